use std::path::PathBuf;

use colored::Colorize;
use inquire::{Confirm, Select, Text};

use crate::{
    commands::{App, check_if_profiles_exist, validate_new_name},
    error::AppError,
    storage::ProfileStore,
    validation::{prompt_until_valid, validate_email, validate_username},
};

/// Menu entry that returns to the main menu
pub const BACK_OPTION: &str = "back";

/// Runs interactive menu interface
pub fn run_menu(app: &App) -> Result<(), AppError> {
    loop {
        let actions: Vec<&'static str> = vec![
            "switch profile",
            "add profile",
            "detect current profile",
            "clone profile",
            "delete profile",
            "export profile",
            "import profile",
            "show current user",
            "show all profiles",
            "test SSH connection",
            "quit",
        ];

        let action_selected: &'static str = Select::new(&format!("{}", "select action".blue()), actions)
            .prompt()?;

        let result = match action_selected {
            "switch profile" => menu_switch_profile(app),
            "add profile" => menu_add_profile(app),
            "detect current profile" => menu_detect_profile(app),
            "clone profile" => menu_clone_profile(app),
            "delete profile" => menu_delete_profile(app),
            "export profile" => menu_export_profile(app),
            "import profile" => menu_import_profile(app),
            "show current user" => app.show_current(),
            "show all profiles" => app.list_profiles(),
            "test SSH connection" => app.test_connection(),
            "quit" => {
                println!("{}", "quitting".yellow());
                break Ok(());
            }
            _ => unreachable!("unexpected input"),
        };

        // stay in the menu on recoverable errors
        match result {
            Ok(()) => {}
            Err(AppError::Inquire(e)) => return Err(AppError::Inquire(e)),
            Err(e) => println!("{}", e.to_string().red()),
        }
    }
}

/// Menu for switching profiles
fn menu_switch_profile(app: &App) -> Result<(), AppError> {
    if let Some(name) = select_profile(&app.store, "select profile to switch:")? {
        app.switch_profile(&name)?;
    }
    Ok(())
}

/// Menu for adding a new profile
fn menu_add_profile(app: &App) -> Result<(), AppError> {
    let name: String = prompt_until_valid(&format!("{}", "enter profile name:".blue()), |input| {
        validate_menu_name(input, &app.store)
    })?;
    let username: String = prompt_until_valid(&format!("{}", "enter git username:".blue()), validate_username)?;
    let email: String = prompt_until_valid(&format!("{}", "enter git email:".blue()), validate_email)?;

    let with_keys = Confirm::new("attach an SSH key pair?").with_default(false).prompt()?;
    if with_keys {
        let private_key = PathBuf::from(Text::new("path to private key:").prompt()?);
        let public_key = PathBuf::from(Text::new("path to public key:").prompt()?);
        app.add_profile(&name, &username, &email, Some((private_key.as_path(), public_key.as_path())), false)
    } else {
        app.add_profile(&name, &username, &email, None, false)
    }
}

fn menu_detect_profile(app: &App) -> Result<(), AppError> {
    let name: String = prompt_until_valid(&format!("{}", "enter profile name:".blue()), |input| {
        validate_menu_name(input, &app.store)
    })?;
    app.detect_profile(&name)
}

fn menu_clone_profile(app: &App) -> Result<(), AppError> {
    let Some(source) = select_profile(&app.store, "select profile to clone:")? else {
        return Ok(());
    };
    let new_name: String = prompt_until_valid(&format!("{}", "enter name for the copy:".blue()), |input| {
        validate_menu_name(input, &app.store)
    })?;
    app.clone_profile(&source, &new_name)
}

/// Menu for deleting a profile
fn menu_delete_profile(app: &App) -> Result<(), AppError> {
    if let Some(name) = select_profile(&app.store, "select profile to delete:")? {
        app.delete_profile(&name)?;
    }
    Ok(())
}

fn menu_export_profile(app: &App) -> Result<(), AppError> {
    let Some(name) = select_profile(&app.store, "select profile to export:")? else {
        return Ok(());
    };
    let dir = PathBuf::from(Text::new("export directory:").prompt()?);
    app.export_profile(&name, &dir)
}

fn menu_import_profile(app: &App) -> Result<(), AppError> {
    let file = PathBuf::from(Text::new("profile file to import:").prompt()?);
    app.import_profile(&file)
}

/// Profile name rules plus the reserved back entry
fn validate_menu_name(name: &str, store: &ProfileStore) -> Result<(), AppError> {
    if name == BACK_OPTION {
        return Err(AppError::Validation(format!("name cannot be '{}'", BACK_OPTION)));
    }
    validate_new_name(name, store)
}

fn select_profile(store: &ProfileStore, prompt: &str) -> Result<Option<String>, AppError> {
    check_if_profiles_exist(store)?;
    let names: Vec<String> = build_name_list(store);
    let selected: String = Select::new(&format!("{}", prompt.blue()), names).prompt()?;
    Ok((selected != BACK_OPTION).then_some(selected))
}

/// Builds list of profile names for menu to display
pub fn build_name_list(store: &ProfileStore) -> Vec<String> {
    let mut names: Vec<String> = store.list().into_iter().map(|profile| profile.name).collect();
    names.push(BACK_OPTION.to_string());
    names
}

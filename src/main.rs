use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use gitid::{
    cli::{Cli, Commands},
    commands::{App, ProfileChanges},
    config::Settings,
    error::AppError,
    menu::run_menu,
};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", err.to_string().red());
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr; RUST_LOG wins over -v
fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn run(cli: Cli) -> Result<(), AppError> {
    let settings = Settings::resolve(&cli.global)?;
    let app = App::open(&settings)?;

    match cli.command {
        Some(Commands::Switch { name }) => app.switch_profile(&name),
        Some(Commands::Add {
            name,
            git_username,
            git_email,
            private_key,
            public_key,
            active,
        }) => {
            let keys = private_key.as_deref().zip(public_key.as_deref());
            app.add_profile(&name, &git_username, &git_email, keys, active)
        }
        Some(Commands::Edit {
            name,
            new_name,
            username,
            email,
            private_key,
            public_key,
            clear_keys,
        }) => app.edit_profile(
            &name,
            ProfileChanges {
                new_name,
                username,
                email,
                keys: private_key.zip(public_key),
                clear_keys,
            },
        ),
        Some(Commands::Delete { name }) => app.delete_profile(&name),
        Some(Commands::Clone { source, new_name }) => app.clone_profile(&source, &new_name),
        Some(Commands::Detect { name }) => app.detect_profile(&name),
        Some(Commands::Export { name, dir }) => app.export_profile(&name, &dir),
        Some(Commands::Import { file }) => app.import_profile(&file),
        Some(Commands::Current) => app.show_current(),
        Some(Commands::List) => app.list_profiles(),
        Some(Commands::Test) => app.test_connection(),
        Some(Commands::Fingerprint) => app.show_fingerprint(),
        None => run_menu(&app),
    }
}

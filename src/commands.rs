use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use colored::Colorize;

use crate::{
    config::Settings,
    engine::CredentialEngine,
    error::AppError,
    git::GitCli,
    profile::{CreatedFrom, Profile},
    ssh::KeyStore,
    storage::ProfileStore,
    validation::{self, MAX_PRIVATE_KEY_SIZE, MAX_PUBLIC_KEY_SIZE},
};

/// Registry plus engine; every user-facing action goes through here
pub struct App {
    pub store: ProfileStore,
    pub engine: Arc<CredentialEngine>,
}

/// Field changes requested by `edit`
#[derive(Debug, Default)]
pub struct ProfileChanges {
    pub new_name: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub keys: Option<(PathBuf, PathBuf)>,
    pub clear_keys: bool,
}

impl App {
    /// Opens the registry and wires the real git adapter
    pub fn open(settings: &Settings) -> Result<App, AppError> {
        let store = ProfileStore::open(&settings.profile_dir)?;
        let keys = KeyStore::new(&settings.ssh_dir, settings.backup_keys);
        let engine = CredentialEngine::new(Box::new(GitCli::new()), keys)
            .with_probe(settings.ssh_host.clone(), settings.probe_timeout);
        Ok(App {
            store,
            engine: Arc::new(engine),
        })
    }

    /// Applies the profile in the background, then records it as active
    pub fn switch_profile(&self, name: &str) -> Result<(), AppError> {
        let profile = self
            .store
            .get(name)
            .ok_or_else(|| AppError::NotFound(name.to_string()))?;

        println!("{} {}", "switching to profile:".blue(), profile.name);
        let handle = self.engine.spawn_apply(profile);
        let report = handle
            .wait()
            .ok_or_else(|| AppError::command("apply", "background task ended without a result"))??;

        self.store.set_active(name)?;

        if let Some(paths) = &report.installed_keys {
            println!("{} {}", "installed SSH key:".green(), paths.private_key.display());
        }
        if let Some(probe) = report.probe.as_ref().filter(|probe| !probe.is_success()) {
            println!("{} {}", "warning:".yellow(), probe.describe());
        }
        println!("{} {}", "switched to profile:".green(), name);
        Ok(())
    }

    /// Adds a manually entered profile
    pub fn add_profile(
        &self,
        name: &str,
        git_username: &str,
        git_email: &str,
        keys: Option<(&Path, &Path)>,
        active: bool,
    ) -> Result<(), AppError> {
        let mut profile = Profile::new(name, git_username, git_email, CreatedFrom::Manual);
        if let Some((private_path, public_path)) = keys {
            let (private_key, public_key) = self.read_key_files(private_path, public_path)?;
            profile = profile.with_keys(private_key, public_key);
        }
        profile.is_active = active;

        self.store.add(profile)?;
        println!("{} {}", "profile added:".green(), name);
        Ok(())
    }

    /// Applies field changes to an existing profile
    pub fn edit_profile(&self, name: &str, changes: ProfileChanges) -> Result<(), AppError> {
        let mut profile = self
            .store
            .get(name)
            .ok_or_else(|| AppError::NotFound(name.to_string()))?;

        if let Some(new_name) = changes.new_name {
            profile.name = new_name;
        }
        if let Some(username) = changes.username {
            profile.git_username = username;
        }
        if let Some(email) = changes.email {
            profile.git_email = email;
        }
        if changes.clear_keys {
            profile.ssh_private_key.clear();
            profile.ssh_public_key.clear();
        } else if let Some((private_path, public_path)) = &changes.keys {
            let (private_key, public_key) = self.read_key_files(private_path, public_path)?;
            profile.ssh_private_key = private_key;
            profile.ssh_public_key = public_key;
        }

        let new_name = profile.name.clone();
        self.store.update(name, profile)?;
        println!("{} {}", "profile updated:".green(), new_name);
        Ok(())
    }

    pub fn delete_profile(&self, name: &str) -> Result<(), AppError> {
        self.store.delete(name)?;
        println!("{} {}", "profile deleted:".green(), name);
        Ok(())
    }

    pub fn clone_profile(&self, source: &str, new_name: &str) -> Result<(), AppError> {
        self.store.clone_profile(source, new_name)?;
        println!("{} {} -> {}", "profile cloned:".green(), source, new_name);
        Ok(())
    }

    /// Registers the identity currently configured on this machine
    pub fn detect_profile(&self, name: &str) -> Result<(), AppError> {
        let profile = self.engine.detect_from_system(name)?;
        let with_keys = profile.has_ssh_keys();
        self.store.add(profile)?;
        println!("{} {}", "profile detected:".green(), name);
        if !with_keys {
            println!("{}", "no SSH key pair found, profile has no keys".yellow());
        }
        Ok(())
    }

    pub fn export_profile(&self, name: &str, dir: &Path) -> Result<(), AppError> {
        let path = self.store.export(name, dir)?;
        println!("{} {}", "profile exported to:".green(), path.display());
        Ok(())
    }

    pub fn import_profile(&self, file: &Path) -> Result<(), AppError> {
        let profile = self.store.import(file)?;
        println!("{} {}", "profile imported:".green(), profile.name);
        Ok(())
    }

    /// Shows current git identity
    pub fn show_current(&self) -> Result<(), AppError> {
        let identity = self.engine.query_current_identity()?;
        println!(
            "{} {} <{}>",
            "current user:".blue(),
            identity.username,
            identity.email
        );
        if let Some(active) = self.store.active() {
            println!("{} {}", "active profile:".blue(), active.name);
        }
        Ok(())
    }

    /// Lists every profile
    pub fn list_profiles(&self) -> Result<(), AppError> {
        check_if_profiles_exist(&self.store)?;
        for profile in self.store.list() {
            let keys = if profile.has_ssh_keys() {
                format!(" ({})", profile.key_type().file_name())
            } else {
                String::new()
            };
            let line = format!("{}: {}{} [{}]", profile.name, profile, keys, profile.created_from.as_str());
            if profile.is_active {
                println!("{}", line.green());
            } else {
                println!("{line}");
            }
        }
        Ok(())
    }

    /// Runs the SSH probe in the background and reports the outcome
    pub fn test_connection(&self) -> Result<(), AppError> {
        println!("{}", "testing SSH connection...".blue());
        let outcome = self
            .engine
            .spawn_probe()
            .wait()
            .ok_or_else(|| AppError::command("ssh", "background task ended without a result"))??;
        if outcome.is_success() {
            println!("{}", "SSH authentication succeeded".green());
        } else {
            println!("{} {}", "SSH test failed:".red(), outcome.describe());
        }
        Ok(())
    }

    pub fn show_fingerprint(&self) -> Result<(), AppError> {
        println!("{}", self.engine.fingerprint()?);
        Ok(())
    }

    /// Reads and checks a key pair from files
    fn read_key_files(&self, private_path: &Path, public_path: &Path) -> Result<(String, String), AppError> {
        let private_key = read_bounded(private_path, MAX_PRIVATE_KEY_SIZE)?;
        let public_key = read_bounded(public_path, MAX_PUBLIC_KEY_SIZE)?;
        self.engine.validate_key_content(&private_key, true)?;
        self.engine.validate_key_content(&public_key, false)?;
        Ok((private_key, public_key))
    }
}

/// Checks if any profiles exist in storage
pub fn check_if_profiles_exist(store: &ProfileStore) -> Result<(), AppError> {
    if store.is_empty() {
        return Err(AppError::Validation("no profiles found".to_string()));
    }
    Ok(())
}

fn read_bounded(path: &Path, max: usize) -> Result<String, AppError> {
    let metadata = fs::metadata(path).map_err(|e| AppError::file("access key file", path, e))?;
    if metadata.len() > max as u64 {
        return Err(AppError::SizeLimit(format!(
            "{} is larger than {} bytes",
            path.display(),
            max
        )));
    }
    fs::read_to_string(path).map_err(|e| AppError::file("read key file", path, e))
}

/// Validates a new profile name against the registry, for interactive prompts
pub fn validate_new_name(name: &str, store: &ProfileStore) -> Result<(), AppError> {
    validation::validate_profile_name(name)?;
    if store.contains(name) {
        return Err(AppError::DuplicateName(name.to_string()));
    }
    Ok(())
}

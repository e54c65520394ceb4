use std::{path::PathBuf, time::Duration};

use crate::{
    cli::GlobalArgs,
    engine::{DEFAULT_PROBE_TIMEOUT, DEFAULT_SSH_HOST},
    error::AppError,
};

/// Profile directory under the user's home directory
const PROFILE_DIR_NAME: &str = ".gitid";
/// SSH directory under the user's home directory
const SSH_DIR_NAME: &str = ".ssh";

/// Resolved runtime settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub profile_dir: PathBuf,
    pub ssh_dir: PathBuf,
    pub ssh_host: String,
    pub probe_timeout: Duration,
    pub backup_keys: bool,
}

impl Settings {
    /// Merges CLI flags and environment (already folded in by clap) over home-relative defaults
    pub fn resolve(args: &GlobalArgs) -> Result<Settings, AppError> {
        let home = dirs::home_dir();
        let under_home = |name: &str| -> Result<PathBuf, AppError> {
            home.as_ref()
                .map(|home| home.join(name))
                .ok_or_else(|| AppError::Validation("failed to find the home directory".to_string()))
        };

        let profile_dir = match &args.profile_dir {
            Some(dir) => dir.clone(),
            None => under_home(PROFILE_DIR_NAME)?,
        };
        let ssh_dir = match &args.ssh_dir {
            Some(dir) => dir.clone(),
            None => under_home(SSH_DIR_NAME)?,
        };

        let probe_timeout = match args.probe_timeout {
            Some(0) => {
                return Err(AppError::Validation("probe timeout must be at least 1 second".to_string()));
            }
            Some(secs) => Duration::from_secs(secs),
            None => DEFAULT_PROBE_TIMEOUT,
        };

        Ok(Settings {
            profile_dir,
            ssh_dir,
            ssh_host: args.ssh_host.clone().unwrap_or_else(|| DEFAULT_SSH_HOST.to_string()),
            probe_timeout,
            backup_keys: args.backup_keys,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> GlobalArgs {
        GlobalArgs {
            profile_dir: Some(PathBuf::from("/tmp/profiles")),
            ssh_dir: Some(PathBuf::from("/tmp/ssh")),
            ssh_host: None,
            probe_timeout: None,
            backup_keys: false,
            verbose: 0,
        }
    }

    #[test]
    fn explicit_paths_win() {
        let settings = Settings::resolve(&args()).unwrap();
        assert_eq!(settings.profile_dir, PathBuf::from("/tmp/profiles"));
        assert_eq!(settings.ssh_dir, PathBuf::from("/tmp/ssh"));
        assert_eq!(settings.ssh_host, DEFAULT_SSH_HOST);
        assert_eq!(settings.probe_timeout, DEFAULT_PROBE_TIMEOUT);
    }

    #[test]
    fn zero_timeout_rejected() {
        let mut args = args();
        args.probe_timeout = Some(0);
        assert!(matches!(Settings::resolve(&args), Err(AppError::Validation(_))));
        args.probe_timeout = Some(3);
        assert_eq!(Settings::resolve(&args).unwrap().probe_timeout, Duration::from_secs(3));
    }
}

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// CLI arguments parser using `clap`
#[derive(Parser, Debug)]
#[command(name = "gitid", version, about = "Switch between Git identity profiles and their SSH keys")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,
    /// Subcommand chosen to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Options shared by every subcommand
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Directory holding one JSON file per profile (default: ~/.gitid)
    #[arg(long, global = true, env = "GITID_PROFILE_DIR")]
    pub profile_dir: Option<PathBuf>,
    /// SSH directory keys are installed into (default: ~/.ssh)
    #[arg(long, global = true, env = "GITID_SSH_DIR")]
    pub ssh_dir: Option<PathBuf>,
    /// Host used by the SSH connectivity test (default: git@github.com)
    #[arg(long, global = true, env = "GITID_SSH_HOST")]
    pub ssh_host: Option<String>,
    /// Connectivity test timeout in seconds (default: 10)
    #[arg(long, global = true, env = "GITID_PROBE_TIMEOUT")]
    pub probe_timeout: Option<u64>,
    /// Move existing key files into ~/.ssh/backup/<timestamp> before installing new ones
    #[arg(long, global = true, env = "GITID_BACKUP_KEYS")]
    pub backup_keys: bool,
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

// Subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Applies a profile to global Git config and installs its SSH keys
    Switch {
        /// Name of profile to switch to
        name: String,
    },
    /// Adds a new profile
    Add {
        /// Unique profile name
        name: String,
        /// Git username
        git_username: String,
        /// Git email
        git_email: String,
        /// File holding the SSH private key
        #[arg(long, requires = "public_key")]
        private_key: Option<PathBuf>,
        /// File holding the SSH public key
        #[arg(long, requires = "private_key")]
        public_key: Option<PathBuf>,
        /// Mark the new profile active without applying it
        #[arg(long)]
        active: bool,
    },
    /// Changes fields of an existing profile
    Edit {
        /// Current profile name
        name: String,
        /// New profile name
        #[arg(long = "name")]
        new_name: Option<String>,
        /// New Git username
        #[arg(long)]
        username: Option<String>,
        /// New Git email
        #[arg(long)]
        email: Option<String>,
        /// File holding the new SSH private key
        #[arg(long, requires = "public_key", conflicts_with = "clear_keys")]
        private_key: Option<PathBuf>,
        /// File holding the new SSH public key
        #[arg(long, requires = "private_key", conflicts_with = "clear_keys")]
        public_key: Option<PathBuf>,
        /// Remove the SSH key pair from the profile
        #[arg(long)]
        clear_keys: bool,
    },
    /// Deletes an inactive profile
    Delete {
        /// Name of profile to delete
        name: String,
    },
    /// Copies a profile under a new name
    Clone {
        /// Profile to copy
        source: String,
        /// Name of the copy
        new_name: String,
    },
    /// Creates a profile from the current Git config and installed SSH keys
    Detect {
        /// Name for the detected profile
        name: String,
    },
    /// Writes a profile to a JSON file in a directory
    Export {
        /// Profile to export
        name: String,
        /// Existing directory to write into
        dir: PathBuf,
    },
    /// Adds a profile from an exported JSON file
    Import {
        /// Exported profile file
        file: PathBuf,
    },
    /// Displays current Git identity
    Current,
    /// Displays all profiles
    List,
    /// Tests SSH authentication with the installed keys
    Test,
    /// Shows the fingerprint of the installed public key
    Fingerprint,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn add_keys_must_come_in_pairs() {
        let parsed = Cli::try_parse_from(["gitid", "add", "work", "jane", "jane@example.com", "--private-key", "k"]);
        assert!(parsed.is_err());

        let parsed = Cli::try_parse_from([
            "gitid", "add", "work", "jane", "jane@example.com", "--private-key", "k", "--public-key", "k.pub",
        ])
        .unwrap();
        assert!(matches!(parsed.command, Some(Commands::Add { private_key: Some(_), .. })));
    }

    #[test]
    fn global_flags_after_subcommand() {
        let parsed = Cli::try_parse_from(["gitid", "list", "--profile-dir", "/tmp/p", "-vv"]).unwrap();
        assert_eq!(parsed.global.profile_dir, Some(PathBuf::from("/tmp/p")));
        assert_eq!(parsed.global.verbose, 2);
    }
}

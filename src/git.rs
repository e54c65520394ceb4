use std::process::{Command, Output};

use crate::error::AppError;

/// Git config key for the username
pub const USER_NAME_KEY: &str = "user.name";
/// Git config key for the email
pub const USER_EMAIL_KEY: &str = "user.email";

/// Read/write access to the global git identity
pub trait GitIdentity: Send + Sync {
    /// Reads a global config value, untrimmed
    fn get(&self, key: &str) -> Result<String, AppError>;
    /// Writes a global config value
    fn set(&self, key: &str, value: &str) -> Result<(), AppError>;
}

/// `git config --global` through the git executable
#[derive(Debug, Clone)]
pub struct GitCli {
    program: String,
}

impl GitCli {
    pub fn new() -> Self {
        GitCli {
            program: "git".to_string(),
        }
    }

    /// Uses a specific git executable
    pub fn with_program(program: impl Into<String>) -> Self {
        GitCli {
            program: program.into(),
        }
    }

    fn run(&self, args: &[&str]) -> Result<Output, AppError> {
        let git_command_output: Output = Command::new(&self.program)
            .args(args)
            .output()
            .map_err(|e| AppError::command(&self.program, e.to_string()))?;

        if !git_command_output.status.success() {
            let stderr = String::from_utf8(git_command_output.stderr)?.trim().to_string();
            let message = if stderr.is_empty() {
                format!("exited with {}", git_command_output.status)
            } else {
                stderr
            };
            return Err(AppError::command(&self.program, message));
        }

        Ok(git_command_output)
    }
}

impl Default for GitCli {
    fn default() -> Self {
        GitCli::new()
    }
}

impl GitIdentity for GitCli {
    /// Executes Git config get command
    ///
    /// # Arguments
    /// * `key` - Git config key (user.name or user.email)
    fn get(&self, key: &str) -> Result<String, AppError> {
        let git_command_output = self.run(&["config", "--global", "--get", key])?;
        Ok(String::from_utf8_lossy(&git_command_output.stdout).to_string())
    }

    /// Executes a Git config set command
    ///
    /// # Arguments
    /// * `key` - Git config key to set (user.name or user.email)
    /// * `value` - Value to set for key (username or email)
    fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        self.run(&["config", "--global", key, value])?;
        Ok(())
    }
}

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    /// Error during file I/O operations
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    /// File operation failed on a specific path
    #[error("failed to {action} {}: {source}", .path.display())]
    File {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Error during JSON serialization or deserialization
    #[error("json error: {0}")]
    SerdeJson(#[from] serde_json::Error),
    /// Error when user input fails.
    #[error("inquire error: {0}")]
    Inquire(#[from] inquire::InquireError),
    /// External program (git, ssh, ssh-keygen) failed or produced unusable output
    #[error("{program} failed: {message}")]
    ExternalCommand { program: String, message: String },
    /// Error during input validation.
    #[error("validation error: {0}")]
    Validation(String),
    /// Profile name already taken
    #[error("profile '{0}' already exists")]
    DuplicateName(String),
    /// Error when a profile is not found.
    #[error("profile not found: '{0}'")]
    NotFound(String),
    /// Active profile cannot be deleted
    #[error("cannot delete active profile '{0}'")]
    ActiveProfileProtected(String),
    /// Import, export or key material over its size bound
    #[error("size limit exceeded: {0}")]
    SizeLimit(String),
    /// No key pair installed in the SSH directory
    #[error("no SSH key pair found in {}", .0.display())]
    MissingKeys(PathBuf),
    /// Error during UTF-8 conversion.
    #[error("UTF-8 error: {0}")]
    Utf8Error(#[from] std::string::FromUtf8Error),
}

impl AppError {
    /// Wraps an I/O error with the action and path it happened on
    pub fn file(action: &'static str, path: &Path, source: std::io::Error) -> Self {
        AppError::File {
            action,
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn command(program: &str, message: impl Into<String>) -> Self {
        AppError::ExternalCommand {
            program: program.to_string(),
            message: message.into(),
        }
    }
}

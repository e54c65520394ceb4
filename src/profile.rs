use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{error::AppError, ssh::KeyType, validation};

/// How a profile came into the registry
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CreatedFrom {
    /// Detected from the current git config and installed keys
    System,
    /// Entered by hand
    #[default]
    Manual,
    /// Read from an exported file
    Import,
    /// Copied from another profile
    Clone,
}

impl CreatedFrom {
    /// Parses a provenance tag, `None` for anything unknown
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "system" => Some(CreatedFrom::System),
            "manual" => Some(CreatedFrom::Manual),
            "import" => Some(CreatedFrom::Import),
            "clone" => Some(CreatedFrom::Clone),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CreatedFrom::System => "system",
            CreatedFrom::Manual => "manual",
            CreatedFrom::Import => "import",
            CreatedFrom::Clone => "clone",
        }
    }
}

/// Represents a Git identity profile, stored one file per profile
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    /// Unique profile name, also the base of the backing file name
    pub name: String,
    /// Git username (user.name)
    pub git_username: String,
    /// Git email address (user.email)
    pub git_email: String,
    /// Private key content, empty when the profile carries no keys
    #[serde(default)]
    pub ssh_private_key: String,
    /// Public key content, empty when the profile carries no keys
    #[serde(default)]
    pub ssh_public_key: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub created_from: CreatedFrom,
}

impl Profile {
    /// Creates an inactive profile without key material
    pub fn new(name: &str, git_username: &str, git_email: &str, created_from: CreatedFrom) -> Self {
        Profile {
            name: name.to_string(),
            git_username: git_username.to_string(),
            git_email: git_email.to_string(),
            ssh_private_key: String::new(),
            ssh_public_key: String::new(),
            is_active: false,
            created_from,
        }
    }

    /// Attaches a key pair
    pub fn with_keys(mut self, private_key: impl Into<String>, public_key: impl Into<String>) -> Self {
        self.ssh_private_key = private_key.into();
        self.ssh_public_key = public_key.into();
        self
    }

    /// True only when both halves of the key pair are present
    pub fn has_ssh_keys(&self) -> bool {
        !self.ssh_private_key.is_empty() && !self.ssh_public_key.is_empty()
    }

    /// Key type the public key installs as
    pub fn key_type(&self) -> KeyType {
        KeyType::detect(&self.ssh_public_key)
    }

    /// Checks every field constraint a stored profile must satisfy
    pub fn validate(&self) -> Result<(), AppError> {
        validation::validate_profile_name(&self.name)?;
        validation::validate_git_identity(&self.git_username, &self.git_email)?;
        validation::validate_key_pair(&self.ssh_private_key, &self.ssh_public_key)
    }

    /// Copy under a new name; clones always start inactive
    pub fn clone_as(&self, new_name: &str) -> Profile {
        Profile {
            name: new_name.to_string(),
            is_active: false,
            created_from: CreatedFrom::Clone,
            ..self.clone()
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.git_username, self.git_email)?;
        if self.is_active {
            write!(f, " [ACTIVE]")?;
        }
        Ok(())
    }
}

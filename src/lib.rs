//! Git identity profile switcher.
//!
//! Profiles (git username/email plus an optional SSH key pair) live one JSON
//! file per profile in `~/.gitid`. Switching applies the identity to global
//! git config, installs the key pair into `~/.ssh`, and probes SSH.

pub mod cli;
pub mod commands;
pub mod config;
pub mod engine;
pub mod error;
pub mod fsutil;
pub mod git;
pub mod menu;
pub mod profile;
pub mod ssh;
pub mod storage;
pub mod tasks;
pub mod transfer;
pub mod validation;

pub use engine::{CredentialEngine, Identity, ProbeOutcome};
pub use error::AppError;
pub use profile::{CreatedFrom, Profile};
pub use ssh::{KeyStore, KeyType};
pub use storage::ProfileStore;

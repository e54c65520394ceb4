//! Size-bounded, validated reading and writing of standalone profile files.

use std::{
    fs,
    io::Read,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::{
    error::AppError,
    fsutil::{self, Publish},
    profile::{CreatedFrom, Profile},
    storage::{PROFILE_EXTENSION, sanitize_filename},
};

/// Largest accepted import file
pub const MAX_IMPORT_SIZE: u64 = 1024 * 1024;
/// Smallest accepted import file
pub const MIN_IMPORT_SIZE: u64 = 10;
/// Mode of an exported file
pub const EXPORT_FILE_MODE: u32 = 0o600;

/// Loosely typed view of an import file; everything is checked before it becomes a `Profile`
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct ImportedProfile {
    name: String,
    git_username: String,
    git_email: String,
    ssh_private_key: String,
    ssh_public_key: String,
    created_from: Option<String>,
}

impl ImportedProfile {
    fn into_profile(self) -> Profile {
        let created_from = self
            .created_from
            .as_deref()
            .and_then(CreatedFrom::parse)
            .unwrap_or(CreatedFrom::Import);
        Profile {
            name: self.name,
            git_username: self.git_username,
            git_email: self.git_email,
            ssh_private_key: self.ssh_private_key,
            ssh_public_key: self.ssh_public_key,
            is_active: false,
            created_from,
        }
    }
}

/// Writes `profile` to `<dir>/<sanitized name>.json` without overwriting anything
pub fn write_export(profile: &Profile, dir: &Path) -> Result<PathBuf, AppError> {
    if dir.as_os_str().is_empty() {
        return Err(AppError::Validation("export directory cannot be empty".to_string()));
    }
    let metadata = fs::metadata(dir).map_err(|e| AppError::file("access export directory", dir, e))?;
    if !metadata.is_dir() {
        return Err(AppError::Validation(format!(
            "export path is not a directory: {}",
            dir.display()
        )));
    }

    let export_path = dir.join(format!("{}.{}", sanitize_filename(&profile.name), PROFILE_EXTENSION));
    if export_path.exists() {
        return Err(AppError::Validation(format!(
            "export file already exists: {}",
            export_path.display()
        )));
    }

    profile.validate()?;

    let json = serde_json::to_string_pretty(profile)?;
    if json.len() as u64 > MAX_IMPORT_SIZE {
        return Err(AppError::SizeLimit(format!(
            "exported profile exceeds {} bytes",
            MAX_IMPORT_SIZE
        )));
    }

    fsutil::atomic_write(&export_path, json.as_bytes(), EXPORT_FILE_MODE, Publish::NoClobber)?;
    Ok(export_path)
}

/// Reads and validates an import file; the result is inactive and marked `import`
pub fn read_import(path: &Path) -> Result<Profile, AppError> {
    if path.as_os_str().is_empty() {
        return Err(AppError::Validation("import file path cannot be empty".to_string()));
    }
    let has_json_suffix = path
        .extension()
        .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(PROFILE_EXTENSION));
    if !has_json_suffix {
        return Err(AppError::Validation("import file must have .json extension".to_string()));
    }

    let metadata = fs::metadata(path).map_err(|e| AppError::file("access import file", path, e))?;
    if !metadata.is_file() {
        return Err(AppError::Validation(format!("not a file: {}", path.display())));
    }
    if metadata.len() > MAX_IMPORT_SIZE {
        return Err(AppError::SizeLimit("import file too large (max 1MB)".to_string()));
    }
    if metadata.len() < MIN_IMPORT_SIZE {
        return Err(AppError::SizeLimit("import file too small to be valid".to_string()));
    }

    let file = fs::File::open(path).map_err(|e| AppError::file("open import file", path, e))?;
    let mut contents = String::new();
    file.take(MAX_IMPORT_SIZE + 1)
        .read_to_string(&mut contents)
        .map_err(|e| AppError::file("read import file", path, e))?;
    if contents.len() as u64 > MAX_IMPORT_SIZE {
        return Err(AppError::SizeLimit("import file too large (max 1MB)".to_string()));
    }

    let imported: ImportedProfile = serde_json::from_str(&contents)?;
    let mut profile = imported.into_profile();
    profile.validate()?;

    profile.is_active = false;
    profile.created_from = CreatedFrom::Import;
    Ok(profile)
}

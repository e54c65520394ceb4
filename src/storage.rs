use std::{
    fs,
    path::{Path, PathBuf},
};

use dashmap::DashMap;
use tracing::{info, warn};

use crate::{
    error::AppError,
    fsutil::{self, Publish},
    profile::Profile,
    transfer,
};

/// Mode of the profile directory
pub const PROFILE_DIR_MODE: u32 = 0o755;
/// Mode of each profile file
pub const PROFILE_FILE_MODE: u32 = 0o600;
/// File extension of profile files
pub const PROFILE_EXTENSION: &str = "json";
/// Fallback file stem when a name sanitizes to nothing
const DEFAULT_FILE_STEM: &str = "profile";
/// Maximum file stem length in characters
const MAX_FILE_STEM_LENGTH: usize = 100;

/// Makes a profile name safe to use as a file stem
pub fn sanitize_filename(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| if crate::validation::UNSAFE_NAME_CHARS.contains(&c) { '_' } else { c })
        .collect();

    let trimmed = replaced.trim_matches(|c: char| c == '.' || c.is_whitespace());
    if trimmed.is_empty() {
        return DEFAULT_FILE_STEM.to_string();
    }

    trimmed.chars().take(MAX_FILE_STEM_LENGTH).collect()
}

/// Registry of profiles, one JSON file per profile in a directory.
///
/// Reads may happen from any thread; mutations are expected from a single
/// interactive flow.
#[derive(Debug)]
pub struct ProfileStore {
    dir: PathBuf,
    profiles: DashMap<String, Profile>,
    /// File each profile was loaded from or last written to
    files: DashMap<String, PathBuf>,
}

impl ProfileStore {
    /// Opens (creating if needed) the profile directory and loads it
    pub fn open(dir: impl Into<PathBuf>) -> Result<ProfileStore, AppError> {
        let dir = dir.into();
        fsutil::ensure_dir(&dir, PROFILE_DIR_MODE)?;
        let store = ProfileStore {
            dir,
            profiles: DashMap::new(),
            files: DashMap::new(),
        };
        store.load()?;
        Ok(store)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `name`
    pub fn profile_path(&self, name: &str) -> PathBuf {
        self.dir
            .join(format!("{}.{}", sanitize_filename(name), PROFILE_EXTENSION))
    }

    /// File currently backing `name`; hand-edited files may not match `profile_path`
    fn backing_file(&self, name: &str) -> PathBuf {
        self.files
            .get(name)
            .map(|entry| entry.value().clone())
            .unwrap_or_else(|| self.profile_path(name))
    }

    /// Re-reads every profile file, skipping unreadable or invalid ones and demoting extra active flags
    pub fn load(&self) -> Result<(), AppError> {
        self.profiles.clear();
        self.files.clear();

        let mut paths: Vec<PathBuf> = fs::read_dir(&self.dir)
            .map_err(|e| AppError::file("read directory", &self.dir, e))?
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_ok_and(|t| t.is_file()))
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == PROFILE_EXTENSION))
            .collect();
        paths.sort();

        let mut active_found = false;
        for path in paths {
            let mut profile = match read_profile_file(&path) {
                Ok(profile) => profile,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping unreadable profile file");
                    continue;
                }
            };
            if let Err(e) = profile.validate() {
                warn!(path = %path.display(), error = %e, "skipping invalid profile file");
                continue;
            }

            if self.profiles.contains_key(&profile.name) {
                warn!(path = %path.display(), name = %profile.name, "skipping profile with duplicate name");
                continue;
            }

            self.files.insert(profile.name.clone(), path);
            if profile.is_active {
                if active_found {
                    profile.is_active = false;
                    warn!(name = %profile.name, "demoting extra active profile");
                    if let Err(e) = self.save(&profile) {
                        warn!(name = %profile.name, error = %e, "failed to persist demotion");
                    }
                } else {
                    active_found = true;
                }
            }
            self.profiles.insert(profile.name.clone(), profile);
        }

        Ok(())
    }

    /// Profile by name
    pub fn get(&self, name: &str) -> Option<Profile> {
        self.profiles.get(name).map(|entry| entry.value().clone())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.profiles.contains_key(name)
    }

    /// All profiles sorted by name
    pub fn list(&self) -> Vec<Profile> {
        let mut profiles: Vec<Profile> = self.profiles.iter().map(|entry| entry.value().clone()).collect();
        profiles.sort_by(|a, b| a.name.cmp(&b.name));
        profiles
    }

    /// The active profile, if any
    pub fn active(&self) -> Option<Profile> {
        self.profiles
            .iter()
            .find(|entry| entry.value().is_active)
            .map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Validates, persists, then registers a new profile.
    ///
    /// A profile created active demotes the others only once its own file is written.
    pub fn add(&self, profile: Profile) -> Result<(), AppError> {
        profile.validate()?;
        if self.contains(&profile.name) {
            return Err(AppError::DuplicateName(profile.name));
        }
        self.check_file_free(&profile.name, None)?;

        let path = self.profile_path(&profile.name);
        self.write_file(&path, &profile)?;
        if profile.is_active {
            self.demote_all_except(&profile.name);
        }

        self.files.insert(profile.name.clone(), path);
        self.profiles.insert(profile.name.clone(), profile);
        Ok(())
    }

    /// Replaces `old_name` with `profile`, renaming the backing file when the name changes.
    ///
    /// The stored active flag is kept; activation only changes through `set_active`.
    pub fn update(&self, old_name: &str, mut profile: Profile) -> Result<(), AppError> {
        profile.validate()?;
        let Some(existing) = self.get(old_name) else {
            return Err(AppError::NotFound(old_name.to_string()));
        };
        profile.is_active = existing.is_active;

        if old_name == profile.name {
            self.save(&profile)?;
            self.profiles.insert(profile.name.clone(), profile);
            return Ok(());
        }

        if self.contains(&profile.name) {
            return Err(AppError::DuplicateName(profile.name));
        }
        self.check_file_free(&profile.name, Some(old_name))?;

        let old_path = self.backing_file(old_name);
        let new_path = self.profile_path(&profile.name);
        self.write_file(&new_path, &profile)?;

        if old_path != new_path {
            if let Err(e) = fs::remove_file(&old_path) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    let _ = fs::remove_file(&new_path);
                    return Err(AppError::file("remove old profile file", &old_path, e));
                }
            }
        }

        self.profiles.remove(old_name);
        self.files.remove(old_name);
        self.files.insert(profile.name.clone(), new_path);
        self.profiles.insert(profile.name.clone(), profile);
        Ok(())
    }

    /// Removes an inactive profile and its file
    pub fn delete(&self, name: &str) -> Result<(), AppError> {
        let Some(profile) = self.get(name) else {
            return Err(AppError::NotFound(name.to_string()));
        };
        if profile.is_active {
            return Err(AppError::ActiveProfileProtected(name.to_string()));
        }

        let path = self.backing_file(name);
        fs::remove_file(&path).map_err(|e| AppError::file("remove profile file", &path, e))?;
        self.profiles.remove(name);
        self.files.remove(name);
        Ok(())
    }

    /// Marks `name` active and every other profile inactive.
    ///
    /// Demotions are best-effort; a crash mid-way is healed by the next `load`.
    pub fn set_active(&self, name: &str) -> Result<(), AppError> {
        let Some(mut target) = self.get(name) else {
            return Err(AppError::NotFound(name.to_string()));
        };

        self.demote_all_except(name);

        target.is_active = true;
        self.save(&target)?;
        self.profiles.insert(target.name.clone(), target);
        Ok(())
    }

    /// Registers a copy of `source` under `new_name`
    pub fn clone_profile(&self, source: &str, new_name: &str) -> Result<Profile, AppError> {
        let original = self
            .get(source)
            .ok_or_else(|| AppError::NotFound(source.to_string()))?;
        let copy = original.clone_as(new_name);
        self.add(copy.clone())?;
        Ok(copy)
    }

    /// Writes `name` into `dir` as a standalone JSON file
    pub fn export(&self, name: &str, dir: &Path) -> Result<PathBuf, AppError> {
        let profile = self
            .get(name)
            .ok_or_else(|| AppError::NotFound(name.to_string()))?;
        let path = transfer::write_export(&profile, dir)?;
        info!(name = %name, path = %path.display(), "exported profile");
        Ok(path)
    }

    /// Reads an exported file and adds it as an inactive `import` profile
    pub fn import(&self, path: &Path) -> Result<Profile, AppError> {
        let profile = transfer::read_import(path)?;
        if self.contains(&profile.name) {
            return Err(AppError::DuplicateName(profile.name));
        }
        self.add(profile.clone())?;
        info!(name = %profile.name, path = %path.display(), "imported profile");
        Ok(profile)
    }

    fn demote_all_except(&self, name: &str) {
        let active: Vec<String> = self
            .profiles
            .iter()
            .filter(|entry| entry.value().is_active && entry.key() != name)
            .map(|entry| entry.key().clone())
            .collect();

        for other in active {
            let Some(mut profile) = self.get(&other) else {
                continue;
            };
            profile.is_active = false;
            if let Err(e) = self.save(&profile) {
                warn!(name = %other, error = %e, "failed to save deactivated profile");
            }
            self.profiles.insert(other, profile);
        }
    }

    /// Rejects a name whose sanitized file already backs a different profile
    fn check_file_free(&self, name: &str, renaming_from: Option<&str>) -> Result<(), AppError> {
        let path = self.profile_path(name);
        let taken = self.profiles.iter().any(|entry| {
            entry.key() != name
                && Some(entry.key().as_str()) != renaming_from
                && self.backing_file(entry.key()) == path
        });
        if taken {
            return Err(AppError::DuplicateName(name.to_string()));
        }
        Ok(())
    }

    /// Rewrites the file already backing `profile`
    fn save(&self, profile: &Profile) -> Result<(), AppError> {
        self.write_file(&self.backing_file(&profile.name), profile)
    }

    fn write_file(&self, path: &Path, profile: &Profile) -> Result<(), AppError> {
        let json: String = serde_json::to_string_pretty(profile)?;
        fsutil::atomic_write(path, json.as_bytes(), PROFILE_FILE_MODE, Publish::Replace)
    }
}

fn read_profile_file(path: &Path) -> Result<Profile, AppError> {
    let contents = fs::read_to_string(path).map_err(|e| AppError::file("read profile file", path, e))?;
    Ok(serde_json::from_str(&contents)?)
}

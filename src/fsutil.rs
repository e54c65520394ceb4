//! File helpers shared by the profile store, export, and key installation.

use std::{
    fs,
    io::Write,
    path::Path,
};

use tempfile::NamedTempFile;

use crate::error::AppError;

/// How the final rename treats an existing file at the target path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Publish {
    Replace,
    NoClobber,
}

/// Atomic write: temp file in the target directory, mode set, synced, then renamed.
///
/// The temp file is removed on every early return, so a failed write leaves
/// whatever was at `target` untouched.
pub fn atomic_write(target: &Path, data: &[u8], mode: u32, publish: Publish) -> Result<(), AppError> {
    let staged = stage(target, data, mode)?;
    persist(staged, target, publish)
}

/// Writes `data` to a synced temp file next to `target` without publishing it.
///
/// Dropping the returned file deletes it.
pub fn stage(target: &Path, data: &[u8], mode: u32) -> Result<NamedTempFile, AppError> {
    let parent = target
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let file_name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "file".to_string());

    let temp = tempfile::Builder::new()
        .prefix(&format!(".{file_name}."))
        .suffix(".tmp")
        .tempfile_in(parent)
        .map_err(|e| AppError::file("create temp file in", parent, e))?;

    set_mode(temp.path(), mode)?;

    let mut file = temp.as_file();
    file.write_all(data)
        .map_err(|e| AppError::file("write temp file for", target, e))?;
    file.sync_all()
        .map_err(|e| AppError::file("sync temp file for", target, e))?;

    Ok(temp)
}

/// Renames a staged file onto `target`
pub fn persist(temp: NamedTempFile, target: &Path, publish: Publish) -> Result<(), AppError> {
    let result = match publish {
        Publish::Replace => temp.persist(target),
        Publish::NoClobber => temp.persist_noclobber(target),
    };
    result
        .map(|_| ())
        .map_err(|e| AppError::file("rename temp file to", target, e.error))
}

/// Sets unix permission bits; a no-op elsewhere
#[cfg(unix)]
pub fn set_mode(path: &Path, mode: u32) -> Result<(), AppError> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
        .map_err(|e| AppError::file("set permissions on", path, e))
}

#[cfg(not(unix))]
pub fn set_mode(_path: &Path, _mode: u32) -> Result<(), AppError> {
    Ok(())
}

/// Permission bits of an existing path
#[cfg(unix)]
pub fn mode_of(path: &Path) -> Result<u32, AppError> {
    use std::os::unix::fs::PermissionsExt;
    let metadata = fs::metadata(path).map_err(|e| AppError::file("stat", path, e))?;
    Ok(metadata.permissions().mode() & 0o777)
}

#[cfg(not(unix))]
pub fn mode_of(path: &Path) -> Result<u32, AppError> {
    fs::metadata(path).map_err(|e| AppError::file("stat", path, e))?;
    Ok(0)
}

/// Creates `dir` (and parents) and forces its mode
pub fn ensure_dir(dir: &Path, mode: u32) -> Result<(), AppError> {
    fs::create_dir_all(dir).map_err(|e| AppError::file("create directory", dir, e))?;
    if mode_of(dir)? != mode {
        set_mode(dir, mode)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("data.json");
        fs::write(&target, "old").unwrap();

        atomic_write(&target, b"new", 0o600, Publish::Replace).unwrap();

        assert_eq!(fs::read_to_string(&target).unwrap(), "new");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn no_clobber_keeps_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("data.json");
        fs::write(&target, "old").unwrap();

        let result = atomic_write(&target, b"new", 0o600, Publish::NoClobber);

        assert!(matches!(result, Err(AppError::File { .. })));
        assert_eq!(fs::read_to_string(&target).unwrap(), "old");
        // temp file cleaned up
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn missing_parent_fails_without_side_effects() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("missing").join("data.json");

        assert!(atomic_write(&target, b"x", 0o600, Publish::Replace).is_err());
        assert!(!target.exists());
    }

    #[cfg(unix)]
    #[test]
    fn applies_mode() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("key");
        atomic_write(&target, b"x", 0o640, Publish::Replace).unwrap();
        assert_eq!(mode_of(&target).unwrap(), 0o640);
    }
}

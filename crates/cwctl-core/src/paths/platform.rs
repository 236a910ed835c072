//! Platform data directory resolution.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use super::error::PathError;

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "CWCTL_DATA_DIR";

/// Get the root directory for cwctl data (connection registry, `.env`).
///
/// Resolution order:
/// 1. `CWCTL_DATA_DIR` environment variable
/// 2. System data directory (e.g., `~/.local/share/cwctl`)
///
/// The directory is created if it does not exist.
pub fn data_root() -> Result<PathBuf, PathError> {
    let root = match env::var(DATA_DIR_ENV) {
        Ok(path) if path.trim().is_empty() => return Err(PathError::EmptyOverride(DATA_DIR_ENV)),
        Ok(path) => PathBuf::from(path.trim()),
        Err(_) => dirs::data_local_dir()
            .ok_or(PathError::NoDataDir)?
            .join("cwctl"),
    };

    ensure_dir(&root)?;
    Ok(root)
}

fn ensure_dir(path: &Path) -> Result<(), PathError> {
    if path.exists() {
        if !path.is_dir() {
            return Err(PathError::NotADirectory(path.to_path_buf()));
        }
        return Ok(());
    }

    fs::create_dir_all(path).map_err(|e| PathError::CreateFailed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paths::test_utils::{ENV_LOCK, EnvVarGuard};
    use tempfile::tempdir;

    #[test]
    fn test_override_is_created() {
        let _lock = ENV_LOCK.lock().unwrap();
        let temp = tempdir().unwrap();
        let target = temp.path().join("nested").join("cwctl");
        let _env = EnvVarGuard::set(DATA_DIR_ENV, target.to_str().unwrap());

        let root = data_root().unwrap();

        assert_eq!(root, target);
        assert!(root.is_dir());
    }

    #[test]
    fn test_override_pointing_at_file_fails() {
        let _lock = ENV_LOCK.lock().unwrap();
        let temp = tempdir().unwrap();
        let file = temp.path().join("not-a-dir");
        fs::write(&file, b"x").unwrap();
        let _env = EnvVarGuard::set(DATA_DIR_ENV, file.to_str().unwrap());

        assert!(matches!(data_root(), Err(PathError::NotADirectory(_))));
    }

    #[test]
    fn test_blank_override_is_rejected() {
        let _lock = ENV_LOCK.lock().unwrap();
        let _env = EnvVarGuard::set(DATA_DIR_ENV, "  ");

        assert!(matches!(
            data_root(),
            Err(PathError::EmptyOverride(DATA_DIR_ENV))
        ));
    }
}

//! Well-known files inside the data root.

use std::path::PathBuf;

use super::error::PathError;
use super::platform::data_root;

/// File name of the connection registry.
pub const CONNECTIONS_FILE: &str = "connections.json";

/// Location of the connection registry file.
pub fn connections_path() -> Result<PathBuf, PathError> {
    Ok(data_root()?.join(CONNECTIONS_FILE))
}

/// Location of the `.env` file that stores user overrides.
pub fn env_file_path() -> Result<PathBuf, PathError> {
    Ok(data_root()?.join(".env"))
}

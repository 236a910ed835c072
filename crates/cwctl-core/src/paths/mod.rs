//! Path utilities for the cwctl data directory.
//!
//! - Data root (`CWCTL_DATA_DIR` or the platform local data directory)
//! - `connections.json` registry file
//! - `.env` overrides file read at CLI start
//!
//! No interactive I/O here; adapters decide what to do with missing files.

mod config;
mod error;
mod platform;

#[cfg(test)]
mod test_utils;

pub use error::PathError;

pub use platform::{DATA_DIR_ENV, data_root};

pub use config::{CONNECTIONS_FILE, connections_path, env_file_path};

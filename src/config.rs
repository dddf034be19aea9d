//! Platform-specific paths

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Environment variable overriding the data directory
pub const DATA_DIR_ENV: &str = "HOMEPAGE_DATA_DIR";

/// Get the data directory
/// - macOS: ~/Library/Application Support/homepage/
/// - Linux: ~/.local/share/homepage/
/// - Windows: %APPDATA%/homepage/
///
/// `HOMEPAGE_DATA_DIR` takes precedence when set and non-empty.
pub fn data_dir() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os(DATA_DIR_ENV).filter(|d| !d.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    let data = dirs::data_dir().context("Could not determine data directory")?;
    Ok(data.join("homepage"))
}

/// Get the SQLite database holding the config document
pub fn database_path() -> Result<PathBuf> {
    Ok(data_dir()?.join("storage.db"))
}

/// Get the directory backups are written to
pub fn backups_dir() -> Result<PathBuf> {
    Ok(data_dir()?.join("backups"))
}

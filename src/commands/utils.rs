//! Shared utilities for commands

use anyhow::{Context, Result};
use serde_json::Value;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

use homepage_config::config;
use homepage_config::storage::SqliteStore;
use homepage_config::store::{ConfigStore, StoreOptions};

/// Format bytes as human-readable size
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Open the store backed by `db` (or the default database) and load it
pub fn open_store(db: Option<&Path>) -> Result<ConfigStore> {
    let path = match db {
        Some(path) => path.to_path_buf(),
        None => config::database_path()?,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create: {}", parent.display()))?;
    }

    let backend = SqliteStore::open(&path)
        .with_context(|| format!("Failed to open: {}", path.display()))?;
    let store = ConfigStore::new(Box::new(backend), StoreOptions::default());
    store.initialize();
    Ok(store)
}

/// Parse a command-line value as JSON, falling back to a plain string
///
/// `true`, `42` and `{"a":1}` become JSON; `dark` becomes `"dark"`.
pub fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Ask a yes/no question on stdin
pub fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt} [y/N] ");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(1024), "1.0 KB");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(1024 * 1024), "1.0 MB");
        assert_eq!(format_size(1024 * 1024 * 1024), "1.0 GB");
    }

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value("true"), json!(true));
        assert_eq!(parse_value("42"), json!(42));
        assert_eq!(parse_value(r#"{"a":1}"#), json!({ "a": 1 }));
        assert_eq!(parse_value("dark"), json!("dark"));
        assert_eq!(parse_value("#ff0000"), json!("#ff0000"));
    }

    #[test]
    fn test_open_store_creates_database() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("nested").join("storage.db");

        let store = open_store(Some(&db)).unwrap();
        assert!(store.force_save());
        assert!(db.exists());
    }
}

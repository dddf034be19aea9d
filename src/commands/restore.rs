//! Restore command - Import the config from a backup archive

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use flate2::read::GzDecoder;
use owo_colors::OwoColorize;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tar::Archive;

use super::backup::{BackupManifest, MANIFEST_FILE_NAME};
use super::utils;
use homepage_config::store::EXPORT_FILE_NAME;

/// Execute the restore command
pub fn execute(db: Option<&Path>, backup_path: &Path, yes: bool) -> Result<()> {
    if !backup_path.exists() {
        bail!("Backup file does not exist: {}", backup_path.display());
    }

    let manifest = read_manifest(backup_path)?;
    let created = DateTime::<Utc>::from_timestamp(manifest.created_at, 0)
        .map(|at| at.to_rfc3339())
        .unwrap_or_else(|| manifest.created_at.to_string());

    println!("Restoring from backup:");
    println!("  Created: {}", created);
    println!("  Config version: {}", manifest.config_version);
    println!(
        "  Entries: {} bookmarks, {} todos, {} notes, {} events, {} countdowns",
        manifest.includes.bookmarks,
        manifest.includes.todos,
        manifest.includes.notes,
        manifest.includes.events,
        manifest.includes.countdowns
    );
    println!();

    if !yes && !utils::confirm("Replace the current config with this backup?")? {
        println!("Aborted.");
        return Ok(());
    }

    let config_json = read_entry(backup_path, EXPORT_FILE_NAME)?;
    let store = utils::open_store(db)?;
    store
        .import_config(&config_json)
        .with_context(|| format!("Backup contains an invalid config: {}", backup_path.display()))?;

    println!("{}", "Restore complete!".green());
    Ok(())
}

/// Read manifest from a backup archive
pub fn read_manifest(backup_path: &Path) -> Result<BackupManifest> {
    let content = read_entry(backup_path, MANIFEST_FILE_NAME)?;
    serde_json::from_str(&content).context("Failed to parse manifest.json")
}

/// Read one file out of a backup archive
fn read_entry(backup_path: &Path, name: &str) -> Result<String> {
    let file = File::open(backup_path)
        .with_context(|| format!("Failed to open: {}", backup_path.display()))?;
    let decoder = GzDecoder::new(file);
    let mut archive = Archive::new(decoder);

    for entry in archive.entries()? {
        let mut entry = entry?;
        let path = entry.path()?;

        if path.to_string_lossy() == name {
            let mut content = String::new();
            entry.read_to_string(&mut content)?;
            return Ok(content);
        }
    }

    bail!("Backup archive does not contain {}", name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::backup::create_backup;
    use serde_json::{json, Value};

    #[test]
    fn test_restore_replaces_current_config() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("storage.db");

        let store = utils::open_store(Some(&db)).unwrap();
        store.set("settings.theme", json!("dark")).unwrap();
        let archive = create_backup(&store, dir.path(), Utc::now()).unwrap();
        store.set("settings.theme", json!("light")).unwrap();
        store.flush();
        drop(store);

        execute(Some(&db), &archive, true).unwrap();

        let store = utils::open_store(Some(&db)).unwrap();
        assert_eq!(store.get("settings.theme", Value::Null), json!("dark"));
    }

    #[test]
    fn test_missing_archive() {
        let dir = tempfile::tempdir().unwrap();
        let result = execute(None, &dir.path().join("nope.tar.gz"), true);
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_entry() {
        let dir = tempfile::tempdir().unwrap();
        let store = utils::open_store(Some(&dir.path().join("storage.db"))).unwrap();
        let archive = create_backup(&store, dir.path(), Utc::now()).unwrap();

        assert!(read_entry(&archive, "other.json").is_err());
        assert!(read_entry(&archive, EXPORT_FILE_NAME).is_ok());
    }
}

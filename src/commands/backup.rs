//! Backup command - Archive the config document
//!
//! Archives are `.tar.gz` files holding `manifest.json` and `config.json`,
//! named `config-backup-<timestamp>.tar.gz`. `preferences.backupInterval`
//! (hours) and `preferences.maxBackups` decide when a new one is due and how
//! many are kept.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use flate2::write::GzEncoder;
use flate2::Compression;
use owo_colors::OwoColorize;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tar::Builder;
use tracing::{debug, warn};

use super::utils;
use homepage_config::config;
use homepage_config::store::{ConfigStore, EXPORT_FILE_NAME};

pub const MANIFEST_FILE_NAME: &str = "manifest.json";
const BACKUP_PREFIX: &str = "config-backup-";
const BACKUP_SUFFIX: &str = ".tar.gz";
const TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S-%3f";

const DEFAULT_INTERVAL_HOURS: f64 = 24.0;
const DEFAULT_MAX_BACKUPS: usize = 5;

/// Backup metadata
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct BackupManifest {
    /// Version of the backup format
    pub version: u32,
    /// Unix timestamp of backup creation
    pub created_at: i64,
    /// `version` field of the archived document
    pub config_version: String,
    /// `lastUpdated` field of the archived document
    pub last_updated: String,
    /// Entry counts of the archived document
    pub includes: BackupContents,
}

/// What's included in the backup
#[derive(Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct BackupContents {
    pub bookmarks: usize,
    pub todos: usize,
    pub notes: usize,
    pub events: usize,
    pub countdowns: usize,
}

/// Execute the backup command
pub fn execute(db: Option<&Path>, output_dir: Option<&Path>, if_due: bool) -> Result<()> {
    let store = utils::open_store(db)?;
    let dir = match output_dir {
        Some(dir) => dir.to_path_buf(),
        None => config::backups_dir()?,
    };
    fs::create_dir_all(&dir).with_context(|| format!("Failed to create: {}", dir.display()))?;

    let now = Utc::now();
    let interval = store
        .get_as::<f64>("preferences.backupInterval")
        .unwrap_or(DEFAULT_INTERVAL_HOURS);

    if if_due {
        let existing = list_backups(&dir)?;
        if !is_due(&existing, interval, now) {
            println!(
                "{} latest backup is newer than {} hours",
                "Skipped:".yellow(),
                interval
            );
            return Ok(());
        }
    }

    let backup_path = create_backup(&store, &dir, now)?;
    let size = fs::metadata(&backup_path)?.len();
    println!(
        "{} {} ({})",
        "Created:".green(),
        backup_path.display(),
        utils::format_size(size)
    );

    let max_backups = store
        .get_as::<usize>("preferences.maxBackups")
        .unwrap_or(DEFAULT_MAX_BACKUPS);
    for removed in prune(&dir, max_backups)? {
        println!("{} {}", "Removed:".green(), removed.display());
    }

    Ok(())
}

/// Write a new archive of the current document into `dir`
pub fn create_backup(store: &ConfigStore, dir: &Path, now: DateTime<Utc>) -> Result<PathBuf> {
    let config_json = store.export_config()?;
    let stats = store.stats().unwrap_or_default();

    let manifest = BackupManifest {
        version: 1,
        created_at: now.timestamp(),
        config_version: stats.version,
        last_updated: stats.last_updated,
        includes: BackupContents {
            bookmarks: stats.bookmarks_count,
            todos: stats.todos_count,
            notes: stats.notes_count,
            events: stats.events_count,
            countdowns: stats.countdowns_count,
        },
    };

    let backup_path = dir.join(backup_file_name(now));
    let file = File::create(&backup_path)
        .with_context(|| format!("Failed to create: {}", backup_path.display()))?;

    let encoder = GzEncoder::new(file, Compression::default());
    let mut archive = Builder::new(encoder);

    let manifest_json = serde_json::to_string_pretty(&manifest)?;
    add_file_to_archive(&mut archive, MANIFEST_FILE_NAME, manifest_json.as_bytes(), now)?;
    add_file_to_archive(&mut archive, EXPORT_FILE_NAME, config_json.as_bytes(), now)?;

    let encoder = archive.into_inner()?;
    encoder.finish()?;

    debug!(path = %backup_path.display(), "Wrote backup");
    Ok(backup_path)
}

fn backup_file_name(at: DateTime<Utc>) -> String {
    format!(
        "{BACKUP_PREFIX}{}{BACKUP_SUFFIX}",
        at.format(TIMESTAMP_FORMAT)
    )
}

/// Creation time encoded in a backup file name
fn parse_backup_time(name: &str) -> Option<DateTime<Utc>> {
    let stamp = name
        .strip_prefix(BACKUP_PREFIX)?
        .strip_suffix(BACKUP_SUFFIX)?;
    NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

/// Backups in `dir`, oldest first
pub fn list_backups(dir: &Path) -> Result<Vec<(DateTime<Utc>, PathBuf)>> {
    let mut backups = Vec::new();
    if !dir.exists() {
        return Ok(backups);
    }

    for entry in fs::read_dir(dir)?.flatten() {
        let name = entry.file_name();
        if let Some(created) = parse_backup_time(&name.to_string_lossy()) {
            backups.push((created, entry.path()));
        }
    }
    backups.sort();
    Ok(backups)
}

/// Whether a new backup is due given the existing ones
fn is_due(existing: &[(DateTime<Utc>, PathBuf)], interval_hours: f64, now: DateTime<Utc>) -> bool {
    let Some((newest, _)) = existing.last() else {
        return true;
    };
    let interval = Duration::milliseconds((interval_hours.max(0.0) * 3_600_000.0) as i64);
    now - *newest >= interval
}

/// Delete the oldest backups so at most `keep` remain (at least one is kept)
pub fn prune(dir: &Path, keep: usize) -> Result<Vec<PathBuf>> {
    let backups = list_backups(dir)?;
    let excess = backups.len().saturating_sub(keep.max(1));

    let mut removed = Vec::new();
    for (_, path) in backups.into_iter().take(excess) {
        match fs::remove_file(&path) {
            Ok(()) => removed.push(path),
            Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove old backup"),
        }
    }
    Ok(removed)
}

/// Add a file with content to the archive
fn add_file_to_archive<W: Write>(
    archive: &mut Builder<W>,
    name: &str,
    content: &[u8],
    mtime: DateTime<Utc>,
) -> Result<()> {
    let mut header = tar::Header::new_gnu();
    header.set_size(content.len() as u64);
    header.set_mode(0o644);
    header.set_mtime(mtime.timestamp().max(0) as u64);
    header.set_cksum();

    archive.append_data(&mut header, name, content)?;
    Ok(())
}

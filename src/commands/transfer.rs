//! Export, import and reset commands

use anyhow::{bail, Context, Result};
use owo_colors::OwoColorize;
use std::fs;
use std::path::Path;

use super::utils;
use homepage_config::storage::STORAGE_DUMP_FILE_NAME;
use homepage_config::store::EXPORT_FILE_NAME;

/// Write the config as pretty JSON to `output`, or to stdout
///
/// With `raw`, dumps every `homepage-` storage key instead of the config.
pub fn export(db: Option<&Path>, output: Option<&Path>, raw: bool) -> Result<()> {
    let store = utils::open_store(db)?;

    let Some(path) = output else {
        let json = if raw {
            store.export_storage()?
        } else {
            store.export_config()?
        };
        println!("{}", json);
        return Ok(());
    };

    let path = if path.is_dir() {
        path.join(if raw { STORAGE_DUMP_FILE_NAME } else { EXPORT_FILE_NAME })
    } else {
        path.to_path_buf()
    };
    let json = if raw {
        let json = store.export_storage()?;
        fs::write(&path, &json).with_context(|| format!("Failed to write: {}", path.display()))?;
        json
    } else {
        store.export_to(&path)?
    };

    println!(
        "{} {} ({})",
        "Exported:".green(),
        path.display(),
        utils::format_size(json.len() as u64)
    );
    Ok(())
}

/// Replace the config with the contents of `file`
///
/// With `raw`, `file` is a storage dump and its `homepage-` keys are written
/// back as they are.
pub fn import(db: Option<&Path>, file: &Path, raw: bool) -> Result<()> {
    let store = utils::open_store(db)?;

    if !raw {
        store
            .import_from(file)
            .with_context(|| format!("Failed to import: {}", file.display()))?;
        println!("{} {}", "Imported:".green(), file.display());
        return Ok(());
    }

    let text =
        fs::read_to_string(file).with_context(|| format!("Failed to read: {}", file.display()))?;
    let written = store
        .import_storage(&text)
        .with_context(|| format!("Failed to import: {}", file.display()))?;
    println!(
        "{} {} ({} keys)",
        "Imported:".green(),
        file.display(),
        written
    );
    Ok(())
}

/// Replace the config with defaults
///
/// With `all`, every key in the database is removed, legacy ones included.
pub fn reset(db: Option<&Path>, yes: bool, all: bool) -> Result<()> {
    let prompt = if all {
        "Delete everything stored in the database?"
    } else {
        "Reset all settings and data to defaults?"
    };
    if !yes && !utils::confirm(prompt)? {
        println!("Aborted.");
        return Ok(());
    }

    let store = utils::open_store(db)?;
    if all {
        if !store.clear_storage() {
            bail!("Some keys could not be removed");
        }
        println!("{} storage cleared", "Reset:".green());
    } else {
        store.reset_config();
        println!("{} config restored to defaults", "Reset:".green());
    }
    Ok(())
}

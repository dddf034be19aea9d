//! Stats command - Summarize the stored config

use anyhow::{Context, Result};
use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, ContentArrangement, Table};
use std::path::Path;

use super::utils;
use homepage_config::store::ConfigStats;

/// Get statistics for the stored config
pub fn stats(db: Option<&Path>) -> Result<ConfigStats> {
    let store = utils::open_store(db)?;
    store.stats().context("Config is not loaded")
}

/// Format stats for display
pub fn format_stats(stats: &ConfigStats) -> String {
    let mut lines = vec![];

    lines.push(format!("Version: {}", stats.version));
    lines.push(format!("Last Updated: {}", stats.last_updated));
    lines.push(format!(
        "Data Size: {}",
        utils::format_size(stats.data_size as u64)
    ));
    lines.push(format!(
        "Autosave: {}",
        if stats.autosave { "on" } else { "off" }
    ));
    lines.push(String::new()); // blank line

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![Cell::new("Collection"), Cell::new("Entries")]);

    for (name, count) in [
        ("Bookmarks", stats.bookmarks_count),
        ("Todos", stats.todos_count),
        ("Notes", stats.notes_count),
        ("Events", stats.events_count),
        ("Countdowns", stats.countdowns_count),
    ] {
        table.add_row(vec![Cell::new(name), Cell::new(count)]);
    }
    lines.push(table.to_string());

    lines.join("\n")
}

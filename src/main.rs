//! homepage-config: CLI for the new-tab homepage configuration store
//!
//! Reads and edits the config document in the local SQLite database, renders
//! the appearance settings as CSS, and manages backups.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

mod commands;

#[derive(Parser)]
#[command(name = "homepage-config")]
#[command(about = "Manage the new-tab homepage configuration", long_about = None)]
#[command(version)]
struct Cli {
    /// SQLite database to use (default: <data dir>/homepage/storage.db)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the config with defaults (migrating legacy keys if present)
    Init,

    /// Print a value by dot path, or the whole config
    Get {
        /// Dot path, e.g. settings.theme or data.todos.0
        path: Option<String>,
    },

    /// Set a value by dot path (JSON, or a plain string)
    Set {
        /// Dot path, e.g. settings.theme
        path: String,

        /// New value, e.g. dark, 0.5, true or '{"a":1}'
        value: String,
    },

    /// Append a JSON object to a list, e.g. data.bookmarks
    Add {
        /// Dot path of the list
        path: String,

        /// Entry as a JSON object; an id is assigned if missing
        item: String,
    },

    /// Remove an entry from a list by id
    Remove {
        /// Dot path of the list
        path: String,

        /// Id of the entry
        id: i64,
    },

    /// Export the config as JSON
    Export {
        /// Output file or directory (prints to stdout if omitted)
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Dump every homepage- storage key instead of the config
        #[arg(long)]
        raw: bool,
    },

    /// Replace the config with an exported JSON file
    Import {
        /// File to import
        file: PathBuf,

        /// The file is a raw storage dump made with `export --raw`
        #[arg(long)]
        raw: bool,
    },

    /// Reset the config to defaults
    Reset {
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,

        /// Delete every stored key, legacy ones included
        #[arg(long)]
        all: bool,
    },

    /// Show a summary of the config
    Stats {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the stylesheet produced by the stored settings
    Css {
        /// Print the resolved style as JSON instead of CSS
        #[arg(long)]
        json: bool,
    },

    /// Preview settings on top of the stored ones without saving them
    Preview {
        /// Settings to try, as a JSON object
        settings: String,

        /// Wait for the preview to expire and print the reverted stylesheet
        #[arg(long)]
        wait: bool,
    },

    /// Print the module a new tab opens with
    Startup,

    /// Archive the config into the backups directory
    Backup {
        /// Only back up if the latest backup is older than preferences.backupInterval
        #[arg(long)]
        if_due: bool,

        /// Directory to write to (default: <data dir>/homepage/backups)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Restore the config from a backup archive
    Restore {
        /// Backup file to restore from
        backup_file: PathBuf,

        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

fn main() -> Result<()> {
    // Parse log level from environment variable
    let log_level = match std::env::var("LOG_LEVEL")
        .unwrap_or_else(|_| "warn".to_string())
        .to_lowercase()
        .as_str()
    {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();
    let db = cli.db.as_deref();

    match cli.command {
        Commands::Init => commands::document::init(db)?,

        Commands::Get { path } => commands::document::get(db, path.as_deref())?,

        Commands::Set { path, value } => commands::document::set(db, &path, &value)?,

        Commands::Add { path, item } => commands::document::add(db, &path, &item)?,

        Commands::Remove { path, id } => commands::document::remove(db, &path, id)?,

        Commands::Export { output, raw } => {
            commands::transfer::export(db, output.as_deref(), raw)?
        }

        Commands::Import { file, raw } => commands::transfer::import(db, &file, raw)?,

        Commands::Reset { yes, all } => commands::transfer::reset(db, yes, all)?,

        Commands::Stats { json } => {
            let stats = commands::stats::stats(db)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                println!("{}", commands::stats::format_stats(&stats));
            }
        }

        Commands::Css { json } => commands::appearance::css(db, json)?,

        Commands::Preview { settings, wait } => {
            commands::appearance::preview(db, &settings, wait)?
        }

        Commands::Startup => commands::appearance::startup(db)?,

        Commands::Backup { if_due, output } => {
            commands::backup::execute(db, output.as_deref(), if_due)?
        }

        Commands::Restore { backup_file, yes } => {
            commands::restore::execute(db, &backup_file, yes)?
        }
    }

    Ok(())
}

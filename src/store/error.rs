use std::path::PathBuf;
use thiserror::Error;

use crate::document::PathError;

/// Errors surfaced by [`ConfigStore`](super::ConfigStore)
///
/// Storage failures never show up here: they are logged and absorbed by
/// [`Persistence`](crate::storage::Persistence).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config is not valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    #[error("config has an invalid shape: {0}")]
    InvalidShape(&'static str),

    #[error(transparent)]
    InvalidPath(#[from] PathError),

    #[error("'{0}' does not hold a list")]
    NotACollection(String),

    #[error("list entries must be JSON objects")]
    InvalidItem,

    #[error("failed to serialize config: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

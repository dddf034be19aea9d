//! The persisted config document
//!
//! The document is kept as a `serde_json::Value` so keys written by newer or
//! older builds survive a load/save cycle untouched. Typed views are built on
//! demand (see [`crate::appearance::Settings`]).

pub mod defaults;
pub mod merge;
pub mod migrate;
pub mod path;

use chrono::{DateTime, SecondsFormat, Utc};

pub use defaults::{default_config, CONFIG_VERSION};
pub use merge::{deep_merge, merge_with_defaults};
pub use path::{get_path, set_path, PathError};

/// Storage key of the consolidated document
pub const CONFIG_KEY: &str = "homepage-config";

/// Format a timestamp the way the document stores it: `2024-01-01T00:00:00.000Z`
pub fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_iso_timestamp_millis_zulu() {
        let at = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(iso_timestamp(at), "2024-01-02T03:04:05.000Z");
    }
}

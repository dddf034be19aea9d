//! Default document template
//!
//! Every field the UI reads has a default here. Fields added to this template
//! are backfilled into existing documents on the next load.

use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use super::iso_timestamp;

/// Version written into new documents
pub const CONFIG_VERSION: &str = "1.0.0";

/// A fresh copy of the full default document, stamped with `now`
pub fn default_config(now: DateTime<Utc>) -> Value {
    json!({
        "version": CONFIG_VERSION,
        "lastUpdated": iso_timestamp(now),
        "settings": default_settings(),
        "data": {
            "lastActiveModule": "quote",
            "bookmarks": [],
            "todos": [],
            "notes": [],
            "calendar": {
                "events": [],
                "countdowns": []
            },
            "news": {
                "sources": [],
                "cache": []
            }
        },
        "preferences": {
            "autoSave": true,
            "backupInterval": 24,
            "maxBackups": 5,
            "enableAnalytics": false
        }
    })
}

/// Default `settings` sub-document
pub fn default_settings() -> Value {
    json!({
        "theme": "light",
        "backgroundType": "color",
        "backgroundColor": "#ffffff",
        "backgroundImage": "",
        "backgroundOpacity": 1,
        "backgroundBrightness": 1,
        "backgroundBlur": 0,
        "backgroundFit": "cover",
        "textColor": "#000000",
        "linkColor": "#4a90e2",
        "fontFamily": "Arial, sans-serif",
        "gradientType": "linear",
        "gradientDirection": "to right",
        "gradientColors": ["#4a90e2", "#9b59b6"],
        "gradientStops": [0, 100],
        "showBackground": true,
        "startupModuleType": "last",
        "startupModule": "quote"
    })
}

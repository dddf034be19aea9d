//! Which widget opens when a new tab loads

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::appearance::Settings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Module {
    Calendar,
    Bookmark,
    Todo,
    Note,
    #[default]
    Quote,
    News,
}

impl Module {
    pub const ALL: [Module; 6] = [
        Self::Calendar,
        Self::Bookmark,
        Self::Todo,
        Self::Note,
        Self::Quote,
        Self::News,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Calendar => "calendar",
            Self::Bookmark => "bookmark",
            Self::Todo => "todo",
            Self::Note => "note",
            Self::Quote => "quote",
            Self::News => "news",
        }
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Module {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| format!("unknown module '{s}'"))
    }
}

/// Pick the startup module
///
/// `startupModuleType` is `"last"` (reopen the last active module) or
/// `"specific"` (always open `startupModule`). Unknown names fall back to
/// [`Module::Quote`].
pub fn determine_startup_module(settings: &Settings, last_active: Option<&str>) -> Module {
    let name = match settings.startup_module_type.as_str() {
        "specific" => Some(settings.startup_module.as_str()),
        _ => last_active.filter(|s| !s.is_empty()),
    };

    name.and_then(|n| n.parse().ok()).unwrap_or_default()
}

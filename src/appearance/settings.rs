//! Typed view of the `settings` sub-document
//!
//! Parsing is per field: a malformed field is logged and replaced by its
//! default while the rest of the settings still apply.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    /// Flat fill used when no background is shown
    pub fn fill(self) -> &'static str {
        match self {
            Self::Light => "#ffffff",
            Self::Dark => "#121212",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundType {
    #[default]
    Color,
    Image,
    Gradient,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GradientType {
    #[default]
    Linear,
    Radial,
}

/// Presentation settings with defaults for every field
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub theme: Theme,
    pub background_type: BackgroundType,
    pub background_color: String,
    pub background_image: String,
    pub background_opacity: f64,
    pub background_brightness: f64,
    pub background_blur: f64,
    pub background_fit: String,
    pub text_color: Option<String>,
    pub link_color: Option<String>,
    pub font_family: Option<String>,
    pub gradient_type: GradientType,
    pub gradient_direction: String,
    pub gradient_colors: Vec<String>,
    pub gradient_stops: Vec<f64>,
    pub show_background: bool,
    pub startup_module_type: String,
    pub startup_module: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::Light,
            background_type: BackgroundType::Color,
            background_color: "#ffffff".to_string(),
            background_image: String::new(),
            background_opacity: 1.0,
            background_brightness: 1.0,
            background_blur: 0.0,
            background_fit: "cover".to_string(),
            text_color: None,
            link_color: None,
            font_family: None,
            gradient_type: GradientType::Linear,
            gradient_direction: "to right".to_string(),
            gradient_colors: vec!["#4a90e2".to_string(), "#9b59b6".to_string()],
            gradient_stops: vec![0.0, 100.0],
            show_background: true,
            startup_module_type: "last".to_string(),
            startup_module: "quote".to_string(),
        }
    }
}

impl Settings {
    /// Build from the raw `settings` value; never fails
    pub fn from_value(value: &Value) -> Self {
        let empty = Map::new();
        let map = match value {
            Value::Object(map) => map,
            Value::Null => &empty,
            other => {
                warn!(value = %other, "Settings are not an object, using defaults");
                &empty
            }
        };

        let defaults = Self::default();
        Self {
            theme: field(map, "theme").unwrap_or(defaults.theme),
            background_type: field(map, "backgroundType").unwrap_or(defaults.background_type),
            background_color: field(map, "backgroundColor").unwrap_or(defaults.background_color),
            background_image: field(map, "backgroundImage").unwrap_or(defaults.background_image),
            background_opacity: field(map, "backgroundOpacity")
                .unwrap_or(defaults.background_opacity),
            background_brightness: field(map, "backgroundBrightness")
                .unwrap_or(defaults.background_brightness),
            background_blur: field(map, "backgroundBlur").unwrap_or(defaults.background_blur),
            background_fit: field(map, "backgroundFit").unwrap_or(defaults.background_fit),
            text_color: non_empty(field(map, "textColor")),
            link_color: non_empty(field(map, "linkColor")),
            font_family: non_empty(field(map, "fontFamily")),
            gradient_type: field(map, "gradientType").unwrap_or(defaults.gradient_type),
            gradient_direction: field(map, "gradientDirection")
                .unwrap_or(defaults.gradient_direction),
            gradient_colors: field(map, "gradientColors").unwrap_or(defaults.gradient_colors),
            gradient_stops: field(map, "gradientStops").unwrap_or(defaults.gradient_stops),
            show_background: field(map, "showBackground").unwrap_or(defaults.show_background),
            startup_module_type: field(map, "startupModuleType")
                .unwrap_or(defaults.startup_module_type),
            startup_module: field(map, "startupModule").unwrap_or(defaults.startup_module),
        }
    }
}

/// Decode one field; absent and `null` are silent, anything else malformed
/// is logged
fn field<T: DeserializeOwned>(map: &Map<String, Value>, key: &str) -> Option<T> {
    match map.get(key) {
        None | Some(Value::Null) => None,
        Some(value) => match serde_json::from_value(value.clone()) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                warn!(field = key, value = %value, error = %e, "Ignoring malformed setting");
                None
            }
        },
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

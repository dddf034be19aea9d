//! Applying a [`ResolvedStyle`] to a page
//!
//! [`StyleSurface`] is the seam to whatever hosts the page. Each step is
//! applied independently so one failure does not stop the rest.

use std::fmt::Write as _;
use thiserror::Error;
use tracing::{debug, warn};

use super::style::{BackgroundLayer, ResolvedStyle, DARK_MODE_CLASS, LAYER_ID, THEME_ATTRIBUTE};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("surface rejected {what}: {reason}")]
    Rejected { what: String, reason: String },

    #[error("surface is not available")]
    Unavailable,
}

/// Something styles can be written to
pub trait StyleSurface {
    fn set_property(&mut self, name: &str, value: &str) -> Result<(), RenderError>;
    fn set_attribute(&mut self, name: &str, value: &str) -> Result<(), RenderError>;
    fn set_body_class(&mut self, class: &str, enabled: bool) -> Result<(), RenderError>;
    fn set_body_background(&mut self, value: &str) -> Result<(), RenderError>;
    /// Create the layer on first use, then update it in place
    fn apply_layer(&mut self, layer: &BackgroundLayer) -> Result<(), RenderError>;
}

/// Write `style` to `surface`, returning how many steps failed
pub fn render<S: StyleSurface + ?Sized>(style: &ResolvedStyle, surface: &mut S) -> usize {
    let mut failures = 0;
    let mut check = |step: &str, result: Result<(), RenderError>| {
        if let Err(e) = result {
            warn!(step, error = %e, "Failed to apply style step");
            failures += 1;
        }
    };

    for (name, value) in &style.root_properties {
        check(name, surface.set_property(name, value));
    }
    check(
        THEME_ATTRIBUTE,
        surface.set_attribute(THEME_ATTRIBUTE, style.theme.as_str()),
    );
    check(
        DARK_MODE_CLASS,
        surface.set_body_class(DARK_MODE_CLASS, style.dark_mode),
    );
    check(
        "body background",
        surface.set_body_background(&style.body_background),
    );
    check(LAYER_ID, surface.apply_layer(&style.layer));

    debug!(theme = %style.theme, failures, "Rendered style");
    failures
}

/// In-memory surface that can be dumped as a stylesheet
#[derive(Debug, Default, Clone)]
pub struct StyleSheet {
    properties: Vec<(String, String)>,
    attributes: Vec<(String, String)>,
    body_classes: Vec<String>,
    body_background: Option<String>,
    layer: Option<BackgroundLayer>,
    layers_created: usize,
}

impl StyleSheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn property(&self, name: &str) -> Option<&str> {
        lookup(&self.properties, name)
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        lookup(&self.attributes, name)
    }

    pub fn has_body_class(&self, class: &str) -> bool {
        self.body_classes.iter().any(|c| c == class)
    }

    pub fn body_background(&self) -> Option<&str> {
        self.body_background.as_deref()
    }

    pub fn layer(&self) -> Option<&BackgroundLayer> {
        self.layer.as_ref()
    }

    /// Number of times a layer element was created
    pub fn layers_created(&self) -> usize {
        self.layers_created
    }

    /// Render the current state as CSS
    pub fn to_css(&self) -> String {
        let mut css = String::new();

        if !self.properties.is_empty() {
            css.push_str(":root {\n");
            for (name, value) in &self.properties {
                let _ = writeln!(css, "  {name}: {value};");
            }
            css.push_str("}\n");
        }

        let body = if self.has_body_class(DARK_MODE_CLASS) {
            format!("body.{DARK_MODE_CLASS}")
        } else {
            "body".to_string()
        };
        if let Some(bg) = &self.body_background {
            let _ = writeln!(css, "\n{body} {{\n  background: {bg};\n}}");
        }

        if let Some(layer) = &self.layer {
            let _ = writeln!(css, "\n#{LAYER_ID} {{");
            css.push_str("  position: fixed;\n  inset: 0;\n  z-index: -1;\n  pointer-events: none;\n");
            if layer.visible {
                for (name, value) in &layer.declarations {
                    let _ = writeln!(css, "  {name}: {value};");
                }
                let _ = writeln!(css, "  opacity: {};", layer.opacity);
                if let Some(filter) = &layer.filter {
                    let _ = writeln!(css, "  filter: {filter};");
                }
            } else {
                css.push_str("  display: none;\n");
            }
            css.push_str("}\n");
        }

        css
    }
}

fn lookup<'a>(entries: &'a [(String, String)], name: &str) -> Option<&'a str> {
    entries
        .iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.as_str())
}

fn upsert(entries: &mut Vec<(String, String)>, name: &str, value: &str) {
    match entries.iter_mut().find(|(k, _)| k == name) {
        Some((_, existing)) => *existing = value.to_string(),
        None => entries.push((name.to_string(), value.to_string())),
    }
}

impl StyleSurface for StyleSheet {
    fn set_property(&mut self, name: &str, value: &str) -> Result<(), RenderError> {
        upsert(&mut self.properties, name, value);
        Ok(())
    }

    fn set_attribute(&mut self, name: &str, value: &str) -> Result<(), RenderError> {
        upsert(&mut self.attributes, name, value);
        Ok(())
    }

    fn set_body_class(&mut self, class: &str, enabled: bool) -> Result<(), RenderError> {
        self.body_classes.retain(|c| c != class);
        if enabled {
            self.body_classes.push(class.to_string());
        }
        Ok(())
    }

    fn set_body_background(&mut self, value: &str) -> Result<(), RenderError> {
        self.body_background = Some(value.to_string());
        Ok(())
    }

    fn apply_layer(&mut self, layer: &BackgroundLayer) -> Result<(), RenderError> {
        if self.layer.is_none() {
            self.layers_created += 1;
        }
        self.layer = Some(layer.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::appearance::palette::TEXT_COLOR;
    use crate::appearance::settings::Settings;
    use crate::appearance::style::resolve;
    use serde_json::json;

    /// Surface whose property writes always fail
    #[derive(Default)]
    struct BrokenProperties(StyleSheet);

    impl StyleSurface for BrokenProperties {
        fn set_property(&mut self, name: &str, _value: &str) -> Result<(), RenderError> {
            Err(RenderError::Rejected {
                what: name.to_string(),
                reason: "read-only".to_string(),
            })
        }
        fn set_attribute(&mut self, name: &str, value: &str) -> Result<(), RenderError> {
            self.0.set_attribute(name, value)
        }
        fn set_body_class(&mut self, class: &str, enabled: bool) -> Result<(), RenderError> {
            self.0.set_body_class(class, enabled)
        }
        fn set_body_background(&mut self, value: &str) -> Result<(), RenderError> {
            self.0.set_body_background(value)
        }
        fn apply_layer(&mut self, layer: &BackgroundLayer) -> Result<(), RenderError> {
            self.0.apply_layer(layer)
        }
    }

    fn style(value: serde_json::Value) -> ResolvedStyle {
        resolve(&Settings::from_value(&value))
    }

    #[test]
    fn test_render_dark_theme() {
        let mut sheet = StyleSheet::new();
        let failures = render(&style(json!({ "theme": "dark" })), &mut sheet);

        assert_eq!(failures, 0);
        assert_eq!(sheet.attribute(THEME_ATTRIBUTE), Some("dark"));
        assert!(sheet.has_body_class(DARK_MODE_CLASS));
        assert_eq!(sheet.property(TEXT_COLOR), Some("#e0e0e0"));
        assert_eq!(sheet.body_background(), Some("transparent"));
    }

    #[test]
    fn test_switching_back_to_light_clears_dark_class() {
        let mut sheet = StyleSheet::new();
        render(&style(json!({ "theme": "dark" })), &mut sheet);
        render(&style(json!({ "theme": "light" })), &mut sheet);

        assert!(!sheet.has_body_class(DARK_MODE_CLASS));
        assert_eq!(sheet.attribute(THEME_ATTRIBUTE), Some("light"));
    }

    #[test]
    fn test_layer_created_once() {
        let mut sheet = StyleSheet::new();
        render(&style(json!({ "backgroundType": "color" })), &mut sheet);
        render(&style(json!({ "backgroundType": "gradient" })), &mut sheet);
        render(&style(json!({ "showBackground": false })), &mut sheet);

        assert_eq!(sheet.layers_created(), 1);
        assert!(!sheet.layer().map(|l| l.visible).unwrap_or(true));
    }

    #[test]
    fn test_failed_steps_do_not_stop_others() {
        let mut surface = BrokenProperties::default();
        let resolved = style(json!({ "theme": "dark" }));
        let failures = render(&resolved, &mut surface);

        assert_eq!(failures, resolved.root_properties.len());
        assert_eq!(surface.0.attribute(THEME_ATTRIBUTE), Some("dark"));
        assert!(surface.0.layer().is_some());
    }

    #[test]
    fn test_to_css() {
        let mut sheet = StyleSheet::new();
        render(
            &style(json!({ "theme": "dark", "backgroundBlur": 2 })),
            &mut sheet,
        );
        let css = sheet.to_css();

        assert!(css.starts_with(":root {\n"));
        assert!(css.contains("  --background-color: #121212;\n"));
        assert!(css.contains("body.dark-mode {\n  background: transparent;\n}"));
        assert!(css.contains("#homepage-background {"));
        assert!(css.contains("  z-index: -1;\n"));
        assert!(css.contains("  filter: blur(2px);\n"));
    }

    #[test]
    fn test_to_css_hidden_layer() {
        let mut sheet = StyleSheet::new();
        render(&style(json!({ "showBackground": false })), &mut sheet);
        let css = sheet.to_css();

        assert!(css.contains("  display: none;\n"));
        assert!(css.contains("body {\n  background: #ffffff;\n}"));
    }
}

//! Settings resolution
//!
//! [`resolve`] is pure: it turns [`Settings`] into the full description of
//! what the page should look like. Nothing here touches a surface.

use serde::Serialize;
use tracing::warn;
use url::Url;

use super::palette::{self, DEFAULT_PRIMARY, FONT_FAMILY, PRIMARY_COLOR, TEXT_COLOR};
use super::settings::{BackgroundType, GradientType, Settings, Theme};

/// Element id of the background layer
pub const LAYER_ID: &str = "homepage-background";
/// Body class toggled on in dark mode
pub const DARK_MODE_CLASS: &str = "dark-mode";
/// Root attribute carrying the theme name
pub const THEME_ATTRIBUTE: &str = "data-theme";

// Relative image paths are resolved against the extension page
const IMAGE_BASE: &str = "https://homepage.invalid/";

/// What the background layer ended up showing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LayerSource {
    Hidden,
    Color,
    Image,
    Gradient,
    /// Flat theme fill, used for unknown types and unusable images/gradients
    ThemeFill,
}

/// The dedicated full-viewport background element
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackgroundLayer {
    pub source: LayerSource,
    pub visible: bool,
    /// `background-*` declarations, in order
    pub declarations: Vec<(String, String)>,
    pub opacity: f64,
    pub filter: Option<String>,
}

/// Everything the renderer needs to apply a set of settings
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedStyle {
    pub theme: Theme,
    /// Root custom properties, each name at most once
    pub root_properties: Vec<(String, String)>,
    pub dark_mode: bool,
    /// Inline body background; transparent unless the layer is hidden
    pub body_background: String,
    pub layer: BackgroundLayer,
}

impl ResolvedStyle {
    pub fn property(&self, name: &str) -> Option<&str> {
        self.root_properties
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

impl BackgroundLayer {
    pub fn declaration(&self, name: &str) -> Option<&str> {
        self.declarations
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Compute the style for `settings`
pub fn resolve(settings: &Settings) -> ResolvedStyle {
    let theme = settings.theme;

    let mut root_properties: Vec<(String, String)> = palette::palette(theme)
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    if let Some(color) = &settings.text_color {
        put(&mut root_properties, TEXT_COLOR, color);
    }
    put(
        &mut root_properties,
        PRIMARY_COLOR,
        settings.link_color.as_deref().unwrap_or(DEFAULT_PRIMARY),
    );
    if let Some(font) = &settings.font_family {
        put(&mut root_properties, FONT_FAMILY, font);
    }

    let layer = resolve_layer(settings);
    let body_background = if layer.visible {
        "transparent".to_string()
    } else {
        theme.fill().to_string()
    };

    ResolvedStyle {
        theme,
        root_properties,
        dark_mode: theme == Theme::Dark,
        body_background,
        layer,
    }
}

fn put(properties: &mut Vec<(String, String)>, name: &str, value: &str) {
    match properties.iter_mut().find(|(k, _)| k == name) {
        Some((_, existing)) => *existing = value.to_string(),
        None => properties.push((name.to_string(), value.to_string())),
    }
}

fn resolve_layer(settings: &Settings) -> BackgroundLayer {
    if !settings.show_background {
        return BackgroundLayer {
            source: LayerSource::Hidden,
            visible: false,
            declarations: Vec::new(),
            opacity: 1.0,
            filter: None,
        };
    }

    let (source, declarations) = match settings.background_type {
        BackgroundType::Color => (
            LayerSource::Color,
            vec![
                decl("background-color", &settings.background_color),
                decl("background-image", "none"),
            ],
        ),
        BackgroundType::Image => match image_declarations(settings) {
            Some(declarations) => (LayerSource::Image, declarations),
            None => theme_fill(settings.theme),
        },
        BackgroundType::Gradient => match gradient(settings) {
            Some(gradient) => (
                LayerSource::Gradient,
                vec![decl("background-image", &gradient)],
            ),
            None => theme_fill(settings.theme),
        },
        BackgroundType::Unknown => theme_fill(settings.theme),
    };

    BackgroundLayer {
        source,
        visible: true,
        declarations,
        opacity: settings.background_opacity.clamp(0.0, 1.0),
        filter: filter(settings),
    }
}

fn decl(name: &str, value: &str) -> (String, String) {
    (name.to_string(), value.to_string())
}

fn theme_fill(theme: Theme) -> (LayerSource, Vec<(String, String)>) {
    (
        LayerSource::ThemeFill,
        vec![
            decl("background-color", theme.fill()),
            decl("background-image", "none"),
        ],
    )
}

fn image_declarations(settings: &Settings) -> Option<Vec<(String, String)>> {
    let image = settings.background_image.trim();
    if image.is_empty() {
        warn!("Image background selected without an image URL");
        return None;
    }

    let valid = Url::parse(IMAGE_BASE)
        .and_then(|base| base.join(image))
        .is_ok();
    if !valid {
        warn!(url = image, "Background image URL is not usable");
        return None;
    }

    Some(vec![
        decl("background-image", &format!("url(\"{}\")", css_escape(image))),
        decl("background-size", &settings.background_fit),
        decl("background-position", "center center"),
        decl("background-repeat", "no-repeat"),
        decl("background-attachment", "fixed"),
    ])
}

fn css_escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

fn gradient(settings: &Settings) -> Option<String> {
    let colors = &settings.gradient_colors;
    if colors.len() < 2 {
        warn!(colors = colors.len(), "Gradient needs at least two colors");
        return None;
    }

    let last = (colors.len() - 1) as f64;
    let stops: Vec<String> = colors
        .iter()
        .enumerate()
        .map(|(i, color)| {
            let stop = settings
                .gradient_stops
                .get(i)
                .copied()
                .unwrap_or(i as f64 * 100.0 / last);
            format!("{color} {stop}%")
        })
        .collect();

    Some(match settings.gradient_type {
        GradientType::Radial => format!("radial-gradient(circle, {})", stops.join(", ")),
        GradientType::Linear => format!(
            "linear-gradient({}, {})",
            settings.gradient_direction,
            stops.join(", ")
        ),
    })
}

fn filter(settings: &Settings) -> Option<String> {
    let mut filters = Vec::new();
    if settings.background_brightness != 1.0 {
        filters.push(format!("brightness({})", settings.background_brightness));
    }
    if settings.background_blur > 0.0 {
        filters.push(format!("blur({}px)", settings.background_blur));
    }
    (!filters.is_empty()).then(|| filters.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::appearance::palette::{BACKGROUND_COLOR, TEXT_SECONDARY_COLOR};
    use serde_json::json;

    fn resolve_json(value: serde_json::Value) -> ResolvedStyle {
        resolve(&Settings::from_value(&value))
    }

    #[test]
    fn test_light_theme_defaults() {
        let style = resolve(&Settings::default());
        assert_eq!(style.theme, Theme::Light);
        assert!(!style.dark_mode);
        assert_eq!(style.property(BACKGROUND_COLOR), Some("#ffffff"));
        assert_eq!(style.property(TEXT_COLOR), Some("#333333"));
        assert_eq!(style.property(PRIMARY_COLOR), Some(DEFAULT_PRIMARY));
        assert_eq!(style.property(FONT_FAMILY), None);
    }

    #[test]
    fn test_dark_theme_palette() {
        let style = resolve_json(json!({ "theme": "dark" }));
        assert!(style.dark_mode);
        assert_eq!(style.property(BACKGROUND_COLOR), Some("#121212"));
        assert_eq!(style.property(TEXT_SECONDARY_COLOR), Some("#a0a0a0"));
    }

    #[test]
    fn test_user_overrides_win_over_palette() {
        let style = resolve_json(json!({
            "theme": "dark",
            "textColor": "#ff0000",
            "linkColor": "#00ff00",
            "fontFamily": "Georgia, serif"
        }));

        assert_eq!(style.property(TEXT_COLOR), Some("#ff0000"));
        assert_eq!(style.property(PRIMARY_COLOR), Some("#00ff00"));
        assert_eq!(style.property(FONT_FAMILY), Some("Georgia, serif"));
        let text_entries = style
            .root_properties
            .iter()
            .filter(|(k, _)| k == TEXT_COLOR)
            .count();
        assert_eq!(text_entries, 1);
    }

    #[test]
    fn test_color_background() {
        let style = resolve_json(json!({ "backgroundType": "color", "backgroundColor": "#123456" }));
        assert_eq!(style.layer.source, LayerSource::Color);
        assert_eq!(style.layer.declaration("background-color"), Some("#123456"));
        assert_eq!(style.body_background, "transparent");
    }

    #[test]
    fn test_image_background() {
        let style = resolve_json(json!({
            "backgroundType": "image",
            "backgroundImage": "https://example.com/a.jpg",
            "backgroundFit": "contain"
        }));
        assert_eq!(style.layer.source, LayerSource::Image);
        assert_eq!(
            style.layer.declaration("background-image"),
            Some("url(\"https://example.com/a.jpg\")")
        );
        assert_eq!(style.layer.declaration("background-size"), Some("contain"));
        assert_eq!(style.layer.declaration("background-attachment"), Some("fixed"));
    }

    #[test]
    fn test_relative_and_data_image_urls_accepted() {
        for image in ["images/bg.png", "data:image/png;base64,AAAA"] {
            let style = resolve_json(json!({ "backgroundType": "image", "backgroundImage": image }));
            assert_eq!(style.layer.source, LayerSource::Image, "{image}");
        }
    }

    #[test]
    fn test_image_quotes_escaped() {
        let style = resolve_json(json!({
            "backgroundType": "image",
            "backgroundImage": "https://example.com/a\"b.jpg"
        }));
        assert_eq!(
            style.layer.declaration("background-image"),
            Some("url(\"https://example.com/a\\\"b.jpg\")")
        );
    }

    #[test]
    fn test_unusable_image_falls_back_to_theme_fill() {
        for image in ["", "   ", "http://[::1"] {
            let style = resolve_json(json!({
                "theme": "dark",
                "backgroundType": "image",
                "backgroundImage": image
            }));
            assert_eq!(style.layer.source, LayerSource::ThemeFill, "{image:?}");
            assert_eq!(style.layer.declaration("background-color"), Some("#121212"));
        }
    }

    #[test]
    fn test_linear_gradient() {
        let style = resolve_json(json!({ "backgroundType": "gradient" }));
        assert_eq!(
            style.layer.declaration("background-image"),
            Some("linear-gradient(to right, #4a90e2 0%, #9b59b6 100%)")
        );
    }

    #[test]
    fn test_radial_gradient_with_default_stops() {
        let style = resolve_json(json!({
            "backgroundType": "gradient",
            "gradientType": "radial",
            "gradientColors": ["#000", "#777", "#fff"],
            "gradientStops": [10]
        }));
        assert_eq!(
            style.layer.declaration("background-image"),
            Some("radial-gradient(circle, #000 10%, #777 50%, #fff 100%)")
        );
    }

    #[test]
    fn test_single_color_gradient_falls_back() {
        let style = resolve_json(json!({ "backgroundType": "gradient", "gradientColors": ["#000"] }));
        assert_eq!(style.layer.source, LayerSource::ThemeFill);
    }

    #[test]
    fn test_unknown_type_falls_back() {
        let style = resolve_json(json!({ "backgroundType": "video" }));
        assert_eq!(style.layer.source, LayerSource::ThemeFill);
        assert_eq!(style.layer.declaration("background-color"), Some("#ffffff"));
    }

    #[test]
    fn test_hidden_background() {
        let style = resolve_json(json!({ "theme": "dark", "showBackground": false }));
        assert!(!style.layer.visible);
        assert_eq!(style.layer.source, LayerSource::Hidden);
        assert_eq!(style.body_background, "#121212");
    }

    #[test]
    fn test_effects() {
        let style = resolve_json(json!({
            "backgroundOpacity": 1.7,
            "backgroundBrightness": 0.8,
            "backgroundBlur": 4
        }));
        assert_eq!(style.layer.opacity, 1.0);
        assert_eq!(style.layer.filter.as_deref(), Some("brightness(0.8) blur(4px)"));

        let plain = resolve(&Settings::default());
        assert_eq!(plain.layer.filter, None);
    }

    #[test]
    fn test_resolve_is_deterministic() {
        let settings = Settings::from_value(&json!({ "theme": "dark", "backgroundType": "gradient" }));
        assert_eq!(resolve(&settings), resolve(&settings));
    }
}

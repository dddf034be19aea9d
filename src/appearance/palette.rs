//! Light and dark palettes
//!
//! Property names are the CSS contract widget stylesheets depend on.

use super::settings::Theme;

pub const BACKGROUND_COLOR: &str = "--background-color";
pub const CARD_BACKGROUND: &str = "--card-background";
pub const BORDER_COLOR: &str = "--border-color";
pub const SHADOW_COLOR: &str = "--shadow-color";
pub const TEXT_COLOR: &str = "--text-color";
pub const TEXT_SECONDARY_COLOR: &str = "--text-secondary-color";
pub const HOVER_BACKGROUND: &str = "--hover-background";
pub const PRIMARY_COLOR: &str = "--primary-color";
pub const FONT_FAMILY: &str = "--font-family";

/// Accent used when no link color is configured
pub const DEFAULT_PRIMARY: &str = "#4a90e2";

const LIGHT: [(&str, &str); 7] = [
    (BACKGROUND_COLOR, "#ffffff"),
    (CARD_BACKGROUND, "#f8f8f8"),
    (BORDER_COLOR, "#e0e0e0"),
    (SHADOW_COLOR, "rgba(0, 0, 0, 0.1)"),
    (TEXT_COLOR, "#333333"),
    (TEXT_SECONDARY_COLOR, "#666666"),
    (HOVER_BACKGROUND, "#f0f0f0"),
];

const DARK: [(&str, &str); 7] = [
    (BACKGROUND_COLOR, "#121212"),
    (CARD_BACKGROUND, "#1e1e1e"),
    (BORDER_COLOR, "#333333"),
    (SHADOW_COLOR, "rgba(0, 0, 0, 0.3)"),
    (TEXT_COLOR, "#e0e0e0"),
    (TEXT_SECONDARY_COLOR, "#a0a0a0"),
    (HOVER_BACKGROUND, "#333333"),
];

/// Custom properties for `theme`, in application order
pub fn palette(theme: Theme) -> &'static [(&'static str, &'static str)] {
    match theme {
        Theme::Light => &LIGHT,
        Theme::Dark => &DARK,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palettes_cover_same_properties() {
        let light: Vec<&str> = palette(Theme::Light).iter().map(|(k, _)| *k).collect();
        let dark: Vec<&str> = palette(Theme::Dark).iter().map(|(k, _)| *k).collect();
        assert_eq!(light, dark);
    }

    #[test]
    fn test_palette_background_matches_theme_fill() {
        for theme in [Theme::Light, Theme::Dark] {
            let (_, bg) = palette(theme)[0];
            assert_eq!(bg, theme.fill());
        }
    }
}

//! Applying settings to a surface, with timed previews
//!
//! Previews render immediately and fall back to the last applied settings
//! once [`PREVIEW_DURATION_SECS`] have passed; the host drives that with
//! [`SettingsApplier::tick`].

use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

use super::render::{render, StyleSurface};
use super::settings::Settings;
use super::style::resolve;
use crate::store::{Clock, SystemClock};

/// How long a preview stays before the previous settings come back
pub const PREVIEW_DURATION_SECS: i64 = 3;

#[derive(Debug)]
struct PendingRevert {
    at: DateTime<Utc>,
    to: Settings,
}

/// Keeps a [`StyleSurface`] in sync with the settings sub-document
pub struct SettingsApplier<S> {
    surface: S,
    clock: Arc<dyn Clock>,
    current: Option<Settings>,
    revert: Option<PendingRevert>,
}

impl<S: StyleSurface> SettingsApplier<S> {
    pub fn new(surface: S) -> Self {
        Self::with_clock(surface, Arc::new(SystemClock))
    }

    pub fn with_clock(surface: S, clock: Arc<dyn Clock>) -> Self {
        Self {
            surface,
            clock,
            current: None,
            revert: None,
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Settings currently on the surface
    pub fn current(&self) -> Option<&Settings> {
        self.current.as_ref()
    }

    /// Apply `settings`; safe to call repeatedly. Cancels a pending preview
    /// revert. Returns the number of failed render steps.
    pub fn apply(&mut self, settings: &Value) -> usize {
        self.revert = None;
        self.apply_settings(Settings::from_value(settings))
    }

    /// Apply `settings` for a short while, then go back to what was applied
    /// before
    pub fn preview(&mut self, settings: &Value) -> usize {
        // Chained previews revert to the last settings applied for real
        let previous = match self.revert.take() {
            Some(pending) => Some(pending.to),
            None => self.current.clone(),
        };

        let failures = self.apply_settings(Settings::from_value(settings));

        match previous {
            Some(to) => {
                let at = self.clock.now() + Duration::seconds(PREVIEW_DURATION_SECS);
                debug!(revert_at = %at, "Preview armed");
                self.revert = Some(PendingRevert { at, to });
            }
            None => debug!("Preview without previous settings, nothing to revert to"),
        }
        failures
    }

    pub fn revert_pending(&self) -> bool {
        self.revert.is_some()
    }

    /// Perform a due preview revert. Returns true if one happened.
    pub fn tick(&mut self) -> bool {
        let due = self
            .revert
            .as_ref()
            .is_some_and(|pending| self.clock.now() >= pending.at);
        if !due {
            return false;
        }

        if let Some(pending) = self.revert.take() {
            info!("Reverting previewed settings");
            self.apply_settings(pending.to);
        }
        true
    }

    fn apply_settings(&mut self, settings: Settings) -> usize {
        let failures = render(&resolve(&settings), &mut self.surface);
        self.current = Some(settings);
        failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::appearance::palette::TEXT_COLOR;
    use crate::appearance::render::StyleSheet;
    use crate::appearance::settings::Theme;
    use crate::appearance::style::THEME_ATTRIBUTE;
    use crate::store::ManualClock;
    use chrono::TimeZone;
    use serde_json::json;

    fn applier() -> (SettingsApplier<StyleSheet>, ManualClock) {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap());
        let applier = SettingsApplier::with_clock(StyleSheet::new(), Arc::new(clock.clone()));
        (applier, clock)
    }

    #[test]
    fn test_apply_is_idempotent() {
        let (mut applier, _) = applier();
        let settings = json!({ "theme": "dark", "backgroundType": "gradient" });

        applier.apply(&settings);
        let first = applier.surface().to_css();
        applier.apply(&settings);

        assert_eq!(applier.surface().to_css(), first);
        assert_eq!(applier.surface().layers_created(), 1);
    }

    #[test]
    fn test_preview_reverts_after_delay() {
        let (mut applier, clock) = applier();
        applier.apply(&json!({ "theme": "light" }));
        applier.preview(&json!({ "theme": "dark" }));

        assert_eq!(applier.surface().attribute(THEME_ATTRIBUTE), Some("dark"));
        assert!(applier.revert_pending());

        clock.advance(Duration::milliseconds(2999));
        assert!(!applier.tick());
        assert_eq!(applier.surface().attribute(THEME_ATTRIBUTE), Some("dark"));

        clock.advance(Duration::milliseconds(1));
        assert!(applier.tick());
        assert_eq!(applier.surface().attribute(THEME_ATTRIBUTE), Some("light"));
        assert_eq!(applier.current().map(|s| s.theme), Some(Theme::Light));
        assert!(!applier.revert_pending());
    }

    #[test]
    fn test_chained_previews_revert_to_applied_settings() {
        let (mut applier, clock) = applier();
        applier.apply(&json!({ "textColor": "#111111" }));
        applier.preview(&json!({ "textColor": "#222222" }));
        applier.preview(&json!({ "textColor": "#333333" }));

        clock.advance(Duration::seconds(PREVIEW_DURATION_SECS));
        assert!(applier.tick());
        assert_eq!(applier.surface().property(TEXT_COLOR), Some("#111111"));
    }

    #[test]
    fn test_apply_cancels_pending_revert() {
        let (mut applier, clock) = applier();
        applier.apply(&json!({ "theme": "light" }));
        applier.preview(&json!({ "theme": "dark" }));
        applier.apply(&json!({ "theme": "dark" }));

        clock.advance(Duration::seconds(10));
        assert!(!applier.tick());
        assert_eq!(applier.surface().attribute(THEME_ATTRIBUTE), Some("dark"));
    }

    #[test]
    fn test_preview_without_previous_does_not_revert() {
        let (mut applier, clock) = applier();
        applier.preview(&json!({ "theme": "dark" }));

        assert!(!applier.revert_pending());
        clock.advance(Duration::seconds(10));
        assert!(!applier.tick());
        assert_eq!(applier.surface().attribute(THEME_ATTRIBUTE), Some("dark"));
    }
}

//! Turning the `settings` sub-document into page styles
//!
//! Resolution ([`resolve`]) is pure and testable on its own; rendering goes
//! through the [`StyleSurface`] trait.

pub mod applier;
pub mod palette;
pub mod render;
pub mod settings;
pub mod style;

pub use applier::SettingsApplier;
pub use render::{render, RenderError, StyleSheet, StyleSurface};
pub use settings::{BackgroundType, GradientType, Settings, Theme};
pub use style::{resolve, BackgroundLayer, LayerSource, ResolvedStyle};

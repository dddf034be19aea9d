//! homepage-config library
//!
//! Configuration layer of a new-tab homepage: one JSON document holding
//! appearance settings, widget data and preferences, persisted to a
//! key-value store with debounced saves, plus the code that turns the
//! settings into page styles.

pub mod appearance;
pub mod config;
pub mod document;
pub mod startup;
pub mod storage;
pub mod store;

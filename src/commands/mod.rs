//! CLI commands

pub mod appearance;
pub mod backup;
pub mod document;
pub mod restore;
pub mod stats;
pub mod transfer;
pub mod utils;

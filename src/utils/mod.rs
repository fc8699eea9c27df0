//! Shared utilities.
//!
//! - [`app_data`] - persisted configuration in the app data directory
//! - [`interrupt`] - Ctrl-C as a stop flag
//! - [`progress`] - progress spinner (no-op without the `progress` feature)

pub mod app_data;
pub mod interrupt;
pub mod progress;

pub use app_data::*;

//! diaprops Settings Crate
//!
//! Handles editor configuration and its persistence.

pub mod config;
pub mod error;

pub use config::{EditorSettings, ModifiedDetection};
pub use error::{ConfigError, ConfigResult, SettingsError, SettingsResult};

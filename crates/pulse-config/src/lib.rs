//! # pulse-config
//!
//! Persisted refresh settings, per-view overrides, and the merge that turns
//! them into an effective `RefreshConfig`.
//!
//! Depends only on `pulse-paths`. The `SettingsStore` is the single
//! process-wide owner of the settings record.

mod loading;
mod merge;
mod validation;

pub mod errors;
pub mod store;
pub mod types;

// Public API re-exports
pub use errors::ConfigError;
pub use loading::{SETTING_KEYS, apply_setting, load_settings, read_settings_file, save_settings};
pub use merge::effective_config;
pub use store::SettingsStore;
pub use types::{
    DEFAULT_MAX_RETRIES, DEFAULT_REFRESH_INTERVAL_MS, PulseSettings, RefreshConfig, ViewKind,
    ViewOverrides,
};
pub use validation::{
    MAX_REFRESH_INTERVAL_MS, MAX_RETRIES_LIMIT, MIN_REFRESH_INTERVAL_MS, validate_settings,
};

//! Settings file loading, saving, and single-key edits.
//!
//! The settings file is a flat TOML record at `~/.pulse/settings.toml`.
//! Loading never fails: a missing file yields defaults silently, and an
//! unreadable, unparseable, or invalid record yields defaults with a warning.
//! Saving always replaces the whole record.

use std::fs;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::errors::ConfigError;
use crate::types::{PulseSettings, ViewKind};
use crate::validation::validate_settings;

/// Every key accepted by [`apply_setting`], in file order.
pub const SETTING_KEYS: [&str; 8] = [
    "refresh_interval_ms",
    "refresh_enabled",
    "pause_on_hidden",
    "pause_on_offline",
    "max_retries",
    "feed_enabled",
    "messages_enabled",
    "notifications_enabled",
];

/// Load settings from `path`, falling back to defaults on any problem.
pub fn load_settings(path: &Path) -> PulseSettings {
    match read_settings_file(path) {
        Ok(settings) => {
            debug!(event = "config.settings.load_completed", path = %path.display());
            settings
        }
        Err(ConfigError::IoError { source }) if source.kind() == std::io::ErrorKind::NotFound => {
            debug!(
                event = "config.settings.not_found",
                path = %path.display(),
                "Using default settings"
            );
            PulseSettings::default()
        }
        Err(e) => {
            warn!(
                event = "config.settings.load_failed",
                path = %path.display(),
                error = %e,
                "Settings record unusable - falling back to defaults"
            );
            PulseSettings::default()
        }
    }
}

/// Read and validate a settings file without any fallback.
///
/// # Errors
///
/// Returns `ConfigError::IoError` if the file cannot be read,
/// `ConfigError::SettingsParseError` if it is not a valid record, and
/// `ConfigError::InvalidConfiguration` if a value is out of range.
pub fn read_settings_file(path: &Path) -> Result<PulseSettings, ConfigError> {
    let content = fs::read_to_string(path)?;
    let settings: PulseSettings =
        toml::from_str(&content).map_err(|e| ConfigError::SettingsParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
    validate_settings(&settings)?;
    Ok(settings)
}

/// Persist `settings` to `path`, replacing the previous record.
///
/// Writes a sibling temp file and renames it over the target so readers
/// never observe a partially written record.
pub fn save_settings(path: &Path, settings: &PulseSettings) -> Result<(), ConfigError> {
    validate_settings(settings)?;

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    let content = toml::to_string_pretty(settings)?;
    let temp_path = pulse_paths::PulsePaths::settings_temp_file(path);
    fs::write(&temp_path, content)?;
    fs::rename(&temp_path, path)?;

    info!(event = "config.settings.save_completed", path = %path.display());
    Ok(())
}

/// Return a copy of `settings` with one key replaced.
///
/// Keys may be written with `-` or `_` (`feed-enabled`, `feed_enabled`).
/// The result is validated as a whole.
pub fn apply_setting(
    settings: &PulseSettings,
    key: &str,
    value: &str,
) -> Result<PulseSettings, ConfigError> {
    let normalized = key.trim().to_ascii_lowercase().replace('-', "_");
    let mut updated = settings.clone();

    match normalized.as_str() {
        "refresh_interval_ms" => updated.refresh_interval_ms = parse_value(key, value)?,
        "refresh_enabled" => updated.refresh_enabled = parse_bool(key, value)?,
        "pause_on_hidden" => updated.pause_on_hidden = parse_bool(key, value)?,
        "pause_on_offline" => updated.pause_on_offline = parse_bool(key, value)?,
        "max_retries" => updated.max_retries = parse_value(key, value)?,
        other => {
            let view = other
                .strip_suffix("_enabled")
                .and_then(|name| name.parse::<ViewKind>().ok())
                .ok_or_else(|| ConfigError::UnknownSetting {
                    key: key.to_string(),
                    valid_keys: SETTING_KEYS.join(", "),
                })?;
            updated.set_view_enabled(view, parse_bool(key, value)?);
        }
    }

    validate_settings(&updated).map_err(|e| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        message: e.to_string(),
    })?;

    Ok(updated)
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            message: e.to_string(),
        })
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Ok(true),
        "false" | "off" | "no" | "0" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            message: "expected true/false".to_string(),
        }),
    }
}

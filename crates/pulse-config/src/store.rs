//! Externally owned settings store with subscribe/replace semantics.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::watch;
use tracing::info;

use crate::errors::ConfigError;
use crate::loading::{apply_setting, load_settings, save_settings};
use crate::types::PulseSettings;
use crate::validation::validate_settings;

/// Holds the current settings record and broadcasts every replacement.
///
/// Readers take a snapshot or subscribe; writers replace the whole record.
/// Cloning shares the same underlying record.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: Option<PathBuf>,
    sender: Arc<watch::Sender<PulseSettings>>,
}

impl SettingsStore {
    /// Open a store backed by the settings file at `path`.
    ///
    /// Never fails: see [`load_settings`] for the fallback rules.
    pub fn open(path: PathBuf) -> Self {
        let settings = load_settings(&path);
        Self {
            path: Some(path),
            sender: Arc::new(watch::channel(settings).0),
        }
    }

    /// A store with no backing file. Replacements are broadcast but not persisted.
    pub fn in_memory(settings: PulseSettings) -> Self {
        Self {
            path: None,
            sender: Arc::new(watch::channel(settings).0),
        }
    }

    /// Backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Current record.
    pub fn snapshot(&self) -> PulseSettings {
        self.sender.borrow().clone()
    }

    /// Receiver notified on every replacement.
    pub fn subscribe(&self) -> watch::Receiver<PulseSettings> {
        self.sender.subscribe()
    }

    /// Replace the whole record: validate, persist (if file-backed), then broadcast.
    ///
    /// # Errors
    ///
    /// Returns an error if validation or the write fails. Subscribers are not
    /// notified in that case.
    pub fn replace(&self, settings: PulseSettings) -> Result<(), ConfigError> {
        validate_settings(&settings)?;
        if let Some(path) = &self.path {
            save_settings(path, &settings)?;
        }
        self.sender.send_replace(settings);
        info!(event = "config.store.replace_completed", persisted = self.path.is_some());
        Ok(())
    }

    /// Set a single key by name and replace the record with the result.
    pub fn update(&self, key: &str, value: &str) -> Result<PulseSettings, ConfigError> {
        let updated = apply_setting(&self.snapshot(), key, value)?;
        self.replace(updated.clone())?;
        Ok(updated)
    }

    /// Replace the record with hard-coded defaults.
    pub fn reset(&self) -> Result<PulseSettings, ConfigError> {
        let defaults = PulseSettings::default();
        self.replace(defaults.clone())?;
        Ok(defaults)
    }
}

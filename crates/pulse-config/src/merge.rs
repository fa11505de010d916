//! Effective refresh configuration for a view.
//!
//! Combines the process-wide settings record with the view's own overrides.
//! The result is a complete `RefreshConfig` handed to the scheduler as a
//! replacement, never applied as a partial patch.

use crate::types::{PulseSettings, RefreshConfig, ViewKind, ViewOverrides};

/// Merge global settings with a view's overrides.
///
/// `enabled` requires the master switch, the view's persisted toggle, and the
/// override (when present) to all be on. Every other field takes the override
/// when present and the global value otherwise.
pub fn effective_config(
    settings: &PulseSettings,
    view: ViewKind,
    overrides: &ViewOverrides,
) -> RefreshConfig {
    RefreshConfig {
        interval_ms: overrides.interval_ms.unwrap_or(settings.refresh_interval_ms),
        enabled: settings.refresh_enabled
            && settings.view_enabled(view)
            && overrides.enabled.unwrap_or(true),
        pause_on_hidden: overrides.pause_on_hidden.unwrap_or(settings.pause_on_hidden),
        pause_on_offline: overrides
            .pause_on_offline
            .unwrap_or(settings.pause_on_offline),
        max_retries: overrides.max_retries.unwrap_or(settings.max_retries),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_overrides_uses_globals() {
        let settings = PulseSettings {
            refresh_interval_ms: 12_000,
            pause_on_offline: false,
            max_retries: 5,
            ..PulseSettings::default()
        };
        let config = effective_config(&settings, ViewKind::Feed, &ViewOverrides::default());
        assert_eq!(
            config,
            RefreshConfig {
                interval_ms: 12_000,
                enabled: true,
                pause_on_hidden: true,
                pause_on_offline: false,
                max_retries: 5,
            }
        );
    }

    #[test]
    fn test_overrides_win_when_present() {
        let overrides = ViewOverrides {
            interval_ms: Some(10_000),
            pause_on_hidden: Some(false),
            max_retries: Some(0),
            ..ViewOverrides::default()
        };
        let config = effective_config(&PulseSettings::default(), ViewKind::Messages, &overrides);
        assert_eq!(config.interval_ms, 10_000);
        assert!(!config.pause_on_hidden);
        assert!(config.pause_on_offline);
        assert_eq!(config.max_retries, 0);
    }

    #[test]
    fn test_enabled_is_conjunction() {
        let on = ViewOverrides::default();
        let off = ViewOverrides {
            enabled: Some(false),
            ..ViewOverrides::default()
        };
        let forced_on = ViewOverrides {
            enabled: Some(true),
            ..ViewOverrides::default()
        };

        let defaults = PulseSettings::default();
        assert!(effective_config(&defaults, ViewKind::Feed, &on).enabled);
        assert!(!effective_config(&defaults, ViewKind::Feed, &off).enabled);

        let master_off = PulseSettings {
            refresh_enabled: false,
            ..PulseSettings::default()
        };
        assert!(!effective_config(&master_off, ViewKind::Feed, &forced_on).enabled);

        let feed_off = PulseSettings {
            feed_enabled: false,
            ..PulseSettings::default()
        };
        assert!(!effective_config(&feed_off, ViewKind::Feed, &forced_on).enabled);
        assert!(effective_config(&feed_off, ViewKind::Notifications, &on).enabled);
    }
}

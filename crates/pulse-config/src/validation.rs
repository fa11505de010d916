//! Settings validation.
//!
//! Persisted records that fail these checks are replaced by defaults on load;
//! user edits that fail them are rejected.

use crate::errors::ConfigError;
use crate::types::PulseSettings;

/// Shortest automatic-refresh interval accepted from persisted settings.
pub const MIN_REFRESH_INTERVAL_MS: u64 = 1_000;

/// Longest automatic-refresh interval accepted from persisted settings (24h).
pub const MAX_REFRESH_INTERVAL_MS: u64 = 86_400_000;

/// Upper bound for the consecutive-failure budget.
pub const MAX_RETRIES_LIMIT: u32 = 100;

/// Validate a settings record.
///
/// # Errors
///
/// Returns `ConfigError::InvalidConfiguration` when the interval is outside
/// `[MIN_REFRESH_INTERVAL_MS, MAX_REFRESH_INTERVAL_MS]` or the retry budget
/// exceeds `MAX_RETRIES_LIMIT`.
pub fn validate_settings(settings: &PulseSettings) -> Result<(), ConfigError> {
    if !(MIN_REFRESH_INTERVAL_MS..=MAX_REFRESH_INTERVAL_MS).contains(&settings.refresh_interval_ms)
    {
        return Err(ConfigError::InvalidConfiguration {
            message: format!(
                "refresh_interval_ms must be between {} and {} (got {})",
                MIN_REFRESH_INTERVAL_MS, MAX_REFRESH_INTERVAL_MS, settings.refresh_interval_ms
            ),
        });
    }

    if settings.max_retries > MAX_RETRIES_LIMIT {
        return Err(ConfigError::InvalidConfiguration {
            message: format!(
                "max_retries must be <= {} (got {})",
                MAX_RETRIES_LIMIT, settings.max_retries
            ),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate_settings(&PulseSettings::default()).is_ok());
    }

    #[test]
    fn test_interval_too_short() {
        let settings = PulseSettings {
            refresh_interval_ms: 10,
            ..PulseSettings::default()
        };
        let err = validate_settings(&settings).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidConfiguration { .. }));
        assert!(err.to_string().contains("refresh_interval_ms"));
    }

    #[test]
    fn test_interval_bounds_inclusive() {
        for interval in [MIN_REFRESH_INTERVAL_MS, MAX_REFRESH_INTERVAL_MS] {
            let settings = PulseSettings {
                refresh_interval_ms: interval,
                ..PulseSettings::default()
            };
            assert!(validate_settings(&settings).is_ok(), "{interval} rejected");
        }
    }

    #[test]
    fn test_interval_too_long() {
        let settings = PulseSettings {
            refresh_interval_ms: MAX_REFRESH_INTERVAL_MS + 1,
            ..PulseSettings::default()
        };
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_max_retries_limit() {
        let settings = PulseSettings {
            max_retries: MAX_RETRIES_LIMIT + 1,
            ..PulseSettings::default()
        };
        let err = validate_settings(&settings).unwrap_err();
        assert!(err.to_string().contains("max_retries"));

        let zero = PulseSettings {
            max_retries: 0,
            ..PulseSettings::default()
        };
        assert!(validate_settings(&zero).is_ok());
    }
}

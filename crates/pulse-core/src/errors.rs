use std::error::Error;

/// Base trait for all pulse errors.
pub trait PulseError: Error + Send + Sync + 'static {
    /// Error code for programmatic handling
    fn error_code(&self) -> &'static str;

    /// Whether this error should be logged as an error or warning
    fn is_user_error(&self) -> bool {
        false
    }
}

/// Failure reported by a refresh operation.
///
/// Carries only a human-readable message; it is surfaced to views as the
/// status `error` string and never propagated further.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct RefreshError {
    message: String,
}

impl RefreshError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<String> for RefreshError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for RefreshError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl PulseError for RefreshError {
    fn error_code(&self) -> &'static str {
        "REFRESH_FAILED"
    }
}

impl PulseError for pulse_config::ConfigError {
    fn error_code(&self) -> &'static str {
        match self {
            pulse_config::ConfigError::SettingsParseError { .. } => "SETTINGS_PARSE_ERROR",
            pulse_config::ConfigError::UnknownSetting { .. } => "UNKNOWN_SETTING",
            pulse_config::ConfigError::InvalidValue { .. } => "INVALID_SETTING_VALUE",
            pulse_config::ConfigError::UnknownView { .. } => "UNKNOWN_VIEW",
            pulse_config::ConfigError::InvalidConfiguration { .. } => "INVALID_CONFIGURATION",
            pulse_config::ConfigError::SerializeError { .. } => "SETTINGS_SERIALIZE_ERROR",
            pulse_config::ConfigError::IoError { .. } => "SETTINGS_IO_ERROR",
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(
            self,
            pulse_config::ConfigError::SettingsParseError { .. }
                | pulse_config::ConfigError::UnknownSetting { .. }
                | pulse_config::ConfigError::InvalidValue { .. }
                | pulse_config::ConfigError::UnknownView { .. }
                | pulse_config::ConfigError::InvalidConfiguration { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulse_config::ConfigError;

    #[test]
    fn test_refresh_error_display() {
        let error = RefreshError::from("backend unavailable");
        assert_eq!(error.to_string(), "backend unavailable");
        assert_eq!(error.message(), "backend unavailable");
        assert_eq!(error.error_code(), "REFRESH_FAILED");
        assert!(!error.is_user_error());
    }

    #[test]
    fn test_config_error_codes() {
        let cases: Vec<(ConfigError, &str, bool)> = vec![
            (
                ConfigError::UnknownSetting {
                    key: "x".to_string(),
                    valid_keys: String::new(),
                },
                "UNKNOWN_SETTING",
                true,
            ),
            (
                ConfigError::InvalidValue {
                    key: "max_retries".to_string(),
                    value: "lots".to_string(),
                    message: "invalid digit".to_string(),
                },
                "INVALID_SETTING_VALUE",
                true,
            ),
            (
                ConfigError::IoError {
                    source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
                },
                "SETTINGS_IO_ERROR",
                false,
            ),
        ];

        for (err, code, user) in cases {
            assert_eq!(err.error_code(), code);
            assert_eq!(err.is_user_error(), user, "{code}");
        }
    }
}

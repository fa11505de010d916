use chrono::{DateTime, Utc};
use pulse_config::RefreshConfig;
use serde::Serialize;

use crate::session::{RefreshSession, SessionState};

/// Everything a view may observe about its refresh session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefreshStatus {
    pub state: SessionState,
    pub is_refreshing: bool,
    pub last_refresh: Option<DateTime<Utc>>,
    pub error: Option<String>,
    pub retry_count: u32,
    pub is_enabled: bool,
    pub is_visible: bool,
    pub is_online: bool,
}

impl RefreshStatus {
    pub fn from_session(session: &RefreshSession, config: Option<&RefreshConfig>) -> Self {
        let environment = session.environment();
        Self {
            state: session.state(),
            is_refreshing: session.state() == SessionState::Refreshing,
            last_refresh: session.last_refresh_at(),
            error: session.last_error().map(str::to_owned),
            retry_count: session.consecutive_failures(),
            is_enabled: config.is_some_and(|config| config.enabled),
            is_visible: environment.visible,
            is_online: environment.online,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::Environment;

    #[test]
    fn test_status_before_start() {
        let session = RefreshSession::new(Environment {
            visible: false,
            online: true,
        });
        let status = RefreshStatus::from_session(&session, None);
        assert_eq!(status.state, SessionState::Idle);
        assert!(!status.is_refreshing);
        assert!(!status.is_enabled);
        assert!(!status.is_visible);
        assert!(status.is_online);
    }

    #[test]
    fn test_status_reflects_failures() {
        let mut session = RefreshSession::new(Environment::default());
        session.begin_refresh();
        session.record_failure("connection reset");
        let config = RefreshConfig::default();

        let status = RefreshStatus::from_session(&session, Some(&config));
        assert!(status.is_refreshing);
        assert!(status.is_enabled);
        assert_eq!(status.retry_count, 1);
        assert_eq!(status.error.as_deref(), Some("connection reset"));
    }

    #[test]
    fn test_status_serializes_lowercase_state() {
        let session = RefreshSession::new(Environment::default());
        let status = RefreshStatus::from_session(&session, None);
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["state"], "idle");
        assert_eq!(json["retry_count"], 0);
        assert!(json["last_refresh"].is_null());
    }
}

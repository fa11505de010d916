use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::environment::Environment;
use crate::retry::RetryPolicy;

/// Scheduler-visible state of a refresh session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    /// Not scheduling: never started, stopped, disabled, or misconfigured.
    Idle,
    /// Waiting for the next tick (possibly dormant while the environment gate is closed).
    Scheduled,
    /// Exactly one refresh operation is in flight.
    Refreshing,
    /// Failure budget exhausted; only a manual refresh or a new config resumes.
    Suspended,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionState::Idle => write!(f, "idle"),
            SessionState::Scheduled => write!(f, "scheduled"),
            SessionState::Refreshing => write!(f, "refreshing"),
            SessionState::Suspended => write!(f, "suspended"),
        }
    }
}

/// Mutable state of one view's refresh loop.
///
/// Owned by exactly one scheduler task; never shared between views.
#[derive(Debug, Clone)]
pub struct RefreshSession {
    state: SessionState,
    last_refresh_at: Option<DateTime<Utc>>,
    consecutive_failures: u32,
    last_error: Option<String>,
    environment: Environment,
}

impl RefreshSession {
    pub fn new(environment: Environment) -> Self {
        Self {
            state: SessionState::Idle,
            last_refresh_at: None,
            consecutive_failures: 0,
            last_error: None,
            environment,
        }
    }

    // --- Getters ---

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn last_refresh_at(&self) -> Option<DateTime<Utc>> {
        self.last_refresh_at
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    pub fn set_environment(&mut self, environment: Environment) {
        self.environment = environment;
    }

    // --- Outcomes ---

    pub fn record_success(&mut self, at: DateTime<Utc>) {
        self.last_refresh_at = Some(at);
        self.consecutive_failures = 0;
        self.last_error = None;
    }

    pub fn record_failure(&mut self, message: impl Into<String>) {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        self.last_error = Some(message.into());
    }

    /// Forget the failure streak. Called whenever the configuration is replaced.
    pub fn reset_failures(&mut self) {
        self.consecutive_failures = 0;
        self.last_error = None;
    }

    // --- State transitions ---

    pub fn begin_refresh(&mut self) {
        debug_assert!(
            self.state != SessionState::Refreshing,
            "begin_refresh called while a refresh is already in flight"
        );
        self.state = SessionState::Refreshing;
    }

    pub fn set_scheduled(&mut self) {
        self.state = SessionState::Scheduled;
    }

    pub fn set_idle(&mut self) {
        self.state = SessionState::Idle;
    }

    pub fn suspend(&mut self, policy: &RetryPolicy) {
        debug_assert!(
            policy.is_exhausted(self.consecutive_failures),
            "suspend called with {} failures under {:?}",
            self.consecutive_failures,
            policy
        );
        self.state = SessionState::Suspended;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_is_idle() {
        let session = RefreshSession::new(Environment::default());
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.last_refresh_at().is_none());
        assert_eq!(session.consecutive_failures(), 0);
        assert!(session.last_error().is_none());
    }

    #[test]
    fn test_failure_then_success_resets_streak() {
        let mut session = RefreshSession::new(Environment::default());
        session.begin_refresh();
        session.record_failure("timeout");
        session.set_scheduled();
        session.begin_refresh();
        session.record_failure("timeout again");
        assert_eq!(session.consecutive_failures(), 2);
        assert_eq!(session.last_error(), Some("timeout again"));

        let now = Utc::now();
        session.record_success(now);
        assert_eq!(session.consecutive_failures(), 0);
        assert!(session.last_error().is_none());
        assert_eq!(session.last_refresh_at(), Some(now));
    }

    #[test]
    fn test_reset_failures_keeps_last_refresh() {
        let mut session = RefreshSession::new(Environment::default());
        let now = Utc::now();
        session.record_success(now);
        session.record_failure("boom");
        session.reset_failures();
        assert_eq!(session.consecutive_failures(), 0);
        assert!(session.last_error().is_none());
        assert_eq!(session.last_refresh_at(), Some(now));
    }

    #[test]
    fn test_suspend_after_budget() {
        let policy = RetryPolicy::new(2);
        let mut session = RefreshSession::new(Environment::default());
        session.record_failure("a");
        session.record_failure("b");
        session.suspend(&policy);
        assert_eq!(session.state(), SessionState::Suspended);
    }

    #[test]
    fn test_session_state_display() {
        assert_eq!(SessionState::Idle.to_string(), "idle");
        assert_eq!(SessionState::Scheduled.to_string(), "scheduled");
        assert_eq!(SessionState::Refreshing.to_string(), "refreshing");
        assert_eq!(SessionState::Suspended.to_string(), "suspended");
    }
}

//! Failure budget and the automatic-tick gate.
//!
//! Pure decision logic: no timers, no I/O. The scheduler consults it on every
//! tick and after every settled refresh.

use pulse_config::RefreshConfig;

use crate::session::{RefreshSession, SessionState};

/// Consecutive-failure budget.
///
/// `max_retries == 0` never exhausts: automatic refresh keeps retrying forever.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
}

impl RetryPolicy {
    pub fn new(max_retries: u32) -> Self {
        Self { max_retries }
    }

    pub fn from_config(config: &RefreshConfig) -> Self {
        Self::new(config.max_retries)
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Whether `failures` consecutive failures should halt automatic refresh.
    pub fn is_exhausted(&self, failures: u32) -> bool {
        self.max_retries > 0 && failures >= self.max_retries
    }
}

/// Why an automatic tick did not run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    InFlight,
    NotStarted,
    InvalidInterval,
    Disabled,
    Hidden,
    Offline,
    BudgetExhausted,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::InFlight => "in_flight",
            SkipReason::NotStarted => "not_started",
            SkipReason::InvalidInterval => "invalid_interval",
            SkipReason::Disabled => "disabled",
            SkipReason::Hidden => "hidden",
            SkipReason::Offline => "offline",
            SkipReason::BudgetExhausted => "budget_exhausted",
        }
    }
}

/// Gate for automatic ticks. Manual refreshes never consult it.
pub fn should_attempt(config: &RefreshConfig, session: &RefreshSession) -> Result<(), SkipReason> {
    let environment = session.environment();

    if session.state() == SessionState::Refreshing {
        return Err(SkipReason::InFlight);
    }
    if !config.enabled {
        return Err(SkipReason::Disabled);
    }
    if config.pause_on_hidden && !environment.visible {
        return Err(SkipReason::Hidden);
    }
    if config.pause_on_offline && !environment.online {
        return Err(SkipReason::Offline);
    }
    if RetryPolicy::from_config(config).is_exhausted(session.consecutive_failures()) {
        return Err(SkipReason::BudgetExhausted);
    }
    Ok(())
}

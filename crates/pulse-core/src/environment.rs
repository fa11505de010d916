//! Application-visible and network-online signals.
//!
//! One `EnvironmentMonitor` is shared by every mounted view. Platform glue
//! (window focus, connectivity probes) feeds it; each scheduler subscribes and
//! decides for itself whether a change resumes or pauses its timer.

use std::sync::Arc;

use pulse_config::RefreshConfig;
use serde::Serialize;
use tokio::sync::watch;
use tracing::info;

/// Last known environmental signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Environment {
    pub visible: bool,
    pub online: bool,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            visible: true,
            online: true,
        }
    }
}

impl Environment {
    /// Whether automatic refresh may run under `config`'s pause flags.
    pub fn allows(&self, config: &RefreshConfig) -> bool {
        (!config.pause_on_hidden || self.visible) && (!config.pause_on_offline || self.online)
    }
}

/// What an environment change means for one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvironmentEvent {
    /// The gate opened: catch up with one immediate tick, then re-arm.
    Resume,
    /// The gate closed: cancel the pending timer, keep counters.
    Suspend,
}

/// Classify a change from `previous` to `next` under `config`.
///
/// Returns `None` when the change does not move the session's gate, which
/// includes every change when both pause flags are off.
pub fn transition(
    config: &RefreshConfig,
    previous: Environment,
    next: Environment,
) -> Option<EnvironmentEvent> {
    match (previous.allows(config), next.allows(config)) {
        (false, true) => Some(EnvironmentEvent::Resume),
        (true, false) => Some(EnvironmentEvent::Suspend),
        _ => None,
    }
}

/// Shared broadcaster of [`Environment`] changes.
///
/// Cloning shares the same signals. Setting a signal to its current value
/// does not notify subscribers.
#[derive(Debug, Clone)]
pub struct EnvironmentMonitor {
    sender: Arc<watch::Sender<Environment>>,
}

impl Default for EnvironmentMonitor {
    fn default() -> Self {
        Self::new(Environment::default())
    }
}

impl EnvironmentMonitor {
    pub fn new(initial: Environment) -> Self {
        Self {
            sender: Arc::new(watch::channel(initial).0),
        }
    }

    pub fn current(&self) -> Environment {
        *self.sender.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<Environment> {
        self.sender.subscribe()
    }

    pub fn set_visible(&self, visible: bool) {
        let changed = self.sender.send_if_modified(|env| {
            let changed = env.visible != visible;
            env.visible = visible;
            changed
        });
        if changed {
            info!(event = "core.environment.visibility_changed", visible = visible);
        }
    }

    pub fn set_online(&self, online: bool) {
        let changed = self.sender.send_if_modified(|env| {
            let changed = env.online != online;
            env.online = online;
            changed
        });
        if changed {
            info!(event = "core.environment.connectivity_changed", online = online);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(pause_on_hidden: bool, pause_on_offline: bool) -> RefreshConfig {
        RefreshConfig {
            pause_on_hidden,
            pause_on_offline,
            ..RefreshConfig::default()
        }
    }

    const VISIBLE_ONLINE: Environment = Environment {
        visible: true,
        online: true,
    };
    const HIDDEN_ONLINE: Environment = Environment {
        visible: false,
        online: true,
    };
    const VISIBLE_OFFLINE: Environment = Environment {
        visible: true,
        online: false,
    };
    const HIDDEN_OFFLINE: Environment = Environment {
        visible: false,
        online: false,
    };

    #[test]
    fn test_hidden_suspends_and_visible_resumes() {
        let cfg = config(true, false);
        assert_eq!(
            transition(&cfg, VISIBLE_ONLINE, HIDDEN_ONLINE),
            Some(EnvironmentEvent::Suspend)
        );
        assert_eq!(
            transition(&cfg, HIDDEN_ONLINE, VISIBLE_ONLINE),
            Some(EnvironmentEvent::Resume)
        );
        // Connectivity is ignored without pause_on_offline
        assert_eq!(transition(&cfg, VISIBLE_ONLINE, VISIBLE_OFFLINE), None);
    }

    #[test]
    fn test_offline_symmetric() {
        let cfg = config(false, true);
        assert_eq!(
            transition(&cfg, VISIBLE_ONLINE, VISIBLE_OFFLINE),
            Some(EnvironmentEvent::Suspend)
        );
        assert_eq!(
            transition(&cfg, VISIBLE_OFFLINE, VISIBLE_ONLINE),
            Some(EnvironmentEvent::Resume)
        );
        assert_eq!(transition(&cfg, VISIBLE_ONLINE, HIDDEN_ONLINE), None);
    }

    #[test]
    fn test_passthrough_when_no_pause_flags() {
        let cfg = config(false, false);
        for (previous, next) in [
            (VISIBLE_ONLINE, HIDDEN_OFFLINE),
            (HIDDEN_OFFLINE, VISIBLE_ONLINE),
            (VISIBLE_ONLINE, HIDDEN_ONLINE),
        ] {
            assert_eq!(transition(&cfg, previous, next), None);
        }
    }

    #[test]
    fn test_resume_requires_both_signals() {
        let cfg = config(true, true);
        // Becoming visible while still offline keeps the gate closed
        assert_eq!(transition(&cfg, HIDDEN_OFFLINE, VISIBLE_OFFLINE), None);
        assert_eq!(
            transition(&cfg, VISIBLE_OFFLINE, VISIBLE_ONLINE),
            Some(EnvironmentEvent::Resume)
        );
    }

    #[test]
    fn test_monitor_skips_redundant_updates() {
        let monitor = EnvironmentMonitor::default();
        let mut rx = monitor.subscribe();

        monitor.set_visible(true);
        assert!(!rx.has_changed().unwrap());

        monitor.set_online(false);
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), VISIBLE_OFFLINE);
        assert_eq!(monitor.current(), VISIBLE_OFFLINE);
    }

    #[test]
    fn test_clones_share_signals() {
        let monitor = EnvironmentMonitor::default();
        let other = monitor.clone();
        other.set_visible(false);
        assert!(!monitor.current().visible);
    }
}

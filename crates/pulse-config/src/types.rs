//! Settings, per-view override, and effective refresh configuration types.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

pub const DEFAULT_REFRESH_INTERVAL_MS: u64 = 30_000;
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Process-wide refresh settings, persisted as a flat TOML record.
///
/// Holds the global defaults for every scheduler plus one on/off toggle per
/// view. Keys missing from the file take their default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PulseSettings {
    /// Time between automatic refreshes.
    /// Default: 30000
    #[serde(default = "default_refresh_interval_ms")]
    pub refresh_interval_ms: u64,

    /// Master switch for automatic refresh across all views.
    #[serde(default = "default_true")]
    pub refresh_enabled: bool,

    /// Suspend the timer while the application is not foregrounded.
    #[serde(default = "default_true")]
    pub pause_on_hidden: bool,

    /// Suspend the timer while the network is unreachable.
    #[serde(default = "default_true")]
    pub pause_on_offline: bool,

    /// Consecutive-failure budget before automatic refresh suspends.
    /// `0` never suspends.
    /// Default: 3
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_true")]
    pub feed_enabled: bool,

    #[serde(default = "default_true")]
    pub messages_enabled: bool,

    #[serde(default = "default_true")]
    pub notifications_enabled: bool,
}

impl Default for PulseSettings {
    fn default() -> Self {
        Self {
            refresh_interval_ms: default_refresh_interval_ms(),
            refresh_enabled: true,
            pause_on_hidden: true,
            pause_on_offline: true,
            max_retries: default_max_retries(),
            feed_enabled: true,
            messages_enabled: true,
            notifications_enabled: true,
        }
    }
}

impl PulseSettings {
    /// Per-view toggle for `view`.
    pub fn view_enabled(&self, view: ViewKind) -> bool {
        match view {
            ViewKind::Feed => self.feed_enabled,
            ViewKind::Messages => self.messages_enabled,
            ViewKind::Notifications => self.notifications_enabled,
        }
    }

    pub fn set_view_enabled(&mut self, view: ViewKind, enabled: bool) {
        match view {
            ViewKind::Feed => self.feed_enabled = enabled,
            ViewKind::Messages => self.messages_enabled = enabled,
            ViewKind::Notifications => self.notifications_enabled = enabled,
        }
    }
}

fn default_refresh_interval_ms() -> u64 {
    DEFAULT_REFRESH_INTERVAL_MS
}

fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

fn default_true() -> bool {
    true
}

/// A view that owns its own refresh session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewKind {
    Feed,
    Messages,
    Notifications,
}

impl ViewKind {
    pub const ALL: [ViewKind; 3] = [ViewKind::Feed, ViewKind::Messages, ViewKind::Notifications];

    pub fn as_str(&self) -> &'static str {
        match self {
            ViewKind::Feed => "feed",
            ViewKind::Messages => "messages",
            ViewKind::Notifications => "notifications",
        }
    }
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ViewKind::ALL
            .into_iter()
            .find(|view| view.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ConfigError::UnknownView {
                view: s.to_string(),
                valid_views: ViewKind::ALL.map(|v| v.as_str()).join(", "),
            })
    }
}

/// Per-view settings supplied by the view itself.
///
/// Every present field overrides the global value; `enabled` is ANDed with
/// the global and per-view toggles instead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewOverrides {
    #[serde(default)]
    pub interval_ms: Option<u64>,
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub pause_on_hidden: Option<bool>,
    #[serde(default)]
    pub pause_on_offline: Option<bool>,
    #[serde(default)]
    pub max_retries: Option<u32>,
}

/// Effective schedule parameters for one scheduler instance.
///
/// Always replaced as a whole; never patched field by field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshConfig {
    pub interval_ms: u64,
    pub enabled: bool,
    pub pause_on_hidden: bool,
    pub pause_on_offline: bool,
    pub max_retries: u32,
}

impl RefreshConfig {
    /// The automatic-refresh period, or `None` when the interval is not positive.
    pub fn interval(&self) -> Option<Duration> {
        (self.interval_ms > 0).then(|| Duration::from_millis(self.interval_ms))
    }
}

impl Default for RefreshConfig {
    fn default() -> Self {
        let settings = PulseSettings::default();
        Self {
            interval_ms: settings.refresh_interval_ms,
            enabled: settings.refresh_enabled,
            pause_on_hidden: settings.pause_on_hidden,
            pause_on_offline: settings.pause_on_offline,
            max_retries: settings.max_retries,
        }
    }
}

//! # pulse-core
//!
//! Periodic refresh scheduling for pulse views.
//!
//! A `RefreshScheduler` re-invokes a caller-supplied refresh operation on a
//! timer, pauses while the `EnvironmentMonitor` reports the app hidden or
//! offline, and stops automatic attempts once the `RetryPolicy` budget is
//! spent. `ViewRefresher` binds a scheduler to the settings store so that
//! configuration changes restart it in place.

pub mod environment;
pub mod errors;
pub mod logging;
pub mod operation;
pub mod retry;
pub mod scheduler;
pub mod session;
pub mod status;
pub mod view;

// Public API re-exports
pub use environment::{Environment, EnvironmentEvent, EnvironmentMonitor, transition};
pub use errors::{PulseError, RefreshError};
pub use logging::init_logging;
pub use operation::{RefreshFuture, RefreshOperation};
pub use retry::{RetryPolicy, SkipReason, should_attempt};
pub use scheduler::{ManualRefresh, RefreshScheduler};
pub use session::{RefreshSession, SessionState};
pub use status::RefreshStatus;
pub use view::ViewRefresher;

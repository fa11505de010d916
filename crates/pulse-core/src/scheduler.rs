//! Per-view refresh scheduler.
//!
//! Each `RefreshScheduler` owns one tokio task that is the session's single
//! thread of control. The task multiplexes:
//! 1. Commands from handles (start, stop, manual trigger)
//! 2. Environment changes from the shared `EnvironmentMonitor`
//! 3. The in-flight refresh future, if any
//! 4. The next-tick deadline, if armed
//!
//! Every attempt, automatic or manual, is launched and settled by this task,
//! so attempts are totally ordered and never overlap. The next tick is armed
//! only after the previous refresh settles, so a slow refresh delays the
//! cadence instead of stacking up.

use std::future::pending;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use pulse_config::RefreshConfig;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::{Instant, sleep_until};
use tracing::{debug, info, warn};

use crate::environment::{Environment, EnvironmentEvent, EnvironmentMonitor, transition};
use crate::errors::RefreshError;
use crate::operation::{RefreshFuture, RefreshOperation};
use crate::retry::{RetryPolicy, SkipReason, should_attempt};
use crate::session::{RefreshSession, SessionState};
use crate::status::RefreshStatus;

/// Outcome of [`RefreshScheduler::trigger_manual`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManualRefresh {
    Completed,
    Failed(String),
    /// A refresh was already in flight. Nothing was queued.
    AlreadyRefreshing,
    /// No operation registered: never started, or stopped.
    NotStarted,
    /// The session was stopped while this refresh was in flight.
    Cancelled,
}

enum Command {
    Start {
        config: RefreshConfig,
        operation: Arc<dyn RefreshOperation>,
    },
    Stop,
    TriggerManual {
        reply: oneshot::Sender<ManualRefresh>,
    },
}

/// Handle to one refresh session.
///
/// Cheap to clone. The session task exits once every handle is dropped,
/// dropping any pending timer and in-flight refresh with it.
#[derive(Clone)]
pub struct RefreshScheduler {
    label: Arc<str>,
    commands: mpsc::UnboundedSender<Command>,
    status: watch::Receiver<RefreshStatus>,
}

impl std::fmt::Debug for RefreshScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshScheduler")
            .field("label", &self.label)
            .field("status", &*self.status.borrow())
            .finish()
    }
}

impl RefreshScheduler {
    /// Spawn an idle session task on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn spawn(label: impl Into<Arc<str>>, monitor: &EnvironmentMonitor) -> Self {
        let label = label.into();
        let environment = monitor.subscribe();
        let session = RefreshSession::new(*environment.borrow());
        let (status_tx, status_rx) = watch::channel(RefreshStatus::from_session(&session, None));
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();

        let task = SchedulerTask {
            label: label.clone(),
            session,
            config: None,
            operation: None,
            deadline: None,
            in_flight: None,
            status: status_tx,
        };
        tokio::spawn(task.run(commands_rx, environment));

        debug!(event = "core.scheduler.spawned", label = %label);

        Self {
            label,
            commands: commands_tx,
            status: status_rx,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Replace the configuration and operation, clearing any pending timer.
    ///
    /// A changed configuration resets the failure streak. The first tick is
    /// armed immediately.
    pub fn start<O: RefreshOperation>(&self, config: RefreshConfig, operation: O) {
        self.start_shared(config, Arc::new(operation));
    }

    pub fn start_shared(&self, config: RefreshConfig, operation: Arc<dyn RefreshOperation>) {
        self.send(Command::Start { config, operation });
    }

    /// Cancel the timer and discard any in-flight refresh. Idempotent.
    pub fn stop(&self) {
        self.send(Command::Stop);
    }

    /// Run the operation now, bypassing the timer and every automatic gate
    /// except mutual exclusion.
    pub async fn trigger_manual(&self) -> ManualRefresh {
        let (reply, response) = oneshot::channel();
        if self.commands.send(Command::TriggerManual { reply }).is_err() {
            return ManualRefresh::NotStarted;
        }
        response.await.unwrap_or(ManualRefresh::Cancelled)
    }

    pub fn status(&self) -> RefreshStatus {
        self.status.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<RefreshStatus> {
        self.status.clone()
    }

    fn send(&self, command: Command) {
        if self.commands.send(command).is_err() {
            warn!(event = "core.scheduler.command_dropped", label = %self.label);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trigger {
    Automatic,
    Manual,
}

impl Trigger {
    fn as_str(&self) -> &'static str {
        match self {
            Trigger::Automatic => "automatic",
            Trigger::Manual => "manual",
        }
    }
}

/// When to arm the next tick after coming to rest.
#[derive(Debug, Clone, Copy)]
enum Arm {
    Now,
    AfterInterval,
}

struct InFlight {
    future: RefreshFuture,
    trigger: Trigger,
    reply: Option<oneshot::Sender<ManualRefresh>>,
}

struct SchedulerTask {
    label: Arc<str>,
    session: RefreshSession,
    config: Option<RefreshConfig>,
    operation: Option<Arc<dyn RefreshOperation>>,
    deadline: Option<Instant>,
    in_flight: Option<InFlight>,
    status: watch::Sender<RefreshStatus>,
}

impl SchedulerTask {
    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<Command>,
        environment: watch::Receiver<Environment>,
    ) {
        let mut environment = Some(environment);

        loop {
            tokio::select! {
                biased;
                command = commands.recv() => match command {
                    Some(command) => self.handle_command(command),
                    None => break,
                },
                next = changed(&mut environment) => match next {
                    Some(next) => self.handle_environment(next),
                    None => {
                        debug!(event = "core.scheduler.monitor_closed", label = %self.label);
                        environment = None;
                    }
                },
                outcome = in_flight(&mut self.in_flight) => self.settle(outcome),
                _ = timer(self.deadline) => {
                    self.deadline = None;
                    self.tick();
                }
            }
        }

        debug!(event = "core.scheduler.task_exited", label = %self.label);
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::Start { config, operation } => self.start(config, operation),
            Command::Stop => self.stop(),
            Command::TriggerManual { reply } => self.trigger_manual(reply),
        }
    }

    fn start(&mut self, config: RefreshConfig, operation: Arc<dyn RefreshOperation>) {
        let config_changed = self.config != Some(config);
        if config_changed {
            self.session.reset_failures();
        }
        self.config = Some(config);
        self.operation = Some(operation);
        self.deadline = None;

        info!(
            event = "core.scheduler.start_completed",
            label = %self.label,
            interval_ms = config.interval_ms,
            enabled = config.enabled,
            max_retries = config.max_retries,
            config_changed = config_changed,
        );

        // An in-flight refresh keeps running; arming follows the new config once it settles
        if self.in_flight.is_none() {
            self.rest(Arm::Now);
        }
        self.publish();
    }

    fn stop(&mut self) {
        let cancelled = self.in_flight.take();
        let cancelled_in_flight = cancelled.is_some();
        if let Some(InFlight {
            reply: Some(reply), ..
        }) = cancelled
        {
            let _ = reply.send(ManualRefresh::Cancelled);
        }

        self.deadline = None;
        self.config = None;
        self.operation = None;
        self.session.set_idle();
        self.publish();

        info!(
            event = "core.scheduler.stop_completed",
            label = %self.label,
            cancelled_in_flight = cancelled_in_flight,
        );
    }

    fn trigger_manual(&mut self, reply: oneshot::Sender<ManualRefresh>) {
        if self.in_flight.is_some() {
            debug!(event = "core.scheduler.manual_rejected", label = %self.label, reason = "in_flight");
            let _ = reply.send(ManualRefresh::AlreadyRefreshing);
            return;
        }
        if self.operation.is_none() {
            debug!(event = "core.scheduler.manual_rejected", label = %self.label, reason = "not_started");
            let _ = reply.send(ManualRefresh::NotStarted);
            return;
        }
        self.launch(Trigger::Manual, Some(reply));
    }

    fn handle_environment(&mut self, next: Environment) {
        let previous = self.session.environment();
        self.session.set_environment(next);

        if let Some(config) = self.config {
            match transition(&config, previous, next) {
                Some(EnvironmentEvent::Suspend) => {
                    if self.deadline.take().is_some() {
                        info!(event = "core.scheduler.timer_paused", label = %self.label);
                    }
                }
                Some(EnvironmentEvent::Resume) => {
                    if self.session.state() == SessionState::Scheduled && self.in_flight.is_none() {
                        info!(event = "core.scheduler.resume_started", label = %self.label);
                        self.deadline = None;
                        self.tick();
                    }
                }
                None => {}
            }
        }

        self.publish();
    }

    fn tick(&mut self) {
        let Some(config) = self.config else {
            self.skip(SkipReason::NotStarted);
            return;
        };
        if config.interval().is_none() {
            self.skip(SkipReason::InvalidInterval);
            return;
        }
        match should_attempt(&config, &self.session) {
            Ok(()) => self.launch(Trigger::Automatic, None),
            Err(reason) => self.skip(reason),
        }
    }

    fn skip(&self, reason: SkipReason) {
        debug!(
            event = "core.scheduler.tick_skipped",
            label = %self.label,
            reason = reason.as_str(),
        );
    }

    fn launch(&mut self, trigger: Trigger, reply: Option<oneshot::Sender<ManualRefresh>>) {
        let Some(operation) = self.operation.clone() else {
            if let Some(reply) = reply {
                let _ = reply.send(ManualRefresh::NotStarted);
            }
            return;
        };

        self.deadline = None;
        self.session.begin_refresh();
        self.in_flight = Some(InFlight {
            future: operation.refresh(),
            trigger,
            reply,
        });

        info!(
            event = "core.scheduler.refresh_started",
            label = %self.label,
            trigger = trigger.as_str(),
        );
        self.publish();
    }

    fn settle(&mut self, outcome: Result<(), RefreshError>) {
        let Some(settled) = self.in_flight.take() else {
            return;
        };

        let reply = match outcome {
            Ok(()) => {
                self.session.record_success(Utc::now());
                info!(
                    event = "core.scheduler.refresh_completed",
                    label = %self.label,
                    trigger = settled.trigger.as_str(),
                );
                ManualRefresh::Completed
            }
            Err(e) => {
                self.session.record_failure(e.message());
                warn!(
                    event = "core.scheduler.refresh_failed",
                    label = %self.label,
                    trigger = settled.trigger.as_str(),
                    error = %e,
                    consecutive_failures = self.session.consecutive_failures(),
                );
                ManualRefresh::Failed(e.message().to_string())
            }
        };

        self.rest(Arm::AfterInterval);
        self.publish();

        if let Some(tx) = settled.reply {
            let _ = tx.send(reply);
        }
    }

    /// Settle into Idle, Scheduled or Suspended and arm the timer if allowed.
    fn rest(&mut self, arm: Arm) {
        self.deadline = None;

        let Some(config) = self.config else {
            self.session.set_idle();
            return;
        };
        if !config.enabled {
            debug!(event = "core.scheduler.rest_idle", label = %self.label, reason = "disabled");
            self.session.set_idle();
            return;
        }
        let Some(interval) = config.interval() else {
            warn!(
                event = "core.scheduler.invalid_interval",
                label = %self.label,
                interval_ms = config.interval_ms,
            );
            self.session.set_idle();
            return;
        };

        let policy = RetryPolicy::from_config(&config);
        if policy.is_exhausted(self.session.consecutive_failures()) {
            if self.session.state() != SessionState::Suspended {
                warn!(
                    event = "core.scheduler.suspended",
                    label = %self.label,
                    consecutive_failures = self.session.consecutive_failures(),
                    max_retries = policy.max_retries(),
                );
            }
            self.session.suspend(&policy);
            return;
        }

        self.session.set_scheduled();
        if !self.session.environment().allows(&config) {
            debug!(event = "core.scheduler.dormant", label = %self.label);
            return;
        }

        let delay = match arm {
            Arm::Now => Duration::ZERO,
            Arm::AfterInterval => interval,
        };
        self.deadline = Some(Instant::now() + delay);
    }

    fn publish(&self) {
        let next = RefreshStatus::from_session(&self.session, self.config.as_ref());
        self.status.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            *current = next;
            true
        });
    }
}

/// Next environment value, or `None` once the monitor is gone. Pending forever
/// when there is no receiver.
async fn changed(receiver: &mut Option<watch::Receiver<Environment>>) -> Option<Environment> {
    match receiver {
        Some(rx) => match rx.changed().await {
            Ok(()) => Some(*rx.borrow_and_update()),
            Err(_) => None,
        },
        None => pending().await,
    }
}

async fn in_flight(slot: &mut Option<InFlight>) -> Result<(), RefreshError> {
    match slot {
        Some(in_flight) => (&mut in_flight.future).await,
        None => pending().await,
    }
}

async fn timer(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => pending().await,
    }
}

//! Binding between a view, the settings store and its refresh scheduler.

use std::sync::Arc;

use pulse_config::{
    PulseSettings, RefreshConfig, SettingsStore, ViewKind, ViewOverrides, effective_config,
};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::environment::EnvironmentMonitor;
use crate::operation::RefreshOperation;
use crate::scheduler::{ManualRefresh, RefreshScheduler};
use crate::status::RefreshStatus;

/// A mounted view's refresh session.
///
/// Re-merges settings on every store replacement and restarts the scheduler
/// only when the effective configuration changed. Dropping it tears the
/// session down.
#[derive(Debug)]
pub struct ViewRefresher {
    view: ViewKind,
    scheduler: RefreshScheduler,
    shutdown: CancellationToken,
}

impl ViewRefresher {
    /// Mount `view` and start refreshing with `operation`.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn mount<O: RefreshOperation>(
        view: ViewKind,
        overrides: ViewOverrides,
        store: &SettingsStore,
        monitor: &EnvironmentMonitor,
        operation: O,
    ) -> Self {
        let scheduler = RefreshScheduler::spawn(view.as_str(), monitor);
        let operation: Arc<dyn RefreshOperation> = Arc::new(operation);

        let mut settings = store.subscribe();
        let config = effective_config(&settings.borrow_and_update(), view, &overrides);
        scheduler.start_shared(config, operation.clone());

        info!(
            event = "core.view.mount_completed",
            view = %view,
            interval_ms = config.interval_ms,
            enabled = config.enabled,
        );

        let shutdown = CancellationToken::new();
        tokio::spawn(watch_settings(
            view,
            overrides,
            settings,
            config,
            scheduler.clone(),
            operation,
            shutdown.clone(),
        ));

        Self {
            view,
            scheduler,
            shutdown,
        }
    }

    pub fn view(&self) -> ViewKind {
        self.view
    }

    pub fn status(&self) -> RefreshStatus {
        self.scheduler.status()
    }

    pub fn subscribe(&self) -> watch::Receiver<RefreshStatus> {
        self.scheduler.subscribe()
    }

    pub async fn manual_refresh(&self) -> ManualRefresh {
        self.scheduler.trigger_manual().await
    }
}

impl Drop for ViewRefresher {
    fn drop(&mut self) {
        self.shutdown.cancel();
        self.scheduler.stop();
        debug!(event = "core.view.unmount_completed", view = %self.view);
    }
}

async fn watch_settings(
    view: ViewKind,
    overrides: ViewOverrides,
    mut settings: watch::Receiver<PulseSettings>,
    mut current: RefreshConfig,
    scheduler: RefreshScheduler,
    operation: Arc<dyn RefreshOperation>,
    shutdown: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            changed = settings.changed() => {
                if changed.is_err() {
                    debug!(event = "core.view.settings_closed", view = %view);
                    break;
                }
                let next = effective_config(&settings.borrow_and_update(), view, &overrides);
                if next == current {
                    debug!(event = "core.view.config_unchanged", view = %view);
                    continue;
                }
                info!(
                    event = "core.view.config_changed",
                    view = %view,
                    interval_ms = next.interval_ms,
                    enabled = next.enabled,
                    max_retries = next.max_retries,
                );
                current = next;
                scheduler.start_shared(current, operation.clone());
            }
        }
    }
}

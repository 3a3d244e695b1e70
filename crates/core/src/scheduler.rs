//! Debounced automatic uploads driven by "generation completed" signals.

use crate::manager::{AssetEvent, AssetManager, AutoCheck};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_secs(2);

/// A single-slot timer: arming replaces whatever was pending.
#[derive(Default)]
pub struct DebounceTimer {
    slot: Option<JoinHandle<()>>,
}

impl DebounceTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `on_fire` after `delay` unless cancelled or re-armed first.
    pub fn arm<F>(&mut self, delay: Duration, on_fire: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.cancel();
        self.slot = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            on_fire();
        }));
    }

    /// Returns whether a pending fire was cancelled.
    pub fn cancel(&mut self) -> bool {
        match self.slot.take() {
            Some(handle) if !handle.is_finished() => {
                handle.abort();
                true
            }
            _ => false,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.slot.as_ref().map(|h| !h.is_finished()).unwrap_or(false)
    }
}

impl Drop for DebounceTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    PendingCheck,
}

/// Waits for a quiet period after the last signal, then runs one automatic
/// check. Signals arriving while pending restart the wait; there is no cap,
/// so a continuous stream of signals defers the check indefinitely.
///
/// A check that has started is detached from the timer: later signals never
/// cancel an upload already issued.
pub struct AutomaticUploadScheduler {
    manager: Arc<AssetManager>,
    quiet_period: Duration,
    timer: Mutex<DebounceTimer>,
}

impl AutomaticUploadScheduler {
    pub fn new(manager: Arc<AssetManager>, quiet_period: Duration) -> Self {
        Self {
            manager,
            quiet_period,
            timer: Mutex::new(DebounceTimer::new()),
        }
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet_period
    }

    /// Records a "generation completed" signal. Must be called from within a
    /// Tokio runtime.
    pub fn signal(&self) {
        let manager = self.manager.clone();
        let mut timer = self.timer.lock().unwrap_or_else(|p| p.into_inner());
        let restarted = timer.is_armed();
        timer.arm(self.quiet_period, move || {
            tokio::spawn(run_check(manager));
        });
        debug!(restarted, "automatic upload check armed");
    }

    /// Drops a pending check, if any.
    pub fn cancel(&self) -> bool {
        self.timer
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .cancel()
    }

    pub fn state(&self) -> SchedulerState {
        if self
            .timer
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .is_armed()
        {
            SchedulerState::PendingCheck
        } else {
            SchedulerState::Idle
        }
    }
}

/// Runs one check, swallowing every error after logging it.
async fn run_check(manager: Arc<AssetManager>) {
    match manager.auto_check().await {
        Ok(AutoCheck::Uploaded(outcome)) if !outcome.is_committed() => {
            let message = outcome.message().unwrap_or("Automatic upload failed").to_string();
            warn!("automatic upload rejected: {}", message);
            manager.emit(AssetEvent::AutoUploadFailed { message });
        }
        Ok(AutoCheck::Uploaded(_)) => info!("automatic upload finished"),
        Ok(other) => debug!(?other, "automatic check finished"),
        Err(e) => {
            warn!("automatic upload check failed: {}", e);
            manager.emit(AssetEvent::AutoUploadFailed {
                message: e.to_string(),
            });
        }
    }
}

//! Periodic session liveness check.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use growthwatch_core::config::MonitorConfig;

use crate::client::AuthClient;
use crate::error::ClientError;
use crate::event::SessionEvent;

/// Polls `GET /api/auth/session` on a fixed interval.
///
/// An invalid session emits [`SessionEvent::Expired`]; a session expiring
/// inside the lookahead window is refreshed through the server.
#[derive(Debug, Clone)]
pub struct SessionMonitor {
    client: Arc<AuthClient>,
    interval: Duration,
    lookahead_seconds: i64,
}

impl SessionMonitor {
    /// Creates a monitor with the configured interval and lookahead.
    pub fn new(client: Arc<AuthClient>, config: &MonitorConfig) -> Self {
        Self {
            client,
            interval: Duration::from_secs(config.poll_interval_seconds),
            lookahead_seconds: i64::try_from(config.refresh_lookahead_seconds).unwrap_or(i64::MAX),
        }
    }

    /// Overrides the poll interval.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Runs a single check and publishes its event.
    pub async fn check_once(&self) -> Result<SessionEvent, ClientError> {
        let status = self.client.session().await?;
        let now = Utc::now().timestamp();

        let event = if !status.valid {
            info!("Session no longer valid");
            SessionEvent::Expired
        } else if status.expires_within(self.lookahead_seconds, now) {
            debug!(expires_at = ?status.expires_at, "Session expiring soon, refreshing");
            let refreshed = self.client.refresh().await?;
            match refreshed.expires_at.filter(|_| refreshed.valid) {
                Some(expires_at) => SessionEvent::Refreshed { expires_at },
                None => SessionEvent::Expired,
            }
        } else {
            SessionEvent::Healthy {
                expires_at: status.expires_at.unwrap_or_default(),
            }
        };

        self.client.publish(event.clone());
        Ok(event)
    }

    /// Starts polling on a background task. The first check runs immediately.
    pub fn start(self) -> MonitorHandle {
        let (cancel_tx, mut cancel_rx) = watch::channel(false);
        let interval = self.interval.max(Duration::from_millis(1));

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            info!(interval_secs = interval.as_secs(), "Session monitor started");

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if let Err(e) = self.check_once().await {
                            warn!(error = %e, "Session check failed");
                        }
                    }
                    changed = cancel_rx.changed() => {
                        if changed.is_err() || *cancel_rx.borrow() {
                            break;
                        }
                    }
                }
            }

            info!("Session monitor stopped");
        });

        MonitorHandle {
            cancel: cancel_tx,
            task: Some(task),
        }
    }
}

/// Handle to a running [`SessionMonitor`]. Dropping it stops the monitor.
#[derive(Debug)]
pub struct MonitorHandle {
    cancel: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl MonitorHandle {
    /// Cancels the timer. A check already in flight runs to completion.
    pub fn stop(&self) {
        let _ = self.cancel.send(true);
    }

    /// True until the background task has exited.
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Stops the monitor and waits for the task to exit.
    pub async fn shutdown(mut self) {
        self.stop();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(error = %e, "Session monitor task failed");
            }
        }
    }
}

impl Drop for MonitorHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

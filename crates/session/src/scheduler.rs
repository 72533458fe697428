// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Background proactive refresh.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::backend::ApiBackend;
use crate::config::SessionConfig;
use crate::coordinator::{ProactiveCheck, SessionCoordinator};

/// Handle to a running proactive refresh task.
///
/// Dropping the handle stops the task.
pub struct RefreshSchedule {
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl RefreshSchedule {
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Stop the task and wait for it to exit.
    pub async fn join(mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for RefreshSchedule {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl<B: ApiBackend> SessionCoordinator<B> {
    /// Start proactive refresh with the interval and threshold from `config`.
    pub fn start_proactive_refresh(self: &Arc<Self>, config: &SessionConfig) -> RefreshSchedule {
        spawn_proactive_refresh(
            Arc::clone(self),
            config.refresh_check_interval(),
            config.refresh_threshold(),
        )
    }
}

/// Spawn a task that checks the access token every `interval` and refreshes
/// it through the coordinator's gate once it has less than `threshold` left.
///
/// Failures are logged and never end the session on their own.
pub fn spawn_proactive_refresh<B: ApiBackend>(
    coordinator: Arc<SessionCoordinator<B>>,
    interval: Duration,
    threshold: Duration,
) -> RefreshSchedule {
    let cancel = CancellationToken::new();
    let handle = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            let mut timer = tokio::time::interval(interval);
            timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    _ = timer.tick() => {}
                }

                match coordinator.refresh_if_expiring(threshold).await {
                    ProactiveCheck::Refreshed => {
                        tracing::debug!("proactive refresh succeeded");
                    }
                    ProactiveCheck::Failed(failure) => {
                        tracing::warn!(err = %failure, "proactive refresh failed");
                    }
                    ProactiveCheck::Fresh { remaining } => {
                        tracing::trace!(remaining, "access token still fresh");
                    }
                    ProactiveCheck::NoToken | ProactiveCheck::Expired => {}
                }
            }
            tracing::debug!("proactive refresh stopped");
        })
    };
    RefreshSchedule { cancel, handle: Some(handle) }
}

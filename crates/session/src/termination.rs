// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session termination: the single place an unrecoverable session is torn down.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::broadcast;

use crate::events::SessionEvent;
use crate::token::store::TokenStore;

/// Why a session ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum TerminationReason {
    /// The server rejected a request and no refresh token was stored.
    MissingRefreshToken,
    /// Exchanging the refresh token failed.
    RefreshFailed(String),
    /// The user signed out.
    LoggedOut,
}

/// UI-side reaction to a terminated session.
///
/// The dashboard registers one implementation that clears in-memory user
/// state and navigates to sign-in; tests register a recorder.
pub trait SessionExpiredListener: Send + Sync {
    fn session_expired(&self, reason: &TerminationReason);
}

impl<F> SessionExpiredListener for F
where
    F: Fn(&TerminationReason) + Send + Sync,
{
    fn session_expired(&self, reason: &TerminationReason) {
        self(reason)
    }
}

/// Fires the termination side effects at most once per session.
///
/// Armed at construction and again on every login. The first `terminate`
/// after arming clears the store, calls the listener, and emits
/// [`SessionEvent::Terminated`]; later calls are no-ops until re-armed.
/// Tokens written straight into the store after a termination (a host
/// restoring a saved session) count as a new session too.
pub struct SessionTerminator {
    store: Arc<dyn TokenStore>,
    listener: Arc<dyn SessionExpiredListener>,
    event_tx: broadcast::Sender<SessionEvent>,
    armed: Mutex<bool>,
    /// Session generation, bumped on every effective termination and re-arm.
    epoch: AtomicU64,
}

impl SessionTerminator {
    pub fn new(
        store: Arc<dyn TokenStore>,
        listener: Arc<dyn SessionExpiredListener>,
        event_tx: broadcast::Sender<SessionEvent>,
    ) -> Self {
        Self { store, listener, event_tx, armed: Mutex::new(true), epoch: AtomicU64::new(0) }
    }

    /// Run the termination side effects unless they already ran for this
    /// session. Returns whether they ran.
    pub fn terminate(&self, reason: TerminationReason) -> bool {
        {
            let mut armed = self.armed.lock();
            if !*armed && !self.store.tokens().has_any() {
                tracing::debug!(?reason, "session already terminated");
                return false;
            }
            *armed = false;
            self.epoch.fetch_add(1, Ordering::AcqRel);
            self.store.clear();
        }
        tracing::info!(?reason, "session terminated");
        self.listener.session_expired(&reason);
        let _ = self.event_tx.send(SessionEvent::Terminated { reason });
        true
    }

    /// Re-arm after a new session starts.
    pub fn rearm(&self) {
        let mut armed = self.armed.lock();
        self.epoch.fetch_add(1, Ordering::AcqRel);
        *armed = true;
    }

    pub fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::Acquire)
    }
}

#[cfg(test)]
#[path = "termination_tests.rs"]
mod tests;

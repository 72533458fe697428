// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Single-flight refresh gate.
//!
//! The gate is either idle or refreshing. The first caller to enter an idle
//! gate becomes the leader and owns the refresh; everyone entering while it
//! runs becomes a follower queued in FIFO order. Settling the leadership
//! hands the same outcome to every follower in enqueue order and returns the
//! gate to idle in one critical section, so the queue is empty whenever the
//! gate is idle.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tokio::sync::oneshot;

use crate::error::RefreshFailure;

/// New access token on success.
pub type RefreshOutcome = Result<String, RefreshFailure>;

/// What a follower receives when the refresh it waited on settles.
#[derive(Debug, Clone, PartialEq)]
pub struct Release {
    pub outcome: RefreshOutcome,
    /// Gate-wide release counter, increasing in the order followers are released.
    pub sequence: u64,
}

enum GateState {
    Idle,
    Refreshing { waiters: VecDeque<oneshot::Sender<Release>> },
}

pub struct RefreshGate {
    state: Mutex<GateState>,
    released: AtomicU64,
}

/// Role handed out by [`RefreshGate::enter`].
pub enum Entry<'a> {
    Leader(Leadership<'a>),
    Follower(Follower),
}

impl RefreshGate {
    pub fn new() -> Self {
        Self { state: Mutex::new(GateState::Idle), released: AtomicU64::new(0) }
    }

    /// Join the current refresh, or start one if the gate is idle.
    ///
    /// The check and the transition happen under one lock, so two callers can
    /// never both become leader.
    pub fn enter(&self) -> Entry<'_> {
        let mut state = self.state.lock();
        if let GateState::Refreshing { waiters } = &mut *state {
            let (tx, rx) = oneshot::channel();
            waiters.push_back(tx);
            return Entry::Follower(Follower { rx, position: waiters.len() });
        }
        *state = GateState::Refreshing { waiters: VecDeque::new() };
        Entry::Leader(Leadership { gate: self, settled: false })
    }

    pub fn is_refreshing(&self) -> bool {
        matches!(*self.state.lock(), GateState::Refreshing { .. })
    }

    /// Followers currently queued behind the leader.
    pub fn queued(&self) -> usize {
        match &*self.state.lock() {
            GateState::Idle => 0,
            GateState::Refreshing { waiters } => waiters.len(),
        }
    }

    /// Return to idle only if nobody is queued, checked under the same lock.
    fn settle_if_unwatched(&self) -> bool {
        let mut state = self.state.lock();
        match &*state {
            GateState::Refreshing { waiters } if !waiters.is_empty() => false,
            _ => {
                *state = GateState::Idle;
                true
            }
        }
    }

    /// Drain the queue in FIFO order and return to idle. Returns the number of
    /// followers that were queued.
    fn settle(&self, outcome: &RefreshOutcome) -> usize {
        let mut state = self.state.lock();
        let waiters = match std::mem::replace(&mut *state, GateState::Idle) {
            GateState::Refreshing { waiters } => waiters,
            GateState::Idle => VecDeque::new(),
        };
        let count = waiters.len();
        for tx in waiters {
            let sequence = self.released.fetch_add(1, Ordering::AcqRel);
            // A follower that timed out has dropped its receiver.
            let _ = tx.send(Release { outcome: outcome.clone(), sequence });
        }
        count
    }
}

impl Default for RefreshGate {
    fn default() -> Self {
        Self::new()
    }
}

/// Ownership of the in-flight refresh.
///
/// Dropping it unsettled releases every follower with
/// [`RefreshFailure::Abandoned`] so nobody waits on a refresh that will never
/// finish.
#[must_use = "followers wait until the leadership is settled"]
pub struct Leadership<'a> {
    gate: &'a RefreshGate,
    settled: bool,
}

impl Leadership<'_> {
    /// Release all followers with `outcome`. Returns how many were queued.
    pub fn settle(mut self, outcome: &RefreshOutcome) -> usize {
        self.settled = true;
        self.gate.settle(outcome)
    }

    pub fn queued(&self) -> usize {
        self.gate.queued()
    }

    /// Release the gate if no follower is waiting, atomically with the check.
    ///
    /// Hands the leadership back when followers are queued; once this returns
    /// `Ok`, later callers start a new refresh instead of joining this one.
    pub fn settle_unwatched(mut self) -> Result<(), Self> {
        if self.gate.settle_if_unwatched() {
            self.settled = true;
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl Drop for Leadership<'_> {
    fn drop(&mut self) {
        if !self.settled {
            let released = self.gate.settle(&Err(RefreshFailure::Abandoned));
            tracing::warn!(followers = released, "refresh leader dropped before settling");
        }
    }
}

/// A caller queued behind the in-flight refresh.
pub struct Follower {
    rx: oneshot::Receiver<Release>,
    /// 1-based place in the queue at enqueue time.
    pub position: usize,
}

impl Follower {
    /// Wait for the leader to settle.
    pub async fn wait(self) -> Release {
        match self.rx.await {
            Ok(release) => release,
            // Sender dropped without sending; only possible if the gate itself went away.
            Err(_) => Release { outcome: Err(RefreshFailure::Abandoned), sequence: u64::MAX },
        }
    }
}

#[cfg(test)]
#[path = "gate_tests.rs"]
mod tests;

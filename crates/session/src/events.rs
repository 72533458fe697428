// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use serde::Serialize;

use crate::coordinator::RefreshTrigger;
use crate::termination::TerminationReason;

/// Session lifecycle events, broadcast to any subscriber.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    /// Login stored a fresh token pair.
    LoggedIn,
    /// A refresh stored a new access token and released its followers.
    Refreshed { trigger: RefreshTrigger, followers: usize },
    /// A refresh failed; followers received the same failure.
    RefreshFailed { trigger: RefreshTrigger, error: String },
    /// The session was torn down.
    Terminated { reason: TerminationReason },
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::fmt;

use serde::Serialize;

/// Failure of a login or refresh call against the auth endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AuthError {
    /// The server answered with a non-success status.
    Rejected { status: u16, body: String },
    /// The call never produced a response.
    Transport { message: String },
}

impl AuthError {
    pub fn transport(err: impl fmt::Display) -> Self {
        Self::Transport { message: err.to_string() }
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rejected { status, body } if body.is_empty() => write!(f, "rejected ({status})"),
            Self::Rejected { status, body } => write!(f, "rejected ({status}): {body}"),
            Self::Transport { message } => write!(f, "transport: {message}"),
        }
    }
}

impl std::error::Error for AuthError {}

/// Outcome shared by a refresh leader and every follower queued behind it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RefreshFailure {
    /// No refresh token was stored when the refresh was attempted.
    MissingRefreshToken,
    /// The refresh endpoint rejected the refresh token.
    Rejected { status: u16, body: String },
    /// The refresh call failed before a response arrived.
    Transport { message: String },
    /// The leader was dropped before the refresh settled.
    Abandoned,
    /// The session was terminated while the refresh was in flight.
    SessionEnded,
    /// This follower gave up waiting on the in-flight refresh.
    TimedOut,
}

impl RefreshFailure {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingRefreshToken => "MISSING_REFRESH_TOKEN",
            Self::Rejected { .. } => "REFRESH_REJECTED",
            Self::Transport { .. } => "REFRESH_TRANSPORT",
            Self::Abandoned => "REFRESH_ABANDONED",
            Self::SessionEnded => "SESSION_ENDED",
            Self::TimedOut => "REFRESH_TIMEOUT",
        }
    }
}

impl From<AuthError> for RefreshFailure {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Rejected { status, body } => Self::Rejected { status, body },
            AuthError::Transport { message } => Self::Transport { message },
        }
    }
}

impl fmt::Display for RefreshFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingRefreshToken => f.write_str("no refresh token"),
            Self::Rejected { status, body } if body.is_empty() => {
                write!(f, "refresh rejected ({status})")
            }
            Self::Rejected { status, body } => write!(f, "refresh rejected ({status}): {body}"),
            Self::Transport { message } => write!(f, "refresh transport error: {message}"),
            Self::Abandoned => f.write_str("refresh abandoned before it settled"),
            Self::SessionEnded => f.write_str("session ended during refresh"),
            Self::TimedOut => f.write_str("timed out waiting for refresh"),
        }
    }
}

impl std::error::Error for RefreshFailure {}

/// Error surfaced to callers of the session coordinator.
#[derive(Debug)]
pub enum SessionError {
    /// The request carried no token and the session cannot be recovered.
    Unauthenticated,
    /// The server rejected the request's credentials and no refresh applies.
    Unauthorized { status: u16 },
    /// The refresh failed and the session was terminated.
    SessionExpired(RefreshFailure),
    /// Waiting on another caller's refresh exceeded the queue wait.
    RefreshTimeout,
    /// Login was rejected or could not reach the server.
    Login(AuthError),
    /// Network failure talking to the API.
    Transport(anyhow::Error),
    /// Non-success response from a JSON helper.
    Status { status: u16, body: String },
    /// Response body did not match the expected shape.
    Decode(serde_json::Error),
}

impl SessionError {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::Unauthorized { .. } => "UNAUTHORIZED",
            Self::SessionExpired(_) => "SESSION_EXPIRED",
            Self::RefreshTimeout => "REFRESH_TIMEOUT",
            Self::Login(_) => "LOGIN_FAILED",
            Self::Transport(_) => "TRANSPORT",
            Self::Status { status, .. } if *status >= 500 => "SERVER_ERROR",
            Self::Status { .. } => "HTTP_STATUS",
            Self::Decode(_) => "BAD_RESPONSE",
        }
    }

    /// True when the caller should treat the user as signed out.
    pub fn is_session_expired(&self) -> bool {
        matches!(self, Self::SessionExpired(_) | Self::Unauthenticated)
    }
}

impl From<RefreshFailure> for SessionError {
    fn from(failure: RefreshFailure) -> Self {
        match failure {
            RefreshFailure::TimedOut => Self::RefreshTimeout,
            other => Self::SessionExpired(other),
        }
    }
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unauthenticated => f.write_str("not signed in"),
            Self::Unauthorized { status } => write!(f, "unauthorized ({status})"),
            Self::SessionExpired(reason) => write!(f, "session expired: {reason}"),
            Self::RefreshTimeout => f.write_str("timed out waiting for token refresh"),
            Self::Login(e) => write!(f, "login failed: {e}"),
            Self::Transport(e) => write!(f, "transport error: {e:#}"),
            Self::Status { status, body } if body.is_empty() => write!(f, "request failed ({status})"),
            Self::Status { status, body } => write!(f, "request failed ({status}): {body}"),
            Self::Decode(e) => write!(f, "bad response body: {e}"),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::SessionExpired(e) => Some(e),
            Self::Login(e) => Some(e),
            Self::Transport(e) => Some(&**e),
            Self::Decode(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Adboard session: authenticated API client and token lifecycle coordinator.
//!
//! Every request issued through a [`SessionCoordinator`] is stamped with the
//! current access token. Expired-session responses funnel into a single-flight
//! refresh; concurrent failures queue behind it and replay once it settles.
//! A background [`RefreshSchedule`] refreshes ahead of expiry through the same
//! gate, and an unrecoverable session is torn down exactly once.

pub mod backend;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod events;
pub mod request;
pub mod scheduler;
pub mod termination;
pub mod token;

pub use crate::backend::http::HttpBackend;
pub use crate::backend::{ApiBackend, Credentials, TokenGrant, TokenPair};
pub use crate::config::SessionConfig;
pub use crate::coordinator::{ProactiveCheck, RefreshTrigger, SessionCoordinator};
pub use crate::error::{AuthError, RefreshFailure, SessionError};
pub use crate::events::SessionEvent;
pub use crate::request::{ApiRequest, ApiResponse, PreparedRequest};
pub use crate::scheduler::{spawn_proactive_refresh, RefreshSchedule};
pub use crate::termination::{SessionExpiredListener, TerminationReason};
pub use crate::token::store::{open_token_store, MemoryTokenStore, TokenStore};
pub use crate::token::{SessionTokens, TokenKind};

use std::sync::Arc;

/// Build a coordinator against the real HTTP API described by `config` and
/// start its proactive refresh.
///
/// Opens the token store (file-backed when `token_file` is set) and wires the
/// listener that the UI layer uses to clear user state and navigate to sign-in.
/// Must be called from within a Tokio runtime; dropping the returned
/// [`RefreshSchedule`] stops the background refresh.
pub fn connect(
    config: &SessionConfig,
    listener: Arc<dyn SessionExpiredListener>,
) -> anyhow::Result<(Arc<SessionCoordinator<HttpBackend>>, RefreshSchedule)> {
    let store = open_token_store(config)?;
    let backend = HttpBackend::new(config);
    let coordinator = SessionCoordinator::new(backend, store, listener, config);
    let schedule = coordinator.start_proactive_refresh(config);
    tracing::debug!(
        base_url = %config.base_url,
        interval = ?config.refresh_check_interval(),
        threshold = ?config.refresh_threshold(),
        "session connected"
    );
    Ok((coordinator, schedule))
}

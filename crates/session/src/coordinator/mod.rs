// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session coordinator: authenticated requests with single-flight refresh.
//!
//! Every request goes out with the stored access token. A 401 on a first
//! attempt hands the request to the refresh gate: the first caller refreshes,
//! concurrent callers queue behind it, and all of them replay once with
//! whatever token the refresh produced. A second 401 is final. Requests to
//! the login endpoint bypass the flow entirely.

pub mod gate;

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::broadcast;

use crate::backend::{ApiBackend, Credentials};
use crate::config::SessionConfig;
use crate::coordinator::gate::{Entry, RefreshGate, RefreshOutcome};
use crate::error::{RefreshFailure, SessionError};
use crate::events::SessionEvent;
use crate::request::{attach, ApiRequest, ApiResponse, PreparedRequest};
use crate::termination::{SessionExpiredListener, SessionTerminator, TerminationReason};
use crate::token::inspect;
use crate::token::store::TokenStore;
use crate::token::TokenKind;

/// What started a refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshTrigger {
    /// A request was rejected with an expired session.
    Request,
    /// The background scheduler saw the token nearing expiry.
    Proactive,
    /// The host asked for a refresh directly.
    Manual,
}

/// Result of one proactive expiry check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProactiveCheck {
    /// No access token stored; nothing to do.
    NoToken,
    /// Token has at least the threshold left.
    Fresh { remaining: u64 },
    /// Token already expired (or unreadable); left to the request path.
    Expired,
    Refreshed,
    Failed(RefreshFailure),
}

/// Process-wide coordinator shared by every caller that talks to the API.
pub struct SessionCoordinator<B> {
    backend: B,
    store: Arc<dyn TokenStore>,
    gate: RefreshGate,
    terminator: SessionTerminator,
    event_tx: broadcast::Sender<SessionEvent>,
    queue_wait: Duration,
}

impl<B: ApiBackend> SessionCoordinator<B> {
    pub fn new(
        backend: B,
        store: Arc<dyn TokenStore>,
        listener: Arc<dyn SessionExpiredListener>,
        config: &SessionConfig,
    ) -> Arc<Self> {
        let (event_tx, _) = broadcast::channel(64);
        let terminator = SessionTerminator::new(Arc::clone(&store), listener, event_tx.clone());
        Arc::new(Self {
            backend,
            store,
            gate: RefreshGate::new(),
            terminator,
            event_tx,
            queue_wait: config.queue_wait(),
        })
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn store(&self) -> &Arc<dyn TokenStore> {
        &self.store
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.event_tx.subscribe()
    }

    pub fn is_refreshing(&self) -> bool {
        self.gate.is_refreshing()
    }

    pub fn has_session(&self) -> bool {
        self.store.has_session()
    }

    /// Issue `request` with the current access token, recovering an expired
    /// session once if possible.
    ///
    /// Non-401 responses, server errors included, come back unchanged.
    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse, SessionError> {
        let exempt = self.backend.is_login_path(&request.path);
        let mut retried = false;
        loop {
            let prepared = attach(&request, self.store.as_ref(), retried);
            let response = self.backend.send(&prepared).await.map_err(SessionError::Transport)?;
            if exempt || !response.is_session_invalid() {
                return Ok(response);
            }
            if prepared.retried {
                tracing::debug!(path = %request.path, "rejected again after refresh");
                return Err(SessionError::Unauthorized { status: response.status });
            }
            self.recover(&prepared, response.status).await?;
            retried = true;
        }
    }

    /// Decide how a first-attempt 401 is recovered. `Ok` means replay.
    async fn recover(&self, failed: &PreparedRequest, status: u16) -> Result<(), SessionError> {
        if self.store.get(TokenKind::Refresh).is_none() {
            self.terminator.terminate(TerminationReason::MissingRefreshToken);
            return Err(match failed.token {
                None => SessionError::Unauthenticated,
                Some(_) => SessionError::Unauthorized { status },
            });
        }

        // A refresh that finished while this request was in flight already
        // rotated the token it carried.
        if let (Some(sent), Some(current)) =
            (failed.token.as_deref(), self.store.get(TokenKind::Access))
        {
            if sent != current {
                tracing::debug!(path = %failed.request.path, "token rotated in flight, replaying");
                return Ok(());
            }
        }

        self.refresh(RefreshTrigger::Request).await?;
        Ok(())
    }

    /// Refresh the access token through the single-flight gate.
    ///
    /// Joins the in-flight refresh when there is one. Returns the new access
    /// token, or the failure shared by everyone in this refresh generation.
    pub async fn refresh(&self, trigger: RefreshTrigger) -> Result<String, RefreshFailure> {
        let leadership = loop {
            let follower = match self.gate.enter() {
                Entry::Leader(leadership) => break leadership,
                Entry::Follower(follower) => follower,
            };
            tracing::debug!(?trigger, position = follower.position, "queued behind refresh");
            match tokio::time::timeout(self.queue_wait, follower.wait()).await {
                // The leader went away without an answer; try again ourselves.
                Ok(release) if release.outcome == Err(RefreshFailure::Abandoned) => continue,
                Ok(release) => return release.outcome,
                Err(_) => {
                    tracing::warn!(?trigger, wait = ?self.queue_wait, "gave up waiting on refresh");
                    return Err(RefreshFailure::TimedOut);
                }
            }
        };

        tracing::debug!(?trigger, "starting token refresh");
        let outcome = self.run_refresh().await;
        match outcome {
            Ok(_) => {
                let followers = leadership.settle(&outcome);
                tracing::info!(?trigger, followers, "access token refreshed");
                let _ = self.event_tx.send(SessionEvent::Refreshed { trigger, followers });
            }
            Err(ref failure) => {
                // A failed proactive refresh only ends the session when
                // requests were already waiting on it. The check and the
                // release share one gate lock so no request can slip in
                // between them.
                let pending = match trigger {
                    RefreshTrigger::Proactive => leadership.settle_unwatched().err(),
                    _ => Some(leadership),
                };
                let followers = match pending {
                    Some(leadership) => {
                        if *failure != RefreshFailure::SessionEnded {
                            self.terminator
                                .terminate(TerminationReason::RefreshFailed(failure.to_string()));
                        }
                        leadership.settle(&outcome)
                    }
                    None => 0,
                };
                tracing::warn!(
                    ?trigger,
                    followers,
                    code = failure.as_str(),
                    err = %failure,
                    "token refresh failed"
                );
                let _ = self
                    .event_tx
                    .send(SessionEvent::RefreshFailed { trigger, error: failure.to_string() });
            }
        }
        outcome
    }

    async fn run_refresh(&self) -> RefreshOutcome {
        let epoch = self.terminator.epoch();
        let refresh_token =
            self.store.get(TokenKind::Refresh).ok_or(RefreshFailure::MissingRefreshToken)?;
        let grant = self.backend.refresh(&refresh_token).await?;
        if self.terminator.epoch() != epoch {
            tracing::info!("session changed during refresh, discarding new tokens");
            return Err(RefreshFailure::SessionEnded);
        }
        self.store.set_pair(&grant.access, grant.refresh.as_deref());
        Ok(grant.access)
    }

    /// One proactive check: refresh if the access token has less than
    /// `threshold` left but has not expired yet.
    pub async fn refresh_if_expiring(&self, threshold: Duration) -> ProactiveCheck {
        let Some(access) = self.store.get(TokenKind::Access) else {
            return ProactiveCheck::NoToken;
        };
        let remaining = inspect::seconds_until_expiry(&access);
        if remaining == 0 {
            return ProactiveCheck::Expired;
        }
        if remaining >= threshold.as_secs() {
            return ProactiveCheck::Fresh { remaining };
        }
        match self.refresh(RefreshTrigger::Proactive).await {
            Ok(_) => ProactiveCheck::Refreshed,
            Err(failure) => ProactiveCheck::Failed(failure),
        }
    }

    /// Exchange credentials for a token pair and start a new session.
    ///
    /// Login failures are returned as-is and never touch the refresh flow.
    pub async fn login(&self, credentials: &Credentials) -> Result<(), SessionError> {
        let pair = self.backend.login(credentials).await.map_err(SessionError::Login)?;
        self.terminator.rearm();
        self.store.set_pair(&pair.access, Some(&pair.refresh));
        tracing::info!(email = %credentials.email, "logged in");
        let _ = self.event_tx.send(SessionEvent::LoggedIn);
        Ok(())
    }

    /// Sign out: best-effort server invalidation, then local termination.
    pub async fn logout(&self) {
        let tokens = self.store.tokens();
        if tokens.access_token.is_some() || tokens.refresh_token.is_some() {
            if let Err(e) = self.backend.logout(&tokens).await {
                tracing::warn!(err = %e, "server-side logout failed");
            }
        }
        self.terminator.terminate(TerminationReason::LoggedOut);
    }

    /// GET `path` and decode a JSON success body.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, SessionError> {
        self.send(ApiRequest::get(path)).await?.error_for_status()?.json()
    }

    /// POST a JSON body to `path` and decode a JSON success body.
    pub async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> Result<T, SessionError> {
        let body = serde_json::to_value(body).map_err(SessionError::Decode)?;
        self.send(ApiRequest::post(path, body)).await?.error_for_status()?.json()
    }

    pub async fn put_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> Result<T, SessionError> {
        let body = serde_json::to_value(body).map_err(SessionError::Decode)?;
        self.send(ApiRequest::put(path, body)).await?.error_for_status()?.json()
    }

    pub async fn delete(&self, path: &str) -> Result<(), SessionError> {
        self.send(ApiRequest::delete(path)).await?.error_for_status()?;
        Ok(())
    }
}

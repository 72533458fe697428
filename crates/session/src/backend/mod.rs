// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The backend seam: ordinary API traffic plus the three auth capabilities.

pub mod http;

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::error::AuthError;
use crate::request::{ApiResponse, PreparedRequest};
use crate::token::SessionTokens;

/// Sign-in credentials for the login endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self { email: email.into(), password: password.into() }
    }
}

/// Token pair issued by a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    #[serde(alias = "access_token")]
    pub access: String,
    #[serde(alias = "refresh_token")]
    pub refresh: String,
}

/// Result of a refresh: a new access token and, when the backend rotates
/// refresh tokens, a new refresh token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenGrant {
    #[serde(alias = "access_token")]
    pub access: String,
    #[serde(default, alias = "refresh_token", skip_serializing_if = "Option::is_none")]
    pub refresh: Option<String>,
}

/// Everything the coordinator needs from the server.
///
/// `send` performs one attempt and reports the response as-is, including
/// 401s; classification is the coordinator's job.
pub trait ApiBackend: Send + Sync + 'static {
    fn send(
        &self,
        request: &PreparedRequest,
    ) -> impl Future<Output = anyhow::Result<ApiResponse>> + Send;

    fn login(
        &self,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<TokenPair, AuthError>> + Send;

    fn refresh(&self, refresh_token: &str)
        -> impl Future<Output = Result<TokenGrant, AuthError>> + Send;

    /// Best-effort server-side invalidation.
    fn logout(&self, tokens: &SessionTokens) -> impl Future<Output = anyhow::Result<()>> + Send;

    /// True when `path` addresses the login endpoint.
    fn is_login_path(&self, path: &str) -> bool;
}

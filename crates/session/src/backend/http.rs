// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! reqwest-backed [`ApiBackend`] talking to the dashboard REST API.

use std::sync::Once;

use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::backend::{ApiBackend, Credentials, TokenGrant, TokenPair};
use crate::config::SessionConfig;
use crate::error::AuthError;
use crate::request::{ApiResponse, PreparedRequest};
use crate::token::SessionTokens;

static CRYPTO_INIT: Once = Once::new();

/// Install the ring crypto provider (needed for reqwest even on plain HTTP).
fn ensure_crypto_provider() {
    CRYPTO_INIT.call_once(|| {
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}

/// HTTP client wrapper for the API origin in [`SessionConfig`].
pub struct HttpBackend {
    config: SessionConfig,
    client: Client,
}

impl HttpBackend {
    pub fn new(config: &SessionConfig) -> Self {
        ensure_crypto_provider();
        let client = Client::builder().timeout(config.request_timeout()).build().unwrap_or_default();
        Self { config: config.clone(), client }
    }

    /// POST a JSON body to an auth endpoint and decode the success body.
    async fn post_auth<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<T, AuthError> {
        let url = self.config.url(path);
        let resp = self.client.post(url).json(body).send().await.map_err(AuthError::transport)?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(AuthError::Rejected { status, body });
        }

        resp.json().await.map_err(AuthError::transport)
    }
}

impl ApiBackend for HttpBackend {
    async fn send(&self, prepared: &PreparedRequest) -> anyhow::Result<ApiResponse> {
        let request = &prepared.request;
        let mut req = self.client.request(request.method.clone(), self.config.url(&request.path));
        if !request.query.is_empty() {
            req = req.query(&request.query);
        }
        for (name, value) in prepared.headers() {
            req = req.header(name, value);
        }
        if let Some(ref body) = request.body {
            req = req.json(body);
        }

        let resp = req.send().await?;
        let status = resp.status().as_u16();
        let body = resp.bytes().await?;
        Ok(ApiResponse { status, body })
    }

    async fn login(&self, credentials: &Credentials) -> Result<TokenPair, AuthError> {
        let body = serde_json::to_value(credentials).map_err(AuthError::transport)?;
        self.post_auth(&self.config.login_path, &body).await
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenGrant, AuthError> {
        let body = serde_json::json!({ "refresh": refresh_token });
        self.post_auth(&self.config.refresh_path, &body).await
    }

    async fn logout(&self, tokens: &SessionTokens) -> anyhow::Result<()> {
        let body = serde_json::json!({ "refresh": tokens.refresh_token });
        let url = self.config.url(&self.config.logout_path);
        let mut req = self.client.post(url).json(&body);
        if let Some(ref access) = tokens.access_token {
            req = req.bearer_auth(access);
        }
        req.send().await?.error_for_status()?;
        Ok(())
    }

    fn is_login_path(&self, path: &str) -> bool {
        let path = path.split('?').next().unwrap_or(path);
        path.trim_end_matches('/') == self.config.login_path.trim_end_matches('/')
    }
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Request descriptors, bearer attachment, and buffered responses.

use bytes::Bytes;
use reqwest::Method;
use serde::de::DeserializeOwned;

use crate::error::SessionError;
use crate::token::store::TokenStore;
use crate::token::TokenKind;

/// Outgoing API call, independent of credentials.
///
/// The descriptor is never mutated by the coordinator: each attempt builds a
/// fresh [`PreparedRequest`] from it.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self { method, path: path.into(), query: vec![], headers: vec![], body: None }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn post(path: impl Into<String>, body: serde_json::Value) -> Self {
        Self::new(Method::POST, path).with_body(body)
    }

    pub fn put(path: impl Into<String>, body: serde_json::Value) -> Self {
        Self::new(Method::PUT, path).with_body(body)
    }

    pub fn patch(path: impl Into<String>, body: serde_json::Value) -> Self {
        Self::new(Method::PATCH, path).with_body(body)
    }

    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// One attempt at sending an [`ApiRequest`].
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRequest {
    pub request: ApiRequest,
    /// Access token attached to this attempt, if any.
    pub token: Option<String>,
    /// Set on the single replay after a refresh. A retried attempt that fails
    /// authentication again is final.
    pub retried: bool,
}

impl PreparedRequest {
    /// `Authorization` header value for this attempt.
    pub fn authorization(&self) -> Option<String> {
        self.token.as_ref().map(|t| format!("Bearer {t}"))
    }

    /// All headers to send, caller-supplied ones first.
    ///
    /// A caller-supplied `Authorization` header is dropped when a token is attached.
    pub fn headers(&self) -> Vec<(String, String)> {
        let mut headers: Vec<(String, String)> = self
            .request
            .headers
            .iter()
            .filter(|(name, _)| self.token.is_none() || !name.eq_ignore_ascii_case("authorization"))
            .cloned()
            .collect();
        if let Some(value) = self.authorization() {
            headers.push(("Authorization".to_owned(), value));
        }
        headers
    }
}

/// Stamp `request` with the current access token.
///
/// Never blocks and never refreshes. Without a stored token the request goes
/// out unauthenticated and the server's rejection takes the normal error path.
pub fn attach(request: &ApiRequest, store: &dyn TokenStore, retried: bool) -> PreparedRequest {
    PreparedRequest { request: request.clone(), token: store.get(TokenKind::Access), retried }
}

/// Buffered API response.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Bytes,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self { status, body: body.into() }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The server rejected the attempt's credentials.
    pub fn is_session_invalid(&self) -> bool {
        self.status == 401
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Decode the JSON body. An empty body decodes as `null`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, SessionError> {
        if self.body.is_empty() {
            return serde_json::from_value(serde_json::Value::Null).map_err(SessionError::Decode);
        }
        serde_json::from_slice(&self.body).map_err(SessionError::Decode)
    }

    /// Turn a non-success response into [`SessionError::Status`].
    pub fn error_for_status(self) -> Result<Self, SessionError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(SessionError::Status { status: self.status, body: self.text() })
        }
    }
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;

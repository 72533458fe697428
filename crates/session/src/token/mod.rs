// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Access/refresh token storage and offline inspection.

pub mod inspect;
pub mod persist;
pub mod store;

use serde::{Deserialize, Serialize};

/// Which of the two session credentials a store entry holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    /// Stable key under which the token is persisted.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Access => "access_token",
            Self::Refresh => "refresh_token",
        }
    }
}

/// Snapshot of both session credentials.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTokens {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

impl SessionTokens {
    pub fn get(&self, kind: TokenKind) -> Option<&str> {
        match kind {
            TokenKind::Access => self.access_token.as_deref(),
            TokenKind::Refresh => self.refresh_token.as_deref(),
        }
    }

    pub fn set(&mut self, kind: TokenKind, token: String) {
        match kind {
            TokenKind::Access => self.access_token = Some(token),
            TokenKind::Refresh => self.refresh_token = Some(token),
        }
    }

    /// A session exists when both tokens are present.
    pub fn has_session(&self) -> bool {
        self.access_token.is_some() && self.refresh_token.is_some()
    }

    pub fn has_any(&self) -> bool {
        self.access_token.is_some() || self.refresh_token.is_some()
    }
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Synchronous process-wide token store.
//!
//! The store holds exactly two entries, the access token and the refresh
//! token. Reads and writes never suspend, so the coordinator can check the
//! store and act on the result without another task interleaving.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::config::SessionConfig;
use crate::token::persist::FileTokenStore;
use crate::token::{SessionTokens, TokenKind};

/// Key-value storage for the two session credentials.
///
/// No well-formedness checks: a missing token means unauthenticated.
pub trait TokenStore: Send + Sync {
    fn get(&self, kind: TokenKind) -> Option<String>;

    fn set(&self, kind: TokenKind, token: &str);

    /// Remove both tokens.
    fn clear(&self);

    /// Store a freshly issued access token and, when rotated, a new refresh token.
    fn set_pair(&self, access: &str, refresh: Option<&str>) {
        self.set(TokenKind::Access, access);
        if let Some(refresh) = refresh {
            self.set(TokenKind::Refresh, refresh);
        }
    }

    fn tokens(&self) -> SessionTokens {
        SessionTokens {
            access_token: self.get(TokenKind::Access),
            refresh_token: self.get(TokenKind::Refresh),
        }
    }

    fn has_session(&self) -> bool {
        self.tokens().has_session()
    }
}

/// Token store that lives only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    tokens: Mutex<SessionTokens>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with both tokens.
    pub fn with_tokens(access: impl Into<String>, refresh: impl Into<String>) -> Self {
        Self {
            tokens: Mutex::new(SessionTokens {
                access_token: Some(access.into()),
                refresh_token: Some(refresh.into()),
            }),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self, kind: TokenKind) -> Option<String> {
        self.tokens.lock().get(kind).map(str::to_owned)
    }

    fn set(&self, kind: TokenKind, token: &str) {
        self.tokens.lock().set(kind, token.to_owned());
    }

    fn clear(&self) {
        *self.tokens.lock() = SessionTokens::default();
    }

    fn tokens(&self) -> SessionTokens {
        self.tokens.lock().clone()
    }
}

/// Open the store selected by `config.token_file`: file-backed when set,
/// in-memory otherwise.
pub fn open_token_store(config: &SessionConfig) -> anyhow::Result<Arc<dyn TokenStore>> {
    match config.token_file {
        Some(ref path) => Ok(Arc::new(FileTokenStore::open(path)?)),
        None => Ok(Arc::new(MemoryTokenStore::new())),
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;

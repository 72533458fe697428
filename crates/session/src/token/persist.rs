// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! File-backed token store: JSON on disk with atomic writes.

use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::token::store::TokenStore;
use crate::token::{SessionTokens, TokenKind};

/// Token store mirrored to a JSON file so a session survives restarts.
///
/// Reads are served from memory. Every mutation rewrites the file; write
/// failures are logged and the in-memory state stays authoritative.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    tokens: Mutex<SessionTokens>,
}

impl FileTokenStore {
    /// Open the store at `path`, creating parent directories as needed.
    ///
    /// A missing file starts an empty store. An unreadable or corrupt file is
    /// logged and treated as logged out.
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                std::fs::create_dir_all(dir)?;
            }
        }
        let tokens = if path.exists() {
            match load(path) {
                Ok(tokens) => tokens,
                Err(e) => {
                    tracing::warn!(path = %path.display(), err = %e, "ignoring unreadable token file");
                    SessionTokens::default()
                }
            }
        } else {
            SessionTokens::default()
        };
        Ok(Self { path: path.to_owned(), tokens: Mutex::new(tokens) })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, tokens: &SessionTokens) {
        if let Err(e) = save(&self.path, tokens) {
            tracing::warn!(path = %self.path.display(), err = %e, "failed to persist tokens");
        }
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self, kind: TokenKind) -> Option<String> {
        self.tokens.lock().get(kind).map(str::to_owned)
    }

    fn set(&self, kind: TokenKind, token: &str) {
        let mut tokens = self.tokens.lock();
        tokens.set(kind, token.to_owned());
        self.persist(&tokens);
    }

    fn clear(&self) {
        let mut tokens = self.tokens.lock();
        *tokens = SessionTokens::default();
        self.persist(&tokens);
    }

    fn set_pair(&self, access: &str, refresh: Option<&str>) {
        let mut tokens = self.tokens.lock();
        tokens.set(TokenKind::Access, access.to_owned());
        if let Some(refresh) = refresh {
            tokens.set(TokenKind::Refresh, refresh.to_owned());
        }
        self.persist(&tokens);
    }

    fn tokens(&self) -> SessionTokens {
        self.tokens.lock().clone()
    }
}

/// Load persisted tokens from a JSON file.
pub fn load(path: &Path) -> anyhow::Result<SessionTokens> {
    let contents = std::fs::read_to_string(path)?;
    let tokens: SessionTokens = serde_json::from_str(&contents)?;
    Ok(tokens)
}

/// Save tokens to a JSON file atomically (write tmp + rename).
///
/// Uses a unique temp filename (PID + counter) so concurrent saves never
/// share a `.tmp` file.
pub fn save(path: &Path, tokens: &SessionTokens) -> anyhow::Result<()> {
    use std::sync::atomic::{AtomicU32, Ordering};
    static COUNTER: AtomicU32 = AtomicU32::new(0);

    let json = serde_json::to_string_pretty(tokens)?;
    let seq = COUNTER.fetch_add(1, Ordering::Relaxed);
    let tmp_name = format!(
        "{}.{}.{}.tmp",
        path.file_name().unwrap_or_default().to_string_lossy(),
        std::process::id(),
        seq,
    );
    let tmp_path = path.with_file_name(tmp_name);
    std::fs::write(&tmp_path, json)?;
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_LOGIN_PATH: &str = "/api/auth/token/";
pub const DEFAULT_REFRESH_PATH: &str = "/api/auth/token/refresh/";
pub const DEFAULT_LOGOUT_PATH: &str = "/api/auth/logout/";
pub const DEFAULT_REFRESH_THRESHOLD_MINS: u64 = 5;
pub const DEFAULT_REFRESH_CHECK_MS: u64 = 60_000;
pub const DEFAULT_QUEUE_WAIT_MS: u64 = 30_000;
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

/// Configuration for the session coordinator and its HTTP backend.
///
/// Host binaries embed this with `#[command(flatten)]`.
#[derive(Debug, Clone, clap::Args)]
pub struct SessionConfig {
    /// Origin of the dashboard REST API.
    #[arg(long = "api-base-url", default_value = DEFAULT_BASE_URL, env = "ADBOARD_API_BASE_URL")]
    pub base_url: String,

    /// Path of the login endpoint. Auth failures here never trigger a refresh.
    #[arg(long, default_value = DEFAULT_LOGIN_PATH, env = "ADBOARD_LOGIN_PATH")]
    pub login_path: String,

    /// Path of the token refresh endpoint.
    #[arg(long, default_value = DEFAULT_REFRESH_PATH, env = "ADBOARD_REFRESH_PATH")]
    pub refresh_path: String,

    /// Path of the server-side logout endpoint.
    #[arg(long, default_value = DEFAULT_LOGOUT_PATH, env = "ADBOARD_LOGOUT_PATH")]
    pub logout_path: String,

    /// Refresh the access token proactively once it has fewer than this many
    /// minutes left.
    #[arg(
        long,
        default_value_t = DEFAULT_REFRESH_THRESHOLD_MINS,
        env = "ADBOARD_REFRESH_THRESHOLD_MINS"
    )]
    pub refresh_threshold_mins: u64,

    /// Proactive refresh check interval in milliseconds.
    #[arg(long, default_value_t = DEFAULT_REFRESH_CHECK_MS, env = "ADBOARD_REFRESH_CHECK_MS")]
    pub refresh_check_ms: u64,

    /// Max time a queued request waits on an in-flight refresh, in milliseconds.
    #[arg(long, default_value_t = DEFAULT_QUEUE_WAIT_MS, env = "ADBOARD_QUEUE_WAIT_MS")]
    pub queue_wait_ms: u64,

    /// Per-request HTTP timeout in milliseconds.
    #[arg(long, default_value_t = DEFAULT_REQUEST_TIMEOUT_MS, env = "ADBOARD_REQUEST_TIMEOUT_MS")]
    pub request_timeout_ms: u64,

    /// JSON file holding the access and refresh tokens. In-memory when unset.
    #[arg(long, env = "ADBOARD_TOKEN_FILE")]
    pub token_file: Option<PathBuf>,
}

impl SessionConfig {
    /// Config with every default except the API origin.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            login_path: DEFAULT_LOGIN_PATH.to_owned(),
            refresh_path: DEFAULT_REFRESH_PATH.to_owned(),
            logout_path: DEFAULT_LOGOUT_PATH.to_owned(),
            refresh_threshold_mins: DEFAULT_REFRESH_THRESHOLD_MINS,
            refresh_check_ms: DEFAULT_REFRESH_CHECK_MS,
            queue_wait_ms: DEFAULT_QUEUE_WAIT_MS,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            token_file: None,
        }
    }

    /// Join the API origin with `path`, tolerating a trailing slash on the origin.
    pub fn url(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        if path.starts_with('/') {
            format!("{base}{path}")
        } else {
            format!("{base}/{path}")
        }
    }

    pub fn refresh_threshold(&self) -> Duration {
        Duration::from_secs(self.refresh_threshold_mins * 60)
    }

    pub fn refresh_check_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_check_ms)
    }

    pub fn queue_wait(&self) -> Duration {
        Duration::from_millis(self.queue_wait_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

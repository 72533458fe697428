// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Offline token inspection: payload decoding and expiry math.
//!
//! Nothing here verifies signatures. The server remains the authority on
//! whether a token is valid; these helpers only estimate remaining lifetime.
//! Every function fails soft: malformed input decodes to `None` and is
//! treated as already expired.

use std::time::{SystemTime, UNIX_EPOCH};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::Deserialize;

/// Claims carried in a token payload.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TokenClaims {
    /// Expiry as epoch seconds. JWT allows fractional values.
    #[serde(default)]
    pub exp: Option<f64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl TokenClaims {
    pub fn expires_at(&self) -> Option<i64> {
        self.exp.filter(|exp| exp.is_finite()).map(|exp| exp.floor() as i64)
    }
}

/// Decode the payload segment of a `header.payload.signature` token.
pub fn decode(token: &str) -> Option<TokenClaims> {
    let mut segments = token.split('.');
    let (_header, payload, _signature) = (segments.next()?, segments.next()?, segments.next()?);
    if segments.next().is_some() {
        return None;
    }
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    serde_json::from_slice(&bytes).ok()
}

/// Integer expiry of `token`, if it decodes and carries `exp`.
pub fn expires_at(token: &str) -> Option<i64> {
    decode(token)?.expires_at()
}

/// True when `token` has no readable expiry or it is not after `now`.
pub fn is_expired_at(token: &str, now: i64) -> bool {
    match expires_at(token) {
        Some(exp) => exp <= now,
        None => true,
    }
}

/// Seconds from `now` until `token` expires, clamped to zero.
pub fn seconds_until_expiry_at(token: &str, now: i64) -> u64 {
    match expires_at(token) {
        Some(exp) if exp > now => (exp - now) as u64,
        _ => 0,
    }
}

pub fn is_expired(token: &str) -> bool {
    is_expired_at(token, epoch_secs())
}

pub fn seconds_until_expiry(token: &str) -> u64 {
    seconds_until_expiry_at(token, epoch_secs())
}

pub fn epoch_secs() -> i64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs() as i64
}

#[cfg(test)]
#[path = "inspect_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

use super::*;

fn token_with_payload(payload: &serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let body = URL_SAFE_NO_PAD.encode(payload.to_string());
    format!("{header}.{body}.c2lnbmF0dXJl")
}

fn token_expiring_at(exp: i64) -> String {
    token_with_payload(&serde_json::json!({ "exp": exp, "user_id": 7 }))
}

#[test]
fn decode_reads_exp_and_extra_claims() -> anyhow::Result<()> {
    let token = token_expiring_at(1_700_000_000);
    let claims = decode(&token).ok_or_else(|| anyhow::anyhow!("decode failed"))?;
    assert_eq!(claims.expires_at(), Some(1_700_000_000));
    assert_eq!(claims.extra["user_id"], 7);
    Ok(())
}

#[test]
fn decode_accepts_padded_payload() -> anyhow::Result<()> {
    let token = token_expiring_at(42);
    let mut parts: Vec<String> = token.split('.').map(str::to_owned).collect();
    parts[1].push_str("==");
    let padded = parts.join(".");
    assert_eq!(expires_at(&padded), Some(42));
    Ok(())
}

#[test]
fn fractional_exp_is_floored() {
    let token = token_with_payload(&serde_json::json!({ "exp": 1000.9 }));
    assert_eq!(expires_at(&token), Some(1000));
}

#[test]
fn unexpired_token_reports_remaining_lifetime() {
    let now = epoch_secs();
    let token = token_expiring_at(now + 120);
    assert!(!is_expired(&token));
    let remaining = seconds_until_expiry(&token);
    assert!(remaining > 0 && remaining <= 120, "remaining = {remaining}");
}

#[test]
fn past_token_is_expired_with_zero_remaining() {
    let now = epoch_secs();
    let token = token_expiring_at(now - 1);
    assert!(is_expired(&token));
    assert_eq!(seconds_until_expiry(&token), 0);
}

#[test]
fn expiry_uses_supplied_clock() {
    let token = token_expiring_at(1_000);
    assert!(!is_expired_at(&token, 999));
    assert_eq!(seconds_until_expiry_at(&token, 999), 1);
    assert!(is_expired_at(&token, 1_000));
    assert_eq!(seconds_until_expiry_at(&token, 1_000), 0);
    assert_eq!(seconds_until_expiry_at(&token, 5_000), 0);
}

#[test]
fn missing_exp_counts_as_expired() {
    let token = token_with_payload(&serde_json::json!({ "user_id": 7 }));
    assert!(decode(&token).is_some());
    assert!(is_expired_at(&token, 0));
    assert_eq!(seconds_until_expiry_at(&token, 0), 0);
}

#[yare::parameterized(
    empty = { "" },
    opaque = { "not-a-jwt" },
    two_segments = { "aGVhZGVy.eyJleHAiOjF9" },
    four_segments = { "a.eyJleHAiOjk5OTk5OTk5OTl9.c.d" },
    bad_base64 = { "aGVhZGVy.!!!.c2ln" },
    not_json = { "aGVhZGVy.bm90IGpzb24.c2ln" },
    exp_is_string = { "aGVhZGVy.eyJleHAiOiJzb29uIn0.c2ln" },
)]
fn malformed_tokens_fail_soft(token: &str) {
    assert!(decode(token).is_none());
    assert!(is_expired(token));
    assert_eq!(seconds_until_expiry(token), 0);
}

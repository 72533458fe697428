// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::token::store::MemoryTokenStore;

// ── attach ────────────────────────────────────────────────────────────

#[test]
fn attach_stamps_bearer_from_store() {
    let store = MemoryTokenStore::with_tokens("acc-1", "ref-1");
    let prepared = attach(&ApiRequest::get("/api/teams/"), &store, false);

    assert_eq!(prepared.token.as_deref(), Some("acc-1"));
    assert_eq!(prepared.authorization().as_deref(), Some("Bearer acc-1"));
    assert!(prepared
        .headers()
        .contains(&("Authorization".to_owned(), "Bearer acc-1".to_owned())));
    assert!(!prepared.retried);
}

#[test]
fn attach_without_token_leaves_request_unauthenticated() {
    let store = MemoryTokenStore::new();
    let prepared = attach(&ApiRequest::get("/api/teams/"), &store, false);

    assert_eq!(prepared.token, None);
    assert_eq!(prepared.authorization(), None);
    assert!(prepared.headers().is_empty());
}

#[test]
fn attach_never_refreshes_an_expired_token() {
    let store = MemoryTokenStore::with_tokens("expired-but-present", "ref-1");
    let prepared = attach(&ApiRequest::get("/api/reports/"), &store, false);
    assert_eq!(prepared.token.as_deref(), Some("expired-but-present"));
    assert_eq!(store.get(TokenKind::Access).as_deref(), Some("expired-but-present"));
}

#[test]
fn retry_attaches_current_token_without_touching_descriptor() {
    let store = MemoryTokenStore::with_tokens("acc-1", "ref-1");
    let request = ApiRequest::post("/api/campaigns/", serde_json::json!({ "name": "spring" }));

    let first = attach(&request, &store, false);
    store.set(TokenKind::Access, "acc-2");
    let second = attach(&request, &store, true);

    assert_eq!(first.token.as_deref(), Some("acc-1"));
    assert_eq!(second.token.as_deref(), Some("acc-2"));
    assert!(second.retried);
    assert_eq!(second.request, request);
    assert!(request.headers.is_empty());
}

#[test]
fn attached_token_replaces_caller_authorization_header() {
    let store = MemoryTokenStore::with_tokens("acc-1", "ref-1");
    let request = ApiRequest::get("/api/teams/")
        .with_header("authorization", "Bearer stale")
        .with_header("X-Team", "42");
    let headers = attach(&request, &store, false).headers();

    assert_eq!(
        headers,
        vec![
            ("X-Team".to_owned(), "42".to_owned()),
            ("Authorization".to_owned(), "Bearer acc-1".to_owned()),
        ]
    );
}

// ── ApiRequest builders ───────────────────────────────────────────────

#[test]
fn builders_set_method_body_and_query() {
    let req = ApiRequest::patch("/api/campaigns/9/", serde_json::json!({ "paused": true }))
        .with_query("platform", "meta");
    assert_eq!(req.method, Method::PATCH);
    assert_eq!(req.body, Some(serde_json::json!({ "paused": true })));
    assert_eq!(req.query, vec![("platform".to_owned(), "meta".to_owned())]);
    assert_eq!(ApiRequest::delete("/x").method, Method::DELETE);
}

// ── ApiResponse ───────────────────────────────────────────────────────

#[yare::parameterized(
    ok = { 200, true, false },
    created = { 201, true, false },
    unauthorized = { 401, false, true },
    forbidden = { 403, false, false },
    server_error = { 502, false, false },
)]
fn response_classification(status: u16, success: bool, session_invalid: bool) {
    let resp = ApiResponse::new(status, Bytes::new());
    assert_eq!(resp.is_success(), success);
    assert_eq!(resp.is_session_invalid(), session_invalid);
}

#[test]
fn json_decodes_body() -> anyhow::Result<()> {
    let resp = ApiResponse::new(200, r#"{"teams":[1,2]}"#);
    let value: serde_json::Value = resp.json()?;
    assert_eq!(value["teams"][1], 2);

    let empty: Option<serde_json::Value> = ApiResponse::new(204, Bytes::new()).json()?;
    assert!(empty.is_none());
    Ok(())
}

#[test]
fn error_for_status_keeps_body() {
    let err = ApiResponse::new(503, "maintenance").error_for_status().err();
    match err {
        Some(SessionError::Status { status, body }) => {
            assert_eq!(status, 503);
            assert_eq!(body, "maintenance");
        }
        other => panic!("unexpected: {other:?}"),
    }
}

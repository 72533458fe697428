// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[yare::parameterized(
    exact = { "/api/auth/token/" },
    no_trailing_slash = { "/api/auth/token" },
    with_query = { "/api/auth/token/?next=/reports" },
)]
fn login_path_matches(path: &str) {
    let backend = HttpBackend::new(&SessionConfig::default());
    assert!(backend.is_login_path(path));
}

#[yare::parameterized(
    refresh = { "/api/auth/token/refresh/" },
    other = { "/api/teams/" },
    prefix = { "/api/auth/" },
)]
fn other_paths_are_not_login(path: &str) {
    let backend = HttpBackend::new(&SessionConfig::default());
    assert!(!backend.is_login_path(path));
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

use clap::Parser;

use super::*;

#[derive(Debug, Parser)]
struct HostCli {
    #[command(flatten)]
    session: SessionConfig,
}

#[test]
fn flattened_defaults_match_new() -> anyhow::Result<()> {
    let cli = HostCli::try_parse_from(["dashboard"])?;
    let expected = SessionConfig::new(DEFAULT_BASE_URL);
    assert_eq!(cli.session.base_url, expected.base_url);
    assert_eq!(cli.session.login_path, expected.login_path);
    assert_eq!(cli.session.refresh_path, expected.refresh_path);
    assert_eq!(cli.session.logout_path, expected.logout_path);
    assert_eq!(cli.session.refresh_threshold_mins, 5);
    assert_eq!(cli.session.refresh_check_ms, 60_000);
    assert_eq!(cli.session.queue_wait_ms, 30_000);
    assert!(cli.session.token_file.is_none());
    Ok(())
}

#[test]
fn flags_override_defaults() -> anyhow::Result<()> {
    let cli = HostCli::try_parse_from([
        "dashboard",
        "--api-base-url",
        "https://api.example.com",
        "--refresh-threshold-mins",
        "2",
        "--refresh-check-ms",
        "500",
        "--token-file",
        "/tmp/tokens.json",
    ])?;
    assert_eq!(cli.session.base_url, "https://api.example.com");
    assert_eq!(cli.session.refresh_threshold(), Duration::from_secs(120));
    assert_eq!(cli.session.refresh_check_interval(), Duration::from_millis(500));
    assert_eq!(cli.session.token_file.as_deref(), Some(std::path::Path::new("/tmp/tokens.json")));
    Ok(())
}

#[yare::parameterized(
    plain = { "http://api", "/v1/teams", "http://api/v1/teams" },
    trailing_slash = { "http://api/", "/v1/teams", "http://api/v1/teams" },
    relative_path = { "http://api", "v1/teams", "http://api/v1/teams" },
)]
fn url_joins_base_and_path(base: &str, path: &str, expected: &str) {
    let config = SessionConfig::new(base);
    assert_eq!(config.url(path), expected);
}

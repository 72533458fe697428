// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn lead(gate: &RefreshGate) -> anyhow::Result<Leadership<'_>> {
    match gate.enter() {
        Entry::Leader(l) => Ok(l),
        Entry::Follower(_) => anyhow::bail!("expected leader"),
    }
}

fn follow(gate: &RefreshGate) -> anyhow::Result<Follower> {
    match gate.enter() {
        Entry::Follower(f) => Ok(f),
        Entry::Leader(_) => anyhow::bail!("expected follower"),
    }
}

#[test]
fn first_entry_leads_and_later_entries_follow() -> anyhow::Result<()> {
    let gate = RefreshGate::new();
    assert!(!gate.is_refreshing());

    let leader = lead(&gate)?;
    assert!(gate.is_refreshing());
    let a = follow(&gate)?;
    let b = follow(&gate)?;
    assert_eq!((a.position, b.position), (1, 2));
    assert_eq!(leader.queued(), 2);

    assert_eq!(leader.settle(&Ok("acc-2".into())), 2);
    assert!(!gate.is_refreshing());
    assert_eq!(gate.queued(), 0);
    Ok(())
}

#[tokio::test]
async fn followers_share_the_leader_outcome() -> anyhow::Result<()> {
    let gate = RefreshGate::new();
    let leader = lead(&gate)?;
    let followers: Vec<Follower> = (0..3).map(|_| follow(&gate)).collect::<anyhow::Result<_>>()?;

    leader.settle(&Ok("acc-2".into()));

    for f in followers {
        assert_eq!(f.wait().await.outcome, Ok("acc-2".to_owned()));
    }
    Ok(())
}

#[tokio::test]
async fn followers_release_in_enqueue_order() -> anyhow::Result<()> {
    let gate = RefreshGate::new();
    let leader = lead(&gate)?;
    let followers: Vec<Follower> = (0..5).map(|_| follow(&gate)).collect::<anyhow::Result<_>>()?;

    leader.settle(&Err(RefreshFailure::Rejected { status: 401, body: String::new() }));

    let mut sequences = Vec::new();
    // Await in reverse so the check does not depend on wake order.
    for f in followers.into_iter().rev() {
        let release = f.wait().await;
        assert!(release.outcome.is_err());
        sequences.push(release.sequence);
    }
    sequences.reverse();
    assert!(sequences.windows(2).all(|w| w[0] < w[1]), "sequences {sequences:?}");
    Ok(())
}

#[tokio::test]
async fn settle_starts_a_new_generation() -> anyhow::Result<()> {
    let gate = RefreshGate::new();
    let first = lead(&gate)?;
    let early = follow(&gate)?;
    first.settle(&Err(RefreshFailure::Abandoned));

    // A caller arriving after settle leads a fresh refresh and never sees the
    // previous outcome.
    let second = lead(&gate)?;
    let late = follow(&gate)?;
    assert_eq!(late.position, 1);
    second.settle(&Ok("acc-3".into()));

    assert_eq!(early.wait().await.outcome, Err(RefreshFailure::Abandoned));
    assert_eq!(late.wait().await.outcome, Ok("acc-3".to_owned()));
    Ok(())
}

#[tokio::test]
async fn dropped_leader_releases_followers_as_abandoned() -> anyhow::Result<()> {
    let gate = RefreshGate::new();
    let leader = lead(&gate)?;
    let follower = follow(&gate)?;

    drop(leader);

    assert!(!gate.is_refreshing());
    assert_eq!(follower.wait().await.outcome, Err(RefreshFailure::Abandoned));
    Ok(())
}

#[test]
fn settle_skips_followers_that_gave_up() -> anyhow::Result<()> {
    let gate = RefreshGate::new();
    let leader = lead(&gate)?;
    drop(follow(&gate)?);
    let _kept = follow(&gate)?;

    assert_eq!(leader.settle(&Ok("acc-2".into())), 2);
    assert!(!gate.is_refreshing());
    Ok(())
}

#[test]
fn unwatched_settle_releases_an_empty_gate() -> anyhow::Result<()> {
    let gate = RefreshGate::new();
    let leader = lead(&gate)?;

    assert!(leader.settle_unwatched().is_ok());
    assert!(!gate.is_refreshing());
    // The next caller starts its own refresh rather than joining a settled one.
    let _next = lead(&gate)?;
    Ok(())
}

#[tokio::test]
async fn unwatched_settle_hands_back_leadership_when_followers_wait() -> anyhow::Result<()> {
    let gate = RefreshGate::new();
    let leader = lead(&gate)?;
    let follower = follow(&gate)?;

    let leader = match leader.settle_unwatched() {
        Ok(()) => anyhow::bail!("settled with a follower queued"),
        Err(leader) => leader,
    };
    assert!(gate.is_refreshing());
    // Callers arriving now still join the same refresh.
    let late = follow(&gate)?;
    assert_eq!(late.position, 2);

    let failure = RefreshFailure::Rejected { status: 401, body: String::new() };
    assert_eq!(leader.settle(&Err(failure.clone())), 2);
    assert_eq!(follower.wait().await.outcome, Err(failure.clone()));
    assert_eq!(late.wait().await.outcome, Err(failure));
    Ok(())
}

//! Sync poller tests on a paused tokio clock
//!
//! The clock auto-advances whenever every task is asleep, so the fixed
//! poll delay costs no wall time.

mod common;

use arxiv_trends::{PollMode, SyncPoller, SyncState};
use common::{idle, syncing, unreachable, FakeApi};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

const INTERVAL: Duration = Duration::from_secs(2);

#[tokio::test(start_paused = true)]
async fn test_until_complete_follows_idle_syncing_idle() {
    let fake = Arc::new(FakeApi::arxiv().with_sync_script(vec![syncing(1, 5), idle()]));

    let handle = SyncPoller::new(fake.clone(), INTERVAL, PollMode::UntilComplete).spawn();
    assert_eq!(handle.state(), SyncState::Idle);

    let mut updates = handle.subscribe();
    updates.changed().await.unwrap();
    assert_eq!(
        *updates.borrow_and_update(),
        SyncState::Syncing {
            current: 1,
            total: 5,
            message: "Processing 1/5".to_string(),
        }
    );

    let tracker = handle.join().await.unwrap();
    assert_eq!(tracker.state(), &SyncState::Idle);
    assert_eq!(tracker.last_sync(), Some("2024-05-01T03:00:00"));
    assert_eq!(fake.sync_polls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_polls_are_spaced_by_the_interval() {
    let fake = Arc::new(FakeApi::arxiv().with_sync_script(vec![
        syncing(1, 4),
        syncing(2, 4),
        syncing(3, 4),
        idle(),
    ]));
    let start = Instant::now();

    let handle = SyncPoller::new(fake.clone(), INTERVAL, PollMode::UntilComplete).spawn();
    handle.join().await.unwrap();

    // Polls at 0s, 2s, 4s and 6s
    assert_eq!(fake.sync_polls.load(Ordering::SeqCst), 4);
    let elapsed = start.elapsed();
    assert!(
        elapsed >= INTERVAL * 3 && elapsed < INTERVAL * 4,
        "unexpected elapsed {:?}",
        elapsed
    );
}

#[tokio::test(start_paused = true)]
async fn test_failed_polls_keep_state_and_retry() {
    let fake = Arc::new(FakeApi::arxiv().with_sync_script(vec![
        syncing(2, 4),
        unreachable(),
        unreachable(),
        syncing(3, 4),
        idle(),
    ]));

    let handle = SyncPoller::new(fake.clone(), INTERVAL, PollMode::UntilComplete).spawn();
    let mut updates = handle.subscribe();

    updates.changed().await.unwrap();
    assert_eq!(updates.borrow_and_update().percent(), 50);

    // Both failures pass without a state change; next update is 3/4
    updates.changed().await.unwrap();
    assert_eq!(updates.borrow_and_update().percent(), 75);

    let tracker = handle.join().await.unwrap();
    assert_eq!(tracker.state(), &SyncState::Idle);
    assert_eq!(tracker.consecutive_failures(), 0);
    assert_eq!(fake.sync_polls.load(Ordering::SeqCst), 5);
}

#[tokio::test(start_paused = true)]
async fn test_gives_up_when_no_sync_starts() {
    let fake = Arc::new(FakeApi::arxiv());

    let handle = SyncPoller::new(fake.clone(), INTERVAL, PollMode::UntilComplete).spawn();
    let tracker = handle.join().await.unwrap();

    assert_eq!(tracker.state(), &SyncState::Idle);
    assert_eq!(fake.sync_polls.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_stops_further_polls() {
    let script = (1..=100).map(|i| syncing(i, 100)).collect();
    let fake = Arc::new(FakeApi::arxiv().with_sync_script(script));

    let handle = SyncPoller::new(fake.clone(), INTERVAL, PollMode::Continuous).spawn();

    tokio::time::sleep(Duration::from_millis(4_500)).await;
    assert_eq!(fake.sync_polls.load(Ordering::SeqCst), 3);
    assert_eq!(handle.state().percent(), 3);

    handle.cancel();
    assert!(handle.is_cancelled());
    tokio::time::sleep(INTERVAL * 10).await;
    assert_eq!(fake.sync_polls.load(Ordering::SeqCst), 3);

    let tracker = handle.join().await.unwrap();
    assert!(tracker.is_syncing());
}

#[tokio::test(start_paused = true)]
async fn test_dropping_handle_cancels() {
    let script = (1..=100).map(|i| syncing(i, 100)).collect();
    let fake = Arc::new(FakeApi::arxiv().with_sync_script(script));

    let handle = SyncPoller::new(fake.clone(), INTERVAL, PollMode::Continuous).spawn();
    tokio::time::sleep(Duration::from_millis(2_500)).await;
    drop(handle);

    tokio::time::sleep(INTERVAL * 10).await;
    assert_eq!(fake.sync_polls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_follow_delivers_final_state_before_returning() {
    let fake = Arc::new(FakeApi::arxiv().with_sync_script(vec![syncing(1, 2), idle()]));

    let handle = SyncPoller::new(fake.clone(), INTERVAL, PollMode::UntilComplete).spawn();
    let mut seen = Vec::new();
    let tracker = handle.follow(|state| seen.push(state.clone())).await.unwrap();

    assert_eq!(seen.first().map(|s| s.percent()), Some(50));
    assert_eq!(seen.last(), Some(&SyncState::Idle));
    assert_eq!(tracker.last_sync(), Some("2024-05-01T03:00:00"));
}

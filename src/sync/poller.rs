//! Fixed-delay sync status polling
//!
//! The next poll starts `interval` after the previous one finished, so polls
//! never overlap and a slow server stretches the cadence instead of stacking
//! requests. Poll failures are logged and retried after the same delay; they
//! never end the loop.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use arxiv_trends::api::HttpTrendsApi;
//! use arxiv_trends::config::TrendsConfig;
//! use arxiv_trends::sync::{PollMode, SyncPoller};
//! use std::sync::Arc;
//!
//! # async fn run() -> arxiv_trends::error::Result<()> {
//! let config = TrendsConfig::from_env();
//! let api = Arc::new(HttpTrendsApi::new(&config)?);
//! let handle = SyncPoller::new(api, config.poll_interval(), PollMode::Continuous).spawn();
//! println!("{}%", handle.state().percent());
//! handle.cancel();
//! # Ok(())
//! # }
//! ```

use super::tracker::{SyncProgressTracker, SyncState};
use crate::api::TrendsApi;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Idle polls `UntilComplete` tolerates before concluding no sync is running
const IDLE_POLLS_BEFORE_GIVING_UP: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollMode {
    /// Poll until cancelled
    Continuous,
    /// Stop after a running sync is seen to finish, or after a few idle
    /// polls if none ever starts
    UntilComplete,
}

pub struct SyncPoller {
    api: Arc<dyn TrendsApi>,
    interval: Duration,
    mode: PollMode,
}

impl SyncPoller {
    pub fn new(api: Arc<dyn TrendsApi>, interval: Duration, mode: PollMode) -> Self {
        Self { api, interval, mode }
    }

    /// Start polling on the current tokio runtime
    pub fn spawn(self) -> PollHandle {
        let cancel = CancellationToken::new();
        let (state_tx, state_rx) = watch::channel(SyncState::Idle);

        let task = tokio::spawn(poll_loop(
            self.api,
            self.interval,
            self.mode,
            cancel.clone(),
            state_tx,
        ));

        PollHandle {
            cancel,
            state_rx,
            task: Some(task),
        }
    }
}

/// Owner of a running poller
///
/// `cancel` (or dropping the handle) guarantees no further poll starts. A
/// poll already in flight is allowed to finish but its result is dropped.
pub struct PollHandle {
    cancel: CancellationToken,
    state_rx: watch::Receiver<SyncState>,
    task: Option<JoinHandle<SyncProgressTracker>>,
}

impl PollHandle {
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Latest published state
    pub fn state(&self) -> SyncState {
        self.state_rx.borrow().clone()
    }

    /// Receiver notified on every state change
    pub fn subscribe(&self) -> watch::Receiver<SyncState> {
        self.state_rx.clone()
    }

    /// Wait for the loop to stop and return its final tracker
    ///
    /// Returns `None` if the task panicked or was already joined.
    pub async fn join(mut self) -> Option<SyncProgressTracker> {
        let task = self.task.take()?;
        match task.await {
            Ok(tracker) => Some(tracker),
            Err(e) => {
                log::error!("Sync poller task failed: {}", e);
                None
            }
        }
    }
}

impl PollHandle {
    /// Call `on_change` for every published state until the loop stops, then
    /// return the final tracker
    ///
    /// Updates are delivered in order on the caller's task, and the state the
    /// loop published last is always delivered before this returns.
    pub async fn follow<F>(self, mut on_change: F) -> Option<SyncProgressTracker>
    where
        F: FnMut(&SyncState),
    {
        let mut updates = self.subscribe();
        let join = self.join();
        tokio::pin!(join);

        let tracker = loop {
            tokio::select! {
                biased;
                changed = updates.changed() => match changed {
                    Ok(()) => on_change(&updates.borrow_and_update()),
                    // Sender gone: the loop has stopped
                    Err(_) => break (&mut join).await,
                },
                tracker = &mut join => break tracker,
            }
        };

        // A value published right before the loop stopped may still be unseen
        while updates.changed().await.is_ok() {
            on_change(&updates.borrow_and_update());
        }
        tracker
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn poll_loop(
    api: Arc<dyn TrendsApi>,
    interval: Duration,
    mode: PollMode,
    cancel: CancellationToken,
    state_tx: watch::Sender<SyncState>,
) -> SyncProgressTracker {
    log::info!(
        "Starting sync poller (interval: {}ms, mode: {:?})",
        interval.as_millis(),
        mode
    );

    let mut tracker = SyncProgressTracker::new();
    let mut seen_syncing = false;
    let mut idle_polls = 0u32;

    loop {
        if cancel.is_cancelled() {
            break;
        }

        let result = api.sync_status().await;

        if cancel.is_cancelled() {
            log::debug!("Discarding sync status received after cancel");
            break;
        }

        match result {
            Ok(status) => {
                if tracker.apply(&status) {
                    state_tx.send_replace(tracker.state().clone());
                }

                if tracker.is_syncing() {
                    seen_syncing = true;
                } else if mode == PollMode::UntilComplete {
                    idle_polls += 1;
                    if seen_syncing {
                        break;
                    }
                    if idle_polls >= IDLE_POLLS_BEFORE_GIVING_UP {
                        log::info!("No sync running after {} polls", idle_polls);
                        break;
                    }
                }
            }
            Err(e) => tracker.record_failure(&e),
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(interval) => {}
        }
    }

    log::info!("Sync poller stopped");
    tracker
}

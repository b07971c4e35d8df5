//! Sync progress state machine

use crate::model::SyncStatus;

/// What the client believes the sync job is doing
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SyncState {
    #[default]
    Idle,
    Syncing {
        current: u64,
        total: u64,
        message: String,
    },
}

impl SyncState {
    pub fn is_syncing(&self) -> bool {
        matches!(self, SyncState::Syncing { .. })
    }

    /// Progress in whole percent; 0 when idle or when the total is unknown
    pub fn percent(&self) -> u64 {
        match self {
            SyncState::Idle => 0,
            SyncState::Syncing { current, total, .. } => progress_percent(*current, *total),
        }
    }
}

/// `round(100 * current / total)`, or 0 when `total` is 0
pub fn progress_percent(current: u64, total: u64) -> u64 {
    if total == 0 {
        return 0;
    }
    (100.0 * current as f64 / total as f64).round() as u64
}

/// Applies poll results to a `SyncState`
///
/// A successful poll replaces the state wholesale. A failed poll leaves it
/// untouched, so the last known progress stays visible.
#[derive(Debug, Clone, Default)]
pub struct SyncProgressTracker {
    state: SyncState,
    last_sync: Option<String>,
    consecutive_failures: u32,
}

impl SyncProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SyncState {
        &self.state
    }

    pub fn is_syncing(&self) -> bool {
        self.state.is_syncing()
    }

    /// Timestamp of the last completed sync, as reported by the server
    pub fn last_sync(&self) -> Option<&str> {
        self.last_sync.as_deref()
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// Apply a successful poll. Returns true if the state changed.
    pub fn apply(&mut self, status: &SyncStatus) -> bool {
        self.consecutive_failures = 0;
        if status.last_sync.is_some() {
            self.last_sync = status.last_sync.clone();
        }

        let next = if status.is_syncing {
            SyncState::Syncing {
                current: status.current,
                total: status.total,
                message: status.progress.clone(),
            }
        } else {
            SyncState::Idle
        };

        if next == self.state {
            return false;
        }

        match (&self.state, &next) {
            (SyncState::Idle, SyncState::Syncing { .. }) => log::info!("Sync started"),
            (SyncState::Syncing { .. }, SyncState::Idle) => log::info!("Sync finished"),
            _ => {}
        }
        self.state = next;
        true
    }

    /// Record a failed poll; the state is kept as-is
    pub fn record_failure(&mut self, error: &dyn std::fmt::Display) {
        self.consecutive_failures += 1;
        log::warn!(
            "Sync status poll failed ({} in a row): {}",
            self.consecutive_failures,
            error
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(is_syncing: bool, current: u64, total: u64) -> SyncStatus {
        SyncStatus {
            is_syncing,
            current,
            total,
            progress: if is_syncing {
                "Fetching cs 2023-01".to_string()
            } else {
                "Sync completed".to_string()
            },
            last_sync: None,
        }
    }

    #[test]
    fn test_percent() {
        assert_eq!(progress_percent(0, 0), 0);
        assert_eq!(progress_percent(7, 0), 0);
        assert_eq!(progress_percent(50, 200), 25);
        assert_eq!(progress_percent(1, 3), 33);
        assert_eq!(progress_percent(2, 3), 67);
        assert_eq!(progress_percent(5, 5), 100);
    }

    #[test]
    fn test_poll_sequence_drives_transitions() {
        let mut tracker = SyncProgressTracker::new();
        assert_eq!(tracker.state(), &SyncState::Idle);

        assert!(tracker.apply(&status(true, 1, 5)));
        assert_eq!(
            tracker.state(),
            &SyncState::Syncing {
                current: 1,
                total: 5,
                message: "Fetching cs 2023-01".to_string(),
            }
        );
        assert_eq!(tracker.state().percent(), 20);

        assert!(tracker.apply(&status(false, 0, 0)));
        assert_eq!(tracker.state(), &SyncState::Idle);
    }

    #[test]
    fn test_progress_updates_while_syncing() {
        let mut tracker = SyncProgressTracker::new();
        tracker.apply(&status(true, 1, 5));

        assert!(tracker.apply(&status(true, 3, 5)));
        assert_eq!(tracker.state().percent(), 60);

        // Same report again is not a change
        assert!(!tracker.apply(&status(true, 3, 5)));
    }

    #[test]
    fn test_failure_keeps_stale_state() {
        let mut tracker = SyncProgressTracker::new();
        tracker.apply(&status(true, 2, 4));

        tracker.record_failure(&"connection refused");
        tracker.record_failure(&"connection refused");

        assert_eq!(tracker.consecutive_failures(), 2);
        assert_eq!(tracker.state().percent(), 50);

        tracker.apply(&status(true, 3, 4));
        assert_eq!(tracker.consecutive_failures(), 0);
    }

    #[test]
    fn test_last_sync_survives_polls_without_it() {
        let mut tracker = SyncProgressTracker::new();
        let mut done = status(false, 0, 0);
        done.last_sync = Some("2024-03-01T02:00:00".to_string());

        tracker.apply(&done);
        tracker.apply(&status(true, 1, 2));

        assert_eq!(tracker.last_sync(), Some("2024-03-01T02:00:00"));
    }
}

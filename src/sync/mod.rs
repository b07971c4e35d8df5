//! Client-side view of the server's background sync job
//!
//! - `tracker` - the `Idle` / `Syncing` state machine fed by status polls
//! - `poller` - fixed-delay polling task with an explicit cancel handle

pub mod poller;
pub mod tracker;

pub use poller::{PollHandle, PollMode, SyncPoller};
pub use tracker::{progress_percent, SyncProgressTracker, SyncState};

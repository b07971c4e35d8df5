//! arXiv trends engine
//!
//! Client-side core of the arXiv publication-trends dashboard:
//!
//! ```text
//! TrendsApi (REST) → CategoryCatalog
//!     ↓
//! per-category series / stats (concurrent fan-out)
//!     ↓
//! ranker (top-K, tiers) → aligner (date-union table)
//!     ↓
//! presentation (chart / table shapes)
//! ```
//!
//! The background sync job is tracked separately by `sync`, which polls the
//! status endpoint on a fixed delay until cancelled.

pub mod aligner;
pub mod api;
pub mod catalog;
pub mod config;
pub mod error;
pub mod model;
pub mod presentation;
pub mod ranker;
pub mod session;
pub mod sync;

pub use aligner::{align, AlignedRow, AlignedTable};
pub use api::{HttpTrendsApi, TrendsApi};
pub use catalog::CategoryCatalog;
pub use config::TrendsConfig;
pub use error::{Result, TrendsError};
pub use model::{
    Category, CategoryGroup, CategoryStats, HypeEntry, MonthlyPoint, Selection, SyncKind,
    SyncStatus, TimeSeries, TrendDirection,
};
pub use ranker::{classify_tier, filter_by_parent, rank, RankDirection, TierBands};
pub use session::{ComparisonView, DashboardSession, SelectionGuard, SelectionTicket};
pub use sync::{PollHandle, PollMode, SyncPoller, SyncProgressTracker, SyncState};

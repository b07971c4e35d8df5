//! Wire and domain types shared across the engine
//!
//! Field names follow the trends API JSON bodies (snake_case). Types that the
//! API never sends in full (`CategoryStats::category_id` from the per-category
//! stats endpoint) default on deserialization and are filled in by the client.

use crate::error::{Result, TrendsError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Display prefix used by selectors for "all subcategories of a parent".
pub const PARENT_PREFIX: &str = "parent:";

/// A single category in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(rename = "parent_category", default)]
    pub parent_id: Option<String>,
}

/// A parent category with its ordered subcategories, as served by `GET /categories`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryGroup {
    pub id: String,
    pub name: String,
    pub subcategories: Vec<Category>,
}

/// Publication count for one calendar month
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyPoint {
    pub year: i32,
    pub month: u32,
    pub count: u64,
}

impl MonthlyPoint {
    pub fn new(year: i32, month: u32, count: u64) -> Self {
        Self { year, month, count }
    }

    /// Zero-padded `YYYY-MM` key. Lexicographic order equals chronological order.
    pub fn date_key(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }
}

/// Ordered monthly series for one category; gaps are allowed.
pub type TimeSeries = Vec<MonthlyPoint>;

/// Discrete trend tier derived from the hype score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Surging,
    Rising,
    Growing,
    Stable,
    Cooling,
    Declining,
    /// Sent by the producer for categories without data.
    #[serde(other)]
    Unknown,
}

impl TrendDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendDirection::Surging => "surging",
            TrendDirection::Rising => "rising",
            TrendDirection::Growing => "growing",
            TrendDirection::Stable => "stable",
            TrendDirection::Cooling => "cooling",
            TrendDirection::Declining => "declining",
            TrendDirection::Unknown => "unknown",
        }
    }

    pub fn is_upward(&self) -> bool {
        matches!(
            self,
            TrendDirection::Surging | TrendDirection::Rising | TrendDirection::Growing
        )
    }

    pub fn is_downward(&self) -> bool {
        matches!(self, TrendDirection::Cooling | TrendDirection::Declining)
    }
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-category statistics computed by the upstream producer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryStats {
    #[serde(default)]
    pub category_id: String,
    pub category_name: String,
    pub total_papers: u64,
    pub average_monthly: f64,
    pub hype_score: f64,
    pub trend_direction: TrendDirection,
    #[serde(default)]
    pub recent_growth_percent: f64,
}

/// Row of the server-ranked `/hype` and `/declining` listings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HypeEntry {
    pub category_id: String,
    pub category_name: String,
    pub hype_score: f64,
    pub trend_direction: TrendDirection,
}

impl From<CategoryStats> for HypeEntry {
    fn from(stats: CategoryStats) -> Self {
        Self {
            category_id: stats.category_id,
            category_name: stats.category_name,
            hype_score: stats.hype_score,
            trend_direction: stats.trend_direction,
        }
    }
}

/// Anything the ranker can order by hype score.
pub trait Scored {
    fn category_id(&self) -> &str;
    fn hype_score(&self) -> f64;
}

impl Scored for CategoryStats {
    fn category_id(&self) -> &str {
        &self.category_id
    }

    fn hype_score(&self) -> f64 {
        self.hype_score
    }
}

impl Scored for HypeEntry {
    fn category_id(&self) -> &str {
        &self.category_id
    }

    fn hype_score(&self) -> f64 {
        self.hype_score
    }
}

/// Body of `GET /sync/status`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncStatus {
    pub is_syncing: bool,
    #[serde(default)]
    pub current: u64,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub progress: String,
    #[serde(default)]
    pub last_sync: Option<String>,
}

/// Kind of sync the server should run when triggered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncKind {
    #[default]
    Quick,
    Full,
}

impl SyncKind {
    pub fn is_full(&self) -> bool {
        matches!(self, SyncKind::Full)
    }
}

/// Body of `POST /sync`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncTriggered {
    pub message: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Body of `GET /health`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

/// What the user picked in a category selector
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selection {
    Leaf(String),
    ParentGroup(String),
}

impl Selection {
    /// Parse the selector convention: `parent:<id>` selects every leaf under a
    /// parent, anything else is a single leaf id.
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        match raw.strip_prefix(PARENT_PREFIX) {
            Some(parent) if !parent.is_empty() => Ok(Selection::ParentGroup(parent.to_string())),
            Some(_) => Err(TrendsError::InvalidArgument(format!(
                "parent selection without an id: {:?}",
                raw
            ))),
            None if raw.is_empty() => {
                Err(TrendsError::InvalidArgument("empty selection".to_string()))
            }
            None => Ok(Selection::Leaf(raw.to_string())),
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Selection::Leaf(id) | Selection::ParentGroup(id) => id,
        }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selection::Leaf(id) => f.write_str(id),
            Selection::ParentGroup(id) => write!(f, "{}{}", PARENT_PREFIX, id),
        }
    }
}

//! In-memory trends API shared by the integration tests

#![allow(dead_code)]

use arxiv_trends::error::{Result, TrendsError};
use arxiv_trends::model::{
    Category, CategoryGroup, CategoryStats, HealthStatus, HypeEntry, MonthlyPoint, SyncKind,
    SyncStatus, SyncTriggered, TimeSeries, TrendDirection,
};
use arxiv_trends::TrendsApi;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Default)]
pub struct FakeApi {
    pub groups: Vec<CategoryGroup>,
    pub series: HashMap<String, TimeSeries>,
    pub stats: HashMap<String, CategoryStats>,
    /// Category ids whose series request fails
    pub failing: HashSet<String>,
    /// Simulated latency of every series request
    pub latency: Duration,
    /// Sync status responses, consumed in order; idle once exhausted
    pub sync_script: Mutex<VecDeque<Result<SyncStatus>>>,
    pub sync_running: bool,

    pub sync_polls: AtomicUsize,
    pub trend_calls: AtomicUsize,
    pub in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

pub fn p(year: i32, month: u32, count: u64) -> MonthlyPoint {
    MonthlyPoint::new(year, month, count)
}

pub fn stats(id: &str, hype_score: f64) -> CategoryStats {
    CategoryStats {
        category_id: id.to_string(),
        category_name: format!("{} name", id),
        total_papers: 100,
        average_monthly: 10.0,
        hype_score,
        trend_direction: TrendDirection::Unknown,
        recent_growth_percent: 0.0,
    }
}

pub fn syncing(current: u64, total: u64) -> Result<SyncStatus> {
    Ok(SyncStatus {
        is_syncing: true,
        current,
        total,
        progress: format!("Processing {}/{}", current, total),
        last_sync: None,
    })
}

pub fn idle() -> Result<SyncStatus> {
    Ok(SyncStatus {
        is_syncing: false,
        current: 0,
        total: 0,
        progress: "Sync completed".to_string(),
        last_sync: Some("2024-05-01T03:00:00".to_string()),
    })
}

pub fn unreachable() -> Result<SyncStatus> {
    Err(TrendsError::fetch("/sync/status", "connection refused"))
}

impl FakeApi {
    /// Two parents: `cs` with four leaves and `math` with one
    pub fn arxiv() -> Self {
        let leaf = |id: &str| Category {
            id: id.to_string(),
            name: format!("{} name", id),
            parent_id: None,
        };
        let groups = vec![
            CategoryGroup {
                id: "cs".to_string(),
                name: "Computer Science".to_string(),
                subcategories: vec![leaf("cs.AI"), leaf("cs.CL"), leaf("cs.LG"), leaf("cs.RO")],
            },
            CategoryGroup {
                id: "math".to_string(),
                name: "Mathematics".to_string(),
                subcategories: vec![leaf("math.CO")],
            },
        ];

        let mut series = HashMap::new();
        series.insert("cs.AI".to_string(), vec![p(2023, 1, 10), p(2023, 3, 12)]);
        series.insert("cs.CL".to_string(), vec![p(2023, 2, 5)]);
        series.insert("cs.LG".to_string(), vec![p(2023, 1, 40), p(2023, 2, 44), p(2023, 3, 50)]);
        series.insert("cs.RO".to_string(), vec![]);
        series.insert("math.CO".to_string(), vec![p(2022, 12, 7)]);

        let mut all_stats = HashMap::new();
        for (id, score) in [
            ("cs.AI", 62.0),
            ("cs.CL", 25.0),
            ("cs.LG", 62.0),
            ("cs.RO", -8.0),
            ("math.CO", -30.0),
        ] {
            all_stats.insert(id.to_string(), stats(id, score));
        }

        Self {
            groups,
            series,
            stats: all_stats,
            ..Self::default()
        }
    }

    pub fn with_sync_script(self, script: Vec<Result<SyncStatus>>) -> Self {
        *self.sync_script.lock().unwrap() = script.into();
        self
    }

    fn leaf_ids(&self, parent: Option<&str>) -> Vec<String> {
        self.groups
            .iter()
            .filter(|g| parent.map_or(true, |p| g.id == p))
            .flat_map(|g| g.subcategories.iter().map(|c| c.id.clone()))
            .collect()
    }

    fn listing(&self, limit: usize, parent: Option<&str>, descending: bool) -> Vec<HypeEntry> {
        let mut entries: Vec<HypeEntry> = self
            .leaf_ids(parent)
            .iter()
            .filter_map(|id| self.stats.get(id).cloned())
            .map(HypeEntry::from)
            .collect();
        entries.sort_by(|a, b| a.hype_score.partial_cmp(&b.hype_score).unwrap());
        if descending {
            entries.reverse();
        }
        entries.truncate(limit);
        entries
    }
}

#[async_trait]
impl TrendsApi for FakeApi {
    async fn categories(&self) -> Result<Vec<CategoryGroup>> {
        Ok(self.groups.clone())
    }

    async fn trends(&self, category_id: &str) -> Result<TimeSeries> {
        self.trend_calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing.contains(category_id) {
            return Err(TrendsError::fetch(
                format!("/trends/{}", category_id),
                "API error: 500 Internal Server Error",
            ));
        }
        Ok(self.series.get(category_id).cloned().unwrap_or_default())
    }

    async fn trend_stats(&self, category_id: &str) -> Result<CategoryStats> {
        self.stats
            .get(category_id)
            .cloned()
            .ok_or_else(|| TrendsError::NotFound(format!("/trends/{}/stats", category_id)))
    }

    async fn hype(&self, limit: usize, parent: Option<&str>) -> Result<Vec<HypeEntry>> {
        Ok(self.listing(limit, parent, true))
    }

    async fn declining(&self, limit: usize, parent: Option<&str>) -> Result<Vec<HypeEntry>> {
        Ok(self.listing(limit, parent, false))
    }

    async fn parent_stats(&self, parent_id: &str) -> Result<Vec<CategoryStats>> {
        if !self.groups.iter().any(|g| g.id == parent_id) {
            return Err(TrendsError::NotFound(format!("/parent/{}/stats", parent_id)));
        }
        Ok(self
            .leaf_ids(Some(parent_id))
            .iter()
            .filter_map(|id| self.stats.get(id).cloned())
            .collect())
    }

    async fn sync_status(&self) -> Result<SyncStatus> {
        self.sync_polls.fetch_add(1, Ordering::SeqCst);
        self.sync_script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(idle)
    }

    async fn trigger_sync(&self, kind: SyncKind) -> Result<SyncTriggered> {
        if self.sync_running {
            return Err(TrendsError::SyncInProgress);
        }
        Ok(SyncTriggered {
            message: "Sync started".to_string(),
            kind: if kind.is_full() { "full" } else { "quick" }.to_string(),
        })
    }

    async fn health(&self) -> Result<HealthStatus> {
        Ok(HealthStatus {
            status: "healthy".to_string(),
        })
    }
}

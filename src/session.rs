//! Dashboard session: catalog + API + per-selection views
//!
//! A session owns the loaded catalog and hands out derived views. Nothing
//! derived is cached; every call recomputes from fresh fetches.
//!
//! Selections change while fetches are in flight. `select` stamps a
//! `SelectionTicket`; `load` only returns a view if its ticket is still the
//! current selection when the fetches complete, otherwise `Ok(None)`.

use crate::aligner::{self, AlignedTable};
use crate::api::TrendsApi;
use crate::catalog::CategoryCatalog;
use crate::config::TrendsConfig;
use crate::error::{Result, TrendsError};
use crate::model::{CategoryStats, HypeEntry, Selection};
use crate::ranker::{self, RankDirection, TierBands};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Proof of which selection a request was made for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionTicket {
    generation: u64,
    selection: Selection,
}

impl SelectionTicket {
    pub fn selection(&self) -> &Selection {
        &self.selection
    }
}

/// Tracks the current selection for stale-response checks
#[derive(Debug, Default)]
pub struct SelectionGuard {
    generation: AtomicU64,
    current: Mutex<Option<SelectionTicket>>,
}

impl SelectionGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `selection` current and return its ticket
    pub fn begin(&self, selection: Selection) -> SelectionTicket {
        let ticket = SelectionTicket {
            generation: self.generation.fetch_add(1, Ordering::SeqCst) + 1,
            selection,
        };
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        *current = Some(ticket.clone());
        ticket
    }

    /// Drop the current selection (view torn down)
    pub fn clear(&self) {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        *current = None;
    }

    pub fn is_current(&self, ticket: &SelectionTicket) -> bool {
        let current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        current.as_ref() == Some(ticket)
    }
}

/// Everything needed to draw one selection
#[derive(Debug, Clone)]
pub struct ComparisonView {
    pub selection: Selection,
    /// Stats for the compared categories, in table column order
    pub stats: Vec<CategoryStats>,
    pub table: AlignedTable,
}

pub struct DashboardSession {
    api: Arc<dyn TrendsApi>,
    catalog: CategoryCatalog,
    bands: TierBands,
    top_k: usize,
    guard: SelectionGuard,
}

impl DashboardSession {
    /// Load the catalog and open a session
    pub async fn open(api: Arc<dyn TrendsApi>, config: &TrendsConfig) -> Result<Self> {
        let bands = config.tier_bands()?;
        if config.top_k == 0 {
            return Err(TrendsError::Config("TRENDS_TOP_K must be at least 1".to_string()));
        }
        let catalog = CategoryCatalog::load(api.as_ref()).await?;

        Ok(Self {
            api,
            catalog,
            bands,
            top_k: config.top_k,
            guard: SelectionGuard::new(),
        })
    }

    pub fn catalog(&self) -> &CategoryCatalog {
        &self.catalog
    }

    pub fn api(&self) -> &Arc<dyn TrendsApi> {
        &self.api
    }

    pub fn bands(&self) -> &TierBands {
        &self.bands
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Reload the catalog; the old one stays in place if the fetch fails
    pub async fn refresh_catalog(&mut self) -> Result<()> {
        self.catalog = CategoryCatalog::load(self.api.as_ref()).await?;
        Ok(())
    }

    pub fn select(&self, selection: Selection) -> SelectionTicket {
        log::debug!("Selected {}", selection);
        self.guard.begin(selection)
    }

    pub fn deselect(&self) {
        self.guard.clear();
    }

    pub fn is_current(&self, ticket: &SelectionTicket) -> bool {
        self.guard.is_current(ticket)
    }

    /// Build the view for a ticket, discarding it if the selection moved on
    pub async fn load(&self, ticket: &SelectionTicket) -> Result<Option<ComparisonView>> {
        let result = self.comparison(ticket.selection(), self.top_k).await;

        // Failures are results too; a superseded ticket reports neither
        if !self.guard.is_current(ticket) {
            log::debug!("Discarding stale response for {}", ticket.selection());
            return Ok(None);
        }
        result.map(Some)
    }

    /// Aligned series plus stats for a selection
    ///
    /// A leaf fetches its series and stats together. A parent group ranks its
    /// subcategories by hype score and compares the top `limit`.
    pub async fn comparison(&self, selection: &Selection, limit: usize) -> Result<ComparisonView> {
        let (stats, series) = match selection {
            Selection::Leaf(id) => {
                self.catalog.resolve(selection)?;
                let ids = vec![id.clone()];
                let (series, stats) = tokio::try_join!(
                    aligner::fetch_series(self.api.as_ref(), &ids),
                    self.api.trend_stats(id),
                )?;
                (vec![stats], series)
            }
            Selection::ParentGroup(parent_id) => {
                let stats = self.parent_ranking(parent_id, RankDirection::Hottest, limit).await?;
                let ids: Vec<String> = stats.iter().map(|s| s.category_id.clone()).collect();
                let series = aligner::fetch_series(self.api.as_ref(), &ids).await?;
                (stats, series)
            }
        };

        let table = aligner::align(&series)?;
        log::debug!(
            "{}: {} series over {} months",
            selection,
            table.series_ids.len(),
            table.len()
        );

        Ok(ComparisonView {
            selection: selection.clone(),
            stats,
            table,
        })
    }

    /// Stats for one parent's subcategories, ranked locally
    pub async fn parent_ranking(
        &self,
        parent_id: &str,
        direction: RankDirection,
        limit: usize,
    ) -> Result<Vec<CategoryStats>> {
        // Unknown parents fail here, before any request goes out
        self.catalog.subcategories(parent_id)?;

        let stats = self.api.parent_stats(parent_id).await?;
        let members = ranker::filter_by_parent(&stats, &self.catalog, parent_id)?;
        let members = ranker::retier(&members, &self.bands);
        ranker::rank(&members, limit, direction)
    }

    /// Top or bottom categories, ranked by the server
    pub async fn leaderboard(
        &self,
        direction: RankDirection,
        limit: usize,
        parent: Option<&str>,
    ) -> Result<Vec<HypeEntry>> {
        if limit == 0 {
            return Err(TrendsError::InvalidArgument(
                "rank limit must be at least 1".to_string(),
            ));
        }
        if let Some(parent_id) = parent {
            self.catalog.subcategories(parent_id)?;
        }

        match direction {
            RankDirection::Hottest => self.api.hype(limit, parent).await,
            RankDirection::Cooling => self.api.declining(limit, parent).await,
        }
    }

    /// Same listing as `leaderboard`, ranked here from per-parent stats
    ///
    /// Fetches every parent's stats concurrently (or just one parent's),
    /// re-tiers them with the configured bands, then ranks.
    pub async fn local_leaderboard(
        &self,
        direction: RankDirection,
        limit: usize,
        parent: Option<&str>,
    ) -> Result<Vec<HypeEntry>> {
        let parents: Vec<&str> = match parent {
            Some(parent_id) => {
                self.catalog.subcategories(parent_id)?;
                vec![parent_id]
            }
            None => self.catalog.groups().iter().map(|g| g.id.as_str()).collect(),
        };

        let api = self.api.as_ref();
        let fetches = parents.iter().map(|&parent_id| async move {
            api.parent_stats(parent_id).await.map_err(|e| match e {
                TrendsError::Fetch { .. } => e,
                other => TrendsError::fetch(format!("/parent/{}/stats", parent_id), other),
            })
        });
        let per_parent = futures::future::try_join_all(fetches).await?;

        let all: Vec<CategoryStats> = per_parent
            .into_iter()
            .flatten()
            .filter(|s| s.total_papers > 0)
            .collect();
        let retiered = ranker::retier(&all, &self.bands);

        Ok(ranker::rank(&retiered, limit, direction)?
            .into_iter()
            .map(HypeEntry::from)
            .collect())
    }

    pub async fn stats(&self, category_id: &str) -> Result<CategoryStats> {
        if self.catalog.leaf(category_id).is_none() {
            return Err(TrendsError::NotFound(format!("category {}", category_id)));
        }
        self.api.trend_stats(category_id).await
    }
}

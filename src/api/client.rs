//! HTTP client for the trends API
//!
//! ## Endpoints
//!
//! - `GET /categories` - category groups with subcategories
//! - `GET /trends/{id}` - monthly publication counts
//! - `GET /trends/{id}/stats` - precomputed per-category statistics
//! - `GET /hype`, `GET /declining` - server-ranked listings (`limit`, `parent`)
//! - `GET /parent/{id}/stats` - stats for every subcategory of a parent
//! - `GET /sync/status`, `POST /sync` - background sync job
//! - `GET /health`
//!
//! ## Usage
//!
//! ```rust,no_run
//! use arxiv_trends::api::{HttpTrendsApi, TrendsApi};
//! use arxiv_trends::config::TrendsConfig;
//!
//! # async fn run() -> arxiv_trends::error::Result<()> {
//! let api = HttpTrendsApi::new(&TrendsConfig::from_env())?;
//! let series = api.trends("cs.AI").await?;
//! println!("{} months", series.len());
//! # Ok(())
//! # }
//! ```

use crate::config::TrendsConfig;
use crate::error::{Result, TrendsError};
use crate::model::{
    CategoryGroup, CategoryStats, HealthStatus, HypeEntry, SyncKind, SyncStatus, SyncTriggered,
    TimeSeries,
};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

/// Operations the engine needs from the trends service
#[async_trait]
pub trait TrendsApi: Send + Sync {
    async fn categories(&self) -> Result<Vec<CategoryGroup>>;

    async fn trends(&self, category_id: &str) -> Result<TimeSeries>;

    async fn trend_stats(&self, category_id: &str) -> Result<CategoryStats>;

    /// Hottest categories first, as ranked by the server
    async fn hype(&self, limit: usize, parent: Option<&str>) -> Result<Vec<HypeEntry>>;

    /// Most declining categories first, as ranked by the server
    async fn declining(&self, limit: usize, parent: Option<&str>) -> Result<Vec<HypeEntry>>;

    async fn parent_stats(&self, parent_id: &str) -> Result<Vec<CategoryStats>>;

    async fn sync_status(&self) -> Result<SyncStatus>;

    /// Ask the server to start a sync. Fails with `SyncInProgress` if one is running.
    async fn trigger_sync(&self, kind: SyncKind) -> Result<SyncTriggered>;

    async fn health(&self) -> Result<HealthStatus>;
}

/// reqwest-backed `TrendsApi`
#[derive(Debug, Clone)]
pub struct HttpTrendsApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTrendsApi {
    pub fn new(config: &TrendsConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| TrendsError::Config(format!("HTTP client: {}", e)))?;

        Ok(Self::with_client(client, &config.api_url))
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        log::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| TrendsError::fetch(path, e))?;

        match response.status() {
            status if status.is_success() => response
                .json::<T>()
                .await
                .map_err(|e| TrendsError::fetch(path, format!("invalid body: {}", e))),
            StatusCode::NOT_FOUND => Err(TrendsError::NotFound(path.to_string())),
            status => Err(TrendsError::fetch(path, format!("API error: {}", status))),
        }
    }
}

fn listing_query(limit: usize, parent: Option<&str>) -> Vec<(&'static str, String)> {
    let mut query = vec![("limit", limit.to_string())];
    if let Some(parent) = parent {
        query.push(("parent", parent.to_string()));
    }
    query
}

#[async_trait]
impl TrendsApi for HttpTrendsApi {
    async fn categories(&self) -> Result<Vec<CategoryGroup>> {
        self.get_json("/categories", &[]).await
    }

    async fn trends(&self, category_id: &str) -> Result<TimeSeries> {
        self.get_json(&format!("/trends/{}", category_id), &[]).await
    }

    async fn trend_stats(&self, category_id: &str) -> Result<CategoryStats> {
        let mut stats: CategoryStats = self
            .get_json(&format!("/trends/{}/stats", category_id), &[])
            .await?;
        if stats.category_id.is_empty() {
            stats.category_id = category_id.to_string();
        }
        Ok(stats)
    }

    async fn hype(&self, limit: usize, parent: Option<&str>) -> Result<Vec<HypeEntry>> {
        self.get_json("/hype", &listing_query(limit, parent)).await
    }

    async fn declining(&self, limit: usize, parent: Option<&str>) -> Result<Vec<HypeEntry>> {
        self.get_json("/declining", &listing_query(limit, parent)).await
    }

    async fn parent_stats(&self, parent_id: &str) -> Result<Vec<CategoryStats>> {
        self.get_json(&format!("/parent/{}/stats", parent_id), &[]).await
    }

    async fn sync_status(&self) -> Result<SyncStatus> {
        self.get_json("/sync/status", &[]).await
    }

    async fn trigger_sync(&self, kind: SyncKind) -> Result<SyncTriggered> {
        let path = "/sync";
        let url = format!("{}{}", self.base_url, path);
        log::debug!("POST {} (full={})", url, kind.is_full());

        let response = self
            .client
            .post(&url)
            .query(&[("full", kind.is_full())])
            .send()
            .await
            .map_err(|e| TrendsError::fetch(path, e))?;

        match response.status() {
            status if status.is_success() => response
                .json::<SyncTriggered>()
                .await
                .map_err(|e| TrendsError::fetch(path, format!("invalid body: {}", e))),
            StatusCode::CONFLICT => Err(TrendsError::SyncInProgress),
            status => Err(TrendsError::fetch(path, format!("API error: {}", status))),
        }
    }

    async fn health(&self) -> Result<HealthStatus> {
        self.get_json("/health", &[]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_is_normalized() {
        let api = HttpTrendsApi::with_client(reqwest::Client::new(), "http://localhost:8000/api/");
        assert_eq!(api.base_url(), "http://localhost:8000/api");
    }

    #[test]
    fn test_listing_query_includes_parent_only_when_set() {
        assert_eq!(listing_query(5, None), vec![("limit", "5".to_string())]);
        assert_eq!(
            listing_query(3, Some("cs")),
            vec![("limit", "3".to_string()), ("parent", "cs".to_string())]
        );
    }

    #[tokio::test]
    async fn test_unreachable_server_is_fetch_error() {
        // Port 9 (discard) on localhost is not expected to serve HTTP
        let api = HttpTrendsApi::with_client(reqwest::Client::new(), "http://127.0.0.1:9/api");
        let err = api.categories().await.unwrap_err();
        assert!(err.is_fetch(), "expected fetch error, got {}", err);
    }

    #[tokio::test]
    #[ignore] // Run only against a live trends API
    async fn test_live_categories() {
        let api = HttpTrendsApi::new(&TrendsConfig::from_env()).unwrap();
        let groups = api.categories().await.unwrap();
        assert!(!groups.is_empty());
    }
}

//! Client configuration from environment variables

use crate::error::Result;
use crate::ranker::TierBands;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Configuration for the trends client
///
/// Loaded from environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct TrendsConfig {
    /// Base URL of the trends API, without a trailing slash
    pub api_url: String,

    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,

    /// Delay between the end of one sync poll and the start of the next
    pub poll_interval_ms: u64,

    /// Default top-K bound for rankings and parent comparisons
    pub top_k: usize,

    pub tier_surging: f64,
    pub tier_rising: f64,
    pub tier_growing: f64,
    pub tier_cooling: f64,
    pub tier_declining: f64,
}

impl Default for TrendsConfig {
    fn default() -> Self {
        let bands = TierBands::default();
        Self {
            api_url: "http://localhost:8000/api".to_string(),
            request_timeout_secs: 10,
            poll_interval_ms: 2_000,
            top_k: 10,
            tier_surging: bands.surging,
            tier_rising: bands.rising,
            tier_growing: bands.growing,
            tier_cooling: bands.cooling,
            tier_declining: bands.declining,
        }
    }
}

impl TrendsConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - `TRENDS_API_URL` (default: http://localhost:8000/api)
    /// - `TRENDS_REQUEST_TIMEOUT_SECS` (default: 10)
    /// - `SYNC_POLL_INTERVAL_MS` (default: 2000)
    /// - `TRENDS_TOP_K` (default: 10)
    /// - `TIER_SURGING`, `TIER_RISING`, `TIER_GROWING`, `TIER_COOLING`,
    ///   `TIER_DECLINING` (defaults: 50, 20, 5, -5, -20)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            api_url: env::var("TRENDS_API_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_url),
            request_timeout_secs: parse_var("TRENDS_REQUEST_TIMEOUT_SECS", defaults.request_timeout_secs),
            poll_interval_ms: parse_var("SYNC_POLL_INTERVAL_MS", defaults.poll_interval_ms),
            top_k: parse_var("TRENDS_TOP_K", defaults.top_k),
            tier_surging: parse_var("TIER_SURGING", defaults.tier_surging),
            tier_rising: parse_var("TIER_RISING", defaults.tier_rising),
            tier_growing: parse_var("TIER_GROWING", defaults.tier_growing),
            tier_cooling: parse_var("TIER_COOLING", defaults.tier_cooling),
            tier_declining: parse_var("TIER_DECLINING", defaults.tier_declining),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Tier cut-points, validated for ordering
    pub fn tier_bands(&self) -> Result<TierBands> {
        TierBands::new(
            self.tier_surging,
            self.tier_rising,
            self.tier_growing,
            self.tier_cooling,
            self.tier_declining,
        )
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                log::warn!("Ignoring unparseable {}={:?}, using default", name, raw);
                default
            }
        },
        Err(_) => default,
    }
}

//! Hype ranking and trend-tier classification
//!
//! Everything here is a pure function over the stats it is handed. Ranking
//! never caches; callers re-rank whenever the input changes.

use crate::catalog::CategoryCatalog;
use crate::error::{Result, TrendsError};
use crate::model::{CategoryStats, Scored, TrendDirection};
use std::cmp::Ordering;
use std::collections::HashSet;

/// Which end of the hype scale to rank from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankDirection {
    /// Highest hype score first
    Hottest,
    /// Lowest hype score first
    Cooling,
}

impl RankDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            RankDirection::Hottest => "hottest",
            RankDirection::Cooling => "cooling",
        }
    }
}

/// Tier cut-points, in hype-score percent
///
/// These belong to the stats producer; the defaults mirror the bands it
/// uses so locally computed tiers agree with the server's labels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierBands {
    pub surging: f64,
    pub rising: f64,
    pub growing: f64,
    pub cooling: f64,
    pub declining: f64,
}

impl Default for TierBands {
    fn default() -> Self {
        Self {
            surging: 50.0,
            rising: 20.0,
            growing: 5.0,
            cooling: -5.0,
            declining: -20.0,
        }
    }
}

impl TierBands {
    /// Build bands, requiring `declining <= cooling <= growing <= rising <= surging`
    pub fn new(surging: f64, rising: f64, growing: f64, cooling: f64, declining: f64) -> Result<Self> {
        let ordered = [declining, cooling, growing, rising, surging];
        if ordered.iter().any(|v| !v.is_finite()) {
            return Err(TrendsError::InvalidArgument(
                "tier bands must be finite".to_string(),
            ));
        }
        if ordered.windows(2).any(|w| w[0] > w[1]) {
            return Err(TrendsError::InvalidArgument(format!(
                "tier bands out of order: declining={} cooling={} growing={} rising={} surging={}",
                declining, cooling, growing, rising, surging
            )));
        }

        Ok(Self {
            surging,
            rising,
            growing,
            cooling,
            declining,
        })
    }

    pub fn with_defaults() -> Self {
        Self::default()
    }
}

/// Map a hype score onto a trend tier
///
/// Upward tiers use strict `>`, downward tiers strict `<`; a score sitting
/// exactly on a cut-point falls toward `stable`. NaN is `stable`.
pub fn classify_tier(hype_score: f64, bands: &TierBands) -> TrendDirection {
    if hype_score > bands.surging {
        TrendDirection::Surging
    } else if hype_score > bands.rising {
        TrendDirection::Rising
    } else if hype_score > bands.growing {
        TrendDirection::Growing
    } else if hype_score < bands.declining {
        TrendDirection::Declining
    } else if hype_score < bands.cooling {
        TrendDirection::Cooling
    } else {
        TrendDirection::Stable
    }
}

fn compare_scores(a: f64, b: f64, direction: RankDirection) -> Ordering {
    // NaN sorts last either way
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => {
            let ord = a.partial_cmp(&b).unwrap_or(Ordering::Equal);
            match direction {
                RankDirection::Hottest => ord.reverse(),
                RankDirection::Cooling => ord,
            }
        }
    }
}

/// Top `k` entries by hype score
///
/// The sort is stable: equal scores keep their input order. Empty input gives
/// an empty ranking; `k == 0` is rejected.
pub fn rank<T: Scored + Clone>(stats: &[T], k: usize, direction: RankDirection) -> Result<Vec<T>> {
    if k == 0 {
        return Err(TrendsError::InvalidArgument(
            "rank limit must be at least 1".to_string(),
        ));
    }

    let mut ranked = stats.to_vec();
    ranked.sort_by(|a, b| compare_scores(a.hype_score(), b.hype_score(), direction));
    ranked.truncate(k);
    Ok(ranked)
}

/// Entries belonging to one parent's subcategories, in input order
pub fn filter_by_parent<T: Scored + Clone>(
    stats: &[T],
    catalog: &CategoryCatalog,
    parent_id: &str,
) -> Result<Vec<T>> {
    let members: HashSet<&str> = catalog
        .subcategories(parent_id)?
        .iter()
        .map(|c| c.id.as_str())
        .collect();

    Ok(stats
        .iter()
        .filter(|s| members.contains(s.category_id()))
        .cloned()
        .collect())
}

/// Re-bucket stats with locally configured bands
///
/// Categories without papers keep the producer's `unknown` label.
pub fn retier(stats: &[CategoryStats], bands: &TierBands) -> Vec<CategoryStats> {
    stats
        .iter()
        .map(|s| {
            let mut s = s.clone();
            if s.total_papers > 0 {
                s.trend_direction = classify_tier(s.hype_score, bands);
            }
            s
        })
        .collect()
}

//! Time-series alignment across categories
//!
//! Each category's monthly series is fetched on its own and may skip months.
//! `align` merges them into one table keyed by the union of their `YYYY-MM`
//! dates, so a chart can draw every series against the same x axis.
//!
//! A month with no point is `None`, never `Some(0)`: zero publications and
//! "no data" render differently downstream.

use crate::api::TrendsApi;
use crate::error::{Result, TrendsError};
use crate::model::{MonthlyPoint, TimeSeries};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap, HashSet};

/// One month across every input series
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlignedRow {
    pub date: String,
    pub values: HashMap<String, Option<u64>>,
}

impl AlignedRow {
    /// Count for a category in this month; `None` if absent or unknown id
    pub fn value(&self, category_id: &str) -> Option<u64> {
        self.values.get(category_id).copied().flatten()
    }
}

/// Date-aligned multi-series table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AlignedTable {
    /// Input category ids, in input order
    pub series_ids: Vec<String>,
    /// One row per month of the date union, ascending
    pub rows: Vec<AlignedRow>,
}

impl AlignedTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn dates(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|r| r.date.as_str())
    }

    pub fn row(&self, date: &str) -> Option<&AlignedRow> {
        // Rows are sorted by date
        self.rows
            .binary_search_by(|r| r.date.as_str().cmp(date))
            .ok()
            .map(|i| &self.rows[i])
    }

    /// Column for one category, `None` where it has no point
    pub fn column(&self, category_id: &str) -> Vec<Option<u64>> {
        self.rows.iter().map(|r| r.value(category_id)).collect()
    }
}

/// Reject points a well-formed series can't contain
///
/// Months must be 1..=12, years must fit the four-digit key, and points must
/// be strictly ascending by (year, month).
pub fn validate_series(category_id: &str, series: &[MonthlyPoint]) -> Result<()> {
    let mut previous: Option<(i32, u32)> = None;

    for point in series {
        if !(1..=9999).contains(&point.year)
            || NaiveDate::from_ymd_opt(point.year, point.month, 1).is_none()
        {
            return Err(TrendsError::InvalidArgument(format!(
                "{}: invalid month {}-{}",
                category_id, point.year, point.month
            )));
        }

        let key = (point.year, point.month);
        if let Some(prev) = previous {
            if key <= prev {
                return Err(TrendsError::InvalidArgument(format!(
                    "{}: series not strictly ascending at {}",
                    category_id,
                    point.date_key()
                )));
            }
        }
        previous = Some(key);
    }

    Ok(())
}

/// Merge per-category series into one table over their date union
///
/// Every input id appears in every row's `values`, present or `None`. An empty
/// input gives an empty table. A category with no points adds no dates but
/// still gets a `None` entry in each row contributed by the others.
pub fn align(series: &[(String, TimeSeries)]) -> Result<AlignedTable> {
    let mut seen = HashSet::new();
    let mut lookups: Vec<HashMap<(i32, u32), u64>> = Vec::with_capacity(series.len());
    let mut months: BTreeSet<(i32, u32)> = BTreeSet::new();

    for (category_id, points) in series {
        if !seen.insert(category_id.as_str()) {
            return Err(TrendsError::InvalidArgument(format!(
                "duplicate series for {}",
                category_id
            )));
        }
        validate_series(category_id, points)?;

        let lookup: HashMap<(i32, u32), u64> = points
            .iter()
            .map(|p| ((p.year, p.month), p.count))
            .collect();
        months.extend(lookup.keys().copied());
        lookups.push(lookup);
    }

    // (year, month) order equals the lexicographic order of the padded keys
    let rows = months
        .into_iter()
        .map(|(year, month)| {
            let values = series
                .iter()
                .zip(&lookups)
                .map(|((category_id, _), lookup)| {
                    (category_id.clone(), lookup.get(&(year, month)).copied())
                })
                .collect();
            AlignedRow {
                date: MonthlyPoint::new(year, month, 0).date_key(),
                values,
            }
        })
        .collect();

    Ok(AlignedTable {
        series_ids: series.iter().map(|(id, _)| id.clone()).collect(),
        rows,
    })
}

/// Fetch every category's series concurrently
///
/// All requests are in flight at once and the call waits for all of them.
/// Any single failure fails the whole set as one `Fetch` error; results come
/// back in the order of `category_ids`.
pub async fn fetch_series(
    api: &dyn TrendsApi,
    category_ids: &[String],
) -> Result<Vec<(String, TimeSeries)>> {
    let fetches = category_ids.iter().map(|id| async move {
        match api.trends(id).await {
            Ok(series) => Ok((id.clone(), series)),
            Err(e @ TrendsError::Fetch { .. }) => Err(e),
            Err(e) => Err(TrendsError::fetch(format!("/trends/{}", id), e)),
        }
    });

    let series = futures::future::try_join_all(fetches).await?;
    log::debug!("Fetched {} series", series.len());
    Ok(series)
}

/// Fan-out fetch followed by alignment
pub async fn fetch_aligned(api: &dyn TrendsApi, category_ids: &[String]) -> Result<AlignedTable> {
    let series = fetch_series(api, category_ids).await?;
    align(&series)
}

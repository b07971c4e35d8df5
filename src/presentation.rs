//! Chart- and table-ready shapes for aligned and ranked data
//!
//! Nothing here draws; it only turns engine output into rows and labels a
//! front-end can render directly.

use crate::aligner::AlignedTable;
use crate::catalog::CategoryCatalog;
use crate::model::{CategoryGroup, CategoryStats, HypeEntry, MonthlyPoint, TrendDirection};
use crate::sync::SyncState;
use chrono::NaiveDateTime;
use serde::Serialize;

/// One line of a multi-series chart
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartSeries {
    pub id: String,
    pub name: String,
    /// Parallel to `ChartData::labels`; `None` is a gap, not zero
    pub points: Vec<Option<u64>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub series: Vec<ChartSeries>,
}

pub fn chart_data(table: &AlignedTable, catalog: &CategoryCatalog) -> ChartData {
    ChartData {
        labels: table.dates().map(str::to_string).collect(),
        series: table
            .series_ids
            .iter()
            .map(|id| ChartSeries {
                id: id.clone(),
                name: catalog.display_name(id).to_string(),
                points: table.column(id),
            })
            .collect(),
    }
}

/// Point of a single-category chart
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartPoint {
    pub date: String,
    pub count: u64,
    pub year: i32,
    pub month: u32,
}

pub fn chart_points(series: &[MonthlyPoint]) -> Vec<ChartPoint> {
    series
        .iter()
        .map(|p| ChartPoint {
            date: p.date_key(),
            count: p.count,
            year: p.year,
            month: p.month,
        })
        .collect()
}

pub fn trend_icon(direction: TrendDirection) -> &'static str {
    match direction {
        TrendDirection::Surging => "⬆",
        TrendDirection::Rising | TrendDirection::Growing => "↑",
        TrendDirection::Declining | TrendDirection::Cooling => "↓",
        TrendDirection::Stable | TrendDirection::Unknown => "→",
    }
}

/// Badge text, e.g. `↓ 12.5%`; the arrow carries the sign
pub fn badge_text(direction: TrendDirection, hype_score: f64) -> String {
    format!("{} {:.1}%", trend_icon(direction), hype_score.abs())
}

/// Signed growth, e.g. `+12.3%` or `-4.0%`
pub fn format_growth(hype_score: f64) -> String {
    let rounded = (hype_score * 10.0).round() / 10.0;
    if rounded > 0.0 {
        format!("+{:.1}%", rounded)
    } else if rounded == 0.0 {
        // Also catches -0.0
        "0.0%".to_string()
    } else {
        format!("{:.1}%", rounded)
    }
}

/// Thousands-separated integer, e.g. `12,345`
pub fn format_count(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardRow {
    pub rank: usize,
    pub category_id: String,
    pub category_name: String,
    pub direction: TrendDirection,
    pub badge: String,
}

pub fn leaderboard_rows(entries: &[HypeEntry]) -> Vec<LeaderboardRow> {
    entries
        .iter()
        .enumerate()
        .map(|(i, e)| LeaderboardRow {
            rank: i + 1,
            category_id: e.category_id.clone(),
            category_name: e.category_name.clone(),
            direction: e.trend_direction,
            badge: badge_text(e.trend_direction, e.hype_score),
        })
        .collect()
}

/// Header line for a single category's chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsSummary {
    pub title: String,
    pub total_papers: String,
    pub monthly_average: String,
    pub growth: String,
    pub direction: TrendDirection,
}

pub fn stats_summary(stats: &CategoryStats) -> StatsSummary {
    StatsSummary {
        title: stats.category_name.clone(),
        total_papers: format_count(stats.total_papers),
        monthly_average: format!("{:.1}", stats.average_monthly),
        growth: format_growth(stats.hype_score),
        direction: stats.trend_direction,
    }
}

/// Selector label for a parent group's "view all" entry
pub fn parent_option_label(group: &CategoryGroup) -> String {
    format!(
        "All {} ({} categories)",
        group.name,
        group.subcategories.len()
    )
}

pub fn sync_status_line(state: &SyncState) -> String {
    match state {
        SyncState::Idle => "Idle".to_string(),
        SyncState::Syncing {
            current,
            total,
            message,
        } => {
            let mut line = format!("Syncing {}/{} ({}%)", current, total, state.percent());
            if !message.is_empty() {
                line.push_str(" - ");
                line.push_str(message);
            }
            line
        }
    }
}

/// Render the server's ISO timestamp as `YYYY-MM-DD HH:MM`, or pass it through
pub fn format_last_sync(raw: &str) -> String {
    match raw.parse::<NaiveDateTime>() {
        Ok(ts) => ts.format("%Y-%m-%d %H:%M").to_string(),
        Err(_) => raw.to_string(),
    }
}

/// Plain-text table: one row per month, one column per category
///
/// Absent months print as `-`, zero prints as `0`.
pub fn render_aligned_table(table: &AlignedTable) -> String {
    let widths: Vec<usize> = table
        .series_ids
        .iter()
        .map(|id| {
            table
                .column(id)
                .iter()
                .map(|v| v.map(|c| c.to_string().len()).unwrap_or(1))
                .max()
                .unwrap_or(1)
                .max(id.len())
        })
        .collect();

    let mut out = String::new();
    out.push_str(&format!("{:<7}", "month"));
    for (id, width) in table.series_ids.iter().zip(&widths) {
        out.push_str(&format!("  {:>width$}", id, width = width));
    }
    out.push('\n');

    for row in &table.rows {
        out.push_str(&format!("{:<7}", row.date));
        for (id, width) in table.series_ids.iter().zip(&widths) {
            let cell = row
                .value(id)
                .map(|c| c.to_string())
                .unwrap_or_else(|| "-".to_string());
            out.push_str(&format!("  {:>width$}", cell, width = width));
        }
        out.push('\n');
    }
    out
}

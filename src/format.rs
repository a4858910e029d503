//! # Metric Formatters
//!
//! Reshape flat grouped rows into the nested structures the dashboard
//! renders: zero-filled time series, `{category}_{label}`-keyed heatmaps,
//! and per-source reliability timelines. Formatters never alter values;
//! missing buckets become explicit zeros.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::engine::{CategoryPerfRow, DailyTrendRow, SourceMonthRow};
use crate::model::Label;
use crate::ratio::safe_ratio;

/// One day of the fake/real trend. A date with rows for only one label
/// still carries the other label as zero; out-of-domain labels surface in
/// their own bucket instead of corrupting either side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendPoint {
    pub date: String,
    pub fake: u64,
    pub real: u64,
    pub unknown: u64,
}

/// Collapse (date, label, count) rows into chronological daily points.
pub fn time_series(rows: &[DailyTrendRow]) -> Vec<TrendPoint> {
    let mut by_date: BTreeMap<String, TrendPoint> = BTreeMap::new();
    for row in rows {
        let date = row.date.to_string();
        let point = by_date.entry(date.clone()).or_insert(TrendPoint {
            date,
            fake: 0,
            real: 0,
            unknown: 0,
        });
        match row.label {
            Label::Fake => point.fake += row.count,
            Label::Real => point.real += row.count,
            Label::Unknown => point.unknown += row.count,
        }
    }
    by_date.into_values().collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapPoint {
    pub count: u64,
    pub avg_engagement: f64,
}

/// One heatmap series, keyed by `"{category}_{label}"` with a month →
/// point map inside.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapCell {
    pub category: String,
    pub label: Label,
    pub data: BTreeMap<String, HeatmapPoint>,
}

/// Pivot (month, category, label) rows into heatmap cells. Cell order
/// follows first appearance in the input, which the engine already emits
/// deterministically.
pub fn heatmap(rows: &[CategoryPerfRow]) -> Vec<HeatmapCell> {
    let mut cells: Vec<HeatmapCell> = Vec::new();
    let mut by_key: HashMap<String, usize> = HashMap::new();
    for row in rows {
        let key = format!("{}_{}", row.category, row.label);
        let idx = *by_key.entry(key).or_insert_with(|| {
            cells.push(HeatmapCell {
                category: row.category.clone(),
                label: row.label,
                data: BTreeMap::new(),
            });
            cells.len() - 1
        });
        cells[idx].data.insert(
            row.month.clone(),
            HeatmapPoint {
                count: row.count,
                avg_engagement: row.avg_engagement,
            },
        );
    }
    cells
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyReliability {
    pub month: String,
    pub total_articles: u64,
    pub fake_articles: u64,
    /// Percentage of the month's articles labeled real.
    pub reliability_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceTimeline {
    pub source_name: String,
    pub timeline: Vec<MonthlyReliability>,
}

/// Group (source, month) rows into per-source timelines. Rows arrive
/// source-grouped and month-ascending from the engine; order is kept, not
/// re-sorted.
pub fn reliability_timelines(rows: &[SourceMonthRow]) -> Vec<SourceTimeline> {
    let mut timelines: Vec<SourceTimeline> = Vec::new();
    let mut by_source: HashMap<String, usize> = HashMap::new();
    for row in rows {
        let idx = *by_source.entry(row.source_name.clone()).or_insert_with(|| {
            timelines.push(SourceTimeline {
                source_name: row.source_name.clone(),
                timeline: Vec::new(),
            });
            timelines.len() - 1
        });
        timelines[idx].timeline.push(MonthlyReliability {
            month: row.month.clone(),
            total_articles: row.total,
            fake_articles: row.fake,
            reliability_score: safe_ratio(row.real, row.total),
        });
    }
    timelines
}

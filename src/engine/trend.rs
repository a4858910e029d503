//! Time-grouped aggregation shapes: daily label trends, monthly category
//! performance, and the per-source reliability timeline.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};

use crate::filters::Window;
use crate::model::Label;
use crate::ratio::safe_avg;
use crate::store::Snapshot;

/// Statistical-significance floor for the source timeline: a
/// (source, month) group with fewer articles is suppressed entirely.
pub const MIN_TIMELINE_SAMPLES: u64 = 5;

/// Articles per (publication day, label) within a window.
#[derive(Debug, Clone)]
pub struct DailyTrendQuery {
    pub window: Window,
    pub label: Option<Label>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyTrendRow {
    pub date: NaiveDate,
    pub label: Label,
    pub count: u64,
}

impl DailyTrendQuery {
    /// One row per (date, label) pair that actually occurred, ordered by
    /// date. Absent pairs are not synthesized here; the time-series
    /// formatter zero-fills them.
    pub fn run(&self, snap: &Snapshot) -> Vec<DailyTrendRow> {
        let mut counts: BTreeMap<(NaiveDate, Label), u64> = BTreeMap::new();
        for article in &snap.articles {
            if !self.window.contains(article.created_at) {
                continue;
            }
            if self.label.is_some_and(|l| article.label != l) {
                continue;
            }
            *counts
                .entry((article.created_at.date_naive(), article.label))
                .or_default() += 1;
        }
        counts
            .into_iter()
            .map(|((date, label), count)| DailyTrendRow { date, label, count })
            .collect()
    }
}

/// Article×Category×Post joined rows grouped by (month, category, label).
///
/// Inner-join semantics: an article appears only if it has at least one
/// category link and at least one post, and each of its posts contributes
/// one joined row per category link.
#[derive(Debug, Clone)]
pub struct CategoryPerformanceQuery {
    pub window: Window,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryPerfRow {
    pub month: String,
    pub category: String,
    pub label: Label,
    pub count: u64,
    pub avg_engagement: f64,
}

impl CategoryPerformanceQuery {
    pub fn run(&self, snap: &Snapshot) -> Vec<CategoryPerfRow> {
        // (month, category idx, label) -> (joined rows, repost-counter sum)
        let mut groups: BTreeMap<(String, usize, Label), (u64, u64)> = BTreeMap::new();
        for &(aidx, cidx) in snap.category_links() {
            let article = &snap.articles[aidx];
            if !self.window.since(article.created_at) {
                continue;
            }
            for &pidx in snap.posts_of(aidx) {
                let post = &snap.posts[pidx];
                let entry = groups
                    .entry((month_key(article.created_at), cidx, article.label))
                    .or_insert((0, 0));
                entry.0 += 1;
                entry.1 += post.repost_count;
            }
        }
        groups
            .into_iter()
            .map(|((month, cidx, label), (count, repost_sum))| CategoryPerfRow {
                month,
                category: snap.categories[cidx].category_name.clone(),
                label,
                count,
                avg_engagement: safe_avg(repost_sum, count),
            })
            .collect()
    }
}

/// Articles grouped by (source, month) with conditional label counts.
#[derive(Debug, Clone)]
pub struct SourceTimelineQuery {
    pub window: Window,
    pub min_samples: u64,
}

impl SourceTimelineQuery {
    pub fn new(window: Window) -> Self {
        Self {
            window,
            min_samples: MIN_TIMELINE_SAMPLES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceMonthRow {
    pub source_name: String,
    pub month: String,
    pub total: u64,
    pub fake: u64,
    pub real: u64,
}

#[derive(Default)]
struct LabelCounts {
    total: u64,
    fake: u64,
    real: u64,
}

impl SourceTimelineQuery {
    /// Rows ordered by source (arena order) then month ascending, so the
    /// formatter can group consecutive rows into chronological timelines.
    /// Unknown-label articles count toward `total` only.
    pub fn run(&self, snap: &Snapshot) -> Vec<SourceMonthRow> {
        let mut groups: BTreeMap<(usize, String), LabelCounts> = BTreeMap::new();
        for article in &snap.articles {
            let Some(sidx) = article.source_id.and_then(|id| snap.source_index(id)) else {
                continue;
            };
            if !self.window.since(article.created_at) {
                continue;
            }
            let counts = groups
                .entry((sidx, month_key(article.created_at)))
                .or_default();
            counts.total += 1;
            match article.label {
                Label::Fake => counts.fake += 1,
                Label::Real => counts.real += 1,
                Label::Unknown => {}
            }
        }
        groups
            .into_iter()
            .filter(|(_, counts)| counts.total >= self.min_samples)
            .map(|((sidx, month), counts)| SourceMonthRow {
                source_name: snap.sources[sidx].source_name.clone(),
                month,
                total: counts.total,
                fake: counts.fake,
                real: counts.real,
            })
            .collect()
    }
}

/// Truncate a timestamp to its `YYYY-MM` month bucket.
fn month_key(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m").to_string()
}

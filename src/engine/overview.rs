//! Corpus-wide operational shapes: the overview stat block, all-time
//! source credibility, and the recent category distribution.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::filters::Window;
use crate::model::{Label, SourceId};
use crate::ratio::{round2, safe_avg, safe_ratio};
use crate::store::Snapshot;

/// Headline counters for the dashboard landing panel.
#[derive(Debug, Clone, Serialize)]
pub struct OverviewStats {
    pub articles: ArticleTotals,
    pub users: UserTotals,
    pub engagement: EngagementTotals,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArticleTotals {
    pub total: u64,
    pub fake: u64,
    pub real: u64,
    pub unknown: u64,
    pub fake_percentage: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserTotals {
    pub total: u64,
    pub verified: u64,
    pub unverified: u64,
    pub verified_percentage: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct EngagementTotals {
    pub total_posts: u64,
    pub total_reposts: u64,
    pub avg_reposts_per_post: f64,
}

impl OverviewStats {
    pub fn compute(snap: &Snapshot) -> Self {
        let total_articles = snap.articles.len() as u64;
        let mut fake = 0u64;
        let mut real = 0u64;
        for article in &snap.articles {
            match article.label {
                Label::Fake => fake += 1,
                Label::Real => real += 1,
                Label::Unknown => {}
            }
        }

        let total_users = snap.users.len() as u64;
        let verified = snap.users.iter().filter(|u| u.verified).count() as u64;

        let total_posts = snap.posts.len() as u64;
        let total_reposts: u64 = snap.posts.iter().map(|p| p.repost_count).sum();

        Self {
            articles: ArticleTotals {
                total: total_articles,
                fake,
                real,
                unknown: total_articles - fake - real,
                fake_percentage: round2(safe_ratio(fake, total_articles)),
            },
            users: UserTotals {
                total: total_users,
                verified,
                unverified: total_users - verified,
                verified_percentage: round2(safe_ratio(verified, total_users)),
            },
            engagement: EngagementTotals {
                total_posts,
                total_reposts,
                avg_reposts_per_post: round2(safe_avg(total_reposts, total_posts)),
            },
        }
    }
}

/// All-time per-source article totals with conditional label counts.
/// Sources without articles are absent, not zero-reported.
#[derive(Debug, Clone, Default)]
pub struct SourceCredibilityQuery;

#[derive(Debug, Clone, PartialEq)]
pub struct SourceCredibilityRow {
    pub source_id: SourceId,
    pub source_name: String,
    pub credibility_rating: Option<f64>,
    pub article_count: u64,
    pub fake_count: u64,
    pub real_count: u64,
    pub fake_percentage: f64,
}

#[derive(Default)]
struct SourceAcc {
    total: u64,
    fake: u64,
    real: u64,
}

impl SourceCredibilityQuery {
    /// Rows in source arena order.
    pub fn run(&self, snap: &Snapshot) -> Vec<SourceCredibilityRow> {
        let mut by_source: BTreeMap<usize, SourceAcc> = BTreeMap::new();
        for article in &snap.articles {
            let Some(sidx) = article.source_id.and_then(|id| snap.source_index(id)) else {
                continue;
            };
            let acc = by_source.entry(sidx).or_default();
            acc.total += 1;
            match article.label {
                Label::Fake => acc.fake += 1,
                Label::Real => acc.real += 1,
                Label::Unknown => {}
            }
        }
        by_source
            .into_iter()
            .map(|(sidx, acc)| {
                let source = &snap.sources[sidx];
                SourceCredibilityRow {
                    source_id: source.source_id,
                    source_name: source.source_name.clone(),
                    credibility_rating: source.credibility_rating,
                    article_count: acc.total,
                    fake_count: acc.fake,
                    real_count: acc.real,
                    fake_percentage: round2(safe_ratio(acc.fake, acc.total)),
                }
            })
            .collect()
    }
}

/// Per-category article counts within a trailing window, split by label.
#[derive(Debug, Clone)]
pub struct CategoryDistributionQuery {
    pub window: Window,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryDistributionRow {
    pub category: String,
    pub total_articles: u64,
    pub fake_articles: u64,
    pub real_articles: u64,
    pub unknown_articles: u64,
    pub fake_percentage: f64,
}

impl CategoryDistributionQuery {
    /// Rows in category arena order; categories with no in-window linked
    /// articles are absent.
    pub fn run(&self, snap: &Snapshot) -> Vec<CategoryDistributionRow> {
        let mut by_category: BTreeMap<usize, SourceAcc> = BTreeMap::new();
        for &(aidx, cidx) in snap.category_links() {
            let article = &snap.articles[aidx];
            if !self.window.since(article.created_at) {
                continue;
            }
            let acc = by_category.entry(cidx).or_default();
            acc.total += 1;
            match article.label {
                Label::Fake => acc.fake += 1,
                Label::Real => acc.real += 1,
                Label::Unknown => {}
            }
        }
        by_category
            .into_iter()
            .map(|(cidx, acc)| CategoryDistributionRow {
                category: snap.categories[cidx].category_name.clone(),
                total_articles: acc.total,
                fake_articles: acc.fake,
                real_articles: acc.real,
                unknown_articles: acc.total - acc.fake - acc.real,
                fake_percentage: round2(safe_ratio(acc.fake, acc.total)),
            })
            .collect()
    }
}

//! Post-centric aggregation shapes: top spreaders, verified/unverified
//! behavior segmentation, and the viral-content ranking.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::filters::Window;
use crate::model::{ArticleId, Label, UserId};
use crate::ratio::engagement_score;
use crate::store::Snapshot;

/// Posts grouped by user, optionally restricted to articles carrying one
/// label. Reach is the sum of the cached repost counters, so it includes
/// amplification by users outside any later node-set bound.
#[derive(Debug, Clone)]
pub struct TopSpreadersQuery {
    pub label: Option<Label>,
    pub limit: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpreaderRow {
    pub user_id: UserId,
    pub username: String,
    pub display_name: Option<String>,
    pub verified: bool,
    pub followers_count: u64,
    pub articles_shared: u64,
    pub post_count: u64,
    pub reach: u64,
}

#[derive(Default)]
struct SpreaderAcc {
    articles: HashSet<usize>,
    posts: u64,
    reach: u64,
}

impl TopSpreadersQuery {
    /// Ordered by reach descending; ties keep user arena order (stable
    /// sort over a deterministic iteration), bounded by `limit`.
    pub fn run(&self, snap: &Snapshot) -> Vec<SpreaderRow> {
        let mut by_user: HashMap<usize, SpreaderAcc> = HashMap::new();
        for post in &snap.posts {
            let Some(aidx) = snap.article_index(&post.article_id) else {
                continue;
            };
            if self.label.is_some_and(|l| snap.articles[aidx].label != l) {
                continue;
            }
            let Some(uidx) = snap.user_index(post.user_id) else {
                continue;
            };
            let acc = by_user.entry(uidx).or_default();
            acc.articles.insert(aidx);
            acc.posts += 1;
            acc.reach += post.repost_count;
        }

        let mut rows = Vec::with_capacity(by_user.len());
        for (uidx, user) in snap.users.iter().enumerate() {
            let Some(acc) = by_user.get(&uidx) else {
                continue;
            };
            rows.push(SpreaderRow {
                user_id: user.user_id,
                username: user.username.clone(),
                display_name: user.display_name.clone(),
                verified: user.verified,
                followers_count: user.followers_count,
                articles_shared: acc.articles.len() as u64,
                post_count: acc.posts,
                reach: acc.reach,
            });
        }
        rows.sort_by(|a, b| b.reach.cmp(&a.reach));
        rows.truncate(self.limit);
        rows
    }
}

/// Post×User×Article rows grouped by (verified flag, article label).
#[derive(Debug, Clone, Default)]
pub struct UserBehaviorQuery;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BehaviorRow {
    pub verified: bool,
    pub label: Label,
    pub unique_users: u64,
    pub post_count: u64,
    /// Follower counts summed over joined rows; average with `safe_avg`
    /// against `post_count` (heavy posters weigh in proportionally).
    pub followers_sum: u64,
    pub total_reach: u64,
}

#[derive(Default)]
struct BehaviorAcc {
    users: HashSet<UserId>,
    posts: u64,
    followers_sum: u64,
    reach: u64,
}

impl UserBehaviorQuery {
    pub fn run(&self, snap: &Snapshot) -> Vec<BehaviorRow> {
        let mut groups: BTreeMap<(bool, Label), BehaviorAcc> = BTreeMap::new();
        for post in &snap.posts {
            let (Some(user), Some(aidx)) = (
                snap.user(post.user_id),
                snap.article_index(&post.article_id),
            ) else {
                continue;
            };
            let acc = groups
                .entry((user.verified, snap.articles[aidx].label))
                .or_default();
            acc.users.insert(user.user_id);
            acc.posts += 1;
            acc.followers_sum += user.followers_count;
            acc.reach += post.repost_count;
        }
        groups
            .into_iter()
            .map(|((verified, label), acc)| BehaviorRow {
                verified,
                label,
                unique_users: acc.users.len() as u64,
                post_count: acc.posts,
                followers_sum: acc.followers_sum,
                total_reach: acc.reach,
            })
            .collect()
    }
}

/// Posts created within a trailing window grouped by article. Note the
/// window applies to post creation, not article publication.
#[derive(Debug, Clone)]
pub struct ViralContentQuery {
    pub window: Window,
    pub label: Option<Label>,
    pub limit: usize,
}

impl ViralContentQuery {
    pub const DEFAULT_LIMIT: usize = 20;
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViralRow {
    pub article_id: ArticleId,
    pub title: String,
    pub url: String,
    pub label: Label,
    pub post_count: u64,
    pub repost_count: u64,
    pub favorite_count: u64,
    pub engagement_score: f64,
}

#[derive(Default)]
struct ViralAcc {
    posts: u64,
    reposts: u64,
    favorites: u64,
}

impl ViralContentQuery {
    /// Ordered by summed repost counters descending (arena order on
    /// ties), bounded to the top `limit` articles.
    pub fn run(&self, snap: &Snapshot) -> Vec<ViralRow> {
        let mut by_article: HashMap<usize, ViralAcc> = HashMap::new();
        for post in &snap.posts {
            if !self.window.since(post.created_at) {
                continue;
            }
            let Some(aidx) = snap.article_index(&post.article_id) else {
                continue;
            };
            if self.label.is_some_and(|l| snap.articles[aidx].label != l) {
                continue;
            }
            let acc = by_article.entry(aidx).or_default();
            acc.posts += 1;
            acc.reposts += post.repost_count;
            acc.favorites += post.favorite_count;
        }

        let mut rows = Vec::with_capacity(by_article.len());
        for (aidx, article) in snap.articles.iter().enumerate() {
            let Some(acc) = by_article.get(&aidx) else {
                continue;
            };
            rows.push(ViralRow {
                article_id: article.article_id.clone(),
                title: article.title.clone(),
                url: article.url.clone(),
                label: article.label,
                post_count: acc.posts,
                repost_count: acc.reposts,
                favorite_count: acc.favorites,
                engagement_score: engagement_score(acc.reposts, acc.favorites, acc.posts),
            });
        }
        rows.sort_by(|a, b| b.repost_count.cmp(&a.repost_count));
        rows.truncate(self.limit);
        rows
    }
}

//! # Data Model
//!
//! Read-only entity types mirroring the upstream store's tables: publishing
//! sources, labeled articles with their body content and images, topic
//! categories (many-to-many with articles through a junction row), social
//! users, original posts, and reposts.
//!
//! The engine never mutates these; they are deserialized from a dataset
//! document and frozen inside a [`crate::store::Snapshot`]. Engagement
//! counters (`repost_count`, `favorite_count`, follower counts) are
//! denormalized caches maintained upstream and are propagated as-is.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type SourceId = i32;
pub type CategoryId = i32;
pub type UserId = i64;
pub type PostId = i64;
pub type RepostId = i64;

/// Articles are keyed by an opaque string id assigned upstream.
pub type ArticleId = String;

/// Binary fake/real classification attached to an article.
///
/// Upstream data occasionally carries label strings outside the two
/// expected values. Those deserialize to [`Label::Unknown`] and aggregate
/// into their own bucket: they count toward totals but never toward the
/// fake or real side of a ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Fake,
    Real,
    Unknown,
}

impl<'de> Deserialize<'de> for Label {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(match raw.as_str() {
            "fake" => Label::Fake,
            "real" => Label::Real,
            _ => Label::Unknown,
        })
    }
}

impl Label {
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Fake => "fake",
            Label::Real => "real",
            Label::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Source {
    pub source_id: SourceId,
    pub source_name: String,
    #[serde(default)]
    pub source_url: Option<String>,
    /// Editorial credibility rating in [0, 1]; absent for unrated sources.
    #[serde(default)]
    pub credibility_rating: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Article {
    pub article_id: ArticleId,
    #[serde(default)]
    pub source_id: Option<SourceId>,
    pub url: String,
    pub title: String,
    pub label: Label,
    pub created_at: DateTime<Utc>,
}

/// Article body; at most one per article.
#[derive(Debug, Clone, Deserialize)]
pub struct Content {
    pub article_id: ArticleId,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub publish_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub word_count: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Image {
    pub article_id: ArticleId,
    pub image_url: String,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub position: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Category {
    pub category_id: CategoryId,
    pub category_name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Junction row of the Article↔Category many-to-many association.
#[derive(Debug, Clone, Deserialize)]
pub struct ArticleCategory {
    pub article_id: ArticleId,
    pub category_id: CategoryId,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub user_id: UserId,
    pub username: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub followers_count: u64,
    #[serde(default)]
    pub following_count: u64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Original social post referencing exactly one article and one user.
#[derive(Debug, Clone, Deserialize)]
pub struct Post {
    pub post_id: PostId,
    pub article_id: ArticleId,
    pub user_id: UserId,
    #[serde(default)]
    pub text: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Cached counter; not recomputed from [`Repost`] rows.
    #[serde(default)]
    pub repost_count: u64,
    #[serde(default)]
    pub favorite_count: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Repost {
    pub repost_id: RepostId,
    pub post_id: PostId,
    pub user_id: UserId,
    #[serde(default)]
    pub reposted_at: Option<DateTime<Utc>>,
}

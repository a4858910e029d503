//! # Catalog Reads
//!
//! Non-aggregating reads behind the browse API: filtered, paginated
//! article listings, per-article and per-user detail records, and the
//! source/category reference lists. Missing related entities (an article
//! without a source, without content) degrade to null sub-fields rather
//! than failing the record.

use serde::Serialize;

use crate::filters::PageParams;
use crate::model::{CategoryId, Label, PostId, SourceId, UserId};
use crate::ratio::{round2, safe_ratio};
use crate::store::Snapshot;

/// Validated listing filter produced from request parameters.
#[derive(Debug, Clone, Default)]
pub struct ArticleFilter {
    pub label: Option<Label>,
    pub source_id: Option<SourceId>,
    pub category_id: Option<CategoryId>,
    /// Lowercased substring matched against lowercased titles.
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArticleSummary {
    pub article_id: String,
    pub title: String,
    pub url: String,
    pub label: Label,
    pub source: Option<String>,
    pub created_at: String,
    pub categories: Vec<String>,
}

/// Listing envelope with pagination bookkeeping.
#[derive(Debug, Clone, Serialize)]
pub struct ArticlePage {
    pub articles: Vec<ArticleSummary>,
    pub total: u64,
    pub pages: u64,
    pub current_page: u64,
}

/// Newest-first listing; ties keep arena order. A page past the end is an
/// empty list, not an error.
pub fn list_articles(snap: &Snapshot, filter: &ArticleFilter, page: PageParams) -> ArticlePage {
    let mut matches: Vec<usize> = (0..snap.articles.len())
        .filter(|&aidx| {
            let article = &snap.articles[aidx];
            if filter.label.is_some_and(|l| article.label != l) {
                return false;
            }
            if filter
                .source_id
                .is_some_and(|sid| article.source_id != Some(sid))
            {
                return false;
            }
            if let Some(cid) = filter.category_id {
                let linked = snap
                    .category_index(cid)
                    .is_some_and(|cidx| snap.categories_of(aidx).contains(&cidx));
                if !linked {
                    return false;
                }
            }
            if let Some(needle) = &filter.search {
                if !article.title.to_lowercase().contains(needle) {
                    return false;
                }
            }
            true
        })
        .collect();
    matches.sort_by(|&a, &b| snap.articles[b].created_at.cmp(&snap.articles[a].created_at));

    let total = matches.len() as u64;
    let pages = total.div_ceil(page.per_page as u64);
    let articles = matches
        .into_iter()
        .skip(page.offset())
        .take(page.per_page)
        .map(|aidx| summarize(snap, aidx))
        .collect();

    ArticlePage {
        articles,
        total,
        pages,
        current_page: page.page as u64,
    }
}

fn summarize(snap: &Snapshot, aidx: usize) -> ArticleSummary {
    let article = &snap.articles[aidx];
    ArticleSummary {
        article_id: article.article_id.clone(),
        title: article.title.clone(),
        url: article.url.clone(),
        label: article.label,
        source: article
            .source_id
            .and_then(|id| snap.source(id))
            .map(|s| s.source_name.clone()),
        created_at: article.created_at.to_rfc3339(),
        categories: snap
            .categories_of(aidx)
            .iter()
            .map(|&cidx| snap.categories[cidx].category_name.clone())
            .collect(),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceInfo {
    pub source_id: SourceId,
    pub source_name: String,
    pub credibility_rating: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContentInfo {
    pub text: Option<String>,
    pub author: Option<String>,
    pub publish_date: Option<String>,
    pub word_count: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryRef {
    pub id: CategoryId,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageInfo {
    pub image_url: String,
    pub caption: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArticleEngagement {
    pub post_count: u64,
    pub total_reposts: u64,
    pub total_favorites: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TopPost {
    pub post_id: PostId,
    pub username: Option<String>,
    pub verified: bool,
    pub text: Option<String>,
    pub repost_count: u64,
    pub favorite_count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArticleDetail {
    pub article_id: String,
    pub title: String,
    pub url: String,
    pub label: Label,
    pub created_at: String,
    pub source: Option<SourceInfo>,
    pub content: ContentInfo,
    pub categories: Vec<CategoryRef>,
    pub images: Vec<ImageInfo>,
    pub engagement: ArticleEngagement,
    pub top_posts: Vec<TopPost>,
}

/// Full record for one article, or `None` when the id is unknown.
pub fn article_detail(snap: &Snapshot, article_id: &str) -> Option<ArticleDetail> {
    let aidx = snap.article_index(article_id)?;
    let article = &snap.articles[aidx];

    let mut post_count = 0u64;
    let mut total_reposts = 0u64;
    let mut total_favorites = 0u64;
    let mut post_idxs: Vec<usize> = snap.posts_of(aidx).to_vec();
    for &pidx in &post_idxs {
        let post = &snap.posts[pidx];
        post_count += 1;
        total_reposts += post.repost_count;
        total_favorites += post.favorite_count;
    }

    post_idxs.sort_by(|&a, &b| snap.posts[b].repost_count.cmp(&snap.posts[a].repost_count));
    let top_posts = post_idxs
        .into_iter()
        .take(5)
        .map(|pidx| {
            let post = &snap.posts[pidx];
            let poster = snap.user(post.user_id);
            TopPost {
                post_id: post.post_id,
                username: poster.map(|u| u.username.clone()),
                verified: poster.map(|u| u.verified).unwrap_or(false),
                text: post.text.clone(),
                repost_count: post.repost_count,
                favorite_count: post.favorite_count,
            }
        })
        .collect();

    let content = snap.content_of(aidx);

    Some(ArticleDetail {
        article_id: article.article_id.clone(),
        title: article.title.clone(),
        url: article.url.clone(),
        label: article.label,
        created_at: article.created_at.to_rfc3339(),
        source: article
            .source_id
            .and_then(|id| snap.source(id))
            .map(|s| SourceInfo {
                source_id: s.source_id,
                source_name: s.source_name.clone(),
                credibility_rating: s.credibility_rating,
            }),
        content: ContentInfo {
            text: content.and_then(|c| c.text.clone()),
            author: content.and_then(|c| c.author.clone()),
            publish_date: content
                .and_then(|c| c.publish_date)
                .map(|d| d.to_rfc3339()),
            word_count: content.and_then(|c| c.word_count),
        },
        categories: snap
            .categories_of(aidx)
            .iter()
            .map(|&cidx| CategoryRef {
                id: snap.categories[cidx].category_id,
                name: snap.categories[cidx].category_name.clone(),
            })
            .collect(),
        images: snap
            .images_of(aidx)
            .map(|img| ImageInfo {
                image_url: img.image_url.clone(),
                caption: img.caption.clone(),
            })
            .collect(),
        engagement: ArticleEngagement {
            post_count,
            total_reposts,
            total_favorites,
        },
        top_posts,
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct UserActivity {
    pub total_posts: u64,
    pub articles_shared: u64,
    pub fake_posts: u64,
    pub real_posts: u64,
    pub fake_percentage: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserDetail {
    pub user_id: UserId,
    pub username: String,
    pub display_name: Option<String>,
    pub verified: bool,
    pub followers_count: u64,
    pub following_count: u64,
    pub created_at: Option<String>,
    pub activity: UserActivity,
}

/// Profile plus sharing activity for one user, or `None` when unknown.
pub fn user_detail(snap: &Snapshot, user_id: UserId) -> Option<UserDetail> {
    let user = snap.user(user_id)?;

    let mut total_posts = 0u64;
    let mut fake_posts = 0u64;
    let mut real_posts = 0u64;
    let mut articles = std::collections::HashSet::new();
    for post in &snap.posts {
        if post.user_id != user_id {
            continue;
        }
        total_posts += 1;
        if let Some(aidx) = snap.article_index(&post.article_id) {
            articles.insert(aidx);
            match snap.articles[aidx].label {
                Label::Fake => fake_posts += 1,
                Label::Real => real_posts += 1,
                Label::Unknown => {}
            }
        }
    }

    Some(UserDetail {
        user_id: user.user_id,
        username: user.username.clone(),
        display_name: user.display_name.clone(),
        verified: user.verified,
        followers_count: user.followers_count,
        following_count: user.following_count,
        created_at: user.created_at.map(|d| d.to_rfc3339()),
        activity: UserActivity {
            total_posts,
            articles_shared: articles.len() as u64,
            fake_posts,
            real_posts,
            fake_percentage: round2(safe_ratio(fake_posts, total_posts)),
        },
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceRow {
    pub source_id: SourceId,
    pub source_name: String,
    pub source_url: Option<String>,
    pub credibility_rating: Option<f64>,
}

pub fn list_sources(snap: &Snapshot) -> Vec<SourceRow> {
    snap.sources
        .iter()
        .map(|s| SourceRow {
            source_id: s.source_id,
            source_name: s.source_name.clone(),
            source_url: s.source_url.clone(),
            credibility_rating: s.credibility_rating,
        })
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryRow {
    pub category_id: CategoryId,
    pub category_name: String,
    pub description: Option<String>,
}

pub fn list_categories(snap: &Snapshot) -> Vec<CategoryRow> {
    snap.categories
        .iter()
        .map(|c| CategoryRow {
            category_id: c.category_id,
            category_name: c.category_name.clone(),
            description: c.description.clone(),
        })
        .collect()
}

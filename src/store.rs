//! # Snapshot Store
//!
//! In-memory, read-only view of the relational dataset the engine
//! aggregates over. Entities live in per-table arenas addressed by index;
//! relationships are id→index maps plus a paired-index vector for the
//! Article↔Category junction, so neither side owns the other.
//!
//! [`MemoryStore`] hands out [`Arc<Snapshot>`] clones: every grouped query
//! runs against one immutable snapshot, which makes reads safe while an
//! operator swaps in a freshly loaded dataset. Sub-queries of a composite
//! request each take their own snapshot, so cross-query skew is possible
//! and accepted.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::model::{
    Article, ArticleCategory, ArticleId, Category, CategoryId, Content, Image, Post, PostId,
    Repost, Source, SourceId, User, UserId,
};

#[derive(Debug, Error)]
pub enum StoreError {
    /// No dataset has been installed; requests cannot be served.
    #[error("no dataset loaded")]
    Unavailable,
    #[error("failed to read dataset file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse dataset: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Serde document with one array per upstream table. All tables are
/// optional so partial fixtures deserialize cleanly.
#[derive(Debug, Default, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub sources: Vec<Source>,
    #[serde(default)]
    pub articles: Vec<Article>,
    #[serde(default)]
    pub contents: Vec<Content>,
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub article_categories: Vec<ArticleCategory>,
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub posts: Vec<Post>,
    #[serde(default)]
    pub reposts: Vec<Repost>,
}

/// Immutable, indexed view of one dataset generation.
#[derive(Debug)]
pub struct Snapshot {
    pub sources: Vec<Source>,
    pub articles: Vec<Article>,
    pub categories: Vec<Category>,
    pub users: Vec<User>,
    pub posts: Vec<Post>,
    pub reposts: Vec<Repost>,

    contents: Vec<Content>,
    images: Vec<Image>,

    source_by_id: HashMap<SourceId, usize>,
    article_by_id: HashMap<ArticleId, usize>,
    category_by_id: HashMap<CategoryId, usize>,
    user_by_id: HashMap<UserId, usize>,
    post_by_id: HashMap<PostId, usize>,

    content_by_article: HashMap<usize, usize>,
    images_by_article: HashMap<usize, Vec<usize>>,
    posts_by_article: HashMap<usize, Vec<usize>>,

    /// Article↔Category junction as (article index, category index) pairs.
    category_links: Vec<(usize, usize)>,
    categories_by_article: HashMap<usize, Vec<usize>>,
}

impl Snapshot {
    /// Index a raw dataset. Rows with dangling foreign keys are dropped
    /// (the upstream importer owns referential integrity; we only refuse
    /// to aggregate rows we cannot join).
    pub fn build(dataset: Dataset) -> Self {
        let Dataset {
            sources,
            articles,
            contents,
            images,
            categories,
            article_categories,
            users,
            posts,
            reposts,
        } = dataset;

        let source_by_id: HashMap<_, _> = sources
            .iter()
            .enumerate()
            .map(|(i, s)| (s.source_id, i))
            .collect();
        let article_by_id: HashMap<_, _> = articles
            .iter()
            .enumerate()
            .map(|(i, a)| (a.article_id.clone(), i))
            .collect();
        let category_by_id: HashMap<_, _> = categories
            .iter()
            .enumerate()
            .map(|(i, c)| (c.category_id, i))
            .collect();
        let user_by_id: HashMap<_, _> = users
            .iter()
            .enumerate()
            .map(|(i, u)| (u.user_id, i))
            .collect();

        let mut dropped = 0usize;

        // A post must reference exactly one existing article and user.
        let posts: Vec<Post> = posts
            .into_iter()
            .filter(|p| {
                let ok = article_by_id.contains_key(&p.article_id)
                    && user_by_id.contains_key(&p.user_id);
                if !ok {
                    dropped += 1;
                }
                ok
            })
            .collect();
        let post_by_id: HashMap<_, _> = posts
            .iter()
            .enumerate()
            .map(|(i, p)| (p.post_id, i))
            .collect();

        let mut posts_by_article: HashMap<usize, Vec<usize>> = HashMap::new();
        for (i, p) in posts.iter().enumerate() {
            let aidx = article_by_id[&p.article_id];
            posts_by_article.entry(aidx).or_default().push(i);
        }

        let reposts: Vec<Repost> = reposts
            .into_iter()
            .filter(|r| {
                let ok = post_by_id.contains_key(&r.post_id) && user_by_id.contains_key(&r.user_id);
                if !ok {
                    dropped += 1;
                }
                ok
            })
            .collect();

        // One content row per article; later duplicates lose.
        let mut content_by_article = HashMap::new();
        for (i, c) in contents.iter().enumerate() {
            match article_by_id.get(&c.article_id) {
                Some(&aidx) => {
                    content_by_article.entry(aidx).or_insert(i);
                }
                None => dropped += 1,
            }
        }

        let mut images_by_article: HashMap<usize, Vec<usize>> = HashMap::new();
        for (i, img) in images.iter().enumerate() {
            match article_by_id.get(&img.article_id) {
                Some(&aidx) => images_by_article.entry(aidx).or_default().push(i),
                None => {
                    dropped += 1;
                    continue;
                }
            };
        }

        let mut seen_links = HashSet::new();
        let mut category_links = Vec::with_capacity(article_categories.len());
        let mut categories_by_article: HashMap<usize, Vec<usize>> = HashMap::new();
        for link in &article_categories {
            let (Some(&aidx), Some(&cidx)) = (
                article_by_id.get(&link.article_id),
                category_by_id.get(&link.category_id),
            ) else {
                dropped += 1;
                continue;
            };
            if !seen_links.insert((aidx, cidx)) {
                continue;
            }
            category_links.push((aidx, cidx));
            categories_by_article.entry(aidx).or_default().push(cidx);
        }

        if dropped > 0 {
            warn!(dropped, "dataset rows with dangling references were skipped");
        }

        Self {
            sources,
            articles,
            categories,
            users,
            posts,
            reposts,
            contents,
            images,
            source_by_id,
            article_by_id,
            category_by_id,
            user_by_id,
            post_by_id,
            content_by_article,
            images_by_article,
            posts_by_article,
            category_links,
            categories_by_article,
        }
    }

    pub fn source(&self, id: SourceId) -> Option<&Source> {
        self.source_by_id.get(&id).map(|&i| &self.sources[i])
    }

    pub fn source_index(&self, id: SourceId) -> Option<usize> {
        self.source_by_id.get(&id).copied()
    }

    pub fn article_index(&self, id: &str) -> Option<usize> {
        self.article_by_id.get(id).copied()
    }

    pub fn category_index(&self, id: CategoryId) -> Option<usize> {
        self.category_by_id.get(&id).copied()
    }

    pub fn user(&self, id: UserId) -> Option<&User> {
        self.user_by_id.get(&id).map(|&i| &self.users[i])
    }

    pub fn user_index(&self, id: UserId) -> Option<usize> {
        self.user_by_id.get(&id).copied()
    }

    pub fn post(&self, id: PostId) -> Option<&Post> {
        self.post_by_id.get(&id).map(|&i| &self.posts[i])
    }

    /// Indexes of the posts referencing an article.
    pub fn posts_of(&self, article_idx: usize) -> &[usize] {
        self.posts_by_article
            .get(&article_idx)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn content_of(&self, article_idx: usize) -> Option<&Content> {
        self.content_by_article
            .get(&article_idx)
            .map(|&i| &self.contents[i])
    }

    pub fn images_of(&self, article_idx: usize) -> impl Iterator<Item = &Image> {
        self.images_by_article
            .get(&article_idx)
            .map(Vec::as_slice)
            .unwrap_or(&[])
            .iter()
            .map(|&i| &self.images[i])
    }

    /// Category indexes linked to an article.
    pub fn categories_of(&self, article_idx: usize) -> &[usize] {
        self.categories_by_article
            .get(&article_idx)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The raw junction pairs, in dataset order.
    pub fn category_links(&self) -> &[(usize, usize)] {
        &self.category_links
    }
}

/// Store handle shared across requests. Holds the current snapshot and,
/// when constructed from a file, remembers the path so an operator can
/// reload a refreshed dataset without restarting.
#[derive(Debug)]
pub struct MemoryStore {
    path: Option<PathBuf>,
    current: RwLock<Option<Arc<Snapshot>>>,
}

impl MemoryStore {
    /// A store with no dataset; every `snapshot()` fails with
    /// [`StoreError::Unavailable`] until one is installed.
    pub fn unloaded() -> Self {
        Self {
            path: None,
            current: RwLock::new(None),
        }
    }

    /// Wrap an already-built snapshot (fixtures, tests).
    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        Self {
            path: None,
            current: RwLock::new(Some(Arc::new(snapshot))),
        }
    }

    /// Load the dataset document at `path` and index it.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let snapshot = read_snapshot(&path)?;
        info!(
            articles = snapshot.articles.len(),
            posts = snapshot.posts.len(),
            reposts = snapshot.reposts.len(),
            users = snapshot.users.len(),
            "dataset loaded"
        );
        Ok(Self {
            path: Some(path),
            current: RwLock::new(Some(Arc::new(snapshot))),
        })
    }

    /// Current snapshot, or `Unavailable` when none is loaded.
    pub fn snapshot(&self) -> Result<Arc<Snapshot>, StoreError> {
        self.current
            .read()
            .expect("store rwlock poisoned")
            .clone()
            .ok_or(StoreError::Unavailable)
    }

    /// Atomically install a new snapshot; in-flight queries keep the one
    /// they already hold.
    pub fn replace(&self, snapshot: Snapshot) {
        let mut guard = self.current.write().expect("store rwlock poisoned");
        *guard = Some(Arc::new(snapshot));
    }

    /// Re-read the dataset file this store was loaded from. On failure the
    /// previous snapshot stays installed.
    pub fn reload(&self) -> Result<(), StoreError> {
        let path = self.path.as_ref().ok_or(StoreError::Unavailable)?;
        let snapshot = read_snapshot(path)?;
        info!(
            path = %path.display(),
            articles = snapshot.articles.len(),
            posts = snapshot.posts.len(),
            "dataset reloaded"
        );
        self.replace(snapshot);
        Ok(())
    }
}

fn read_snapshot(path: &Path) -> Result<Snapshot, StoreError> {
    let raw = std::fs::read_to_string(path)?;
    let dataset: Dataset = serde_json::from_str(&raw)?;
    Ok(Snapshot::build(dataset))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Label;
    use chrono::Utc;
    use std::io::Write as _;

    fn article(id: &str, label: Label) -> Article {
        Article {
            article_id: id.to_string(),
            source_id: None,
            url: format!("https://news.example/{id}"),
            title: format!("article {id}"),
            label,
            created_at: Utc::now(),
        }
    }

    fn user(id: UserId) -> User {
        User {
            user_id: id,
            username: format!("user{id}"),
            display_name: None,
            verified: false,
            followers_count: 0,
            following_count: 0,
            created_at: None,
        }
    }

    fn post(id: PostId, article_id: &str, user_id: UserId) -> Post {
        Post {
            post_id: id,
            article_id: article_id.to_string(),
            user_id,
            text: None,
            created_at: Utc::now(),
            repost_count: 0,
            favorite_count: 0,
        }
    }

    #[test]
    fn dangling_posts_and_reposts_are_dropped() {
        let snap = Snapshot::build(Dataset {
            articles: vec![article("a1", Label::Fake)],
            users: vec![user(1)],
            posts: vec![
                post(10, "a1", 1),
                post(11, "missing-article", 1),
                post(12, "a1", 99),
            ],
            reposts: vec![
                Repost {
                    repost_id: 100,
                    post_id: 10,
                    user_id: 1,
                    reposted_at: None,
                },
                Repost {
                    repost_id: 101,
                    post_id: 999,
                    user_id: 1,
                    reposted_at: None,
                },
            ],
            ..Dataset::default()
        });

        assert_eq!(snap.posts.len(), 1);
        assert_eq!(snap.reposts.len(), 1);
        assert_eq!(snap.posts_of(0), &[0]);
    }

    #[test]
    fn duplicate_category_links_collapse() {
        let snap = Snapshot::build(Dataset {
            articles: vec![article("a1", Label::Real)],
            categories: vec![Category {
                category_id: 1,
                category_name: "politics".into(),
                description: None,
            }],
            article_categories: vec![
                ArticleCategory {
                    article_id: "a1".into(),
                    category_id: 1,
                },
                ArticleCategory {
                    article_id: "a1".into(),
                    category_id: 1,
                },
            ],
            ..Dataset::default()
        });

        assert_eq!(snap.category_links().len(), 1);
        assert_eq!(snap.categories_of(0), &[0]);
    }

    #[test]
    fn unloaded_store_reports_unavailable() {
        let store = MemoryStore::unloaded();
        assert!(matches!(store.snapshot(), Err(StoreError::Unavailable)));
        assert!(matches!(store.reload(), Err(StoreError::Unavailable)));
    }

    #[test]
    fn from_path_round_trips_a_dataset_file() {
        let mut file = tempfile::NamedTempFile::new().expect("tmp file");
        write!(
            file,
            r#"{{"articles":[{{"article_id":"a1","url":"u","title":"t","label":"fake","created_at":"2026-01-01T00:00:00Z"}}]}}"#
        )
        .expect("write dataset");

        let store = MemoryStore::from_path(file.path()).expect("load dataset");
        let snap = store.snapshot().expect("snapshot");
        assert_eq!(snap.articles.len(), 1);
        assert_eq!(snap.articles[0].label, Label::Fake);
    }
}

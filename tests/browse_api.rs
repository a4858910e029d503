// tests/browse_api.rs
//
// Catalog reads: filtered/paginated article listings, case-insensitive
// search, article detail with degraded sub-fields, and user activity.

use chrono::{Duration, Utc};

use news_spread_analyzer::catalog::{self, ArticleFilter};
use news_spread_analyzer::filters::PageParams;
use news_spread_analyzer::model::{
    Article, ArticleCategory, Category, Content, Label, Post, Source, User,
};
use news_spread_analyzer::store::{Dataset, Snapshot};

fn article(id: &str, title: &str, label: Label, age_days: i64) -> Article {
    Article {
        article_id: id.to_string(),
        source_id: Some(1),
        url: format!("https://news.example/{id}"),
        title: title.to_string(),
        label,
        created_at: Utc::now() - Duration::days(age_days),
    }
}

fn fixture() -> Snapshot {
    Snapshot::build(Dataset {
        sources: vec![Source {
            source_id: 1,
            source_name: "Gazette".into(),
            source_url: Some("https://gazette.example".into()),
            credibility_rating: Some(0.8),
        }],
        articles: vec![
            article("a1", "Election fraud claims debunked", Label::Real, 1),
            article("a2", "ELECTION night surprises", Label::Fake, 2),
            article("a3", "Sports roundup", Label::Real, 3),
        ],
        contents: vec![Content {
            article_id: "a1".into(),
            text: Some("Body text".into()),
            publish_date: None,
            author: Some("A. Reporter".into()),
            word_count: Some(2),
        }],
        categories: vec![Category {
            category_id: 7,
            category_name: "politics".into(),
            description: None,
        }],
        article_categories: vec![
            ArticleCategory {
                article_id: "a1".into(),
                category_id: 7,
            },
            ArticleCategory {
                article_id: "a2".into(),
                category_id: 7,
            },
        ],
        users: vec![User {
            user_id: 1,
            username: "amplifier".into(),
            display_name: None,
            verified: true,
            followers_count: 500,
            following_count: 5,
            created_at: None,
        }],
        posts: vec![
            Post {
                post_id: 10,
                article_id: "a1".into(),
                user_id: 1,
                text: Some("read this".into()),
                created_at: Utc::now() - Duration::hours(1),
                repost_count: 7,
                favorite_count: 3,
            },
            Post {
                post_id: 11,
                article_id: "a2".into(),
                user_id: 1,
                text: None,
                created_at: Utc::now() - Duration::hours(2),
                repost_count: 1,
                favorite_count: 0,
            },
        ],
        ..Dataset::default()
    })
}

#[test]
fn listing_is_newest_first_and_paginated() {
    let snap = fixture();
    let page = catalog::list_articles(
        &snap,
        &ArticleFilter::default(),
        PageParams { page: 1, per_page: 2 },
    );

    assert_eq!(page.total, 3);
    assert_eq!(page.pages, 2);
    assert_eq!(page.current_page, 1);
    assert_eq!(page.articles.len(), 2);
    assert_eq!(page.articles[0].article_id, "a1");
    assert_eq!(page.articles[1].article_id, "a2");

    let page2 = catalog::list_articles(
        &snap,
        &ArticleFilter::default(),
        PageParams { page: 2, per_page: 2 },
    );
    assert_eq!(page2.articles.len(), 1);
    assert_eq!(page2.articles[0].article_id, "a3");

    // Past the end: empty list, not an error.
    let page9 = catalog::list_articles(
        &snap,
        &ArticleFilter::default(),
        PageParams { page: 9, per_page: 2 },
    );
    assert!(page9.articles.is_empty());
    assert_eq!(page9.total, 3);
}

#[test]
fn search_is_case_insensitive_substring() {
    let snap = fixture();
    let page = catalog::list_articles(
        &snap,
        &ArticleFilter {
            search: Some("election".into()),
            ..ArticleFilter::default()
        },
        PageParams::default(),
    );
    assert_eq!(page.total, 2);
}

#[test]
fn category_and_label_filters_combine() {
    let snap = fixture();
    let page = catalog::list_articles(
        &snap,
        &ArticleFilter {
            label: Some(Label::Fake),
            category_id: Some(7),
            ..ArticleFilter::default()
        },
        PageParams::default(),
    );
    assert_eq!(page.total, 1);
    assert_eq!(page.articles[0].article_id, "a2");
    assert_eq!(page.articles[0].categories, vec!["politics".to_string()]);
}

#[test]
fn unknown_category_filter_matches_nothing() {
    let snap = fixture();
    let page = catalog::list_articles(
        &snap,
        &ArticleFilter {
            category_id: Some(99),
            ..ArticleFilter::default()
        },
        PageParams::default(),
    );
    assert_eq!(page.total, 0);
    assert_eq!(page.pages, 0);
}

#[test]
fn article_detail_carries_relations_and_engagement() {
    let snap = fixture();
    let detail = catalog::article_detail(&snap, "a1").expect("a1 exists");

    assert_eq!(detail.source.as_ref().expect("source").source_name, "Gazette");
    assert_eq!(detail.content.author.as_deref(), Some("A. Reporter"));
    assert_eq!(detail.categories.len(), 1);
    assert_eq!(detail.engagement.post_count, 1);
    assert_eq!(detail.engagement.total_reposts, 7);
    assert_eq!(detail.top_posts.len(), 1);
    assert_eq!(detail.top_posts[0].username.as_deref(), Some("amplifier"));
}

#[test]
fn article_detail_degrades_missing_relations_to_nulls() {
    let snap = fixture();
    // a3 has no content, no categories, no posts.
    let detail = catalog::article_detail(&snap, "a3").expect("a3 exists");
    assert!(detail.content.text.is_none());
    assert!(detail.categories.is_empty());
    assert_eq!(detail.engagement.post_count, 0);
    assert!(detail.top_posts.is_empty());

    assert!(catalog::article_detail(&snap, "missing").is_none());
}

#[test]
fn user_detail_reports_sharing_activity() {
    let snap = fixture();
    let detail = catalog::user_detail(&snap, 1).expect("user exists");

    assert_eq!(detail.activity.total_posts, 2);
    assert_eq!(detail.activity.articles_shared, 2);
    assert_eq!(detail.activity.fake_posts, 1);
    assert_eq!(detail.activity.real_posts, 1);
    assert_eq!(detail.activity.fake_percentage, 50.0);

    assert!(catalog::user_detail(&snap, 404).is_none());
}

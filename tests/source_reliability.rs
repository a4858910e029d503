// tests/source_reliability.rs
//
// Source-reliability timeline: minimum-sample suppression, reliability
// scoring, chronological ordering, and the unknown-label bucket policy.

use chrono::{DateTime, Utc};

use news_spread_analyzer::engine::{SourceTimelineQuery, MIN_TIMELINE_SAMPLES};
use news_spread_analyzer::filters::Window;
use news_spread_analyzer::format::reliability_timelines;
use news_spread_analyzer::model::{Article, Label, Source};
use news_spread_analyzer::store::{Dataset, Snapshot};

fn source(id: i32, name: &str) -> Source {
    Source {
        source_id: id,
        source_name: name.to_string(),
        source_url: None,
        credibility_rating: Some(0.5),
    }
}

fn article_at(id: usize, source_id: i32, label: Label, ts: &str) -> Article {
    Article {
        article_id: format!("a{id}"),
        source_id: Some(source_id),
        url: "https://news.example".into(),
        title: format!("article {id}"),
        label,
        created_at: ts.parse::<DateTime<Utc>>().expect("timestamp"),
    }
}

/// Timestamps inside the current month so a trailing 12-month window
/// always covers them.
fn this_month(day: u32) -> String {
    Utc::now()
        .format(&format!("%Y-%m-{day:02}T12:00:00Z"))
        .to_string()
}

#[test]
fn sparse_source_months_are_suppressed() {
    let mut articles = Vec::new();
    // Source 1: 6 articles this month (kept). Source 2: 3 (suppressed).
    for i in 0..6 {
        articles.push(article_at(i, 1, Label::Real, &this_month(1 + i as u32)));
    }
    for i in 6..9 {
        articles.push(article_at(i, 2, Label::Fake, &this_month(1 + i as u32)));
    }
    let snap = Snapshot::build(Dataset {
        sources: vec![source(1, "Gazette"), source(2, "Tabloid")],
        articles,
        ..Dataset::default()
    });

    let rows = SourceTimelineQuery::new(Window::last_months(12)).run(&snap);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].source_name, "Gazette");
    for row in &rows {
        assert!(row.total >= MIN_TIMELINE_SAMPLES);
    }
}

#[test]
fn reliability_score_is_real_share_of_total() {
    let mut articles = Vec::new();
    for i in 0..4 {
        articles.push(article_at(i, 1, Label::Real, &this_month(1 + i as u32)));
    }
    articles.push(article_at(4, 1, Label::Fake, &this_month(10)));
    let snap = Snapshot::build(Dataset {
        sources: vec![source(1, "Gazette")],
        articles,
        ..Dataset::default()
    });

    let rows = SourceTimelineQuery::new(Window::last_months(12)).run(&snap);
    let timelines = reliability_timelines(&rows);
    assert_eq!(timelines.len(), 1);

    let month = &timelines[0].timeline[0];
    assert_eq!(month.total_articles, 5);
    assert_eq!(month.fake_articles, 1);
    assert_eq!(month.reliability_score, 80.0);
}

#[test]
fn unknown_labels_count_toward_total_but_neither_bucket() {
    let mut articles = Vec::new();
    for i in 0..3 {
        articles.push(article_at(i, 1, Label::Real, &this_month(1 + i as u32)));
    }
    for i in 3..6 {
        articles.push(article_at(i, 1, Label::Unknown, &this_month(1 + i as u32)));
    }
    let snap = Snapshot::build(Dataset {
        sources: vec![source(1, "Gazette")],
        articles,
        ..Dataset::default()
    });

    let rows = SourceTimelineQuery::new(Window::last_months(12)).run(&snap);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].total, 6);
    assert_eq!(rows[0].fake, 0);
    assert_eq!(rows[0].real, 3);

    // 3 real of 6 total -> 50%, not the 100% a fake/real-only total
    // would claim.
    let timelines = reliability_timelines(&rows);
    assert_eq!(timelines[0].timeline[0].reliability_score, 50.0);
}

#[test]
fn timelines_are_chronological_per_source() {
    // A generous window; the shape only bounds the past.
    let rows = SourceTimelineQuery::new(Window::last_months(240)).run(&Snapshot::build(Dataset {
        sources: vec![source(1, "Gazette")],
        articles: (0..12)
            .map(|i| {
                let month = if i < 6 { "2026-05" } else { "2026-06" };
                article_at(i, 1, Label::Real, &format!("{month}-10T00:00:00Z"))
            })
            .collect(),
        ..Dataset::default()
    }));

    let timelines = reliability_timelines(&rows);
    assert_eq!(timelines.len(), 1);
    let months: Vec<&str> = timelines[0]
        .timeline
        .iter()
        .map(|m| m.month.as_str())
        .collect();
    assert_eq!(months, vec!["2026-05", "2026-06"]);
}

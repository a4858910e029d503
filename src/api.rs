//! # HTTP Surface
//!
//! Thin axum layer over the aggregation engine: handlers normalize request
//! parameters through the filter builder, take one store snapshot per
//! sub-query, run the typed aggregation, and serialize the formatted
//! result. All endpoints are read-only GETs; the only write-ish route is
//! the admin dataset reload.
//!
//! Query strings are parsed as a raw map so malformed numerics fall back
//! to endpoint defaults instead of failing the request.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tracing::warn;

use crate::catalog::{self, ArticleFilter};
use crate::engine::{
    CategoryDistributionQuery, CategoryPerformanceQuery, DailyTrendQuery, OverviewStats,
    SourceCredibilityQuery, SourceTimelineQuery, TopSpreadersQuery, UserBehaviorQuery,
    ViralContentQuery,
};
use crate::filters::{self, Window};
use crate::format;
use crate::metrics::track_request;
use crate::model::{Label, UserId};
use crate::network::{self, DEFAULT_NODE_LIMIT};
use crate::ratio::safe_avg;
use crate::store::{MemoryStore, StoreError};

#[derive(Clone)]
pub struct AppState {
    store: Arc<MemoryStore>,
}

impl AppState {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/analytical/temporal-trends", get(temporal_trends))
        .route("/analytical/network-analysis", get(network_analysis))
        .route("/analytical/category-performance", get(category_performance))
        .route("/analytical/user-behavior", get(user_behavior))
        .route("/analytical/source-timeline", get(source_timeline))
        .route("/operational/viral-content", get(viral_content))
        .route("/operational/influencers", get(influencers))
        .route("/operational/source-credibility", get(source_credibility))
        .route(
            "/operational/category-distribution",
            get(category_distribution),
        )
        .route("/api/articles", get(articles))
        .route("/api/articles/{id}", get(article_detail))
        .route("/api/users/{id}", get(user_detail))
        .route("/api/sources", get(sources))
        .route("/api/categories", get(categories))
        .route("/api/stats/overview", get(overview))
        .route("/admin/reload-dataset", get(admin_reload_dataset))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// Request-level failure. Everything the engine computes is infallible;
/// only store access and entity lookups can fail.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn not_found(what: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: format!("{what} not found"),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        let status = match err {
            StoreError::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({ "error": self.message }));
        (self.status, body).into_response()
    }
}

type Params = Query<HashMap<String, String>>;

// ---- analytical ----

async fn temporal_trends(
    State(state): State<AppState>,
    Query(params): Params,
) -> Result<Json<Vec<format::TrendPoint>>, ApiError> {
    track_request("temporal_trends");
    let snap = state.store.snapshot()?;
    let rows = DailyTrendQuery {
        window: Window::last_days(filters::int_param(&params, "days", 30)),
        label: filters::label_param(&params),
    }
    .run(&snap);
    Ok(Json(format::time_series(&rows)))
}

async fn network_analysis(
    State(state): State<AppState>,
    Query(params): Params,
) -> Result<Json<network::NetworkGraph>, ApiError> {
    track_request("network_analysis");
    let snap = state.store.snapshot()?;
    let limit = filters::int_param(&params, "limit", DEFAULT_NODE_LIMIT as i64) as usize;
    Ok(Json(network::build_network(&snap, limit)))
}

async fn category_performance(
    State(state): State<AppState>,
    Query(params): Params,
) -> Result<Json<Vec<format::HeatmapCell>>, ApiError> {
    track_request("category_performance");
    let snap = state.store.snapshot()?;
    let rows = CategoryPerformanceQuery {
        window: Window::last_months(filters::int_param(&params, "months", 6)),
    }
    .run(&snap);
    Ok(Json(format::heatmap(&rows)))
}

#[derive(Serialize)]
struct BehaviorOut {
    user_type: &'static str,
    news_type: Label,
    unique_users: u64,
    total_posts: u64,
    avg_followers: f64,
    total_reach: u64,
    posts_per_user: f64,
}

async fn user_behavior(
    State(state): State<AppState>,
) -> Result<Json<Vec<BehaviorOut>>, ApiError> {
    track_request("user_behavior");
    let snap = state.store.snapshot()?;
    let out = UserBehaviorQuery
        .run(&snap)
        .into_iter()
        .map(|row| BehaviorOut {
            user_type: if row.verified { "Verified" } else { "Unverified" },
            news_type: row.label,
            unique_users: row.unique_users,
            total_posts: row.post_count,
            avg_followers: safe_avg(row.followers_sum, row.post_count),
            total_reach: row.total_reach,
            posts_per_user: safe_avg(row.post_count, row.unique_users),
        })
        .collect();
    Ok(Json(out))
}

async fn source_timeline(
    State(state): State<AppState>,
    Query(params): Params,
) -> Result<Json<Vec<format::SourceTimeline>>, ApiError> {
    track_request("source_timeline");
    let snap = state.store.snapshot()?;
    let rows = SourceTimelineQuery::new(Window::last_months(filters::int_param(
        &params, "months", 12,
    )))
    .run(&snap);
    Ok(Json(format::reliability_timelines(&rows)))
}

// ---- operational ----

#[derive(Serialize)]
struct ViralOut {
    article_id: String,
    title: String,
    url: String,
    label: Label,
    post_count: u64,
    repost_count: u64,
    favorite_count: u64,
    engagement_score: f64,
}

async fn viral_content(
    State(state): State<AppState>,
    Query(params): Params,
) -> Result<Json<Vec<ViralOut>>, ApiError> {
    track_request("viral_content");
    let snap = state.store.snapshot()?;
    let rows = ViralContentQuery {
        window: Window::last_hours(filters::int_param(&params, "hours", 24)),
        label: filters::label_param(&params),
        limit: ViralContentQuery::DEFAULT_LIMIT,
    }
    .run(&snap);
    let out = rows
        .into_iter()
        .map(|r| ViralOut {
            article_id: r.article_id,
            title: r.title,
            url: r.url,
            label: r.label,
            post_count: r.post_count,
            repost_count: r.repost_count,
            favorite_count: r.favorite_count,
            engagement_score: r.engagement_score,
        })
        .collect();
    Ok(Json(out))
}

#[derive(Serialize)]
struct InfluencerOut {
    user_id: UserId,
    username: String,
    display_name: Option<String>,
    verified: bool,
    followers_count: u64,
    post_count: u64,
    impact_score: u64,
}

async fn influencers(
    State(state): State<AppState>,
    Query(params): Params,
) -> Result<Json<Vec<InfluencerOut>>, ApiError> {
    track_request("influencers");
    let snap = state.store.snapshot()?;
    let rows = TopSpreadersQuery {
        label: filters::label_param(&params),
        limit: filters::int_param(&params, "limit", 50) as usize,
    }
    .run(&snap);
    let out = rows
        .into_iter()
        .map(|r| InfluencerOut {
            user_id: r.user_id,
            username: r.username,
            display_name: r.display_name,
            verified: r.verified,
            followers_count: r.followers_count,
            post_count: r.post_count,
            impact_score: r.reach,
        })
        .collect();
    Ok(Json(out))
}

#[derive(Serialize)]
struct CredibilityOut {
    source_id: i32,
    source_name: String,
    credibility_rating: Option<f64>,
    article_count: u64,
    fake_count: u64,
    real_count: u64,
    fake_percentage: f64,
}

async fn source_credibility(
    State(state): State<AppState>,
) -> Result<Json<Vec<CredibilityOut>>, ApiError> {
    track_request("source_credibility");
    let snap = state.store.snapshot()?;
    let out = SourceCredibilityQuery
        .run(&snap)
        .into_iter()
        .map(|r| CredibilityOut {
            source_id: r.source_id,
            source_name: r.source_name,
            credibility_rating: r.credibility_rating,
            article_count: r.article_count,
            fake_count: r.fake_count,
            real_count: r.real_count,
            fake_percentage: r.fake_percentage,
        })
        .collect();
    Ok(Json(out))
}

async fn category_distribution(
    State(state): State<AppState>,
    Query(params): Params,
) -> Result<Json<Vec<crate::engine::CategoryDistributionRow>>, ApiError> {
    track_request("category_distribution");
    let snap = state.store.snapshot()?;
    let rows = CategoryDistributionQuery {
        window: Window::last_hours(filters::int_param(&params, "hours", 24)),
    }
    .run(&snap);
    Ok(Json(rows))
}

// ---- browse API ----

async fn articles(
    State(state): State<AppState>,
    Query(params): Params,
) -> Result<Json<catalog::ArticlePage>, ApiError> {
    track_request("articles");
    let snap = state.store.snapshot()?;
    let filter = ArticleFilter {
        label: filters::label_param(&params),
        source_id: filters::id_param(&params, "source_id"),
        category_id: filters::id_param(&params, "category_id"),
        search: filters::search_param(&params),
    };
    let page = filters::page_params(&params);
    Ok(Json(catalog::list_articles(&snap, &filter, page)))
}

async fn article_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<catalog::ArticleDetail>, ApiError> {
    track_request("article_detail");
    let snap = state.store.snapshot()?;
    catalog::article_detail(&snap, &id)
        .map(Json)
        .ok_or_else(|| ApiError::not_found("article"))
}

async fn user_detail(
    State(state): State<AppState>,
    Path(id): Path<UserId>,
) -> Result<Json<catalog::UserDetail>, ApiError> {
    track_request("user_detail");
    let snap = state.store.snapshot()?;
    catalog::user_detail(&snap, id)
        .map(Json)
        .ok_or_else(|| ApiError::not_found("user"))
}

async fn sources(
    State(state): State<AppState>,
) -> Result<Json<Vec<catalog::SourceRow>>, ApiError> {
    track_request("sources");
    let snap = state.store.snapshot()?;
    Ok(Json(catalog::list_sources(&snap)))
}

async fn categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<catalog::CategoryRow>>, ApiError> {
    track_request("categories");
    let snap = state.store.snapshot()?;
    Ok(Json(catalog::list_categories(&snap)))
}

async fn overview(State(state): State<AppState>) -> Result<Json<OverviewStats>, ApiError> {
    track_request("overview");
    let snap = state.store.snapshot()?;
    Ok(Json(OverviewStats::compute(&snap)))
}

// ---- admin ----

async fn admin_reload_dataset(State(state): State<AppState>) -> String {
    track_request("reload_dataset");
    match state.store.reload() {
        Ok(()) => {
            if let Ok(snap) = state.store.snapshot() {
                crate::metrics::record_snapshot_size(&snap);
            }
            "reloaded".to_string()
        }
        Err(e) => {
            warn!(error = %e, "dataset reload failed");
            format!("failed: {e}")
        }
    }
}

use axum::{routing::get, Router};
use metrics::{counter, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::store::Snapshot;

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Initialize the Prometheus recorder. Call once from the binary;
    /// without a recorder installed the macros below are no-ops, which is
    /// what tests want.
    pub fn init() -> Self {
        let builder = PrometheusBuilder::new();

        let handle = builder
            .install_recorder()
            .expect("prometheus: install recorder");

        Self { handle }
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}

/// Count one dashboard request against its endpoint label.
pub fn track_request(endpoint: &'static str) {
    counter!("dashboard_requests_total", "endpoint" => endpoint).increment(1);
}

/// Publish the entity counts of the currently installed snapshot.
pub fn record_snapshot_size(snap: &Snapshot) {
    gauge!("dataset_articles").set(snap.articles.len() as f64);
    gauge!("dataset_posts").set(snap.posts.len() as f64);
    gauge!("dataset_reposts").set(snap.reposts.len() as f64);
    gauge!("dataset_users").set(snap.users.len() as f64);
}

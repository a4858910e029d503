//! Dashboard Analytics Service — Binary Entrypoint
//! Boots the Axum HTTP server, wiring the dataset store, routes, and
//! middleware.

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use news_spread_analyzer::api::{self, AppState};
use news_spread_analyzer::metrics::{self, Metrics};
use news_spread_analyzer::store::MemoryStore;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("news_spread_analyzer=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    init_tracing();

    let prometheus = Metrics::init();

    // The store is the only collaborator: a snapshot of the dataset file,
    // swappable at runtime via /admin/reload-dataset.
    let store = match std::env::var("DATASET_PATH") {
        Ok(path) => {
            let store = MemoryStore::from_path(&path)
                .with_context(|| format!("loading dataset from {path}"))?;
            let snap = store.snapshot().expect("freshly loaded store has a snapshot");
            metrics::record_snapshot_size(&snap);
            store
        }
        Err(_) => {
            warn!("DATASET_PATH not set; serving 503 until a dataset is installed");
            MemoryStore::unloaded()
        }
    };

    let state = AppState::new(Arc::new(store));
    let app = api::create_router(state).merge(prometheus.router());

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("binding port {port}"))?;
    info!(port, "dashboard analytics listening");

    axum::serve(listener, app).await?;
    Ok(())
}

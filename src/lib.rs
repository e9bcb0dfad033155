// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod aggregate;
pub mod api;
pub mod config;
pub mod ingest;
pub mod metrics;

// ---- Re-exports for stable public API ----
pub use crate::aggregate::Aggregator;
pub use crate::api::{router, AppState};
pub use crate::config::{Credentials, NewsConfig};

use std::sync::Arc;

use axum::Router;
use tracing::info;

use crate::ingest::providers::NaverSearchClient;

/// Build the full router against the real Naver endpoint from `cfg`.
///
/// `credentials` is resolved by the caller (normally `Credentials::from_env()` after
/// `.env` is loaded); `None` keeps the server up but every news request answers with
/// the missing-keys error.
pub fn build_app(cfg: NewsConfig, credentials: Option<Credentials>) -> anyhow::Result<Router> {
    let client = NaverSearchClient::from_config(&cfg)?;
    info!(
        endpoint = client.endpoint(),
        metric = ?cfg.similarity_metric,
        threshold = cfg.similarity_threshold,
        window_days = cfg.window_days,
        max_concurrency = cfg.max_concurrency,
        credentials = credentials.is_some(),
        "news service configured"
    );
    let aggregator = Aggregator::from_config(Arc::new(client), &cfg);
    let state = AppState {
        aggregator: Arc::new(aggregator),
        credentials,
        config: Arc::new(cfg),
    };
    Ok(api::router(state))
}

//! Keyword news service: binary entrypoint.
//! Boots the Axum HTTP server, wiring config, credentials, metrics, and routes.

use keyword_news::{build_app, metrics::Metrics, Credentials, NewsConfig};
use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Compact logs by default, JSON with LOG_FORMAT=json. Filter from RUST_LOG, else `info`.
/// The runtime may already own the global subscriber; in that case this is a no-op.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let res = if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact())
            .try_init()
    };
    if res.is_err() {
        tracing::debug!("global tracing subscriber already installed");
    }
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    init_tracing();

    let cfg = NewsConfig::load_default()?;

    let credentials = Credentials::from_env();
    if credentials.is_none() {
        tracing::warn!("NAVER_CLIENT_ID / NAVER_CLIENT_SECRET not set; /api/news will refuse");
    }

    let mut router = build_app(cfg, credentials)?;

    match Metrics::init() {
        Ok(metrics) => router = router.merge(metrics.router()),
        Err(e) => tracing::warn!(error = %format!("{e:#}"), "metrics disabled"),
    }

    Ok(router.into())
}

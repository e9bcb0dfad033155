// src/api.rs
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

use crate::aggregate::Aggregator;
use crate::config::{Credentials, NewsConfig};
use crate::ingest::types::ResultSet;

#[derive(Clone)]
pub struct AppState {
    pub aggregator: Arc<Aggregator>,
    /// `None` when the server was started without upstream keys.
    pub credentials: Option<Credentials>,
    pub config: Arc<NewsConfig>,
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    // Everything that is not an API route is a static file; `/` serves index.html.
    let static_files = ServeDir::new(&state.config.static_dir);

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/news", post(news))
        .fallback_service(static_files)
        .layer(cors)
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct NewsReq {
    #[serde(default)]
    keywords: Vec<String>,
    #[serde(default)]
    display: Option<u32>,
}

/// Errors that abort the whole request. Upstream trouble never ends up here;
/// it degrades to an empty list for the affected keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiError {
    MissingCredentials,
    InvalidRequest,
}

impl ApiError {
    fn status(self) -> StatusCode {
        match self {
            ApiError::MissingCredentials => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::InvalidRequest => StatusCode::BAD_REQUEST,
        }
    }

    fn message(self) -> &'static str {
        match self {
            ApiError::MissingCredentials => "Missing Server API Keys",
            ApiError::InvalidRequest => "Invalid Request",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.message() });
        (self.status(), Json(body)).into_response()
    }
}

// Body is taken as raw bytes so shape errors produce our JSON error, not axum's rejection text.
async fn news(State(state): State<AppState>, body: Bytes) -> Result<Json<ResultSet>, ApiError> {
    let Some(credentials) = state.credentials.as_ref() else {
        tracing::error!("news request rejected: upstream credentials not configured");
        return Err(ApiError::MissingCredentials);
    };

    let req = parse_news_req(&body)?;
    let page = state.config.display_for(req.display);

    tracing::info!(keywords = req.keywords.len(), display = page, "news request");

    let results = state
        .aggregator
        .aggregate(&req.keywords, page, credentials)
        .await;
    Ok(Json(results))
}

fn parse_news_req(body: &[u8]) -> Result<NewsReq, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(NewsReq {
            keywords: Vec::new(),
            display: None,
        });
    }
    serde_json::from_slice(body).map_err(|e| {
        tracing::warn!(error = %e, "invalid news request body");
        ApiError::InvalidRequest
    })
}

// tests/api_http.rs
//
// HTTP-level tests for the public API Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot.
//
// Covered:
// - GET /health
// - POST /api/news (happy path, default display, invalid body, missing keys)
// - CORS preflight
// - static fallback serving index.html

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use keyword_news::ingest::types::{RawItem, SearchProvider};
use keyword_news::{api, Aggregator, AppState, Credentials, NewsConfig};
use serde_json::Value as Json;
use std::sync::{Arc, Mutex};
use tower::ServiceExt as _; // for `oneshot`

const BODY_LIMIT: usize = 1024 * 1024; // 1MB, safe for tests

/// Items dated relative to the wall clock, since the handler uses the real `now`.
struct StubProvider {
    displays: Mutex<Vec<u32>>,
}

#[async_trait]
impl SearchProvider for StubProvider {
    async fn search(&self, keyword: &str, display: u32, _c: &Credentials) -> Result<Vec<RawItem>> {
        self.displays.lock().unwrap().push(display);
        if keyword == "down" {
            return Err(anyhow!("upstream unavailable"));
        }
        let stamp = |hours: i64| {
            (Utc::now() - Duration::hours(hours))
                .format("%a, %d %b %Y %H:%M:%S %z")
                .to_string()
        };
        Ok(vec![
            RawItem {
                title: format!("<b>{keyword}</b> rally continues"),
                link: "https://n.test/1".into(),
                pub_date: stamp(1),
                description: "Stocks &amp; bonds".into(),
            },
            RawItem {
                title: format!("{keyword} rally continues"),
                link: "https://n.test/1".into(),
                pub_date: stamp(2),
                description: String::new(),
            },
        ])
    }

    fn name(&self) -> &'static str {
        "Stub"
    }
}

fn test_router(credentials: Option<Credentials>, static_dir: &str) -> (Router, Arc<StubProvider>) {
    let provider = Arc::new(StubProvider {
        displays: Mutex::new(vec![]),
    });
    let cfg = NewsConfig {
        static_dir: static_dir.to_string(),
        ..NewsConfig::default()
    };
    let state = AppState {
        aggregator: Arc::new(Aggregator::from_config(provider.clone(), &cfg)),
        credentials,
        config: Arc::new(cfg),
    };
    (api::router(state), provider)
}

fn creds() -> Option<Credentials> {
    Some(Credentials::new("id", "secret"))
}

fn post_news(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/news")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("build POST /api/news")
}

async fn read_json(resp: axum::response::Response) -> Json {
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}

#[tokio::test]
async fn api_health_returns_200_and_ok_body() {
    let (app, _) = test_router(creds(), "public");
    let req = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .expect("build GET /health");

    let resp = app.oneshot(req).await.expect("oneshot /health");
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT).await.unwrap();
    assert_eq!(String::from_utf8(bytes.to_vec()).unwrap(), "ok");
}

#[tokio::test]
async fn api_news_maps_each_keyword_to_clean_items() {
    let (app, provider) = test_router(creds(), "public");

    let resp = app
        .oneshot(post_news(r#"{"keywords":["kospi","down"],"display":20}"#))
        .await
        .expect("oneshot /api/news");
    assert_eq!(resp.status(), StatusCode::OK);

    let v = read_json(resp).await;
    let kospi = v["kospi"].as_array().expect("kospi array");
    assert_eq!(kospi.len(), 1, "same link must collapse: {v}");
    assert_eq!(kospi[0]["title"], "kospi rally continues");
    assert_eq!(kospi[0]["link"], "https://n.test/1");
    assert_eq!(kospi[0]["description"], "Stocks & bonds");
    let pub_date = kospi[0]["pubDate"].as_str().expect("pubDate string");
    assert!(
        chrono::NaiveDateTime::parse_from_str(pub_date, "%Y-%m-%d %H:%M:%S").is_ok(),
        "pubDate format: {pub_date}"
    );

    assert_eq!(v["down"], serde_json::json!([]));
    assert_eq!(*provider.displays.lock().unwrap(), vec![20, 20]);
}

#[tokio::test]
async fn api_news_uses_default_display_and_clamps() {
    let (app, provider) = test_router(creds(), "public");
    let resp = app
        .clone()
        .oneshot(post_news(r#"{"keywords":["a"]}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let resp = app
        .oneshot(post_news(r#"{"keywords":["b"],"display":5000}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(*provider.displays.lock().unwrap(), vec![50, 100]);
}

#[tokio::test]
async fn api_news_without_keywords_is_empty_object() {
    let (app, provider) = test_router(creds(), "public");
    let resp = app.oneshot(post_news("{}")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(read_json(resp).await, serde_json::json!({}));
    assert!(provider.displays.lock().unwrap().is_empty());
}

#[tokio::test]
async fn api_news_invalid_body_is_json_error() {
    let (app, provider) = test_router(creds(), "public");
    let resp = app.oneshot(post_news("{not json")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        read_json(resp).await,
        serde_json::json!({ "error": "Invalid Request" })
    );
    assert!(provider.displays.lock().unwrap().is_empty());
}

#[tokio::test]
async fn api_news_missing_credentials_is_json_error() {
    let (app, provider) = test_router(None, "public");
    let resp = app
        .oneshot(post_news(r#"{"keywords":["a"]}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        read_json(resp).await,
        serde_json::json!({ "error": "Missing Server API Keys" })
    );
    assert!(provider.displays.lock().unwrap().is_empty());
}

#[tokio::test]
async fn cors_preflight_allows_any_origin() {
    let (app, _) = test_router(creds(), "public");
    let req = Request::builder()
        .method("OPTIONS")
        .uri("/api/news")
        .header("origin", "http://localhost:3000")
        .header("access-control-request-method", "POST")
        .header("access-control-request-headers", "content-type")
        .body(Body::empty())
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert!(resp.status().is_success(), "preflight: {}", resp.status());
    let allow_origin = resp
        .headers()
        .get("access-control-allow-origin")
        .and_then(|h| h.to_str().ok())
        .unwrap_or("");
    assert_eq!(allow_origin, "*");
}

#[tokio::test]
async fn root_serves_index_html_from_static_dir() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), "<h1>news</h1>").unwrap();
    let (app, _) = test_router(creds(), dir.path().to_str().unwrap());

    let req = Request::builder().uri("/").body(Body::empty()).unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT).await.unwrap();
    assert_eq!(&bytes[..], b"<h1>news</h1>");

    let req = Request::builder()
        .uri("/missing.js")
        .body(Body::empty())
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

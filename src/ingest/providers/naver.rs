// src/ingest/providers/naver.rs
//! Naver news search (`/v1/search/news.json`), one GET per keyword, sorted by date.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use metrics::{counter, histogram};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

use crate::config::{Credentials, NewsConfig};
use crate::ingest::types::{RawItem, SearchProvider};

const HEADER_CLIENT_ID: &str = "X-Naver-Client-Id";
const HEADER_CLIENT_SECRET: &str = "X-Naver-Client-Secret";
const USER_AGENT: &str = "keyword-news/0.1";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<RawItem>,
}

pub struct NaverSearchClient {
    http: Client,
    endpoint: String,
}

impl NaverSearchClient {
    pub fn new(
        endpoint: impl Into<String>,
        timeout: Duration,
        connect_timeout: Duration,
    ) -> Result<Self> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(connect_timeout)
            .timeout(timeout)
            .build()
            .context("building naver http client")?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }

    pub fn from_config(cfg: &NewsConfig) -> Result<Self> {
        Self::new(
            cfg.endpoint.clone(),
            Duration::from_millis(cfg.request_timeout_ms),
            Duration::from_millis(cfg.connect_timeout_ms),
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl SearchProvider for NaverSearchClient {
    async fn search(
        &self,
        keyword: &str,
        display: u32,
        credentials: &Credentials,
    ) -> Result<Vec<RawItem>> {
        let t0 = std::time::Instant::now();
        counter!("news_search_requests_total").increment(1);

        let display = display.to_string();
        let resp = self
            .http
            .get(&self.endpoint)
            .query(&[
                ("query", keyword),
                ("display", display.as_str()),
                ("sort", "date"),
            ])
            .header(HEADER_CLIENT_ID, &credentials.client_id)
            .header(HEADER_CLIENT_SECRET, &credentials.client_secret)
            .send()
            .await
            .context("naver search request")?;

        let status = resp.status();
        if status != StatusCode::OK {
            bail!("naver search returned HTTP {status}");
        }

        let body: SearchResponse = resp.json().await.context("decoding naver search json")?;

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("news_search_ms").record(ms);
        tracing::debug!(keyword, items = body.items.len(), ms, "naver search ok");

        Ok(body.items)
    }

    fn name(&self) -> &'static str {
        "Naver"
    }
}

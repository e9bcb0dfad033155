// src/aggregate.rs
//! Fan-out over keywords: one upstream search per keyword, each result run through the
//! item pipeline. A failing keyword maps to an empty list and never affects the others.

use chrono::{DateTime, Utc};
use metrics::counter;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::config::{Credentials, NewsConfig, MAX_CONCURRENCY};
use crate::ingest::types::{KeywordResult, ResultSet, SearchProvider};
use crate::ingest::{ensure_metrics_described, process_with, PipelineParams};

pub struct Aggregator {
    provider: Arc<dyn SearchProvider>,
    params: PipelineParams,
    max_concurrency: usize,
    call_timeout: Duration,
}

impl Aggregator {
    pub fn new(
        provider: Arc<dyn SearchProvider>,
        params: PipelineParams,
        max_concurrency: usize,
        call_timeout: Duration,
    ) -> Self {
        Self {
            provider,
            params,
            max_concurrency: max_concurrency.clamp(1, MAX_CONCURRENCY),
            call_timeout,
        }
    }

    pub fn from_config(provider: Arc<dyn SearchProvider>, cfg: &NewsConfig) -> Self {
        Self::new(
            provider,
            PipelineParams::from(cfg),
            cfg.max_concurrency,
            Duration::from_millis(cfg.request_timeout_ms),
        )
    }

    /// Evaluate every keyword against the current time.
    pub async fn aggregate(
        &self,
        keywords: &[String],
        display: u32,
        credentials: &Credentials,
    ) -> ResultSet {
        self.aggregate_at(keywords, display, credentials, Utc::now())
            .await
    }

    /// Same as [`Aggregator::aggregate`] with a fixed `now` shared by all keywords.
    ///
    /// Searches run concurrently, at most `max_concurrency` at a time. The map is filled
    /// in input order: a repeated keyword sits at its first position with the items of
    /// its last occurrence.
    pub async fn aggregate_at(
        &self,
        keywords: &[String],
        display: u32,
        credentials: &Credentials,
        now: DateTime<Utc>,
    ) -> ResultSet {
        ensure_metrics_described();

        let permits = Arc::new(Semaphore::new(self.max_concurrency));
        let credentials = Arc::new(credentials.clone());
        let mut tasks = JoinSet::new();

        for (idx, keyword) in keywords.iter().cloned().enumerate() {
            let provider = Arc::clone(&self.provider);
            let permits = Arc::clone(&permits);
            let credentials = Arc::clone(&credentials);
            let params = self.params;
            let call_timeout = self.call_timeout;

            tasks.spawn(async move {
                // The semaphore is never closed; a failed acquire only means no limit.
                let _permit = permits.acquire_owned().await.ok();
                let items = search_keyword(
                    provider.as_ref(),
                    &keyword,
                    display,
                    &credentials,
                    now,
                    &params,
                    call_timeout,
                )
                .await;
                (idx, items)
            });
        }

        let mut slots: Vec<Option<KeywordResult>> = vec![None; keywords.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((idx, items)) => slots[idx] = Some(items),
                Err(e) => {
                    warn!(error = %e, "keyword task aborted; answering with empty result");
                    counter!("news_search_failures_total").increment(1);
                }
            }
        }

        let mut out = ResultSet::with_capacity(keywords.len());
        for (keyword, slot) in keywords.iter().zip(slots) {
            out.insert(keyword.clone(), slot.unwrap_or_default());
        }
        out
    }
}

async fn search_keyword(
    provider: &dyn SearchProvider,
    keyword: &str,
    display: u32,
    credentials: &Credentials,
    now: DateTime<Utc>,
    params: &PipelineParams,
    call_timeout: Duration,
) -> KeywordResult {
    let searched =
        tokio::time::timeout(call_timeout, provider.search(keyword, display, credentials)).await;

    let raw = match searched {
        Ok(Ok(raw)) => raw,
        Ok(Err(e)) => {
            warn!(
                keyword,
                provider = provider.name(),
                error = %format!("{e:#}"),
                "upstream search failed"
            );
            counter!("news_search_failures_total").increment(1);
            return Vec::new();
        }
        Err(_) => {
            warn!(
                keyword,
                provider = provider.name(),
                timeout_ms = call_timeout.as_millis() as u64,
                "upstream search timed out"
            );
            counter!("news_search_failures_total").increment(1);
            return Vec::new();
        }
    };

    let fetched = raw.len();
    let (items, stats) = process_with(raw, now, params);
    debug!(
        keyword,
        fetched,
        kept = stats.kept,
        bad_date = stats.bad_date,
        out_of_window = stats.out_of_window,
        duplicate_link = stats.duplicate_link,
        similar_title = stats.similar_title,
        "keyword processed"
    );
    items
}

// src/ingest/mod.rs
pub mod date;
pub mod normalize;
pub mod providers;
pub mod similarity;
pub mod types;

use chrono::{DateTime, Duration, Utc};
use metrics::{counter, describe_counter, describe_histogram};
use once_cell::sync::OnceCell;
use std::collections::HashSet;

use crate::config::NewsConfig;
use crate::ingest::date::{format_pub_date, parse_pub_date};
use crate::ingest::similarity::{SimilarityMetric, DEFAULT_SIMILARITY_THRESHOLD};
use crate::ingest::types::{CleanItem, ParsedItem, RawItem};

pub use crate::ingest::normalize::normalize_text;

/// One-time metrics registration (so series show up on /metrics).
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "news_search_requests_total",
            "Upstream search calls issued, one per keyword."
        );
        describe_counter!(
            "news_search_failures_total",
            "Keywords whose upstream call failed and were answered with an empty list."
        );
        describe_histogram!("news_search_ms", "Upstream search latency in milliseconds.");
        describe_counter!(
            "news_items_dropped_total",
            "Items removed by the pipeline, labelled by reason."
        );
        describe_counter!("news_items_kept_total", "Items emitted by the pipeline.");
    });
}

/// Knobs for one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineParams {
    pub window: Duration,
    pub similarity_threshold: f64,
    pub metric: SimilarityMetric,
}

impl Default for PipelineParams {
    fn default() -> Self {
        Self {
            window: Duration::days(crate::config::DEFAULT_WINDOW_DAYS),
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            metric: SimilarityMetric::Gestalt,
        }
    }
}

impl From<&NewsConfig> for PipelineParams {
    fn from(cfg: &NewsConfig) -> Self {
        Self {
            window: Duration::days(cfg.window_days),
            similarity_threshold: cfg.similarity_threshold,
            metric: cfg.similarity_metric,
        }
    }
}

/// Per-run drop counters; `kept` is the output length.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub bad_date: usize,
    pub out_of_window: usize,
    pub duplicate_link: usize,
    pub similar_title: usize,
    pub kept: usize,
}

/// Keep items whose timestamp parses, in input order. Returns the drop count too.
pub fn parse_items(raw: Vec<RawItem>) -> (Vec<ParsedItem>, usize) {
    let mut dropped = 0usize;
    let mut out = Vec::with_capacity(raw.len());
    for item in raw {
        match parse_pub_date(&item.pub_date) {
            Some(published_at) => out.push(ParsedItem {
                raw: item,
                published_at,
            }),
            None => dropped += 1,
        }
    }
    (out, dropped)
}

/// Full pipeline with default params (14 days, gestalt, 0.8).
pub fn process(raw_items: Vec<RawItem>, now: DateTime<Utc>) -> Vec<CleanItem> {
    process_with(raw_items, now, &PipelineParams::default()).0
}

/// Parse, sort newest first, window, then dedup by exact link and by fuzzy title.
///
/// Dedup compares each candidate against every title accepted so far, so the cost is
/// O(n * k). Fine for one page of results (at most 100 items); not meant for bulk input.
pub fn process_with(
    raw_items: Vec<RawItem>,
    now: DateTime<Utc>,
    params: &PipelineParams,
) -> (Vec<CleanItem>, PipelineStats) {
    let mut stats = PipelineStats::default();

    let (mut parsed, bad_date) = parse_items(raw_items);
    stats.bad_date = bad_date;

    // stable: equal instants keep provider order
    parsed.sort_by(|a, b| b.published_at.cmp(&a.published_at));

    let cutoff = now - params.window;
    let mut seen_links: HashSet<String> = HashSet::new();
    let mut accepted_titles: Vec<String> = Vec::new();
    let mut out = Vec::with_capacity(parsed.len());

    for item in parsed {
        if item.published_at.with_timezone(&Utc) < cutoff {
            stats.out_of_window += 1;
            continue;
        }

        let title = normalize_text(&item.raw.title);

        if seen_links.contains(&item.raw.link) {
            stats.duplicate_link += 1;
            continue;
        }
        if accepted_titles
            .iter()
            .any(|t| params.metric.is_similar(&title, t, params.similarity_threshold))
        {
            stats.similar_title += 1;
            continue;
        }

        seen_links.insert(item.raw.link.clone());
        accepted_titles.push(title.clone());
        out.push(CleanItem {
            title,
            link: item.raw.link,
            pub_date: format_pub_date(&item.published_at),
            description: normalize_text(&item.raw.description),
        });
    }

    stats.kept = out.len();
    record_stats(&stats);
    (out, stats)
}

fn record_stats(stats: &PipelineStats) {
    ensure_metrics_described();
    for (reason, n) in [
        ("bad_date", stats.bad_date),
        ("out_of_window", stats.out_of_window),
        ("duplicate_link", stats.duplicate_link),
        ("similar_title", stats.similar_title),
    ] {
        if n > 0 {
            counter!("news_items_dropped_total", "reason" => reason).increment(n as u64);
        }
    }
    counter!("news_items_kept_total").increment(stats.kept as u64);
}

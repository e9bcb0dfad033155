// src/config/mod.rs
//! Service settings: optional TOML file, then environment overrides, then sanitizing.
//! Upstream credentials live in their own type and are never read by the pipeline itself.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::ingest::similarity::{SimilarityMetric, DEFAULT_SIMILARITY_THRESHOLD};

// --- env defaults & names ---
pub const DEFAULT_NEWS_CONFIG_PATH: &str = "config/news.toml";
pub const DEFAULT_ENDPOINT: &str = "https://openapi.naver.com/v1/search/news.json";
pub const DEFAULT_DISPLAY: u32 = 50;
pub const MAX_DISPLAY: u32 = 100;
pub const DEFAULT_WINDOW_DAYS: i64 = 14;
pub const MAX_WINDOW_DAYS: i64 = 3650;
/// Upper bound on simultaneous upstream calls per request.
pub const MAX_CONCURRENCY: usize = 64;

pub const ENV_NEWS_CONFIG_PATH: &str = "NEWS_CONFIG_PATH";
pub const ENV_SIMILARITY_THRESHOLD: &str = "NEWS_SIMILARITY_THRESHOLD";
pub const ENV_WINDOW_DAYS: &str = "NEWS_WINDOW_DAYS";
pub const ENV_MAX_CONCURRENCY: &str = "NEWS_MAX_CONCURRENCY";
pub const ENV_REQUEST_TIMEOUT_MS: &str = "NEWS_REQUEST_TIMEOUT_MS";

pub const ENV_CLIENT_ID: &str = "NAVER_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "NAVER_CLIENT_SECRET";

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}
fn default_display() -> u32 {
    DEFAULT_DISPLAY
}
fn default_window_days() -> i64 {
    DEFAULT_WINDOW_DAYS
}
fn default_threshold() -> f64 {
    DEFAULT_SIMILARITY_THRESHOLD
}
fn default_request_timeout_ms() -> u64 {
    5_000
}
fn default_connect_timeout_ms() -> u64 {
    3_000
}
fn default_max_concurrency() -> usize {
    8
}
fn default_static_dir() -> String {
    "public".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Page size used when the request omits `display`.
    #[serde(default = "default_display")]
    pub default_display: u32,
    #[serde(default = "default_window_days")]
    pub window_days: i64,
    #[serde(default = "default_threshold")]
    pub similarity_threshold: f64,
    #[serde(default)]
    pub similarity_metric: SimilarityMetric,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            default_display: default_display(),
            window_days: default_window_days(),
            similarity_threshold: default_threshold(),
            similarity_metric: SimilarityMetric::default(),
            request_timeout_ms: default_request_timeout_ms(),
            connect_timeout_ms: default_connect_timeout_ms(),
            max_concurrency: default_max_concurrency(),
            static_dir: default_static_dir(),
        }
    }
}

impl NewsConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading news config from {}", path.display()))?;
        let cfg: NewsConfig = toml::from_str(&data)
            .with_context(|| format!("parsing news config {}", path.display()))?;
        Ok(cfg.sanitized())
    }

    /// Resolve the config the way the binary does:
    /// 1) $NEWS_CONFIG_PATH (must exist)
    /// 2) config/news.toml
    /// 3) built-in defaults
    ///
    /// Environment overrides are applied on top in every case.
    pub fn load_default() -> Result<Self> {
        let base = if let Ok(p) = std::env::var(ENV_NEWS_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("{ENV_NEWS_CONFIG_PATH} points to non-existent path"));
            }
            Self::load_from_file(&pb)?
        } else {
            let fallback = PathBuf::from(DEFAULT_NEWS_CONFIG_PATH);
            if fallback.exists() {
                Self::load_from_file(&fallback)?
            } else {
                Self::default()
            }
        };
        Ok(base.with_env_overrides().sanitized())
    }

    pub fn with_env_overrides(mut self) -> Self {
        if let Some(t) = parse_threshold_env(std::env::var(ENV_SIMILARITY_THRESHOLD).ok()) {
            self.similarity_threshold = t;
        }
        if let Some(d) = parse_env::<i64>(ENV_WINDOW_DAYS) {
            self.window_days = d;
        }
        if let Some(n) = parse_env::<usize>(ENV_MAX_CONCURRENCY) {
            self.max_concurrency = n;
        }
        if let Some(ms) = parse_env::<u64>(ENV_REQUEST_TIMEOUT_MS) {
            self.request_timeout_ms = ms;
        }
        self
    }

    pub fn sanitized(mut self) -> Self {
        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            self.similarity_threshold = default_threshold();
        }
        if !(0..=MAX_WINDOW_DAYS).contains(&self.window_days) {
            self.window_days = default_window_days();
        }
        self.max_concurrency = self.max_concurrency.clamp(1, MAX_CONCURRENCY);
        // a zero timeout would fail every call before it starts
        if self.request_timeout_ms == 0 {
            self.request_timeout_ms = default_request_timeout_ms();
        }
        if self.connect_timeout_ms == 0 {
            self.connect_timeout_ms = default_connect_timeout_ms();
        }
        self.default_display = clamp_display(self.default_display);
        self
    }

    /// Page size for one request: explicit value or the configured default, clamped.
    pub fn display_for(&self, requested: Option<u32>) -> u32 {
        clamp_display(requested.unwrap_or(self.default_display))
    }
}

/// Provider accepts 1..=100 results per query.
pub fn clamp_display(n: u32) -> u32 {
    n.clamp(1, MAX_DISPLAY)
}

// parse optional float env and clamp to <0.0..=1.0>
fn parse_threshold_env(raw: Option<String>) -> Option<f64> {
    raw.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .map(|v| v.clamp(0.0, 1.0))
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|s| s.trim().parse().ok())
}

/// Two opaque tokens sent to the upstream provider as headers.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

impl Credentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// `None` if either variable is missing or blank.
    pub fn from_env() -> Option<Self> {
        let id = std::env::var(ENV_CLIENT_ID).ok()?;
        let secret = std::env::var(ENV_CLIENT_SECRET).ok()?;
        if id.trim().is_empty() || secret.trim().is_empty() {
            return None;
        }
        Some(Self::new(id.trim(), secret.trim()))
    }
}

// Never print the secret; the id length is enough for diagnostics.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id_len", &self.client_id.len())
            .field("client_secret", &"***")
            .finish()
    }
}

// src/ingest/types.rs
use anyhow::Result;
use chrono::{DateTime, FixedOffset};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::config::Credentials;

/// One record as returned by the upstream search provider.
/// Title and description still carry markup and entities.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawItem {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub link: String,
    #[serde(rename = "pubDate", default)]
    pub pub_date: String,
    #[serde(default)]
    pub description: String,
}

/// A raw item whose timestamp parsed successfully.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedItem {
    pub raw: RawItem,
    pub published_at: DateTime<FixedOffset>,
}

/// Pipeline output unit; serialized as-is into the response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanItem {
    pub title: String,
    pub link: String,
    /// `YYYY-MM-DD HH:MM:SS` in the item's own UTC offset.
    #[serde(rename = "pubDate")]
    pub pub_date: String,
    pub description: String,
}

/// Items for one keyword, newest first.
pub type KeywordResult = Vec<CleanItem>;

/// keyword -> items, in request order. A repeated keyword keeps the position of its
/// first occurrence and the items of its last.
pub type ResultSet = IndexMap<String, KeywordResult>;

/// Upstream search seam. One call per keyword; any failure is returned as `Err`
/// and never panics past this boundary.
#[async_trait::async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(
        &self,
        keyword: &str,
        display: u32,
        credentials: &Credentials,
    ) -> Result<Vec<RawItem>>;

    fn name(&self) -> &'static str;
}

// src/ingest/types.rs
use anyhow::Result;
use chrono::{DateTime, Utc};

/// One raw entry as exposed by a feed, before canonicalization or gating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    pub title: String,
    pub link: String,
    /// Summary/description as published; may contain HTML.
    pub summary: String,
    pub published_at: Option<DateTime<Utc>>,
}

/// A scored story surviving dedupe, freshness, and the regional gate.
/// Created once per unique canonical URL; never mutated after scoring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateItem {
    pub source: String,
    pub title: String,
    /// Canonical URL; unique across the candidate set within one run.
    pub url: String,
    pub published_at: DateTime<Utc>,
    pub summary: String,
    pub score: i64,
}

#[async_trait::async_trait]
pub trait FeedProvider {
    /// Fetch the current entries for this feed. Unreachable or malformed
    /// feeds should surface as `Err`; the pipeline degrades to zero items
    /// from that source.
    async fn fetch_entries(&self) -> Result<Vec<FeedEntry>>;
    fn name(&self) -> &str;
}

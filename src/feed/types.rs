// src/feed/types.rs
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use serde::Serialize;

use crate::error::Result;

/// One `<entry>` of a collection page with every optional already resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEntry {
    /// Opaque tag URI, e.g. `tag:blog.hatena.ne.jp,2013:blog-user-1234-5678`.
    pub id: String,
    pub published_at: Option<DateTime<FixedOffset>>,
    pub alternate_url: Option<String>,
    pub title: Option<String>,
}

impl RawEntry {
    pub fn entry_id(&self) -> &str {
        entry_id_from_tag(&self.id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedPage {
    pub entries: Vec<RawEntry>,
    pub next_page_url: Option<String>,
}

/// A fully fetched member entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    pub id: String,
    pub entry_id: String,
    pub title: String,
    pub content: String,
    pub published_at: Option<DateTime<FixedOffset>>,
    pub url: Option<String>,
    pub draft: bool,
}

/// Trailing `-`-delimited segment of a tag URI.
pub fn entry_id_from_tag(id: &str) -> &str {
    id.rsplit('-').next().unwrap_or(id)
}

/// Paginated, authenticated feed access. Each call is a fresh request.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch_first_page(&self) -> Result<FeedPage>;
    async fn fetch_page(&self, url: &str) -> Result<FeedPage>;
}

#[async_trait]
pub trait EntryFetcher: Send + Sync {
    async fn fetch(&self, entry_id: &str) -> Result<Entry>;
}

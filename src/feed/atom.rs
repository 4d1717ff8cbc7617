// src/feed/atom.rs
//! Atom (RFC 4287) collection/member documents as served by AtomPub blog APIs.
//! Only the fields the resolver and entry fetcher need are modeled.

use chrono::{DateTime, FixedOffset};
use metrics::histogram;
use quick_xml::de::from_str;
use serde::Deserialize;

use crate::error::{ResolveError, Result};
use crate::feed::types::{entry_id_from_tag, Entry, FeedPage, RawEntry};

#[derive(Debug, Deserialize)]
struct AtomFeed {
    #[serde(rename = "link", default)]
    links: Vec<AtomLink>,
    #[serde(rename = "entry", default)]
    entries: Vec<AtomEntry>,
}

#[derive(Debug, Deserialize)]
struct AtomLink {
    #[serde(rename = "@rel", default)]
    rel: Option<String>,
    #[serde(rename = "@href", default)]
    href: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AtomEntry {
    id: Option<String>,
    title: Option<String>,
    published: Option<String>,
    #[serde(rename = "link", default)]
    links: Vec<AtomLink>,
    content: Option<AtomContent>,
    // app:control
    control: Option<AtomControl>,
}

#[derive(Debug, Deserialize)]
struct AtomContent {
    #[serde(rename = "$text", default)]
    value: String,
}

#[derive(Debug, Deserialize)]
struct AtomControl {
    draft: Option<String>,
}

fn parse_published(ts: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(ts.trim()).ok()
}

/// Atom treats a link without `rel` as `alternate`.
fn find_link<'a>(links: &'a [AtomLink], rel: &str) -> Option<&'a str> {
    links
        .iter()
        .find(|l| l.rel.as_deref().unwrap_or("alternate") == rel)
        .and_then(|l| l.href.as_deref())
        .map(str::trim)
        .filter(|h| !h.is_empty())
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Parse one collection page. Entries without an `<id>` are skipped.
pub fn parse_feed(xml: &str) -> Result<FeedPage> {
    let t0 = std::time::Instant::now();
    let feed: AtomFeed = from_str(xml)?;

    let next_page_url = find_link(&feed.links, "next").map(str::to_string);
    let mut entries = Vec::with_capacity(feed.entries.len());
    for e in feed.entries {
        let Some(id) = non_empty(e.id) else {
            tracing::debug!(target: "feed", "skipping entry without id");
            continue;
        };
        entries.push(RawEntry {
            id,
            published_at: e.published.as_deref().and_then(parse_published),
            alternate_url: find_link(&e.links, "alternate").map(str::to_string),
            title: non_empty(e.title),
        });
    }

    let ms = t0.elapsed().as_secs_f64() * 1_000.0;
    histogram!("feed_parse_ms").record(ms);
    Ok(FeedPage {
        entries,
        next_page_url,
    })
}

/// Parse a member document (`<entry>` root) fetched by id.
pub fn parse_entry(xml: &str) -> Result<Entry> {
    let e: AtomEntry = from_str(xml)?;
    let id = non_empty(e.id).ok_or_else(|| ResolveError::Parse("entry has no <id>".into()))?;
    let entry_id = entry_id_from_tag(&id).to_string();

    Ok(Entry {
        entry_id,
        title: e.title.unwrap_or_default().trim().to_string(),
        content: e.content.map(|c| c.value).unwrap_or_default(),
        published_at: e.published.as_deref().and_then(parse_published),
        url: find_link(&e.links, "alternate").map(str::to_string),
        draft: e
            .control
            .and_then(|c| c.draft)
            .is_some_and(|d| d.trim().eq_ignore_ascii_case("yes")),
        id,
    })
}

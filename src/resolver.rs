// src/resolver.rs
//! Walks the collection feed page by page and picks the entry that best
//! matches a `SearchTarget`.
//!
//! - An exact hit (score 0) ends the walk immediately.
//! - At most `MAX_PAGES` pages are fetched, even if `next` links continue.
//! - Otherwise the lowest score wins; ties go to the earliest entry seen.
//! - Any page failure aborts the whole resolution.

use metrics::counter;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{ResolveError, Result};
use crate::feed::{Entry, EntryFetcher, PageSource};
use crate::scoring::{best_candidate, score, Candidate};
use crate::target::SearchTarget;

pub const MAX_PAGES: usize = 100;

pub struct Resolver<S> {
    source: S,
    max_pages: usize,
    deadline: Option<Duration>,
}

impl<S: PageSource> Resolver<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            max_pages: MAX_PAGES,
            deadline: None,
        }
    }

    /// Bound the wall-clock time of one `resolve` call.
    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub async fn resolve(&self, target: &SearchTarget) -> Result<Candidate> {
        match self.deadline {
            Some(limit) => tokio::time::timeout(limit, self.search(target))
                .await
                .map_err(|_| ResolveError::DeadlineExceeded {
                    secs: limit.as_secs(),
                })?,
            None => self.search(target).await,
        }
    }

    /// Parse a date-encoded reference and resolve it.
    pub async fn resolve_reference(&self, reference: &str) -> Result<Candidate> {
        let target = SearchTarget::parse(reference)?;
        self.resolve(&target).await
    }

    async fn search(&self, target: &SearchTarget) -> Result<Candidate> {
        let mut candidates: Vec<Candidate> = Vec::new();
        let mut page = self.source.fetch_first_page().await?;
        let mut pages_fetched = 1usize;
        counter!("resolver_pages_fetched_total").increment(1);

        loop {
            debug!(
                target: "resolver",
                page = pages_fetched,
                entries = page.entries.len(),
                "scoring page"
            );
            for entry in &page.entries {
                let Some(s) = score(entry, target) else {
                    continue;
                };
                let candidate = Candidate::from_entry(entry, s);
                counter!("resolver_candidates_total").increment(1);
                if candidate.is_exact() {
                    counter!("resolver_exact_matches_total").increment(1);
                    info!(
                        target: "resolver",
                        entry_id = %candidate.entry_id,
                        pages = pages_fetched,
                        "exact match"
                    );
                    return Ok(candidate);
                }
                candidates.push(candidate);
            }

            match page.next_page_url.take() {
                Some(next) if pages_fetched < self.max_pages => {
                    page = self.source.fetch_page(&next).await?;
                    pages_fetched += 1;
                    counter!("resolver_pages_fetched_total").increment(1);
                }
                Some(_) => {
                    debug!(target: "resolver", pages = pages_fetched, "page cap reached");
                    break;
                }
                None => break,
            }
        }

        let seen = candidates.len();
        match best_candidate(candidates) {
            Some(best) => {
                info!(
                    target: "resolver",
                    entry_id = %best.entry_id,
                    score = best.score,
                    candidates = seen,
                    pages = pages_fetched,
                    "closest match"
                );
                Ok(best)
            }
            None => {
                counter!("resolver_not_found_total").increment(1);
                info!(target: "resolver", pages = pages_fetched, reference = %target, "no candidates");
                Err(ResolveError::NotFound {
                    reference: target.to_string(),
                })
            }
        }
    }
}

impl<S: PageSource + EntryFetcher> Resolver<S> {
    pub async fn resolve_and_fetch(&self, target: &SearchTarget) -> Result<Entry> {
        let best = self.resolve(target).await?;
        self.source.fetch(&best.entry_id).await
    }
}

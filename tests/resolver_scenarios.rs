// tests/resolver_scenarios.rs
//
// Resolver behavior over in-memory page sources (no HTTP).
//
// Covered:
// - exact URL match short-circuits pagination
// - exclusion windows leading to NotFound
// - minimum score and earliest-wins tie-break
// - multi-page walks and the 100-page cap
// - error propagation, deadline, resolve_and_fetch

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use entry_resolver::feed::{Entry, EntryFetcher, FeedPage, PageSource, RawEntry};
use entry_resolver::resolver::MAX_PAGES;
use entry_resolver::{ResolveError, Resolver, SearchTarget};

const FIRST: &str = "page-1";

fn target() -> SearchTarget {
    SearchTarget::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), 12, 34, 56).unwrap()
}

fn entry(entry_id: &str, published: &str, url: &str) -> RawEntry {
    RawEntry {
        id: format!("tag:blog.example.com,2013:blog-alice-1768-{entry_id}"),
        published_at: Some(DateTime::parse_from_rfc3339(published).unwrap()),
        alternate_url: Some(url.to_string()),
        title: Some(format!("title {entry_id}")),
    }
}

/// Pages keyed by URL; the first page lives under `page-1`.
#[derive(Default)]
struct ScriptedFeed {
    pages: HashMap<String, FeedPage>,
    failing: HashMap<String, u16>,
    delay: Option<Duration>,
    calls: Mutex<Vec<String>>,
    fetched_entries: Mutex<Vec<String>>,
}

impl ScriptedFeed {
    /// Chain pages `page-1 -> page-2 -> ...` in order.
    fn chain(pages: Vec<Vec<RawEntry>>) -> Self {
        let n = pages.len();
        let mut map = HashMap::new();
        for (i, entries) in pages.into_iter().enumerate() {
            let next_page_url = (i + 1 < n).then(|| format!("page-{}", i + 2));
            map.insert(
                format!("page-{}", i + 1),
                FeedPage {
                    entries,
                    next_page_url,
                },
            );
        }
        Self {
            pages: map,
            ..Default::default()
        }
    }

    fn fail_on(mut self, url: &str, status: u16) -> Self {
        self.failing.insert(url.to_string(), status);
        self
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    async fn serve(&self, url: &str) -> entry_resolver::Result<FeedPage> {
        self.calls.lock().push(url.to_string());
        if let Some(d) = self.delay {
            tokio::time::sleep(d).await;
        }
        if let Some(status) = self.failing.get(url) {
            return Err(ResolveError::RemoteRequest {
                status: *status,
                body: "boom".into(),
            });
        }
        Ok(self.pages.get(url).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl PageSource for ScriptedFeed {
    async fn fetch_first_page(&self) -> entry_resolver::Result<FeedPage> {
        self.serve(FIRST).await
    }

    async fn fetch_page(&self, url: &str) -> entry_resolver::Result<FeedPage> {
        self.serve(url).await
    }
}

#[async_trait]
impl EntryFetcher for ScriptedFeed {
    async fn fetch(&self, entry_id: &str) -> entry_resolver::Result<Entry> {
        self.fetched_entries.lock().push(entry_id.to_string());
        Ok(Entry {
            id: format!("tag:blog.example.com,2013:blog-alice-1768-{entry_id}"),
            entry_id: entry_id.to_string(),
            title: format!("title {entry_id}"),
            content: "body".into(),
            published_at: None,
            url: None,
            draft: false,
        })
    }
}

/// Always offers another page; optionally one entry on the first page.
struct EndlessFeed {
    first_entries: Vec<RawEntry>,
    fetches: AtomicUsize,
}

impl EndlessFeed {
    fn new(first_entries: Vec<RawEntry>) -> Self {
        Self {
            first_entries,
            fetches: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl PageSource for EndlessFeed {
    async fn fetch_first_page(&self) -> entry_resolver::Result<FeedPage> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(FeedPage {
            entries: self.first_entries.clone(),
            next_page_url: Some("page-2".into()),
        })
    }

    async fn fetch_page(&self, url: &str) -> entry_resolver::Result<FeedPage> {
        let n = self.fetches.fetch_add(1, Ordering::SeqCst) + 1;
        assert_eq!(url, format!("page-{n}"));
        Ok(FeedPage {
            entries: vec![],
            next_page_url: Some(format!("page-{}", n + 1)),
        })
    }
}

#[tokio::test]
async fn scenario_a_exact_match_on_first_page_stops_pagination() {
    let feed = ScriptedFeed::chain(vec![
        vec![entry(
            "100",
            "2024-01-01T12:34:56+09:00",
            "https://alice.example.com/entry/2024/01/01/123456",
        )],
        vec![entry(
            "200",
            "2024-01-01T12:34:50+09:00",
            "https://alice.example.com/entry/2024/01/01/123450",
        )],
    ]);

    let resolver = Resolver::new(feed);
    let best = resolver.resolve(&target()).await.expect("resolves");

    assert_eq!(best.entry_id, "100");
    assert_eq!(best.score, 0);
    assert_eq!(resolver.source().calls(), vec![FIRST.to_string()]);
}

#[tokio::test]
async fn scenario_b_outside_hour_window_is_not_found() {
    // 13:40:00 vs 12:34:56 = 3904 s apart.
    let feed = ScriptedFeed::chain(vec![vec![entry(
        "100",
        "2024-01-01T13:40:00+09:00",
        "https://alice.example.com/entry/2024/01/01/134000",
    )]]);
    let resolver = Resolver::new(feed);

    let err = resolver.resolve(&target()).await.unwrap_err();
    assert!(matches!(err, ResolveError::NotFound { .. }), "got {err:?}");
}

#[tokio::test]
async fn scenario_c_lowest_score_wins() {
    let feed = ScriptedFeed::chain(vec![vec![
        // 100 s early
        entry(
            "100",
            "2024-01-01T12:33:16+09:00",
            "https://alice.example.com/entry/2024/01/01/123316",
        ),
        // 50 s late
        entry(
            "50",
            "2024-01-01T12:35:46+09:00",
            "https://alice.example.com/entry/2024/01/01/123546",
        ),
    ]]);
    let resolver = Resolver::new(feed);

    let best = resolver.resolve(&target()).await.expect("resolves");
    assert_eq!(best.entry_id, "50");
    assert_eq!(best.score, 50);
    assert_eq!(best.title, "title 50");
}

#[tokio::test]
async fn scenario_d_match_on_third_page_takes_three_fetches() {
    let feed = ScriptedFeed::chain(vec![
        vec![entry(
            "1",
            "2024-01-02T12:00:00+09:00",
            "https://alice.example.com/entry/2024/01/02/120000",
        )],
        vec![entry(
            "2",
            "2024-01-01T12:00:00+09:00",
            "https://alice.example.com/entry/2024/01/01/120000",
        )],
        vec![entry(
            "3",
            "2024-01-01T12:34:56+09:00",
            "https://alice.example.com/entry/2024/01/01/123456",
        )],
    ]);
    let resolver = Resolver::new(feed);

    let best = resolver.resolve(&target()).await.expect("resolves");
    assert_eq!(best.entry_id, "3");
    assert_eq!(resolver.source().calls(), vec!["page-1", "page-2", "page-3"]);
}

#[tokio::test]
async fn scenario_e_page_cap_falls_back_to_best_seen() {
    let feed = EndlessFeed::new(vec![entry(
        "near",
        "2024-01-01T12:30:00+09:00",
        "https://alice.example.com/entry/2024/01/01/123000",
    )]);
    let resolver = Resolver::new(feed);

    let best = resolver.resolve(&target()).await.expect("resolves");
    assert_eq!(best.entry_id, "near");
    assert_eq!(resolver.source().fetches.load(Ordering::SeqCst), MAX_PAGES);
}

#[tokio::test]
async fn scenario_e_page_cap_without_candidates_is_not_found() {
    let resolver = Resolver::new(EndlessFeed::new(vec![]));

    let err = resolver.resolve(&target()).await.unwrap_err();
    assert!(matches!(err, ResolveError::NotFound { .. }));
    assert_eq!(resolver.source().fetches.load(Ordering::SeqCst), 100);
}

#[tokio::test]
async fn exact_match_wins_over_earlier_closer_looking_candidates() {
    // Scores 120, 50, then 0 on the same page; another page must not be fetched.
    let mut feed = ScriptedFeed::chain(vec![vec![
        entry(
            "120",
            "2024-01-01T12:32:56+09:00",
            "https://alice.example.com/entry/2024/01/01/123256",
        ),
        entry(
            "50",
            "2024-01-01T12:35:46+09:00",
            "https://alice.example.com/entry/2024/01/01/123546",
        ),
        entry(
            "exact",
            "2024-01-01T12:40:00+09:00",
            "https://alice.example.com/entry/2024/01/01/123456",
        ),
    ]]);
    feed.pages.get_mut(FIRST).unwrap().next_page_url = Some("page-2".into());

    let resolver = Resolver::new(feed);
    let best = resolver.resolve(&target()).await.expect("resolves");
    assert_eq!(best.entry_id, "exact");
    assert_eq!(best.score, 0);
    assert_eq!(resolver.source().calls().len(), 1);
}

#[tokio::test]
async fn exact_match_on_later_page_beats_accumulated_candidates() {
    let feed = ScriptedFeed::chain(vec![
        vec![entry(
            "50",
            "2024-01-01T12:35:46+09:00",
            "https://alice.example.com/entry/2024/01/01/123546",
        )],
        vec![entry(
            "exact",
            "2024-01-01T12:34:56+09:00",
            "https://alice.example.com/entry/2024/01/01/123456",
        )],
        vec![entry(
            "later",
            "2024-01-01T12:34:55+09:00",
            "https://alice.example.com/entry/2024/01/01/123455",
        )],
    ]);
    let resolver = Resolver::new(feed);

    let best = resolver.resolve(&target()).await.expect("resolves");
    assert_eq!(best.entry_id, "exact");
    assert_eq!(resolver.source().calls(), vec!["page-1", "page-2"]);
}

#[tokio::test]
async fn equal_scores_resolve_to_first_seen_across_pages() {
    let feed = ScriptedFeed::chain(vec![
        vec![entry(
            "first",
            "2024-01-01T12:35:56+09:00",
            "https://alice.example.com/entry/2024/01/01/123556",
        )],
        vec![entry(
            "second",
            "2024-01-01T12:33:56+09:00",
            "https://alice.example.com/entry/2024/01/01/123356",
        )],
    ]);
    let resolver = Resolver::new(feed);

    let best = resolver.resolve(&target()).await.expect("resolves");
    assert_eq!(best.score, 60);
    assert_eq!(best.entry_id, "first");
}

#[tokio::test]
async fn entries_without_published_are_skipped() {
    let mut undated = entry(
        "undated",
        "2024-01-01T12:34:56+09:00",
        "https://alice.example.com/entry/2024/01/01/123456",
    );
    undated.published_at = None;
    let feed = ScriptedFeed::chain(vec![vec![
        undated,
        entry(
            "dated",
            "2024-01-02T12:34:56+09:00",
            "https://alice.example.com/entry/2024/01/02/123456",
        ),
    ]]);
    let resolver = Resolver::new(feed);

    let best = resolver.resolve(&target()).await.expect("resolves");
    assert_eq!(best.entry_id, "dated");
    assert_eq!(best.score, 86_400);
}

#[tokio::test]
async fn page_failure_aborts_without_partial_result() {
    let feed = ScriptedFeed::chain(vec![
        vec![entry(
            "near",
            "2024-01-01T12:30:00+09:00",
            "https://alice.example.com/entry/2024/01/01/123000",
        )],
        vec![],
    ])
    .fail_on("page-2", 503);
    let resolver = Resolver::new(feed);

    let err = resolver.resolve(&target()).await.unwrap_err();
    match err {
        ResolveError::RemoteRequest { status, body } => {
            assert_eq!(status, 503);
            assert_eq!(body, "boom");
        }
        other => panic!("expected RemoteRequest, got {other:?}"),
    }
    assert_eq!(resolver.source().calls(), vec!["page-1", "page-2"]);
}

#[tokio::test(start_paused = true)]
async fn deadline_bounds_slow_pagination() {
    let mut feed = ScriptedFeed::chain(vec![vec![], vec![], vec![]]);
    feed.delay = Some(Duration::from_secs(10));
    let resolver = Resolver::new(feed).with_deadline(Some(Duration::from_secs(15)));

    let err = resolver.resolve(&target()).await.unwrap_err();
    assert!(
        matches!(err, ResolveError::DeadlineExceeded { secs: 15 }),
        "got {err:?}"
    );
    assert_eq!(resolver.source().calls().len(), 2);
}

#[tokio::test]
async fn resolve_and_fetch_fetches_the_resolved_id() {
    let feed = ScriptedFeed::chain(vec![vec![entry(
        "6802418398300003",
        "2024-01-01T12:34:56+09:00",
        "https://alice.example.com/entry/2024/01/01/123456",
    )]]);
    let resolver = Resolver::new(feed);

    let full = resolver.resolve_and_fetch(&target()).await.expect("fetched");
    assert_eq!(full.entry_id, "6802418398300003");
    assert_eq!(
        resolver.source().fetched_entries.lock().clone(),
        vec!["6802418398300003".to_string()]
    );
}

#[tokio::test]
async fn resolve_reference_rejects_undated_urls_before_fetching() {
    let resolver = Resolver::new(ScriptedFeed::chain(vec![vec![]]));
    let err = resolver
        .resolve_reference("https://alice.example.com/entry/hello-world")
        .await
        .unwrap_err();
    assert!(matches!(err, ResolveError::InvalidReference { .. }));
    assert!(resolver.source().calls().is_empty());
}

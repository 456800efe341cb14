//! The per-run source loop.
//!
//! Sources are fetched and parsed one at a time, in list order. Each source
//! is its own failure boundary: a transport error or an unparseable document
//! is logged and the loop moves on, so a bad feed only removes its own
//! entries from the run.

use chrono::Utc;
use std::error::Error;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{error, info, instrument, warn};

use crate::fetcher::FetchFeed;
use crate::models::{FeedSource, OutputDocument, RawEntry};
use crate::normalize::normalize;
use crate::outputs::json::build_document;
use crate::parser::parse_feed;

/// Fetch and parse every source, concatenating their entries in list order.
///
/// `pacing` is slept after every attempt, successful or not.
#[instrument(level = "info", skip_all, fields(sources = sources.len()))]
pub async fn collect_entries<F: FetchFeed>(
    fetcher: &F,
    sources: &[FeedSource],
    pacing: Duration,
) -> Vec<RawEntry> {
    let mut all_entries = Vec::new();
    let mut failed = 0usize;

    for source in sources {
        let t0 = Instant::now();
        match fetcher.fetch(source.url).await {
            Ok(body) => {
                let entries = parse_feed(&body, source.name);
                if entries.is_empty() {
                    warn!(source = source.name, "Feed produced no entries");
                } else {
                    info!(
                        source = source.name,
                        count = entries.len(),
                        elapsed_ms = t0.elapsed().as_millis() as u128,
                        "Collected feed entries"
                    );
                }
                all_entries.extend(entries);
            }
            Err(e) => {
                failed += 1;
                error!(source = source.name, url = source.url, error = %e, "Feed fetch failed; skipping source");
            }
        }

        sleep(pacing).await;
    }

    info!(
        total = all_entries.len(),
        failed,
        "Finished collecting entries"
    );
    all_entries
}

/// Run the whole pipeline and return the document to write.
///
/// The wall clock is read twice: once after collection, as the window anchor
/// of last resort, and once when the document is stamped.
pub async fn run<F: FetchFeed>(
    fetcher: &F,
    sources: &[FeedSource],
    pacing: Duration,
) -> OutputDocument {
    let entries = collect_entries(fetcher, sources, pacing).await;
    let items = normalize(entries, Utc::now());
    build_document(&items, Utc::now())
}

/// Like [`run`], but tolerate a fetcher that could not be built.
///
/// Without a fetcher every source counts as failed, so the result is the
/// empty document rather than an aborted run.
pub async fn run_or_empty<F: FetchFeed>(
    fetcher: Result<F, Box<dyn Error>>,
    sources: &[FeedSource],
    pacing: Duration,
) -> OutputDocument {
    match fetcher {
        Ok(fetcher) => run(&fetcher, sources, pacing).await,
        Err(e) => {
            error!(error = %e, "Failed to build HTTP client; skipping all sources");
            build_document(&normalize(Vec::new(), Utc::now()), Utc::now())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use std::cell::RefCell;
    use std::collections::HashMap;

    struct FailingFetcher;

    impl FetchFeed for FailingFetcher {
        async fn fetch(&self, url: &str) -> Result<String, Box<dyn Error>> {
            Err(format!("connection refused: {url}").into())
        }
    }

    /// Serves canned bodies by URL and records the request order.
    struct StubFetcher {
        bodies: HashMap<&'static str, &'static str>,
        requested: RefCell<Vec<String>>,
    }

    impl StubFetcher {
        fn new(bodies: &[(&'static str, &'static str)]) -> Self {
            Self {
                bodies: bodies.iter().copied().collect(),
                requested: RefCell::new(Vec::new()),
            }
        }
    }

    impl FetchFeed for StubFetcher {
        async fn fetch(&self, url: &str) -> Result<String, Box<dyn Error>> {
            self.requested.borrow_mut().push(url.to_string());
            self.bodies
                .get(url)
                .map(|body| body.to_string())
                .ok_or_else(|| "404 Not Found".into())
        }
    }

    const SOURCES: &[FeedSource] = &[
        FeedSource { name: "Alpha", url: "https://alpha.test/rss" },
        FeedSource { name: "Down", url: "https://down.test/rss" },
        FeedSource { name: "Broken", url: "https://broken.test/rss" },
        FeedSource { name: "Beta", url: "https://beta.test/atom" },
    ];

    const ALPHA: &str = r#"<rss><channel>
  <item>
    <title>Alpha new</title>
    <link>https://alpha.test/new</link>
    <pubDate>Mon, 15 Jan 2024 10:30:00 +0000</pubDate>
    <description>Fresh</description>
  </item>
  <item>
    <title>Alpha stale</title>
    <link>https://alpha.test/stale</link>
    <pubDate>Mon, 01 Jan 2024 10:30:00 +0000</pubDate>
  </item>
  <item>
    <title>Alpha undated</title>
    <link>https://alpha.test/undated</link>
  </item>
</channel></rss>"#;

    const BETA: &str = r#"<feed xmlns="http://www.w3.org/2005/Atom">
  <entry>
    <title>Beta tie</title>
    <link href="https://beta.test/tie"/>
    <updated>2024-01-15T10:30:00Z</updated>
  </entry>
  <entry>
    <title>Beta older</title>
    <link href="https://beta.test/older"/>
    <updated>2024-01-14T23:59:00Z</updated>
  </entry>
</feed>"#;

    #[tokio::test]
    async fn test_failing_fetcher_yields_empty_document() {
        let doc = run(&FailingFetcher, SOURCES, Duration::ZERO).await;
        assert!(doc.items.is_empty());
        assert!(doc.snapshots.is_empty());
        assert!(DateTime::parse_from_rfc3339(&doc.generated_at).is_ok());

        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["items"], serde_json::json!([]));
        assert_eq!(json["snapshots"], serde_json::json!({}));
    }

    #[tokio::test]
    async fn test_missing_client_yields_empty_document() {
        let fetcher: Result<StubFetcher, Box<dyn Error>> = Err("tls backend unavailable".into());
        let doc = run_or_empty(fetcher, SOURCES, Duration::ZERO).await;
        assert!(doc.items.is_empty());
        assert!(doc.snapshots.is_empty());
        assert!(DateTime::parse_from_rfc3339(&doc.generated_at).is_ok());
    }

    #[tokio::test]
    async fn test_failed_sources_do_not_affect_others() {
        let fetcher = StubFetcher::new(&[
            ("https://alpha.test/rss", ALPHA),
            ("https://broken.test/rss", "<rss><channel><item>"),
            ("https://beta.test/atom", BETA),
        ]);

        let entries = collect_entries(&fetcher, SOURCES, Duration::ZERO).await;
        let sources: Vec<_> = entries.iter().map(|e| e.source.as_str()).collect();
        assert_eq!(sources, ["Alpha", "Alpha", "Alpha", "Beta", "Beta"]);

        let requested = fetcher.requested.borrow();
        let expected: Vec<_> = SOURCES.iter().map(|s| s.url.to_string()).collect();
        assert_eq!(*requested, expected);
    }

    #[tokio::test]
    async fn test_run_filters_sorts_and_groups() {
        let fetcher = StubFetcher::new(&[
            ("https://alpha.test/rss", ALPHA),
            ("https://beta.test/atom", BETA),
        ]);

        let doc = run(&fetcher, SOURCES, Duration::ZERO).await;
        let links: Vec<_> = doc.items.iter().map(|i| i.link.as_str()).collect();
        // stale and undated entries are gone; the tie keeps source order
        assert_eq!(
            links,
            [
                "https://alpha.test/new",
                "https://beta.test/tie",
                "https://beta.test/older"
            ]
        );

        let days: Vec<_> = doc.snapshots.iter().map(|b| b.day.as_str()).collect();
        assert_eq!(days, ["2024-01-15", "2024-01-14"]);
        assert_eq!(doc.snapshots[1].items[0].time, "2024-01-14 23:59");
    }

    #[tokio::test]
    async fn test_pacing_applies_after_failures() {
        let sources = &SOURCES[..2];
        let t0 = Instant::now();
        collect_entries(&FailingFetcher, sources, Duration::from_millis(20)).await;
        assert!(t0.elapsed() >= Duration::from_millis(40));
    }
}

//! Concurrent fan-out across all source adapters, joined before anything
//! flows downstream.
//!
//! Fetches are independent and I/O-bound, so they run through a bounded
//! `buffer_unordered` stream. Each fetch carries its own timeout and is
//! cancelled on expiry; a failed fetch gets one retry with jittered backoff.
//! Nothing a source does can abort the run: failures are counted and logged,
//! and a run where every source fails simply produces zero items, which the
//! pipeline reports as degraded.

use futures::stream::{self, StreamExt};
use rand::{Rng, rng};
use reqwest::Client;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::FetchOptions;
use crate::models::{FetchStatus, NormalizedItem, RawFetchResult};
use crate::sources::SourceAdapter;

/// Delay before the single retry, plus up to 250ms of jitter.
const RETRY_BASE_DELAY_MS: u64 = 500;

/// Everything the join point knows once all adapters have settled.
#[derive(Debug)]
pub struct AggregateOutcome {
    /// Normalized items from every successful source, unordered (ordering is
    /// the Ranker's job).
    pub items: Vec<NormalizedItem>,
    pub attempted: usize,
    pub succeeded: usize,
    pub failed_sources: Vec<String>,
}

/// Invoke every adapter concurrently and merge results after all of them
/// reach a terminal state.
pub async fn collect(
    client: &Client,
    adapters: &[Box<dyn SourceAdapter>],
    options: &FetchOptions,
) -> AggregateOutcome {
    let attempted = adapters.len();
    info!(sources = attempted, "Fetching all sources");

    let settled: Vec<(&dyn SourceAdapter, RawFetchResult)> = stream::iter(adapters)
        .map(|adapter| async move {
            let adapter = adapter.as_ref();
            let raw = fetch_with_retry(client, adapter, options).await;
            (adapter, raw)
        })
        .buffer_unordered(options.concurrency.max(1))
        .collect()
        .await;

    let mut items = Vec::new();
    let mut succeeded = 0usize;
    let mut failed_sources = Vec::new();

    for (adapter, raw) in settled {
        if raw.status == FetchStatus::Failed {
            warn!(
                source = %raw.source_id,
                error = raw.error.as_deref().unwrap_or("unknown"),
                "Source fetch failed"
            );
            failed_sources.push(raw.source_id.clone());
            continue;
        }

        match adapter.normalize(&raw) {
            Ok(normalized) => {
                succeeded += 1;
                debug!(source = %raw.source_id, count = normalized.len(), "Source normalized");
                for item in normalized {
                    if item.is_publishable() {
                        items.push(item);
                    } else {
                        warn!(
                            source = %item.source_id,
                            title = %item.title,
                            "Dropping item with empty title or url"
                        );
                    }
                }
            }
            Err(e) => {
                warn!(source = %raw.source_id, error = %e, "Source payload unusable");
                failed_sources.push(raw.source_id.clone());
            }
        }
    }

    info!(
        attempted,
        succeeded,
        failed = failed_sources.len(),
        items = items.len(),
        "Aggregation complete"
    );

    AggregateOutcome {
        items,
        attempted,
        succeeded,
        failed_sources,
    }
}

async fn fetch_with_retry(
    client: &Client,
    adapter: &dyn SourceAdapter,
    options: &FetchOptions,
) -> RawFetchResult {
    let first = fetch_once(client, adapter, options).await;
    if first.status != FetchStatus::Failed || !options.retry {
        return first;
    }

    let jitter_ms: u64 = rng().random_range(0..=250);
    let delay = Duration::from_millis(RETRY_BASE_DELAY_MS + jitter_ms);
    debug!(source = adapter.source_id(), ?delay, "Retrying failed source once");
    sleep(delay).await;

    fetch_once(client, adapter, options).await
}

async fn fetch_once(
    client: &Client,
    adapter: &dyn SourceAdapter,
    options: &FetchOptions,
) -> RawFetchResult {
    // The HTTP client already times out at `timeout_secs`; this outer guard
    // also bounds adapters whose work goes beyond one request.
    let ceiling = Duration::from_secs(options.timeout_secs + 1);
    match tokio::time::timeout(ceiling, adapter.fetch(client)).await {
        Ok(raw) => raw,
        Err(_) => RawFetchResult::failed(
            adapter.source_id(),
            format!("timed out after {}s", ceiling.as_secs()),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DigestError, Result};
    use async_trait::async_trait;

    /// Scripted adapter for join-point tests.
    struct FakeAdapter {
        id: String,
        outcome: FakeOutcome,
    }

    enum FakeOutcome {
        Items(Vec<&'static str>),
        FetchFails,
        ParseFails,
        EmptyTitleItem,
    }

    impl FakeAdapter {
        fn new(id: &str, outcome: FakeOutcome) -> Box<dyn SourceAdapter> {
            Box::new(Self { id: id.to_string(), outcome })
        }
    }

    #[async_trait]
    impl SourceAdapter for FakeAdapter {
        fn source_id(&self) -> &str {
            &self.id
        }

        fn source_name(&self) -> &str {
            &self.id
        }

        async fn fetch(&self, _client: &Client) -> RawFetchResult {
            match self.outcome {
                FakeOutcome::FetchFails => RawFetchResult::failed(&self.id, "connection refused"),
                _ => RawFetchResult::success(&self.id, "payload".to_string()),
            }
        }

        fn normalize(&self, raw: &RawFetchResult) -> Result<Vec<NormalizedItem>> {
            if raw.status != FetchStatus::Success {
                return Ok(Vec::new());
            }
            match &self.outcome {
                FakeOutcome::Items(titles) => Ok(titles
                    .iter()
                    .map(|t| {
                        NormalizedItem::new(*t, format!("https://{}.org/{}", self.id, t), &self.id)
                    })
                    .collect()),
                FakeOutcome::ParseFails => Err(DigestError::Parse {
                    source_id: self.id.clone(),
                    reason: "not xml".into(),
                }),
                FakeOutcome::EmptyTitleItem => {
                    Ok(vec![NormalizedItem::new("", "https://x.org/1", &self.id)])
                }
                FakeOutcome::FetchFails => unreachable!(),
            }
        }
    }

    fn options() -> FetchOptions {
        FetchOptions {
            retry: false,
            ..FetchOptions::default()
        }
    }

    #[tokio::test]
    async fn test_partial_failure_keeps_healthy_sources() {
        let adapters = vec![
            FakeAdapter::new("good-a", FakeOutcome::Items(vec!["one", "two"])),
            FakeAdapter::new("broken", FakeOutcome::FetchFails),
            FakeAdapter::new("good-b", FakeOutcome::Items(vec!["three"])),
        ];
        let client = Client::new();
        let outcome = collect(&client, &adapters, &options()).await;

        assert_eq!(outcome.attempted, 3);
        assert_eq!(outcome.succeeded, 2);
        assert_eq!(outcome.failed_sources, vec!["broken".to_string()]);
        assert_eq!(outcome.items.len(), 3);
        assert!(outcome.items.iter().all(|i| i.source_id != "broken"));
    }

    #[tokio::test]
    async fn test_total_failure_yields_zero_items_without_panicking() {
        let adapters = vec![
            FakeAdapter::new("a", FakeOutcome::FetchFails),
            FakeAdapter::new("b", FakeOutcome::FetchFails),
        ];
        let client = Client::new();
        let outcome = collect(&client, &adapters, &options()).await;

        assert_eq!(outcome.succeeded, 0);
        assert!(outcome.items.is_empty());
        assert_eq!(outcome.failed_sources.len(), 2);
    }

    #[tokio::test]
    async fn test_unusable_payload_counts_as_failed_source() {
        let adapters = vec![
            FakeAdapter::new("garbage", FakeOutcome::ParseFails),
            FakeAdapter::new("good", FakeOutcome::Items(vec!["one"])),
        ];
        let client = Client::new();
        let outcome = collect(&client, &adapters, &options()).await;

        assert_eq!(outcome.succeeded, 1);
        assert_eq!(outcome.failed_sources, vec!["garbage".to_string()]);
        assert_eq!(outcome.items.len(), 1);
    }

    /// Fails the first fetch, succeeds the second.
    struct FlakyAdapter {
        id: String,
        calls: std::sync::atomic::AtomicUsize,
    }

    #[async_trait]
    impl SourceAdapter for FlakyAdapter {
        fn source_id(&self) -> &str {
            &self.id
        }

        fn source_name(&self) -> &str {
            &self.id
        }

        async fn fetch(&self, _client: &Client) -> RawFetchResult {
            let call = self
                .calls
                .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            if call == 0 {
                RawFetchResult::failed(&self.id, "transient error")
            } else {
                RawFetchResult::success(&self.id, "payload".to_string())
            }
        }

        fn normalize(&self, raw: &RawFetchResult) -> Result<Vec<NormalizedItem>> {
            if raw.status != FetchStatus::Success {
                return Ok(Vec::new());
            }
            Ok(vec![NormalizedItem::new(
                "Recovered story headline",
                "https://flaky.org/story",
                &self.id,
            )])
        }
    }

    #[tokio::test]
    async fn test_single_retry_recovers_transient_failure() {
        let adapters: Vec<Box<dyn SourceAdapter>> = vec![Box::new(FlakyAdapter {
            id: "flaky".to_string(),
            calls: std::sync::atomic::AtomicUsize::new(0),
        })];
        let client = Client::new();
        let retry_options = FetchOptions::default();
        let outcome = collect(&client, &adapters, &retry_options).await;

        assert_eq!(outcome.succeeded, 1);
        assert_eq!(outcome.items.len(), 1);
        assert!(outcome.failed_sources.is_empty());
    }

    #[tokio::test]
    async fn test_invariant_violations_dropped_at_boundary() {
        let adapters = vec![FakeAdapter::new("sloppy", FakeOutcome::EmptyTitleItem)];
        let client = Client::new();
        let outcome = collect(&client, &adapters, &options()).await;

        // Source succeeded, but its invalid item never reaches downstream.
        assert_eq!(outcome.succeeded, 1);
        assert!(outcome.items.is_empty());
    }
}

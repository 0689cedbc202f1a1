//! Source adapters for fetching science-news items.
//!
//! Each adapter owns exactly one source endpoint and follows the same
//! two-phase contract: `fetch` pulls the raw response, `normalize` turns it
//! into [`NormalizedItem`]s. Adapters never raise past their boundary;
//! network and HTTP failures come back as a `failed` [`RawFetchResult`], and
//! malformed entries inside a good payload are skipped one at a time.
//!
//! # Supported Kinds
//!
//! | Kind | Module | Method | Notes |
//! |------|--------|--------|-------|
//! | `feed` | [`feed`] | RSS 2.0 via quick-xml | Smithsonian, BBC science feeds |
//! | `apod` | [`apod`] | JSON API | NASA Astronomy Picture of the Day |
//! | `listing` | [`listing`] | HTML scraping | ScienceDaily / Phys.org headline pages |

pub mod apod;
pub mod feed;
pub mod listing;

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::config::{DigestConfig, FetchOptions, SourceKind};
use crate::error::{DigestError, Result};
use crate::models::{NormalizedItem, RawFetchResult};

/// Contract every source adapter implements.
///
/// `fetch` must resolve to a terminal [`RawFetchResult`] no matter what the
/// network does. `normalize` may fail as a whole (unusable payload), which
/// the Aggregator converts into a failed source; individual bad entries are
/// skipped, not escalated.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Stable identifier from the source configuration.
    fn source_id(&self) -> &str;

    /// Human-readable name for badges and logs.
    fn source_name(&self) -> &str;

    /// Fetch the raw payload. Never propagates errors.
    async fn fetch(&self, client: &Client) -> RawFetchResult;

    /// Interpret a raw result into normalized items. `Failed` and `Empty`
    /// inputs yield an empty list.
    fn normalize(&self, raw: &RawFetchResult) -> Result<Vec<NormalizedItem>>;
}

/// Shared HTTP client honoring the configured timeout and user agent.
pub fn http_client(options: &FetchOptions) -> Result<Client> {
    Client::builder()
        .user_agent(&options.user_agent)
        .timeout(Duration::from_secs(options.timeout_secs))
        .build()
        .map_err(|e| DigestError::Config(format!("building http client: {e}")))
}

/// Instantiate adapters for every enabled configured source.
pub fn build_adapters(config: &DigestConfig) -> Result<Vec<Box<dyn SourceAdapter>>> {
    let mut adapters: Vec<Box<dyn SourceAdapter>> = Vec::new();
    for source in config.enabled_sources() {
        match source.kind {
            SourceKind::Feed => adapters.push(Box::new(feed::FeedSource::new(source.clone()))),
            SourceKind::Apod => adapters.push(Box::new(apod::ApodSource::new(source.clone()))),
            SourceKind::Listing => {
                adapters.push(Box::new(listing::ListingSource::new(source.clone())?))
            }
        }
    }
    Ok(adapters)
}

/// GET a URL and return its body. HTTP-level failures come back as
/// [`DigestError::Fetch`], which adapters fold into a failed
/// [`RawFetchResult`] rather than propagate.
pub(crate) async fn fetch_text(client: &Client, source_id: &str, url: &str) -> Result<String> {
    let fetch_err = |reason: String| DigestError::Fetch {
        source_id: source_id.to_string(),
        reason,
    };

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| fetch_err(e.to_string()))?;
    let status = response.status();
    if !status.is_success() {
        return Err(fetch_err(format!("HTTP {status}")));
    }
    response.text().await.map_err(|e| fetch_err(e.to_string()))
}

//! HTML headline-listing adapter.
//!
//! Scrapes headline anchors from a listing page (ScienceDaily, Phys.org)
//! with a per-source CSS selector. Relative hrefs are resolved against the
//! page URL; navigation links, too-short headlines, and paywalled targets
//! are skipped. Listing pages carry no timestamps, so `published_at` stays
//! unset and those items lean on the other ranking signals.

use reqwest::Client;
use scraper::{Html, Selector};
use std::collections::HashSet;
use tracing::debug;
use url::Url;

use crate::classify;
use crate::config::SourceConfig;
use crate::error::{DigestError, Result};
use crate::models::{FetchStatus, NormalizedItem, RawFetchResult};
use crate::sources::{SourceAdapter, fetch_text};
use crate::text::{is_paywalled, normalize_text};

/// Fallback selector for sources that configure none.
const DEFAULT_SELECTOR: &str = "article h3 a";

/// Cap per listing page; listings repeat headlines across sections.
const MAX_ITEMS: usize = 15;

/// Headlines shorter than this are navigation, not stories.
const MIN_HEADLINE_CHARS: usize = 15;

/// Link texts that mark site chrome rather than articles.
const SKIP_WORDS: &[&str] = &[
    "subscribe",
    "newsletter",
    "sign in",
    "menu",
    "search",
    "advertisement",
    "about us",
    "contact",
    "privacy",
];

/// Adapter for one HTML listing page.
pub struct ListingSource {
    config: SourceConfig,
    base: Url,
    selector: String,
}

impl ListingSource {
    pub fn new(config: SourceConfig) -> Result<Self> {
        let base = Url::parse(&config.endpoint).map_err(|e| {
            DigestError::Config(format!("source '{}' endpoint: {}", config.id, e))
        })?;
        let selector = config
            .selector
            .clone()
            .unwrap_or_else(|| DEFAULT_SELECTOR.to_string());
        // Fail on an unparsable selector before any fetch happens.
        Selector::parse(&selector).map_err(|e| {
            DigestError::Config(format!("source '{}' selector: {}", config.id, e))
        })?;
        Ok(Self { config, base, selector })
    }
}

#[async_trait::async_trait]
impl SourceAdapter for ListingSource {
    fn source_id(&self) -> &str {
        &self.config.id
    }

    fn source_name(&self) -> &str {
        self.config.display_name()
    }

    async fn fetch(&self, client: &Client) -> RawFetchResult {
        match fetch_text(client, &self.config.id, &self.config.endpoint).await {
            Ok(body) if body.trim().is_empty() => RawFetchResult::empty(&self.config.id),
            Ok(body) => RawFetchResult::success(&self.config.id, body),
            Err(e) => RawFetchResult::failed(&self.config.id, e.to_string()),
        }
    }

    fn normalize(&self, raw: &RawFetchResult) -> Result<Vec<NormalizedItem>> {
        if raw.status != FetchStatus::Success {
            return Ok(Vec::new());
        }
        let payload = raw.payload.as_deref().unwrap_or_default();
        let document = Html::parse_document(payload);
        let selector = Selector::parse(&self.selector).map_err(|e| DigestError::Parse {
            source_id: self.config.id.clone(),
            reason: e.to_string(),
        })?;

        let mut seen_titles: HashSet<String> = HashSet::new();
        let mut items = Vec::new();

        for element in document.select(&selector) {
            if items.len() >= MAX_ITEMS {
                break;
            }

            let headline = normalize_text(&element.text().collect::<Vec<_>>().join(" "));
            if headline.chars().count() < MIN_HEADLINE_CHARS {
                continue;
            }
            let lowered = headline.to_lowercase();
            if SKIP_WORDS.iter().any(|w| lowered.contains(w)) {
                continue;
            }
            if !seen_titles.insert(lowered) {
                continue;
            }

            let Some(href) = element.value().attr("href") else {
                continue;
            };
            let Ok(resolved) = self.base.join(href) else {
                debug!(source = %self.config.id, href, "Skipping unresolvable href");
                continue;
            };
            let url = resolved.to_string();
            if is_paywalled(&url) {
                debug!(source = %self.config.id, %url, "Skipping paywalled link");
                continue;
            }

            items.push(NormalizedItem {
                domain: classify::classify(&headline, None),
                title: headline,
                url,
                summary: None,
                source_id: self.config.id.clone(),
                published_at: None,
                score: 0.0,
            });
        }

        Ok(items)
    }
}

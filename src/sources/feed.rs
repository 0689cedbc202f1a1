//! RSS 2.0 feed adapter.
//!
//! Parses `channel > item` entries with quick-xml's serde support. Entries
//! missing a title or link, and entries pointing at paywalled domains, are
//! skipped individually; a feed that parses but carries no usable entries is
//! a valid empty result.

use chrono::{DateTime, Utc};
use quick_xml::de::from_str;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::classify;
use crate::config::SourceConfig;
use crate::error::{DigestError, Result};
use crate::models::{FetchStatus, NormalizedItem, RawFetchResult};
use crate::sources::{SourceAdapter, fetch_text};
use crate::text::{clip_summary, is_paywalled, normalize_text};

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    items: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
}

fn parse_pub_date(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(raw.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Adapter for one RSS 2.0 feed endpoint.
pub struct FeedSource {
    config: SourceConfig,
}

impl FeedSource {
    pub fn new(config: SourceConfig) -> Self {
        Self { config }
    }
}

#[async_trait::async_trait]
impl SourceAdapter for FeedSource {
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
        let rss: Rss = from_str(payload).map_err(|e| DigestError::Parse {
            source_id: self.config.id.clone(),
            reason: e.to_string(),
        })?;

        let mut items = Vec::with_capacity(rss.channel.items.len());
        for entry in rss.channel.items {
            let title = normalize_text(entry.title.as_deref().unwrap_or_default());
            let url = entry.link.as_deref().unwrap_or_default().trim().to_string();
            if title.is_empty() || url.is_empty() {
                debug!(source = %self.config.id, "Skipping entry missing title or link");
                continue;
            }
            if is_paywalled(&url) {
                debug!(source = %self.config.id, %url, "Skipping paywalled entry");
                continue;
            }

            let summary = entry
                .description
                .as_deref()
                .map(normalize_text)
                .filter(|s| !s.is_empty())
                .map(|s| clip_summary(&s));
            let domain = classify::classify(&title, summary.as_deref());

            items.push(NormalizedItem {
                title,
                url,
                summary,
                source_id: self.config.id.clone(),
                published_at: entry.pub_date.as_deref().and_then(parse_pub_date),
                domain,
                score: 0.0,
            });
        }
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SourceKind;

    fn source() -> FeedSource {
        FeedSource::new(SourceConfig {
            id: "bbc-science".into(),
            name: Some("BBC Science".into()),
            kind: SourceKind::Feed,
            endpoint: "https://feeds.bbci.co.uk/news/science_and_environment/rss.xml".into(),
            api_key: None,
            selector: None,
            enabled: true,
        })
    }

    const FIXTURE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>BBC News - Science &amp; Environment</title>
    <item>
      <title>Webb telescope spots ancient galaxy</title>
      <link>https://www.bbc.co.uk/news/science-1?utm_source=rss</link>
      <description>&lt;p&gt;The &lt;b&gt;oldest&lt;/b&gt; galaxy yet seen.&lt;/p&gt;</description>
      <pubDate>Wed, 05 Aug 2026 09:30:00 GMT</pubDate>
    </item>
    <item>
      <title></title>
      <link>https://www.bbc.co.uk/news/science-2</link>
    </item>
    <item>
      <title>Subscriber exclusive on fossils</title>
      <link>https://www.nytimes.com/science/fossil</link>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn test_normalize_parses_entries_and_skips_bad_ones() {
        let adapter = source();
        let raw = RawFetchResult::success("bbc-science", FIXTURE.to_string());
        let items = adapter.normalize(&raw).unwrap();

        // Entry two has no title, entry three is paywalled.
        assert_eq!(items.len(), 1);
        let item = &items[0];
        assert_eq!(item.title, "Webb telescope spots ancient galaxy");
        assert_eq!(item.summary.as_deref(), Some("The oldest galaxy yet seen."));
        assert!(item.published_at.is_some());
        assert_eq!(item.source_id, "bbc-science");
    }

    #[test]
    fn test_normalize_rejects_garbage_payload() {
        let adapter = source();
        let raw = RawFetchResult::success("bbc-science", "this is not xml".to_string());
        assert!(matches!(
            adapter.normalize(&raw),
            Err(DigestError::Parse { .. })
        ));
    }

    #[test]
    fn test_normalize_passes_through_failed_fetch() {
        let adapter = source();
        let raw = RawFetchResult::failed("bbc-science", "timeout");
        assert!(adapter.normalize(&raw).unwrap().is_empty());
    }

    #[test]
    fn test_pub_date_parsing() {
        let dt = parse_pub_date("Wed, 05 Aug 2026 09:30:00 GMT").unwrap();
        assert_eq!(dt.to_rfc3339(), "2026-08-05T09:30:00+00:00");
        assert!(parse_pub_date("yesterday-ish").is_none());
    }
}

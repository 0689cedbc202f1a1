//! NASA Astronomy Picture of the Day adapter.
//!
//! One JSON object per day from `api.nasa.gov/planetary/apod`. The free
//! `DEMO_KEY` works with tight rate limits; a real key goes in the source
//! configuration.

use chrono::{DateTime, NaiveDate, Utc};
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::classify::{self, Domain};
use crate::config::SourceConfig;
use crate::error::{DigestError, Result};
use crate::models::{FetchStatus, NormalizedItem, RawFetchResult};
use crate::sources::{SourceAdapter, fetch_text};
use crate::text::{clip_summary, normalize_text};

/// Landing page used when the payload carries no media URL.
const APOD_PAGE: &str = "https://apod.nasa.gov/apod/astropix.html";

#[derive(Debug, Deserialize)]
struct ApodResponse {
    title: Option<String>,
    explanation: Option<String>,
    url: Option<String>,
    hdurl: Option<String>,
    date: Option<String>,
}

fn parse_apod_date(raw: &str) -> Option<DateTime<Utc>> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Adapter for the APOD JSON endpoint.
pub struct ApodSource {
    config: SourceConfig,
}

impl ApodSource {
    pub fn new(config: SourceConfig) -> Self {
        Self { config }
    }
}

#[async_trait::async_trait]
impl SourceAdapter for ApodSource {
    fn source_id(&self) -> &str {
        &self.config.id
    }

    fn source_name(&self) -> &str {
        self.config.display_name()
    }

    async fn fetch(&self, client: &Client) -> RawFetchResult {
        let api_key = self.config.api_key.as_deref().unwrap_or("DEMO_KEY");
        let url = match Url::parse_with_params(&self.config.endpoint, &[("api_key", api_key)]) {
            Ok(url) => url,
            Err(e) => return RawFetchResult::failed(&self.config.id, e.to_string()),
        };

        match fetch_text(client, &self.config.id, url.as_str()).await {
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
        let apod: ApodResponse = serde_json::from_str(payload).map_err(|e| DigestError::Parse {
            source_id: self.config.id.clone(),
            reason: e.to_string(),
        })?;

        let title = normalize_text(apod.title.as_deref().unwrap_or_default());
        if title.is_empty() {
            // A dayless or titleless payload is an empty result, not an error.
            return Ok(Vec::new());
        }
        let url = apod
            .hdurl
            .or(apod.url)
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| APOD_PAGE.to_string());
        let summary = apod
            .explanation
            .as_deref()
            .map(normalize_text)
            .filter(|s| !s.is_empty())
            .map(|s| clip_summary(&s));

        Ok(vec![NormalizedItem {
            domain: classify::classify(&title, summary.as_deref()).or(Some(Domain::Astronomy)),
            title,
            url,
            summary,
            source_id: self.config.id.clone(),
            published_at: apod.date.as_deref().and_then(parse_apod_date),
            score: 0.0,
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SourceKind;

    fn source() -> ApodSource {
        ApodSource::new(SourceConfig {
            id: "nasa-apod".into(),
            name: Some("NASA APOD".into()),
            kind: SourceKind::Apod,
            endpoint: "https://api.nasa.gov/planetary/apod".into(),
            api_key: Some("DEMO_KEY".into()),
            selector: None,
            enabled: true,
        })
    }

    #[test]
    fn test_normalize_single_item() {
        let payload = r#"{
            "date": "2026-08-06",
            "title": "The Sombrero Galaxy",
            "explanation": "A bright galaxy seen edge-on.",
            "url": "https://apod.nasa.gov/apod/image/sombrero.jpg",
            "hdurl": "https://apod.nasa.gov/apod/image/sombrero_hd.jpg",
            "media_type": "image"
        }"#;
        let adapter = source();
        let raw = RawFetchResult::success("nasa-apod", payload.to_string());
        let items = adapter.normalize(&raw).unwrap();

        assert_eq!(items.len(), 1);
        let item = &items[0];
        assert_eq!(item.title, "The Sombrero Galaxy");
        assert_eq!(item.url, "https://apod.nasa.gov/apod/image/sombrero_hd.jpg");
        assert_eq!(item.domain, Some(Domain::Astronomy));
        assert_eq!(
            item.published_at.unwrap().to_rfc3339(),
            "2026-08-06T00:00:00+00:00"
        );
    }

    #[test]
    fn test_missing_media_url_falls_back_to_page() {
        let payload = r#"{"date": "2026-08-06", "title": "A Video Day", "media_type": "video"}"#;
        let adapter = source();
        let raw = RawFetchResult::success("nasa-apod", payload.to_string());
        let items = adapter.normalize(&raw).unwrap();
        assert_eq!(items[0].url, APOD_PAGE);
    }

    #[test]
    fn test_titleless_payload_is_empty_not_error() {
        let adapter = source();
        let raw = RawFetchResult::success("nasa-apod", "{}".to_string());
        assert!(adapter.normalize(&raw).unwrap().is_empty());
    }

    #[test]
    fn test_garbage_payload_is_parse_error() {
        let adapter = source();
        let raw = RawFetchResult::success("nasa-apod", "<html>rate limited</html>".to_string());
        assert!(matches!(
            adapter.normalize(&raw),
            Err(DigestError::Parse { .. })
        ));
    }
}

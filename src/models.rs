//! Data models for the digest pipeline.
//!
//! This module defines the structures that flow between pipeline stages:
//! - [`RawFetchResult`]: one per source per run, the raw response body plus
//!   fetch outcome; opaque to everything except the adapter that produced it
//! - [`NormalizedItem`]: the canonical unit flowing through dedupe, rank,
//!   and render
//! - [`DigestDocument`]: the final ordered, truncated item list with run
//!   metadata, handed to the renderer
//!
//! Data moves strictly one direction: adapter → aggregator → deduplicator →
//! ranker → renderer. Nothing here is persisted across runs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::classify::Domain;

/// Terminal state of a single source fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchStatus {
    /// The request completed and produced a usable payload.
    Success,
    /// The request failed (network, timeout, HTTP, or unusable payload).
    Failed,
    /// The request completed but the source had nothing to offer.
    Empty,
}

/// Raw per-source fetch outcome, created once per run per source.
///
/// The `payload` is the undecoded response body; only the adapter that
/// fetched it knows how to interpret it. Discarded after normalization.
#[derive(Debug, Clone)]
pub struct RawFetchResult {
    /// Identifier of the source this result belongs to.
    pub source_id: String,
    /// Terminal fetch state.
    pub status: FetchStatus,
    /// Response body for `Success`; `None` for `Failed` and `Empty`.
    pub payload: Option<String>,
    /// When the fetch settled.
    pub fetched_at: DateTime<Utc>,
    /// Failure detail, present only when `status` is `Failed`.
    pub error: Option<String>,
}

impl RawFetchResult {
    /// A successful fetch carrying a response body.
    pub fn success(source_id: &str, payload: String) -> Self {
        Self {
            source_id: source_id.to_string(),
            status: FetchStatus::Success,
            payload: Some(payload),
            fetched_at: Utc::now(),
            error: None,
        }
    }

    /// A failed fetch. The reason is logged by the aggregator and the source
    /// is counted as failed for the run.
    pub fn failed(source_id: &str, reason: impl Into<String>) -> Self {
        Self {
            source_id: source_id.to_string(),
            status: FetchStatus::Failed,
            payload: None,
            fetched_at: Utc::now(),
            error: Some(reason.into()),
        }
    }

    /// A completed fetch that yielded no items.
    pub fn empty(source_id: &str) -> Self {
        Self {
            source_id: source_id.to_string(),
            status: FetchStatus::Empty,
            payload: None,
            fetched_at: Utc::now(),
            error: None,
        }
    }
}

/// Canonical news item flowing through dedupe, rank, and render.
///
/// Invariant: `title` and `url` are non-empty for any item that reaches the
/// Deduplicator. Items violating this are dropped at the normalization
/// boundary with a logged reason.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedItem {
    /// Headline, cleaned by [`crate::text::normalize_text`].
    pub title: String,
    /// Item URL; a weak identity hint used by the Deduplicator.
    pub url: String,
    /// Optional short summary; never full article text.
    pub summary: Option<String>,
    /// Identifier of the source that produced this item.
    pub source_id: String,
    /// Publication timestamp, when the source provided one.
    pub published_at: Option<DateTime<Utc>>,
    /// Scientific domain tag assigned by keyword classification.
    pub domain: Option<Domain>,
    /// Ranking score; zero until the Ranker assigns it.
    #[serde(default)]
    pub score: f64,
}

impl NormalizedItem {
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        source_id: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            summary: None,
            source_id: source_id.into(),
            published_at: None,
            domain: None,
            score: 0.0,
        }
    }

    /// Whether the item satisfies the non-empty title/url invariant required
    /// past the normalization boundary.
    pub fn is_publishable(&self) -> bool {
        !self.title.trim().is_empty() && !self.url.trim().is_empty()
    }

    pub fn has_summary(&self) -> bool {
        self.summary.as_deref().is_some_and(|s| !s.trim().is_empty())
    }
}

/// The final digest: ranked, deduplicated, truncated items plus run metadata.
///
/// Immutable once rendered. One `DigestDocument` exists per run; the output
/// file is overwritten, never appended.
#[derive(Debug, Clone, Serialize)]
pub struct DigestDocument {
    /// Items in final display order.
    pub items: Vec<NormalizedItem>,
    /// When this digest was generated.
    pub generated_at: DateTime<Utc>,
    /// How many sources the run attempted.
    pub sources_attempted: usize,
    /// How many sources produced a terminal `Success` or `Empty` state.
    pub sources_succeeded: usize,
}

impl DigestDocument {
    /// A run where some but not all sources contributed.
    pub fn is_degraded(&self) -> bool {
        self.sources_succeeded < self.sources_attempted
    }
}

//! Error taxonomy for the digest pipeline.
//!
//! Only two classes of error abort a run: configuration errors (raised before
//! any fetch begins) and render/write errors (raised after aggregation, with
//! the previous output left untouched). Fetch and parse failures are recovered
//! inside the source adapter that produced them and surface only as a `failed`
//! [`RawFetchResult`](crate::models::RawFetchResult).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DigestError {
    /// Missing or invalid source configuration. Fatal before any fetch.
    #[error("configuration error: {0}")]
    Config(String),

    /// Network, timeout, or HTTP failure while fetching a source. Recovered
    /// at the adapter boundary; never escapes the Aggregator.
    #[error("fetch failed for source '{source_id}': {reason}")]
    Fetch { source_id: String, reason: String },

    /// Malformed payload or entry. Recovered at the adapter boundary;
    /// offending entries are skipped.
    #[error("parse failed for source '{source_id}': {reason}")]
    Parse { source_id: String, reason: String },

    /// Template or encoding failure while rendering. Fatal for the run;
    /// nothing is written.
    #[error("render error: {0}")]
    Render(String),

    /// Output write failure. Fatal; the atomic replace never half-applies,
    /// so the previous output survives.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DigestError>;

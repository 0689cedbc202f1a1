//! # Science Digest
//!
//! Aggregates science-news items from free, open-access sources into a
//! single deduplicated, ranked digest rendered as a static HTML page.
//!
//! ## Architecture
//!
//! One-directional pipeline, run once per invocation:
//!
//! ```text
//! Source Adapters → Aggregator → Deduplicator → Ranker → Renderer → HTML
//! ```
//!
//! - [`sources`]: per-source fetch + normalize adapters (RSS, NASA APOD,
//!   HTML listings)
//! - [`aggregator`]: concurrent fan-out, join, partial-failure tolerance
//! - [`dedupe`]: canonical-URL and fuzzy-title duplicate collapsing
//! - [`rank`]: deterministic scoring and truncation
//! - [`render`]: escaped, byte-stable HTML with atomic output replacement
//! - [`pipeline`]: orchestration and run reporting
//!
//! Nothing is persisted between runs; the only artifact is the output HTML,
//! overwritten atomically on success.

pub mod aggregator;
pub mod classify;
pub mod cli;
pub mod config;
pub mod dedupe;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod rank;
pub mod render;
pub mod sources;
pub mod text;

pub use config::DigestConfig;
pub use error::{DigestError, Result};
pub use models::{DigestDocument, FetchStatus, NormalizedItem, RawFetchResult};
pub use pipeline::{RunReport, run};

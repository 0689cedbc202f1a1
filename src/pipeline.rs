//! Pipeline orchestration: fetch → normalize → deduplicate → rank → render.
//!
//! The entry point takes an explicit [`DigestConfig`] (no ambient state)
//! and returns a [`RunReport`] the caller maps onto a process exit status.
//! Tests drive [`run_with_adapters`] directly with synthetic sources.

use chrono::Utc;
use std::path::Path;
use tracing::{info, warn};

use crate::aggregator;
use crate::config::DigestConfig;
use crate::dedupe;
use crate::error::Result;
use crate::models::DigestDocument;
use crate::rank;
use crate::render;
use crate::sources::{self, SourceAdapter};

/// What a completed run did, for logging and exit-status mapping.
#[derive(Debug)]
pub struct RunReport {
    pub sources_attempted: usize,
    pub sources_succeeded: usize,
    /// Items in the published digest (zero when nothing was written).
    pub published_items: usize,
    /// Whether the output file was (re)written this run.
    pub written: bool,
}

impl RunReport {
    /// The run counts as successful when at least one source succeeded and
    /// the output landed on disk.
    pub fn is_success(&self) -> bool {
        self.sources_succeeded > 0 && self.written
    }

    /// At least one but not all sources contributed.
    pub fn is_degraded(&self) -> bool {
        self.sources_succeeded > 0 && self.sources_succeeded < self.sources_attempted
    }
}

/// Run the full pipeline with adapters built from the configuration.
pub async fn run(config: &DigestConfig) -> Result<RunReport> {
    config.validate()?;
    let adapters = sources::build_adapters(config)?;
    run_with_adapters(config, &adapters).await
}

/// Run the full pipeline over the given adapters. Split out so tests can
/// substitute synthetic source sets.
pub async fn run_with_adapters(
    config: &DigestConfig,
    adapters: &[Box<dyn SourceAdapter>],
) -> Result<RunReport> {
    let client = sources::http_client(&config.fetch)?;

    let outcome = aggregator::collect(&client, adapters, &config.fetch).await;

    let deduped = dedupe::dedupe(outcome.items, &config.dedupe, &config.source_priority);
    info!(stories = deduped.len(), "Deduplication complete");

    let generated_at = Utc::now();
    let ranked = rank::rank(
        deduped,
        &config.ranking,
        &config.source_priority,
        config.digest_size,
        generated_at,
    );

    let document = DigestDocument {
        items: ranked,
        generated_at,
        sources_attempted: outcome.attempted,
        sources_succeeded: outcome.succeeded,
    };

    if document.items.is_empty() {
        // Zero items means a broken morning, not a blank page: keep whatever
        // the last successful run published.
        warn!(
            attempted = outcome.attempted,
            succeeded = outcome.succeeded,
            "No items obtained; preserving previous output"
        );
        return Ok(RunReport {
            sources_attempted: outcome.attempted,
            sources_succeeded: outcome.succeeded,
            published_items: 0,
            written: false,
        });
    }

    let html = render::render(&document)?;
    render::write_atomic(Path::new(&config.output_path), &html).await?;

    info!(
        items = document.items.len(),
        degraded = document.is_degraded(),
        path = %config.output_path,
        "Digest published"
    );

    Ok(RunReport {
        sources_attempted: outcome.attempted,
        sources_succeeded: outcome.succeeded,
        published_items: document.items.len(),
        written: true,
    })
}

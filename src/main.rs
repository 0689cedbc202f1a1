//! # Science Digest
//!
//! A science-news aggregation pipeline that fetches items from free,
//! open-access sources (RSS feeds, the NASA APOD API, and HTML headline
//! listings), deduplicates and ranks them, and publishes one static HTML
//! digest page.
//!
//! ## Usage
//!
//! ```sh
//! science_digest --config sources.yaml --output /srv/www/science_digest.html
//! ```
//!
//! ## Architecture
//!
//! The application follows a pipeline architecture:
//! 1. **Fetch**: pull all configured sources concurrently, tolerating
//!    partial failure
//! 2. **Normalize**: convert each raw payload into canonical items
//! 3. **Deduplicate**: collapse the same story reported by several sources
//! 4. **Rank**: score by freshness, source priority, and summary presence
//! 5. **Render**: write the digest HTML atomically
//!
//! Exit status is zero only when at least one source succeeded and the
//! output file was written, so an external scheduler can alert on persistent
//! failure.

use clap::Parser;
use std::path::Path;
use std::process::ExitCode;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

use science_digest::cli::Cli;
use science_digest::config::DigestConfig;
use science_digest::pipeline;

#[tokio::main]
async fn main() -> ExitCode {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("science_digest starting up");

    let args = Cli::parse();
    debug!(?args.config, ?args.output, args.no_open, "Parsed CLI arguments");
    if args.no_open {
        // Accepted for scheduler compatibility; the pipeline never opens a
        // browser, so there is nothing to suppress.
        debug!("--no-open accepted and ignored");
    }

    // ---- Load configuration ----
    let mut config = match args.config.as_deref() {
        Some(path) => match DigestConfig::load(Path::new(path)) {
            Ok(config) => {
                info!(path, "Loaded source configuration");
                config
            }
            Err(e) => {
                error!(path, error = %e, "Invalid configuration; aborting before any fetch");
                return ExitCode::FAILURE;
            }
        },
        None => {
            info!("No config file given; using built-in source set");
            DigestConfig::default()
        }
    };
    if let Some(output) = args.output {
        config.output_path = output;
    }
    info!(
        sources = config.enabled_sources().count(),
        digest_size = config.digest_size,
        output = %config.output_path,
        "Configuration ready"
    );

    // ---- Run the pipeline ----
    let report = match pipeline::run(&config).await {
        Ok(report) => report,
        Err(e) => {
            error!(error = %e, "Pipeline run failed");
            return ExitCode::FAILURE;
        }
    };

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        attempted = report.sources_attempted,
        succeeded = report.sources_succeeded,
        published = report.published_items,
        written = report.written,
        "Execution complete"
    );

    if report.is_degraded() {
        warn!(
            succeeded = report.sources_succeeded,
            attempted = report.sources_attempted,
            "Degraded run: some sources did not contribute"
        );
    }

    if report.is_success() {
        ExitCode::SUCCESS
    } else {
        error!("Run did not publish a digest; reporting failure to the scheduler");
        ExitCode::FAILURE
    }
}

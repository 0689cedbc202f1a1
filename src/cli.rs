//! Command-line interface definitions for Science Digest.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! No argument is required; a bare invocation runs the pipeline with the
//! built-in source set and writes `science_digest.html`.

use clap::Parser;

/// Command-line arguments for the Science Digest application.
///
/// # Examples
///
/// ```sh
/// # Run with built-in defaults
/// science_digest
///
/// # Run against a source configuration file
/// science_digest --config sources.yaml
///
/// # Scheduler-friendly invocation
/// science_digest --no-open --output /srv/www/science_digest.html
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path to a YAML source configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Output HTML path, overriding the configured one
    #[arg(short, long)]
    pub output: Option<String>,

    /// Suppress any local post-run auto-open behavior. Accepted for
    /// scheduler compatibility; the pipeline itself never opens anything.
    #[arg(long)]
    pub no_open: bool,
}

//! Run configuration: sources, thresholds, weights, output path.
//!
//! Configuration is an explicit structure handed to the pipeline entry
//! point, never ambient state, so tests can run the pipeline against
//! synthetic source sets. It is read once per run from a YAML file
//! (`--config`), with built-in defaults covering the stock open-access
//! source list when no file is given.
//!
//! # Example
//!
//! ```yaml
//! digest_size: 12
//! output_path: science_digest.html
//! fetch:
//!   timeout_secs: 8
//! dedupe:
//!   similarity: token_overlap
//!   similarity_threshold: 0.6
//! source_priority: [nasa-apod, bbc-science, smithsonian]
//! sources:
//!   - id: bbc-science
//!     name: BBC Science
//!     kind: feed
//!     endpoint: https://feeds.bbci.co.uk/news/science_and_environment/rss.xml
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{DigestError, Result};

/// Which kind of adapter serves a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// RSS 2.0 feed.
    Feed,
    /// NASA Astronomy Picture of the Day JSON API.
    Apod,
    /// HTML headline listing scraped with a CSS selector.
    Listing,
}

/// Per-source settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Stable identifier, unique across the run.
    pub id: String,
    /// Display name; falls back to the id.
    #[serde(default)]
    pub name: Option<String>,
    pub kind: SourceKind,
    /// Feed URL, API URL, or listing page URL.
    pub endpoint: String,
    /// API key for sources that want one (`apod`).
    #[serde(default)]
    pub api_key: Option<String>,
    /// CSS selector for `listing` sources; defaults to a generic
    /// headline-anchor selector.
    #[serde(default)]
    pub selector: Option<String>,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl SourceConfig {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

/// HTTP fetch behavior shared by all adapters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchOptions {
    /// Per-fetch timeout; expired fetches are cancelled, not retried forever.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Whether a failed fetch gets one retry with jittered backoff.
    #[serde(default = "default_true")]
    pub retry: bool,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// How many source fetches run concurrently.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            retry: true,
            user_agent: default_user_agent(),
            concurrency: default_concurrency(),
        }
    }
}

/// Title similarity policy used by the Deduplicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityPolicy {
    /// Ratio of shared title tokens over the smaller token set.
    TokenOverlap,
    /// strsim normalized Levenshtein over normalized titles.
    Levenshtein,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DedupeConfig {
    #[serde(default = "default_similarity_policy")]
    pub similarity: SimilarityPolicy,
    /// Titles scoring at or above this are treated as the same story.
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,
}

impl Default for DedupeConfig {
    fn default() -> Self {
        Self {
            similarity: default_similarity_policy(),
            similarity_threshold: default_similarity_threshold(),
        }
    }
}

/// Scoring weights for the Ranker. All signals land in `0.0..=1.0` before
/// weighting, so the weights express relative importance directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingConfig {
    #[serde(default = "default_freshness_weight")]
    pub freshness_weight: f64,
    #[serde(default = "default_priority_weight")]
    pub priority_weight: f64,
    #[serde(default = "default_summary_weight")]
    pub summary_weight: f64,
    /// Freshness halves every this many hours of item age.
    #[serde(default = "default_half_life_hours")]
    pub freshness_half_life_hours: f64,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            freshness_weight: default_freshness_weight(),
            priority_weight: default_priority_weight(),
            summary_weight: default_summary_weight(),
            freshness_half_life_hours: default_half_life_hours(),
        }
    }
}

/// Top-level run configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DigestConfig {
    /// Maximum number of items in the published digest.
    #[serde(default = "default_digest_size")]
    pub digest_size: usize,
    /// Where the rendered HTML lands; overwritten atomically each run.
    #[serde(default = "default_output_path")]
    pub output_path: String,
    #[serde(default)]
    pub fetch: FetchOptions,
    #[serde(default)]
    pub dedupe: DedupeConfig,
    #[serde(default)]
    pub ranking: RankingConfig,
    /// Source ids in descending priority, used for dedupe tie-breaks and the
    /// ranking priority signal. Unlisted sources rank behind listed ones.
    #[serde(default)]
    pub source_priority: Vec<String>,
    pub sources: Vec<SourceConfig>,
}

impl DigestConfig {
    /// Load and validate configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            DigestError::Config(format!("reading {}: {}", path.display(), e))
        })?;
        let config: DigestConfig = serde_yaml::from_str(&content)
            .map_err(|e| DigestError::Config(format!("parsing {}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that cannot produce a meaningful run. Runs
    /// before any fetch begins.
    pub fn validate(&self) -> Result<()> {
        if self.digest_size == 0 {
            return Err(DigestError::Config("digest_size must be at least 1".into()));
        }
        if self.output_path.trim().is_empty() {
            return Err(DigestError::Config("output_path must not be empty".into()));
        }
        if !self.sources.iter().any(|s| s.enabled) {
            return Err(DigestError::Config("no enabled sources configured".into()));
        }
        let mut seen = std::collections::HashSet::new();
        for source in &self.sources {
            if source.id.trim().is_empty() {
                return Err(DigestError::Config("source with empty id".into()));
            }
            if !seen.insert(source.id.as_str()) {
                return Err(DigestError::Config(format!("duplicate source id '{}'", source.id)));
            }
            url::Url::parse(&source.endpoint).map_err(|e| {
                DigestError::Config(format!("source '{}' endpoint: {}", source.id, e))
            })?;
        }
        let t = self.dedupe.similarity_threshold;
        if !(0.0..=1.0).contains(&t) {
            return Err(DigestError::Config(format!(
                "similarity_threshold {} outside 0.0..=1.0",
                t
            )));
        }
        if self.ranking.freshness_half_life_hours <= 0.0 {
            return Err(DigestError::Config(
                "freshness_half_life_hours must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Position of a source in the priority list; `None` for unlisted.
    pub fn priority_index(&self, source_id: &str) -> Option<usize> {
        self.source_priority.iter().position(|id| id == source_id)
    }

    /// Enabled sources only, in configured order.
    pub fn enabled_sources(&self) -> impl Iterator<Item = &SourceConfig> {
        self.sources.iter().filter(|s| s.enabled)
    }
}

impl Default for DigestConfig {
    /// The stock free, open-access source set from the original digest.
    fn default() -> Self {
        let sources = vec![
            SourceConfig {
                id: "smithsonian".into(),
                name: Some("Smithsonian".into()),
                kind: SourceKind::Feed,
                endpoint: "https://www.smithsonianmag.com/rss/science-nature/".into(),
                api_key: None,
                selector: None,
                enabled: true,
            },
            SourceConfig {
                id: "bbc-science".into(),
                name: Some("BBC Science".into()),
                kind: SourceKind::Feed,
                endpoint: "https://feeds.bbci.co.uk/news/science_and_environment/rss.xml".into(),
                api_key: None,
                selector: None,
                enabled: true,
            },
            SourceConfig {
                id: "nasa-apod".into(),
                name: Some("NASA APOD".into()),
                kind: SourceKind::Apod,
                endpoint: "https://api.nasa.gov/planetary/apod".into(),
                api_key: Some("DEMO_KEY".into()),
                selector: None,
                enabled: true,
            },
            SourceConfig {
                id: "sciencedaily-space".into(),
                name: Some("ScienceDaily".into()),
                kind: SourceKind::Listing,
                endpoint: "https://www.sciencedaily.com/news/space_time/".into(),
                api_key: None,
                selector: Some("#headlines a".into()),
                enabled: true,
            },
            SourceConfig {
                id: "physorg-space".into(),
                name: Some("Phys.org".into()),
                kind: SourceKind::Listing,
                endpoint: "https://phys.org/space-news/".into(),
                api_key: None,
                selector: Some("article h3 a".into()),
                enabled: true,
            },
        ];
        Self {
            digest_size: default_digest_size(),
            output_path: default_output_path(),
            fetch: FetchOptions::default(),
            dedupe: DedupeConfig::default(),
            ranking: RankingConfig::default(),
            source_priority: vec![
                "nasa-apod".into(),
                "bbc-science".into(),
                "smithsonian".into(),
                "sciencedaily-space".into(),
                "physorg-space".into(),
            ],
            sources,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    8
}

fn default_user_agent() -> String {
    format!("science_digest/{}", env!("CARGO_PKG_VERSION"))
}

fn default_concurrency() -> usize {
    6
}

fn default_similarity_policy() -> SimilarityPolicy {
    SimilarityPolicy::TokenOverlap
}

fn default_similarity_threshold() -> f64 {
    0.6
}

fn default_freshness_weight() -> f64 {
    0.6
}

fn default_priority_weight() -> f64 {
    0.3
}

fn default_summary_weight() -> f64 {
    0.1
}

fn default_half_life_hours() -> f64 {
    24.0
}

fn default_digest_size() -> usize {
    12
}

fn default_output_path() -> String {
    "science_digest.html".to_string()
}

//! End-to-end pipeline tests over synthetic source adapters.
//!
//! These exercise the whole fetch → normalize → dedupe → rank → render run
//! without any network: adapters are scripted to succeed, fail, or return
//! duplicate stories, and assertions run against the report and the HTML
//! that lands on disk.

use async_trait::async_trait;
use reqwest::Client;

use science_digest::config::DigestConfig;
use science_digest::error::Result;
use science_digest::models::{FetchStatus, NormalizedItem, RawFetchResult};
use science_digest::pipeline;
use science_digest::sources::SourceAdapter;

/// Scripted adapter: either fails its fetch or returns fixed items.
struct ScriptedSource {
    id: String,
    fail: bool,
    items: Vec<(String, String, Option<String>)>, // (title, url, summary)
}

impl ScriptedSource {
    fn healthy(id: &str, items: &[(&str, &str)]) -> Box<dyn SourceAdapter> {
        Box::new(Self {
            id: id.to_string(),
            fail: false,
            items: items
                .iter()
                .map(|(t, u)| {
                    (
                        t.to_string(),
                        u.to_string(),
                        Some("Syndicated summary for the story.".to_string()),
                    )
                })
                .collect(),
        })
    }

    fn failing(id: &str) -> Box<dyn SourceAdapter> {
        Box::new(Self {
            id: id.to_string(),
            fail: true,
            items: Vec::new(),
        })
    }
}

#[async_trait]
impl SourceAdapter for ScriptedSource {
    fn source_id(&self) -> &str {
        &self.id
    }

    fn source_name(&self) -> &str {
        &self.id
    }

    async fn fetch(&self, _client: &Client) -> RawFetchResult {
        if self.fail {
            RawFetchResult::failed(&self.id, "connection refused")
        } else {
            RawFetchResult::success(&self.id, String::new())
        }
    }

    fn normalize(&self, raw: &RawFetchResult) -> Result<Vec<NormalizedItem>> {
        if raw.status != FetchStatus::Success {
            return Ok(Vec::new());
        }
        Ok(self
            .items
            .iter()
            .map(|(title, url, summary)| {
                let mut item = NormalizedItem::new(title, url, &self.id);
                item.summary = summary.clone();
                item
            })
            .collect())
    }
}

fn config_for(dir: &tempfile::TempDir) -> DigestConfig {
    let mut config = DigestConfig::default();
    config.output_path = dir
        .path()
        .join("science_digest.html")
        .to_string_lossy()
        .into_owned();
    config.fetch.retry = false;
    config
}

#[tokio::test]
async fn one_failed_source_still_yields_a_digest_from_the_others() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(&dir);

    let adapters = vec![
        ScriptedSource::healthy(
            "feed-a",
            &[("Comet returns after seventy years", "https://a.org/comet")],
        ),
        ScriptedSource::failing("feed-b"),
        ScriptedSource::healthy(
            "feed-c",
            &[("Glacier melt accelerates in Antarctica", "https://c.org/glacier")],
        ),
    ];

    let report = pipeline::run_with_adapters(&config, &adapters).await.unwrap();
    assert!(report.is_success());
    assert!(report.is_degraded());
    assert_eq!(report.sources_attempted, 3);
    assert_eq!(report.sources_succeeded, 2);
    assert_eq!(report.published_items, 2);

    let html = std::fs::read_to_string(&config.output_path).unwrap();
    assert!(html.contains("Comet returns after seventy years"));
    assert!(html.contains("Glacier melt accelerates in Antarctica"));
    assert!(!html.contains("feed-b"));
    assert!(html.contains("class=\"degraded\""));
}

#[tokio::test]
async fn all_sources_failing_preserves_previous_output_and_reports_failure() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(&dir);

    let previous = "<html>yesterday's perfectly good digest</html>";
    std::fs::write(&config.output_path, previous).unwrap();

    let adapters = vec![
        ScriptedSource::failing("feed-a"),
        ScriptedSource::failing("feed-b"),
    ];

    let report = pipeline::run_with_adapters(&config, &adapters).await.unwrap();
    assert!(!report.is_success());
    assert!(!report.written);
    assert_eq!(report.sources_succeeded, 0);
    assert_eq!(report.published_items, 0);

    // Yesterday's page survives untouched.
    assert_eq!(std::fs::read_to_string(&config.output_path).unwrap(), previous);
}

#[tokio::test]
async fn same_story_from_two_sources_appears_once() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(&dir);

    let adapters = vec![
        ScriptedSource::healthy(
            "feed-a",
            &[("Webb telescope spots ancient galaxy", "https://a.org/x?utm=1")],
        ),
        ScriptedSource::healthy(
            "feed-b",
            &[("Webb telescope spots ancient galaxy", "https://a.org/x")],
        ),
    ];

    let report = pipeline::run_with_adapters(&config, &adapters).await.unwrap();
    assert!(report.is_success());
    assert_eq!(report.published_items, 1);

    let html = std::fs::read_to_string(&config.output_path).unwrap();
    assert_eq!(html.matches("Webb telescope spots ancient galaxy").count(), 1);
}

#[tokio::test]
async fn digest_truncates_to_configured_size() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_for(&dir);
    config.digest_size = 4;

    // Titles share no vocabulary, so none of them fuzzy-match another.
    let stories: &[(&str, &str)] = &[
        ("Comet dust tail surprises astronomers", "https://a.org/s0"),
        ("Deep sea vents host unknown microbes", "https://a.org/s1"),
        ("Glacier collapse raises coastal flooding risk", "https://a.org/s2"),
        ("Fossil jaw rewrites mammal evolution", "https://a.org/s3"),
        ("Solar probe survives closest approach", "https://a.org/s4"),
        ("Wildfire smoke alters cloud formation", "https://a.org/s5"),
        ("Gene therapy restores hearing in mice", "https://a.org/s6"),
        ("Permafrost thaw releases trapped methane", "https://a.org/s7"),
        ("Exoplanet atmosphere shows water vapor", "https://a.org/s8"),
        ("Coral reef recovery beats expectations", "https://a.org/s9"),
    ];

    let adapters = vec![ScriptedSource::healthy("feed-a", stories)];

    let report = pipeline::run_with_adapters(&config, &adapters).await.unwrap();
    assert_eq!(report.published_items, 4);

    let html = std::fs::read_to_string(&config.output_path).unwrap();
    assert_eq!(html.matches("class=\"card\"").count(), 4);
}

#[tokio::test]
async fn failed_write_leaves_previous_output_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(&dir);

    let previous = "<html>previous digest</html>";
    std::fs::write(&config.output_path, previous).unwrap();
    // Occupy the staging path with a directory so the write fails before the
    // final rename can happen.
    std::fs::create_dir(format!("{}.tmp", config.output_path)).unwrap();

    let adapters = vec![ScriptedSource::healthy(
        "feed-a",
        &[("Comet dust tail surprises astronomers", "https://a.org/x")],
    )];

    let result = pipeline::run_with_adapters(&config, &adapters).await;
    assert!(result.is_err());
    assert_eq!(std::fs::read_to_string(&config.output_path).unwrap(), previous);
}

#[tokio::test]
async fn empty_sources_count_as_succeeded_but_publish_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(&dir);

    let adapters = vec![ScriptedSource::healthy("feed-a", &[])];

    let report = pipeline::run_with_adapters(&config, &adapters).await.unwrap();
    assert_eq!(report.sources_succeeded, 1);
    assert_eq!(report.published_items, 0);
    assert!(!report.written);
    // No output file materializes for an all-empty run.
    assert!(!std::path::Path::new(&config.output_path).exists());
}

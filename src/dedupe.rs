//! Collapse near-duplicate items into one representative per story.
//!
//! Two items are the same story when their canonical URLs match, or when
//! their normalized titles are equal or score above the configured
//! similarity threshold. The similarity measure is a pure function behind
//! the [`Similarity`] trait so the matching policy can be swapped and tested
//! in isolation.
//!
//! Merging is deterministic: the representative is the item with a summary,
//! then the earliest `published_at`, then the highest configured source
//! priority, then the first seen. Output preserves first-seen order of the
//! surviving representatives.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use tracing::debug;
use url::Url;

use crate::config::{DedupeConfig, SimilarityPolicy};
use crate::models::NormalizedItem;

/// Query parameters that identify campaigns or visitors, never content.
const TRACKING_PARAM_PREFIXES: &[&str] = &["utm"];
const TRACKING_PARAMS: &[&str] = &["fbclid", "gclid", "mc_cid", "mc_eid", "cmpid", "ref", "ocid"];

fn is_tracking_param(name: &str) -> bool {
    let name = name.to_ascii_lowercase();
    TRACKING_PARAM_PREFIXES.iter().any(|p| name.starts_with(p))
        || TRACKING_PARAMS.contains(&name.as_str())
}

/// Canonical form of a URL for identity comparison: no fragment, no tracking
/// parameters, no trailing slash. The host is already lowercased by the
/// parser. Unparsable URLs fall back to trimmed lowercase text.
pub fn canonical_url(raw: &str) -> String {
    let Ok(mut url) = Url::parse(raw.trim()) else {
        return raw.trim().trim_end_matches('/').to_ascii_lowercase();
    };

    url.set_fragment(None);

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| !is_tracking_param(k))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    if kept.is_empty() {
        url.set_query(None);
    } else {
        let mut pairs = url.query_pairs_mut();
        pairs.clear();
        for (k, v) in &kept {
            pairs.append_pair(k, v);
        }
        drop(pairs);
    }

    let trimmed = url.path().trim_end_matches('/').to_string();
    if trimmed.is_empty() {
        url.set_path("/");
    } else {
        url.set_path(&trimmed);
    }

    url.to_string()
}

static RE_NON_ALNUM: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9\s]+").unwrap());
static RE_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Normalized title for matching: lower-cased, punctuation stripped,
/// whitespace collapsed.
pub fn normalize_title(title: &str) -> String {
    let lowered = title.to_lowercase();
    let stripped = RE_NON_ALNUM.replace_all(&lowered, " ");
    RE_WS.replace_all(&stripped, " ").trim().to_string()
}

/// A pure title-similarity measure over normalized titles, in `0.0..=1.0`.
pub trait Similarity: Send + Sync {
    fn score(&self, a: &str, b: &str) -> f64;
}

/// Ratio of shared tokens over the smaller token set.
pub struct TokenOverlap;

impl Similarity for TokenOverlap {
    fn score(&self, a: &str, b: &str) -> f64 {
        let ta: std::collections::HashSet<&str> = a.split_whitespace().collect();
        let tb: std::collections::HashSet<&str> = b.split_whitespace().collect();
        if ta.is_empty() || tb.is_empty() {
            return 0.0;
        }
        let shared = ta.intersection(&tb).count();
        shared as f64 / ta.len().min(tb.len()) as f64
    }
}

/// Normalized Levenshtein distance via strsim.
pub struct NormalizedLevenshtein;

impl Similarity for NormalizedLevenshtein {
    fn score(&self, a: &str, b: &str) -> f64 {
        strsim::normalized_levenshtein(a, b)
    }
}

/// The similarity function a [`SimilarityPolicy`] names.
pub fn similarity_for(policy: SimilarityPolicy) -> Box<dyn Similarity> {
    match policy {
        SimilarityPolicy::TokenOverlap => Box::new(TokenOverlap),
        SimilarityPolicy::Levenshtein => Box::new(NormalizedLevenshtein),
    }
}

/// Collapse duplicates, returning at most one item per distinct story in
/// first-seen order.
pub fn dedupe(
    items: Vec<NormalizedItem>,
    config: &DedupeConfig,
    source_priority: &[String],
) -> Vec<NormalizedItem> {
    let similarity = similarity_for(config.similarity);

    // Story groups keyed first by canonical URL, then by fuzzy title match
    // against each group's first-seen title.
    let mut groups: Vec<Vec<(usize, NormalizedItem)>> = Vec::new();
    let mut group_titles: Vec<String> = Vec::new();
    let mut by_url: HashMap<String, usize> = HashMap::new();

    let total = items.len();
    for (index, item) in items.into_iter().enumerate() {
        let url_key = canonical_url(&item.url);
        if let Some(&group) = by_url.get(&url_key) {
            groups[group].push((index, item));
            continue;
        }

        let title_key = normalize_title(&item.title);
        let matched = group_titles.iter().position(|existing| {
            *existing == title_key
                || similarity.score(existing, &title_key) >= config.similarity_threshold
        });

        match matched {
            Some(group) => {
                by_url.insert(url_key, group);
                groups[group].push((index, item));
            }
            None => {
                by_url.insert(url_key, groups.len());
                group_titles.push(title_key);
                groups.push(vec![(index, item)]);
            }
        }
    }

    let deduped: Vec<NormalizedItem> = groups
        .into_iter()
        .map(|group| pick_representative(group, source_priority))
        .collect();

    if deduped.len() < total {
        debug!(before = total, after = deduped.len(), "Collapsed duplicate stories");
    }
    deduped
}

/// Deterministic merge policy: summary present, then earliest published_at
/// (absent loses), then configured source priority, then first-seen.
fn pick_representative(
    group: Vec<(usize, NormalizedItem)>,
    source_priority: &[String],
) -> NormalizedItem {
    group
        .into_iter()
        .min_by_key(|(index, item)| {
            let summary_rank: u8 = if item.has_summary() { 0 } else { 1 };
            let published_rank = item
                .published_at
                .map(|t| t.timestamp())
                .unwrap_or(i64::MAX);
            let priority_rank = source_priority
                .iter()
                .position(|id| *id == item.source_id)
                .unwrap_or(usize::MAX);
            (summary_rank, published_rank, priority_rank, *index)
        })
        .map(|(_, item)| item)
        .expect("dedupe groups are never empty")
}

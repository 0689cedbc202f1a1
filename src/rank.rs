//! Deterministic scoring, ordering, and truncation of the deduplicated set.
//!
//! The score is a weighted sum of three signals, each in `0.0..=1.0`:
//! freshness (exponential decay of item age against a configured half-life),
//! source priority (position in the configured priority list), and summary
//! presence. The sort is stable and descending, so equal scores keep their
//! first-seen order and two runs over the same input produce identical
//! output.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::config::RankingConfig;
use crate::models::NormalizedItem;

/// Score, order, and truncate items to the digest size. `reference_time` is
/// captured once per run so ranking is a pure function of its inputs.
pub fn rank(
    mut items: Vec<NormalizedItem>,
    config: &RankingConfig,
    source_priority: &[String],
    digest_size: usize,
    reference_time: DateTime<Utc>,
) -> Vec<NormalizedItem> {
    for item in &mut items {
        item.score = score(item, config, source_priority, reference_time);
    }

    // Stable sort: ties keep first-seen order.
    items.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));

    if items.len() > digest_size {
        debug!(kept = digest_size, dropped = items.len() - digest_size, "Truncated ranked items");
        items.truncate(digest_size);
    }
    items
}

fn score(
    item: &NormalizedItem,
    config: &RankingConfig,
    source_priority: &[String],
    reference_time: DateTime<Utc>,
) -> f64 {
    config.freshness_weight * freshness(item.published_at, reference_time, config.freshness_half_life_hours)
        + config.priority_weight * priority(&item.source_id, source_priority)
        + config.summary_weight * if item.has_summary() { 1.0 } else { 0.0 }
}

/// Exponential decay: 1.0 at publication, halved every `half_life_hours`.
/// Items without a timestamp score zero; future timestamps clamp to 1.0.
fn freshness(published_at: Option<DateTime<Utc>>, reference_time: DateTime<Utc>, half_life_hours: f64) -> f64 {
    let Some(published) = published_at else {
        return 0.0;
    };
    let age_hours = (reference_time - published).num_seconds() as f64 / 3600.0;
    if age_hours <= 0.0 {
        return 1.0;
    }
    0.5_f64.powf(age_hours / half_life_hours)
}

/// Linear position weight: the first listed source scores 1.0, the last just
/// above 0.0, unlisted sources 0.0.
fn priority(source_id: &str, source_priority: &[String]) -> f64 {
    let n = source_priority.len();
    if n == 0 {
        return 0.0;
    }
    match source_priority.iter().position(|id| id == source_id) {
        Some(index) => (n - index) as f64 / n as f64,
        None => 0.0,
    }
}

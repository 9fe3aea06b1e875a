//! Aggregator: summary statistics over the currently filtered view.

use std::collections::HashMap;

use serde::Serialize;

use super::filter::{LONG_MIN_SECS, SHORT_MAX_SECS};
use crate::record::MediaRecord;

/// Number of tags kept in the frequency ranking.
pub const TOP_TAGS: usize = 5;

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Dashboard summary for a non-empty view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryStats {
    pub avg_views: u64,
    pub avg_vph: u64,
    /// Unrounded mean of the per-record ratios.
    pub avg_performance_ratio: f64,
    pub top_tags: Vec<TagCount>,
    pub type_ratio: TypeRatio,
    /// Narrative supplied by the summarizer, passed through untouched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_analysis: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagCount {
    pub tag: String,
    pub count: usize,
}

/// Three-way duration partition. Every record lands in exactly one bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TypeRatio {
    pub shorts: usize,
    pub mid: usize,
    pub long: usize,
}

impl TypeRatio {
    pub fn total(&self) -> usize {
        self.shorts + self.mid + self.long
    }

    /// Whole-number percentage of `count`, 0 if the partition is empty.
    pub fn pct(&self, count: usize) -> u64 {
        let total = self.total();
        if total == 0 {
            0
        } else {
            ((count as f64 / total as f64) * 100.0).round() as u64
        }
    }
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Summarise a view. Returns `None` for an empty view rather than zeros.
pub fn aggregate(records: &[MediaRecord], ai_analysis: Option<String>) -> Option<SummaryStats> {
    if records.is_empty() {
        return None;
    }

    let n = records.len() as f64;
    let total_views: f64 = records.iter().map(|r| r.view_count() as f64).sum();
    let total_vph: f64 = records.iter().map(|r| r.vph() as f64).sum();
    let total_ratio: f64 = records.iter().map(|r| r.performance_ratio()).sum();

    Some(SummaryStats {
        avg_views: (total_views / n).round() as u64,
        avg_vph: (total_vph / n).round() as u64,
        avg_performance_ratio: total_ratio / n,
        top_tags: top_tags(records, TOP_TAGS),
        type_ratio: type_ratio(records),
        ai_analysis,
    })
}

/// Count every tag occurrence and keep the `limit` most frequent.
///
/// Counting preserves first-seen order and the sort is stable, so equal
/// counts keep the order in which tags were first encountered.
pub fn top_tags(records: &[MediaRecord], limit: usize) -> Vec<TagCount> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<TagCount> = Vec::new();

    for tag in records.iter().flat_map(|r| r.tags()) {
        match index.get(tag.as_str()) {
            Some(&i) => counts[i].count += 1,
            None => {
                index.insert(tag.as_str(), counts.len());
                counts.push(TagCount {
                    tag: tag.clone(),
                    count: 1,
                });
            }
        }
    }

    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(limit);
    counts
}

/// Partition into short (< 180 s), long (≥ 1200 s) and mid (everything else).
///
/// Kept apart from the type filter: the filter has no mid selector, the
/// partition always reports all three buckets.
pub fn type_ratio(records: &[MediaRecord]) -> TypeRatio {
    let mut ratio = TypeRatio::default();
    for record in records {
        let secs = record.duration_sec();
        if secs < SHORT_MAX_SECS {
            ratio.shorts += 1;
        } else if secs >= LONG_MIN_SECS {
            ratio.long += 1;
        } else {
            ratio.mid += 1;
        }
    }
    ratio
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! The synchronous analytics pipeline: filter → sort → aggregate.
//!
//! Every stage is a pure function over `&[MediaRecord]`. A [`View`] is
//! recomputed from scratch whenever the collection, the filter or the sort
//! changes; nothing here mutates the fetched collection.

pub mod aggregate;
pub mod filter;
pub mod keywords;
pub mod sort;

use chrono::{DateTime, Utc};
use serde::Serialize;

pub use aggregate::{SummaryStats, TagCount, TypeRatio, aggregate};
pub use filter::{DateRange, FilterCriteria, VideoType, filter};
pub use keywords::{Keyword, rank_keywords};
pub use sort::{SortField, SortOrder, SortSpec, sort};

use crate::record::MediaRecord;

/// A derived dashboard view over one fetched collection.
#[derive(Debug, Clone, Serialize)]
pub struct View {
    /// Filtered then sorted records.
    pub records: Vec<MediaRecord>,
    /// `None` when nothing passed the filter.
    pub stats: Option<SummaryStats>,
    pub keywords: Vec<Keyword>,
}

/// Run the full pipeline over `records`.
pub fn build_view(
    records: &[MediaRecord],
    criteria: &FilterCriteria,
    spec: SortSpec,
    ai_analysis: Option<String>,
    keyword_limit: usize,
    now: DateTime<Utc>,
) -> View {
    let filtered = filter(records, criteria, now);
    let sorted = sort(&filtered, spec);
    let stats = aggregate(&sorted, ai_analysis);
    let keywords = rank_keywords(&sorted, keyword_limit);

    View {
        records: sorted,
        stats,
        keywords,
    }
}

//! Sort engine: one uniform comparator over any record field.
//!
//! Two numeric values compare numerically; anything else is rendered as
//! text and collated. There is no per-field special casing beyond that, so
//! tier labels sort as text just like titles do.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::record::MediaRecord;

/// Sortable record fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    Id,
    Title,
    Description,
    Thumbnail,
    Tags,
    #[default]
    ViewCount,
    LikeCount,
    SubscriberCount,
    PublishedAt,
    Duration,
    DurationSec,
    ChannelTitle,
    ChannelId,
    Vph,
    PerformanceRatio,
    InfluenceTier,
}

impl SortField {
    pub const ALL: [SortField; 16] = [
        Self::Id,
        Self::Title,
        Self::Description,
        Self::Thumbnail,
        Self::Tags,
        Self::ViewCount,
        Self::LikeCount,
        Self::SubscriberCount,
        Self::PublishedAt,
        Self::Duration,
        Self::DurationSec,
        Self::ChannelTitle,
        Self::ChannelId,
        Self::Vph,
        Self::PerformanceRatio,
        Self::InfluenceTier,
    ];

    /// camelCase name, matching the JSON field name of the record.
    pub fn name(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Title => "title",
            Self::Description => "description",
            Self::Thumbnail => "thumbnail",
            Self::Tags => "tags",
            Self::ViewCount => "viewCount",
            Self::LikeCount => "likeCount",
            Self::SubscriberCount => "subscriberCount",
            Self::PublishedAt => "publishedAt",
            Self::Duration => "duration",
            Self::DurationSec => "durationSec",
            Self::ChannelTitle => "channelTitle",
            Self::ChannelId => "channelId",
            Self::Vph => "vph",
            Self::PerformanceRatio => "performanceRatio",
            Self::InfluenceTier => "influenceTier",
        }
    }

    /// Extract this field's comparable value from a record.
    pub fn value(self, record: &MediaRecord) -> SortValue {
        match self {
            Self::Id => SortValue::Text(record.id().to_string()),
            Self::Title => SortValue::Text(record.title().to_string()),
            Self::Description => SortValue::Text(record.description().to_string()),
            Self::Thumbnail => SortValue::Text(record.thumbnail().to_string()),
            Self::Tags => SortValue::Text(record.tags().join(",")),
            Self::ViewCount => SortValue::Number(record.view_count() as f64),
            Self::LikeCount => SortValue::Number(record.like_count() as f64),
            Self::SubscriberCount => SortValue::Number(record.subscriber_count() as f64),
            Self::PublishedAt => SortValue::Text(record.published_at().to_string()),
            Self::Duration => SortValue::Text(record.duration().to_string()),
            Self::DurationSec => SortValue::Number(record.duration_sec() as f64),
            Self::ChannelTitle => SortValue::Text(record.channel_title().to_string()),
            Self::ChannelId => SortValue::Text(record.channel_id().to_string()),
            Self::Vph => SortValue::Number(record.vph() as f64),
            Self::PerformanceRatio => SortValue::Number(record.performance_ratio()),
            Self::InfluenceTier => SortValue::Text(record.influence_tier().label().to_string()),
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SortField {
    type Err = anyhow::Error;

    /// Accepts the camelCase name, snake_case or kebab-case, case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|field| field.name().to_ascii_lowercase() == wanted)
            .ok_or_else(|| anyhow::anyhow!("unknown sort field: {s}"))
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn toggled(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Asc => f.write_str("asc"),
            Self::Desc => f.write_str("desc"),
        }
    }
}

impl FromStr for SortOrder {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(Self::Asc),
            "desc" | "descending" => Ok(Self::Desc),
            _ => anyhow::bail!("unknown sort order: {s} (expected asc or desc)"),
        }
    }
}

/// Field + direction. Defaults to view count, descending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: SortField,
    pub order: SortOrder,
}

impl SortSpec {
    pub fn new(field: SortField, order: SortOrder) -> Self {
        Self { field, order }
    }

    /// Column-header click behaviour: same field flips the direction, a new
    /// field starts descending.
    pub fn clicked(self, field: SortField) -> Self {
        if self.field == field {
            Self::new(field, self.order.toggled())
        } else {
            Self::new(field, SortOrder::Desc)
        }
    }

    /// Parse optional field/order strings, falling back to `default` for
    /// whatever is missing or blank.
    pub fn parse(field: Option<&str>, order: Option<&str>, default: SortSpec) -> anyhow::Result<Self> {
        let field = match field.map(str::trim).filter(|f| !f.is_empty()) {
            Some(f) => f.parse()?,
            None => default.field,
        };
        let order = match order.map(str::trim).filter(|o| !o.is_empty()) {
            Some(o) => o.parse()?,
            None => default.order,
        };
        Ok(Self::new(field, order))
    }
}

// ---------------------------------------------------------------------------
// Comparison
// ---------------------------------------------------------------------------

/// A field value as seen by the comparator.
#[derive(Debug, Clone, PartialEq)]
pub enum SortValue {
    Number(f64),
    Text(String),
}

impl SortValue {
    fn as_text(&self) -> String {
        match self {
            Self::Number(n) => format_number(*n),
            Self::Text(s) => s.clone(),
        }
    }
}

/// Integral values render without a fractional part.
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// Ascending comparison of two values.
pub fn compare_values(a: &SortValue, b: &SortValue) -> Ordering {
    match (a, b) {
        (SortValue::Number(x), SortValue::Number(y)) => x.partial_cmp(y).unwrap_or(Ordering::Equal),
        _ => collate(&a.as_text(), &b.as_text()),
    }
}

/// Locale-style string collation: case-insensitive first, then lowercase
/// before uppercase so the order stays total.
pub fn collate(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| b.cmp(a))
}

/// Return a new, sorted copy of the records. Stable; the input is untouched.
pub fn sort(records: &[MediaRecord], spec: SortSpec) -> Vec<MediaRecord> {
    let mut keyed: Vec<(SortValue, &MediaRecord)> = records
        .iter()
        .map(|r| (spec.field.value(r), r))
        .collect();

    keyed.sort_by(|(a, _), (b, _)| {
        let ord = compare_values(a, b);
        match spec.order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    });

    keyed.into_iter().map(|(_, r)| r.clone()).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Filter engine: type, date and influence predicates over a collection.
//!
//! The three families are independent predicates combined with AND; each
//! is public so callers can apply any subset.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::metrics::InfluenceTier;
use crate::record::{MediaRecord, parse_timestamp};

/// Shorter than this many seconds counts as short-form.
pub const SHORT_MAX_SECS: u64 = 180;

/// At least this many seconds counts as long-form.
pub const LONG_MIN_SECS: u64 = 1200;

const SECS_PER_DAY: f64 = 86_400.0;

// ---------------------------------------------------------------------------
// Criteria
// ---------------------------------------------------------------------------

/// Duration-based type selector. Mid-length videos have no selector of
/// their own and only pass under `All`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoType {
    #[default]
    All,
    Short,
    Long,
}

impl FromStr for VideoType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "all" => Ok(Self::All),
            "short" | "shorts" => Ok(Self::Short),
            "long" => Ok(Self::Long),
            _ => anyhow::bail!("unknown video type: {s} (expected all, short or long)"),
        }
    }
}

/// Publish-date window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DateRange {
    #[default]
    All,
    Last7Days,
    Last30Days,
    Last90Days,
    /// Inclusive window. Missing either bound disables date filtering.
    Custom {
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    },
}

impl DateRange {
    /// Parse a range name (`all`, `7d`, `30d`, `90d`, `custom`) together
    /// with optional custom bounds.
    pub fn parse(name: &str, start: Option<&str>, end: Option<&str>) -> anyhow::Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "" | "all" => Ok(Self::All),
            "7d" => Ok(Self::Last7Days),
            "30d" => Ok(Self::Last30Days),
            "90d" => Ok(Self::Last90Days),
            "custom" => Ok(Self::Custom {
                start: start.map(parse_bound).transpose()?.flatten(),
                end: end.map(parse_bound).transpose()?.flatten(),
            }),
            _ => anyhow::bail!("unknown date range: {name} (expected all, 7d, 30d, 90d or custom)"),
        }
    }

    /// Maximum age in days for the relative windows.
    fn max_age_days(self) -> Option<f64> {
        match self {
            Self::Last7Days => Some(7.0),
            Self::Last30Days => Some(30.0),
            Self::Last90Days => Some(90.0),
            Self::All | Self::Custom { .. } => None,
        }
    }
}

/// Parse a custom bound: `YYYY-MM-DD` (UTC midnight) or RFC 3339. Blank
/// input means "no bound".
pub fn parse_bound(raw: &str) -> anyhow::Result<Option<DateTime<Utc>>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc()));
    }
    match parse_timestamp(raw) {
        Some(ts) => Ok(Some(ts)),
        None => anyhow::bail!("invalid date: {raw} (expected YYYY-MM-DD or RFC 3339)"),
    }
}

/// Immutable filter state. The default passes everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    pub video_type: VideoType,
    pub date_range: DateRange,
    /// Allowed tiers; empty means no restriction.
    pub influence: Vec<InfluenceTier>,
}

// ---------------------------------------------------------------------------
// Predicates
// ---------------------------------------------------------------------------

pub fn matches_type(record: &MediaRecord, video_type: VideoType) -> bool {
    match video_type {
        VideoType::All => true,
        VideoType::Short => record.duration_sec() < SHORT_MAX_SECS,
        VideoType::Long => record.duration_sec() >= LONG_MIN_SECS,
    }
}

/// Date predicate evaluated against `now`. Records with an unreadable
/// publish time only pass `All` and the unbounded custom fallback.
pub fn matches_date(record: &MediaRecord, range: DateRange, now: DateTime<Utc>) -> bool {
    match range {
        DateRange::All => true,
        DateRange::Custom {
            start: Some(start),
            end: Some(end),
        } => record
            .published()
            .is_some_and(|published| start <= published && published <= end),
        DateRange::Custom { .. } => true,
        relative => {
            let Some(max_days) = relative.max_age_days() else {
                return true;
            };
            record.published().is_some_and(|published| {
                let age_days = (now - published).num_milliseconds() as f64 / 1000.0 / SECS_PER_DAY;
                age_days <= max_days
            })
        }
    }
}

pub fn matches_influence(record: &MediaRecord, allowed: &[InfluenceTier]) -> bool {
    allowed.is_empty() || allowed.contains(&record.influence_tier())
}

impl FilterCriteria {
    /// Build criteria from user-facing strings. Missing values mean "all".
    pub fn parse(
        video_type: Option<&str>,
        date: Option<&str>,
        start: Option<&str>,
        end: Option<&str>,
        influence: &[String],
    ) -> anyhow::Result<Self> {
        let influence = influence
            .iter()
            .flat_map(|raw| raw.split(','))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::parse)
            .collect::<anyhow::Result<Vec<InfluenceTier>>>()?;

        Ok(Self {
            video_type: video_type.unwrap_or_default().parse()?,
            date_range: DateRange::parse(date.unwrap_or_default(), start, end)?,
            influence,
        })
    }

    /// Whether a single record passes every family.
    pub fn matches(&self, record: &MediaRecord, now: DateTime<Utc>) -> bool {
        matches_type(record, self.video_type)
            && matches_date(record, self.date_range, now)
            && matches_influence(record, &self.influence)
    }
}

/// Apply the criteria, keeping input order. The input is not modified.
pub fn filter(records: &[MediaRecord], criteria: &FilterCriteria, now: DateTime<Utc>) -> Vec<MediaRecord> {
    records
        .iter()
        .filter(|r| criteria.matches(r, now))
        .cloned()
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

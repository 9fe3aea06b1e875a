//! Engagement metrics derived once per video at normalisation time.
//!
//! - **Velocity (VPH)**: views per hour since publication, with the elapsed
//!   time floored at one hour so fresh uploads never spike.
//! - **Performance ratio**: views divided by channel subscribers, defined as
//!   exactly zero for channels with no recorded subscribers.
//! - **Influence tier**: the ratio bucketed into five ordered levels.

pub mod duration;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use duration::parse_duration;

const SECS_PER_HOUR: f64 = 3600.0;

// ---------------------------------------------------------------------------
// Influence tier
// ---------------------------------------------------------------------------

/// Discretised performance ratio.
///
/// Variants are declared from lowest to highest so the derived `Ord`
/// follows the ratio thresholds rather than the label text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InfluenceTier {
    VeryLow,
    Low,
    Normal,
    High,
    VeryHigh,
}

impl InfluenceTier {
    /// Every tier, highest first (the order the dashboard lists them in).
    pub const ALL: [InfluenceTier; 5] = [
        Self::VeryHigh,
        Self::High,
        Self::Normal,
        Self::Low,
        Self::VeryLow,
    ];

    /// Bucket a performance ratio. Thresholds are strict, so a ratio sitting
    /// exactly on a boundary lands in the lower tier.
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio > 1.0 {
            Self::VeryHigh
        } else if ratio > 0.5 {
            Self::High
        } else if ratio > 0.2 {
            Self::Normal
        } else if ratio > 0.05 {
            Self::Low
        } else {
            Self::VeryLow
        }
    }

    /// Stable label used on the wire, in CSV exports and for text sorting.
    pub fn label(self) -> &'static str {
        match self {
            Self::VeryHigh => "VERY_HIGH",
            Self::High => "HIGH",
            Self::Normal => "NORMAL",
            Self::Low => "LOW",
            Self::VeryLow => "VERY_LOW",
        }
    }
}

impl fmt::Display for InfluenceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for InfluenceTier {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        match normalized.as_str() {
            "VERY_HIGH" => Ok(Self::VeryHigh),
            "HIGH" => Ok(Self::High),
            "NORMAL" => Ok(Self::Normal),
            "LOW" => Ok(Self::Low),
            "VERY_LOW" => Ok(Self::VeryLow),
            _ => anyhow::bail!("unknown influence tier: {s}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Calculations
// ---------------------------------------------------------------------------

/// Hours elapsed since publication, never less than one.
///
/// An unknown publish time is treated as "just now", which also floors to
/// one hour.
pub fn hours_since_upload(published: Option<DateTime<Utc>>, now: DateTime<Utc>) -> f64 {
    let hours = published
        .map(|p| (now - p).num_milliseconds() as f64 / 1000.0 / SECS_PER_HOUR)
        .unwrap_or(0.0);
    hours.max(1.0)
}

/// Views per hour, rounded to the nearest whole view.
pub fn velocity(view_count: u64, hours_since_upload: f64) -> u64 {
    (view_count as f64 / hours_since_upload.max(1.0)).round() as u64
}

/// Views per subscriber; zero when the channel reports no subscribers.
pub fn performance_ratio(view_count: u64, subscriber_count: u64) -> f64 {
    if subscriber_count > 0 {
        view_count as f64 / subscriber_count as f64
    } else {
        0.0
    }
}

/// All derived metrics for one video.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metrics {
    pub vph: u64,
    pub performance_ratio: f64,
    pub influence_tier: InfluenceTier,
}

/// Compute every derived metric in one pass.
pub fn compute(
    view_count: u64,
    subscriber_count: u64,
    published: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Metrics {
    let hours = hours_since_upload(published, now);
    let ratio = performance_ratio(view_count, subscriber_count);
    Metrics {
        vph: velocity(view_count, hours),
        performance_ratio: ratio,
        influence_tier: InfluenceTier::from_ratio(ratio),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

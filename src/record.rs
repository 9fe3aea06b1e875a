//! The unified per-video record every pipeline stage works on.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::metrics::{self, InfluenceTier, parse_duration};

/// Raw, already-joined fields for one video before metrics are derived.
///
/// Built by the normaliser from the three API payloads; tests build it
/// directly.
#[derive(Debug, Clone, Default)]
pub struct RecordInput {
    pub id: String,
    pub title: String,
    pub description: String,
    pub thumbnail: String,
    pub tags: Vec<String>,
    pub view_count: u64,
    pub like_count: u64,
    pub subscriber_count: u64,
    /// ISO 8601 timestamp exactly as received.
    pub published_at: String,
    /// ISO 8601 duration code exactly as received.
    pub duration: String,
    pub channel_title: String,
    pub channel_id: String,
}

/// A fully normalised video with its derived metrics.
///
/// Fields are private: derived values are computed once in
/// [`MediaRecord::derive`] and only exposed read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaRecord {
    id: String,
    title: String,
    description: String,
    thumbnail: String,
    tags: Vec<String>,
    view_count: u64,
    like_count: u64,
    subscriber_count: u64,
    published_at: String,
    #[serde(skip)]
    published: Option<DateTime<Utc>>,
    duration: String,
    duration_sec: u64,
    channel_title: String,
    channel_id: String,
    vph: u64,
    performance_ratio: f64,
    influence_tier: InfluenceTier,
}

impl MediaRecord {
    /// Derive metrics relative to `now` and freeze the record.
    pub fn derive(input: RecordInput, now: DateTime<Utc>) -> Self {
        let published = parse_timestamp(&input.published_at);
        let metrics = metrics::compute(input.view_count, input.subscriber_count, published, now);

        Self {
            duration_sec: parse_duration(&input.duration),
            vph: metrics.vph,
            performance_ratio: metrics.performance_ratio,
            influence_tier: metrics.influence_tier,
            published,
            id: input.id,
            title: input.title,
            description: input.description,
            thumbnail: input.thumbnail,
            tags: input.tags,
            view_count: input.view_count,
            like_count: input.like_count,
            subscriber_count: input.subscriber_count,
            published_at: input.published_at,
            duration: input.duration,
            channel_title: input.channel_title,
            channel_id: input.channel_id,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn thumbnail(&self) -> &str {
        &self.thumbnail
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn view_count(&self) -> u64 {
        self.view_count
    }

    pub fn like_count(&self) -> u64 {
        self.like_count
    }

    pub fn subscriber_count(&self) -> u64 {
        self.subscriber_count
    }

    /// Publish timestamp as received from the API.
    pub fn published_at(&self) -> &str {
        &self.published_at
    }

    /// Parsed publish time, `None` if the source string was unreadable.
    pub fn published(&self) -> Option<DateTime<Utc>> {
        self.published
    }

    /// Calendar date part of the publish timestamp (`YYYY-MM-DD`).
    pub fn published_date(&self) -> &str {
        self.published_at
            .split('T')
            .next()
            .unwrap_or(&self.published_at)
    }

    pub fn duration(&self) -> &str {
        &self.duration
    }

    pub fn duration_sec(&self) -> u64 {
        self.duration_sec
    }

    pub fn channel_title(&self) -> &str {
        &self.channel_title
    }

    pub fn channel_id(&self) -> &str {
        &self.channel_id
    }

    pub fn vph(&self) -> u64 {
        self.vph
    }

    pub fn performance_ratio(&self) -> f64 {
        self.performance_ratio
    }

    pub fn influence_tier(&self) -> InfluenceTier {
        self.influence_tier
    }

    /// Canonical watch URL for the video.
    pub fn watch_url(&self) -> String {
        format!("https://youtube.com/watch?v={}", self.id)
    }
}

/// Parse an RFC 3339 timestamp into UTC, `None` if unreadable.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

//! Join search, video-detail and channel payloads into [`MediaRecord`]s.
//!
//! Missing or non-numeric counts default to zero and unknown channels get
//! zero subscribers; nothing in here can fail.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::payload::{ChannelListResponse, SearchResponse, VideoItem, VideoListResponse};
use crate::record::{MediaRecord, RecordInput};

/// Video ids from a search response, in result order.
pub fn search_video_ids(search: &SearchResponse) -> Vec<String> {
    search
        .items
        .iter()
        .filter_map(|item| item.id.video_id.clone())
        .collect()
}

/// Distinct channel ids referenced by the video details, first-seen order.
pub fn unique_channel_ids(details: &VideoListResponse) -> Vec<String> {
    let mut seen = HashSet::new();
    details
        .items
        .iter()
        .map(|item| item.snippet.channel_id.as_str())
        .filter(|id| !id.is_empty() && seen.insert(*id))
        .map(str::to_string)
        .collect()
}

/// Channel id → subscriber count.
pub fn subscriber_map(channels: &ChannelListResponse) -> HashMap<String, u64> {
    channels
        .items
        .iter()
        .map(|c| (c.id.clone(), parse_count(c.statistics.subscriber_count.as_ref())))
        .collect()
}

/// Build one record per video detail item, preserving payload order.
pub fn normalize(
    details: VideoListResponse,
    channels: &ChannelListResponse,
    now: DateTime<Utc>,
) -> Vec<MediaRecord> {
    let subscribers = subscriber_map(channels);
    details
        .items
        .into_iter()
        .map(|item| normalize_item(item, &subscribers, now))
        .collect()
}

fn normalize_item(
    item: VideoItem,
    subscribers: &HashMap<String, u64>,
    now: DateTime<Utc>,
) -> MediaRecord {
    let subscriber_count = subscribers
        .get(&item.snippet.channel_id)
        .copied()
        .unwrap_or(0);
    let thumbnail = item.snippet.thumbnails.best_url();

    MediaRecord::derive(
        RecordInput {
            id: item.id,
            title: item.snippet.title,
            description: item.snippet.description,
            thumbnail,
            tags: item.snippet.tags,
            view_count: parse_count(item.statistics.view_count.as_ref()),
            like_count: parse_count(item.statistics.like_count.as_ref()),
            subscriber_count,
            published_at: item.snippet.published_at,
            duration: item.content_details.duration,
            channel_title: item.snippet.channel_title,
            channel_id: item.snippet.channel_id,
        },
        now,
    )
}

/// Parse a count leniently: the leading decimal digits of a string, or an
/// integral JSON number. Negative and unreadable values become zero.
pub fn parse_count(value: Option<&Value>) -> u64 {
    match value {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f.trunc() as u64))
            .unwrap_or(0),
        Some(Value::String(s)) => parse_leading_digits(s),
        _ => 0,
    }
}

fn parse_leading_digits(raw: &str) -> u64 {
    let trimmed = raw.trim_start();
    if trimmed.starts_with('-') {
        return 0;
    }
    let digits: String = trimmed
        .strip_prefix('+')
        .unwrap_or(trimmed)
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn parse_count_variants() {
        assert_eq!(parse_count(Some(&json!("1234"))), 1234);
        assert_eq!(parse_count(Some(&json!("  42abc"))), 42);
        assert_eq!(parse_count(Some(&json!("+7"))), 7);
        assert_eq!(parse_count(Some(&json!("-5"))), 0);
        assert_eq!(parse_count(Some(&json!("abc"))), 0);
        assert_eq!(parse_count(Some(&json!(""))), 0);
        assert_eq!(parse_count(Some(&json!(99))), 99);
        assert_eq!(parse_count(Some(&json!(12.9))), 12);
        assert_eq!(parse_count(Some(&json!(-3))), 0);
        assert_eq!(parse_count(Some(&json!(null))), 0);
        assert_eq!(parse_count(None), 0);
    }

    #[test]
    fn unique_channel_ids_dedups_in_order() {
        let details: VideoListResponse = serde_json::from_value(json!({
            "items": [
                { "id": "a", "snippet": { "channelId": "c2" } },
                { "id": "b", "snippet": { "channelId": "c1" } },
                { "id": "c", "snippet": { "channelId": "c2" } },
                { "id": "d", "snippet": {} }
            ]
        }))
        .unwrap();
        assert_eq!(unique_channel_ids(&details), vec!["c2", "c1"]);
    }

    #[test]
    fn search_ids_skip_non_videos() {
        let search: SearchResponse = serde_json::from_value(json!({
            "items": [
                { "id": { "videoId": "v1" } },
                { "id": { "channelId": "c1" } },
                { "id": { "videoId": "v2" } }
            ]
        }))
        .unwrap();
        assert_eq!(search_video_ids(&search), vec!["v1", "v2"]);
    }
}

/// Payload decoding and normalisation tests against canned API bodies.
use chrono::{TimeZone, Utc};

use tubestat::metrics::InfluenceTier;
use tubestat::youtube::payload::{ChannelListResponse, SearchResponse, VideoListResponse};
use tubestat::youtube::{SourceError, decode_body, normalize};

const SEARCH_BODY: &str = r#"{
  "items": [
    {"id": {"kind": "youtube#video", "videoId": "v1"}},
    {"id": {"kind": "youtube#channel", "channelId": "UC9"}},
    {"id": {"kind": "youtube#video", "videoId": "v2"}}
  ]
}"#;

const VIDEOS_BODY: &str = r#"{
  "items": [
    {
      "id": "v1",
      "snippet": {
        "publishedAt": "2025-05-31T12:00:00Z",
        "channelId": "UC1",
        "title": "Rust tutorial",
        "description": "learn rust",
        "thumbnails": {
          "default": {"url": "https://i.ytimg.com/vi/v1/default.jpg"},
          "high": {"url": "https://i.ytimg.com/vi/v1/hqdefault.jpg"}
        },
        "channelTitle": "Crab Academy",
        "tags": ["rust", "programming"]
      },
      "statistics": {"viewCount": "2400", "likeCount": "not a number"},
      "contentDetails": {"duration": "PT4M13S"}
    },
    {
      "id": "v2",
      "snippet": {
        "publishedAt": "2025-05-01T12:00:00Z",
        "channelId": "UC2",
        "title": "Unknown channel",
        "thumbnails": {"medium": {"url": "https://i.ytimg.com/vi/v2/mqdefault.jpg"}},
        "channelTitle": "Ghost"
      },
      "statistics": {"viewCount": 50},
      "contentDetails": {"duration": "PT1H"}
    },
    {
      "id": "v3",
      "snippet": {"channelId": "UC1", "title": "Sparse"},
      "contentDetails": {"duration": "P1D"}
    }
  ]
}"#;

const CHANNELS_BODY: &str = r#"{
  "items": [
    {"id": "UC1", "statistics": {"subscriberCount": "1200"}}
  ]
}"#;

fn now() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
}

#[test]
fn search_ids_skip_non_video_results() {
    let search: SearchResponse = decode_body(SEARCH_BODY).unwrap();
    assert_eq!(normalize::search_video_ids(&search), vec!["v1", "v2"]);
}

#[test]
fn channel_ids_are_deduplicated_in_first_seen_order() {
    let videos: VideoListResponse = decode_body(VIDEOS_BODY).unwrap();
    assert_eq!(normalize::unique_channel_ids(&videos), vec!["UC1", "UC2"]);
}

#[test]
fn normalize_joins_subscribers_and_derives_metrics() {
    let videos: VideoListResponse = decode_body(VIDEOS_BODY).unwrap();
    let channels: ChannelListResponse = decode_body(CHANNELS_BODY).unwrap();
    let records = normalize::normalize(videos, &channels, now());

    assert_eq!(records.len(), 3);
    let first = &records[0];
    assert_eq!(first.id(), "v1");
    assert_eq!(first.title(), "Rust tutorial");
    assert_eq!(first.channel_title(), "Crab Academy");
    assert_eq!(first.thumbnail(), "https://i.ytimg.com/vi/v1/hqdefault.jpg");
    assert_eq!(first.tags(), ["rust", "programming"]);
    assert_eq!(first.view_count(), 2400);
    assert_eq!(first.like_count(), 0);
    assert_eq!(first.subscriber_count(), 1200);
    assert_eq!(first.duration_sec(), 253);
    // 24 hours old
    assert_eq!(first.vph(), 100);
    assert_eq!(first.performance_ratio(), 2.0);
    assert_eq!(first.influence_tier(), InfluenceTier::VeryHigh);
}

#[test]
fn unknown_channel_means_zero_subscribers() {
    let videos: VideoListResponse = decode_body(VIDEOS_BODY).unwrap();
    let channels: ChannelListResponse = decode_body(CHANNELS_BODY).unwrap();
    let records = normalize::normalize(videos, &channels, now());

    let ghost = &records[1];
    assert_eq!(ghost.view_count(), 50);
    assert_eq!(ghost.subscriber_count(), 0);
    assert_eq!(ghost.performance_ratio(), 0.0);
    assert_eq!(ghost.influence_tier(), InfluenceTier::VeryLow);
    assert_eq!(ghost.thumbnail(), "https://i.ytimg.com/vi/v2/mqdefault.jpg");
    assert_eq!(ghost.duration_sec(), 3600);
}

#[test]
fn sparse_items_default_instead_of_failing() {
    let videos: VideoListResponse = decode_body(VIDEOS_BODY).unwrap();
    let records = normalize::normalize(videos, &ChannelListResponse::default(), now());

    let sparse = &records[2];
    assert_eq!(sparse.view_count(), 0);
    assert!(sparse.tags().is_empty());
    assert_eq!(sparse.thumbnail(), "");
    // day component is outside the supported pattern
    assert_eq!(sparse.duration_sec(), 0);
    assert!(sparse.published().is_none());
    assert_eq!(sparse.vph(), 0);
}

#[test]
fn embedded_error_in_success_body_is_an_api_error() {
    let body = r#"{"error": {"code": 403, "message": "The request cannot be completed because you have exceeded your quota."}}"#;
    let err = decode_body::<VideoListResponse>(body).unwrap_err();
    match err {
        SourceError::Api { status, message } => {
            assert_eq!(status, 403);
            assert!(message.contains("quota"));
        }
        other => panic!("expected api error, got {other:?}"),
    }
}

#[test]
fn malformed_json_is_a_parse_error() {
    let err = decode_body::<SearchResponse>("{not json").unwrap_err();
    assert!(matches!(err, SourceError::Parse(_)));
    assert!(!err.is_input_error());
}

#[test]
fn one_malformed_item_does_not_lose_the_batch() {
    let videos = r#"{ "items": [
        { "id": "good", "snippet": { "channelId": "UC1", "title": "fine",
            "thumbnails": { "high": "x.jpg", "default": { "url": "d.jpg" } } },
          "statistics": { "viewCount": "2400" }, "contentDetails": { "duration": "PT2M" } },
        { "id": "broken", "snippet": null, "statistics": null, "contentDetails": null }
    ] }"#;
    let channels = r#"{ "items": [
        { "id": "UC1", "statistics": { "subscriberCount": "1200" } },
        { "id": "UC2", "statistics": null }
    ] }"#;

    let videos: VideoListResponse = decode_body(videos).unwrap();
    let channels: ChannelListResponse = decode_body(channels).unwrap();
    let records = normalize::normalize(videos, &channels, now());

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].view_count(), 2400);
    assert_eq!(records[0].subscriber_count(), 1200);
    assert_eq!(records[0].thumbnail(), "d.jpg");
    assert_eq!(records[1].id(), "broken");
    assert_eq!(records[1].view_count(), 0);
    assert_eq!(records[1].influence_tier(), InfluenceTier::VeryLow);
}

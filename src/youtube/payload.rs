//! Response shapes for the three YouTube Data API v3 endpoints we call.
//!
//! Every field is optional. String fields accept any JSON type, nested
//! objects that are `null` or misshapen fall back to their defaults, and
//! list entries that are not objects are dropped, so one odd item never
//! fails the whole response.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

// ---------------------------------------------------------------------------
// search?part=snippet&type=video
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SearchResponse {
    #[serde(deserialize_with = "lenient_items")]
    pub items: Vec<SearchItem>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SearchItem {
    #[serde(deserialize_with = "lenient")]
    pub id: SearchItemId,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SearchItemId {
    #[serde(deserialize_with = "lenient_opt_string")]
    pub video_id: Option<String>,
}

// ---------------------------------------------------------------------------
// videos?part=snippet,statistics,contentDetails
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct VideoListResponse {
    #[serde(deserialize_with = "lenient_items")]
    pub items: Vec<VideoItem>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VideoItem {
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(deserialize_with = "lenient")]
    pub snippet: VideoSnippet,
    #[serde(deserialize_with = "lenient")]
    pub statistics: VideoStatistics,
    #[serde(deserialize_with = "lenient")]
    pub content_details: ContentDetails,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VideoSnippet {
    #[serde(deserialize_with = "lenient_string")]
    pub published_at: String,
    #[serde(deserialize_with = "lenient_string")]
    pub channel_id: String,
    #[serde(deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(deserialize_with = "lenient")]
    pub thumbnails: Thumbnails,
    #[serde(deserialize_with = "lenient_string")]
    pub channel_title: String,
    #[serde(deserialize_with = "lenient_tags")]
    pub tags: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Thumbnails {
    #[serde(deserialize_with = "lenient")]
    pub default: Option<Thumbnail>,
    #[serde(deserialize_with = "lenient")]
    pub medium: Option<Thumbnail>,
    #[serde(deserialize_with = "lenient")]
    pub high: Option<Thumbnail>,
}

impl Thumbnails {
    /// Best available thumbnail URL: high, then medium, then default.
    pub fn best_url(&self) -> String {
        [&self.high, &self.medium, &self.default]
            .into_iter()
            .flatten()
            .map(|t| t.url.as_str())
            .find(|url| !url.is_empty())
            .unwrap_or_default()
            .to_string()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Thumbnail {
    #[serde(deserialize_with = "lenient_string")]
    pub url: String,
}

/// Counts arrive as decimal strings (`"viewCount": "1234"`) but we keep the
/// raw value and parse it leniently in the normaliser.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VideoStatistics {
    pub view_count: Option<Value>,
    pub like_count: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ContentDetails {
    #[serde(deserialize_with = "lenient_string")]
    pub duration: String,
}

// ---------------------------------------------------------------------------
// channels?part=statistics
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ChannelListResponse {
    #[serde(deserialize_with = "lenient_items")]
    pub items: Vec<ChannelItem>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ChannelItem {
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(deserialize_with = "lenient")]
    pub statistics: ChannelStatistics,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChannelStatistics {
    pub subscriber_count: Option<Value>,
}

// ---------------------------------------------------------------------------
// Error payload
// ---------------------------------------------------------------------------

/// Pull the `error.message` out of an API error body, if there is one.
///
/// The API reports failures as `{"error": {"code": 403, "message": "..."}}`,
/// sometimes alongside a 200 status.
pub fn embedded_error(body: &Value) -> Option<(Option<u16>, String)> {
    let error = body.get("error")?;
    if error.is_null() {
        return None;
    }
    let code = error
        .get("code")
        .and_then(Value::as_u64)
        .and_then(|c| u16::try_from(c).ok());
    let message = match error.get("message").and_then(Value::as_str) {
        Some(msg) if !msg.is_empty() => msg.to_string(),
        _ => match error.as_str() {
            Some(s) => s.to_string(),
            None => error.to_string(),
        },
    };
    Some((code, message))
}

// ---------------------------------------------------------------------------
// Lenient field helpers
// ---------------------------------------------------------------------------

/// Nested object that falls back to its default when it is `null` or the
/// wrong shape.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// Item list that drops entries which are not objects at all.
fn lenient_items<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items
            .into_iter()
            .filter(Value::is_object)
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => s,
        _ => String::new(),
    })
}

fn lenient_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) if !s.is_empty() => Some(s),
        _ => None,
    })
}

fn lenient_tags<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}

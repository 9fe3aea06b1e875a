//! YouTube Data API v3 client.
//!
//! One search costs three sequential calls, each feeding the next:
//!
//! 1. `search`: up to `max_results` video ids for the query
//! 2. `videos`: snippet, statistics and content details for those ids
//! 3. `channels`: subscriber counts for every channel seen in step 2
//!
//! Uses the synchronous `ureq` client. Any transport failure, non-2xx
//! status, or error object embedded in a 200 body aborts the whole search;
//! there is no retry and no partial result.

pub mod error;
pub mod normalize;
pub mod payload;

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value;

pub use error::{Result, SourceError};

use crate::config::schema::YoutubeConfig;
use crate::record::MediaRecord;
use payload::{ChannelListResponse, SearchResponse, VideoListResponse};

/// Synchronous YouTube API client bound to one API key.
#[derive(Debug)]
pub struct YouTubeClient {
    base_url: String,
    api_key: String,
    max_results: u32,
    agent: ureq::Agent,
}

impl YouTubeClient {
    /// Build a client from the resolved config.
    ///
    /// Fails with [`SourceError::MissingCredential`] before any request is
    /// made if the key is empty.
    pub fn from_config(config: &YoutubeConfig, api_key: &str) -> Result<Self> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(SourceError::MissingCredential);
        }

        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build();

        Ok(Self {
            base_url: config.api_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            max_results: config.max_results.clamp(1, 50),
            agent,
        })
    }

    /// Run a full search and return normalised records in API order.
    pub fn fetch(&self, query: &str, now: DateTime<Utc>) -> Result<Vec<MediaRecord>> {
        let max_results = self.max_results.to_string();
        let search: SearchResponse = self.get_json(
            "search",
            &[
                ("part", "snippet"),
                ("maxResults", &max_results),
                ("q", query),
                ("type", "video"),
            ],
        )?;

        let video_ids = normalize::search_video_ids(&search);
        if video_ids.is_empty() {
            return Ok(Vec::new());
        }

        let details: VideoListResponse = self.get_json(
            "videos",
            &[
                ("part", "snippet,statistics,contentDetails"),
                ("id", &video_ids.join(",")),
            ],
        )?;

        let channel_ids = normalize::unique_channel_ids(&details);
        let channels: ChannelListResponse = if channel_ids.is_empty() {
            ChannelListResponse::default()
        } else {
            self.get_json(
                "channels",
                &[("part", "statistics"), ("id", &channel_ids.join(","))],
            )?
        };

        Ok(normalize::normalize(details, &channels, now))
    }

    /// GET `{base_url}/{endpoint}` and decode the body, surfacing both HTTP
    /// error statuses and embedded `error` objects as [`SourceError::Api`].
    fn get_json<T: DeserializeOwned>(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<T> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let mut request = self.agent.get(&url);
        for (key, value) in params {
            request = request.query(key, value);
        }
        request = request.query("key", &self.api_key);

        let body = match request.call() {
            Ok(resp) => resp
                .into_string()
                .map_err(|e| SourceError::Network(e.to_string()))?,
            Err(ureq::Error::Status(status, resp)) => {
                let body = resp.into_string().unwrap_or_default();
                return Err(status_error(status, &body));
            }
            Err(ureq::Error::Transport(transport)) => return Err(transport.into()),
        };

        decode_body(&body)
    }
}

/// Decode a success body, rejecting success-shaped error payloads.
pub fn decode_body<T: DeserializeOwned>(body: &str) -> Result<T> {
    let value: Value = serde_json::from_str(body)?;
    if let Some((code, message)) = payload::embedded_error(&value) {
        return Err(SourceError::Api {
            status: code.unwrap_or(200),
            message,
        });
    }
    Ok(serde_json::from_value(value)?)
}

/// Map a non-2xx response to an API error, preferring the body's message.
fn status_error(status: u16, body: &str) -> SourceError {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| payload::embedded_error(&v))
        .map(|(_, msg)| msg)
        .unwrap_or_else(|| format!("HTTP {status}"));
    SourceError::Api { status, message }
}

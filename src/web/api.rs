//! JSON API handlers for the web dashboard.
//!
//! Each handler takes the server-owned [`Dashboard`] and returns a
//! `Response<Cursor<Vec<u8>>>`. Failures are [`ApiError`]s, rendered by the
//! router as `{ "error": "…" }` with the matching status code.

use std::io::Cursor;
use std::time::Instant;

use anyhow::Context;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tiny_http::{Header, Response, StatusCode};

use crate::analytics::Event;
use crate::config::credential;
use crate::export;
use crate::pipeline::{FilterCriteria, SortField, SortSpec};
use crate::youtube::{SourceError, YouTubeClient};

use super::{Dashboard, content_type_json};

pub type ApiResult = std::result::Result<Response<Cursor<Vec<u8>>>, ApiError>;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// An error with the HTTP status it should be reported under.
#[derive(Debug)]
pub struct ApiError {
    pub status: u16,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl std::fmt::Display) -> Self {
        Self {
            status: 400,
            message: message.to_string(),
        }
    }

    pub fn conflict(message: impl std::fmt::Display) -> Self {
        Self {
            status: 409,
            message: message.to_string(),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self {
            status: 500,
            message: format!("{err:#}"),
        }
    }
}

impl From<SourceError> for ApiError {
    /// Missing key is the caller's problem; everything else is upstream.
    fn from(err: SourceError) -> Self {
        Self {
            status: if err.is_input_error() { 400 } else { 502 },
            message: err.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct SearchRequest {
    #[serde(default)]
    query: String,
}

#[derive(Deserialize)]
struct KeyRequest {
    #[serde(default)]
    key: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchResponse {
    generation: u64,
    query: String,
    fetched: usize,
    /// A summary is being generated; poll `/api/view` for it.
    summary_pending: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SummaryResponse {
    generation: u64,
    summary_pending: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct KeyResponse {
    set: bool,
    masked: Option<String>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Build a JSON success response.
fn json_response<T: Serialize>(data: &T) -> ApiResult {
    let body = serde_json::to_string(data).context("failed to serialize JSON response")?;
    Ok(Response::from_data(body.into_bytes())
        .with_header(content_type_json())
        .with_status_code(StatusCode(200)))
}

/// Decoded query-string pairs, in order. Repeated keys are kept.
pub fn query_pairs(url: &str) -> Vec<(String, String)> {
    let Some((_, query)) = url.split_once('?') else {
        return Vec::new();
    };
    url::form_urlencoded::parse(query.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

fn param<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

fn params_all(pairs: &[(String, String)], key: &str) -> Vec<String> {
    pairs
        .iter()
        .filter(|(k, _)| k == key)
        .map(|(_, v)| v.clone())
        .collect()
}

/// Filter and sort state from `?type=&date=&start=&end=&influence=…&sort=&order=&click=`.
///
/// `click` applies a column-header click on top of `sort`/`order`.
pub fn view_params(url: &str, default: SortSpec) -> Result<(FilterCriteria, SortSpec), ApiError> {
    let pairs = query_pairs(url);

    let criteria = FilterCriteria::parse(
        param(&pairs, "type"),
        param(&pairs, "date"),
        param(&pairs, "start"),
        param(&pairs, "end"),
        &params_all(&pairs, "influence"),
    )
    .map_err(ApiError::bad_request)?;

    let mut spec = SortSpec::parse(param(&pairs, "sort"), param(&pairs, "order"), default)
        .map_err(ApiError::bad_request)?;
    if let Some(click) = param(&pairs, "click").filter(|c| !c.is_empty()) {
        let field: SortField = click.parse().map_err(ApiError::bad_request)?;
        spec = spec.clicked(field);
    }

    Ok((criteria, spec))
}

/// `Content-Disposition` for a download, with an RFC 5987 UTF-8 file name.
fn attachment_header(file_name: &str) -> Option<Header> {
    let encoded: String =
        url::form_urlencoded::byte_serialize(file_name.as_bytes()).collect::<String>();
    let value = format!(
        "attachment; filename=\"export.csv\"; filename*=UTF-8''{}",
        encoded.replace('+', "%20")
    );
    Header::from_bytes("Content-Disposition", value).ok()
}

// ---------------------------------------------------------------------------
// API Handlers
// ---------------------------------------------------------------------------

/// `GET /api/state`: session status plus dashboard defaults.
pub fn get_state(dash: &Dashboard) -> ApiResult {
    let session = &dash.session;
    let cfg = &dash.config;

    let resp = serde_json::json!({
        "query": session.query(),
        "generation": session.generation(),
        "state": session.state(),
        "error": session.error(),
        "fetched": session.records().len(),
        "summaryPending": dash.summary_pending(),
        "hasKey": dash.api_key().is_some(),
        "summarizer": {
            "enabled": dash.summarizer.is_enabled(),
            "provider": cfg.summarizer.provider.to_string(),
            "model": cfg.summarizer.effective_model(),
        },
        "defaults": {
            "sort": cfg.dashboard.default_sort_spec(),
            "keywordLimit": cfg.dashboard.keyword_limit,
        },
    });

    json_response(&resp)
}

/// `POST /api/search` with `{ "query": "…" }`: fetch a new collection.
///
/// The summary is started on the worker thread and this returns as soon as
/// the records are in.
pub fn post_search(dash: &mut Dashboard, body: &str) -> ApiResult {
    let req: SearchRequest = serde_json::from_str(body)
        .map_err(|e| ApiError::bad_request(format!("invalid search request: {e}")))?;
    let query = req.query.trim().to_string();
    if query.is_empty() {
        return Err(ApiError::bad_request("search query is empty"));
    }

    let api_key = dash.api_key().unwrap_or_default();
    let client = YouTubeClient::from_config(&dash.config.youtube, &api_key)?;

    let ticket = dash.session.begin_search(&query);
    let start = Instant::now();
    let fetched = client.fetch(&query, Utc::now());
    let latency_ms = start.elapsed().as_millis() as u64;

    let records = match fetched {
        Ok(records) => records,
        Err(e) => {
            let message = e.to_string();
            dash.log
                .record(&Event::search(&query, "web", Err(&message), latency_ms));
            dash.session.fail_search(ticket, message);
            return Err(e.into());
        }
    };

    dash.log
        .record(&Event::search(&query, "web", Ok(records.len()), latency_ms));
    let count = records.len();
    dash.session.complete_search(ticket, records);
    if dash.summarizer.is_enabled() && count > 0 {
        dash.start_summary(ticket);
    }

    json_response(&SearchResponse {
        generation: ticket.generation(),
        query,
        fetched: count,
        summary_pending: dash.summary_pending(),
    })
}

/// `POST /api/summary?generation=N`: regenerate the summary for search
/// `N` in the background. 409 once `N` has been superseded.
pub fn post_summary(dash: &mut Dashboard, url: &str) -> ApiResult {
    let pairs = query_pairs(url);
    let generation: u64 = param(&pairs, "generation")
        .context("missing generation parameter")
        .and_then(|g| g.parse().context("generation must be a number"))
        .map_err(ApiError::bad_request)?;

    let Some(ticket) = dash.session.ticket_for(generation) else {
        return Err(ApiError::conflict(format!(
            "search {generation} is no longer current"
        )));
    };

    dash.start_summary(ticket);

    json_response(&SummaryResponse {
        generation,
        summary_pending: dash.summary_pending(),
    })
}

/// `GET /api/view?…`: the filtered, sorted, aggregated view.
pub fn get_view(dash: &Dashboard, url: &str) -> ApiResult {
    let (criteria, spec) = view_params(url, dash.config.dashboard.default_sort_spec())?;
    let view = dash.session.view(
        &criteria,
        spec,
        dash.config.dashboard.keyword_limit,
        Utc::now(),
    );

    let resp = serde_json::json!({
        "query": dash.session.query(),
        "generation": dash.session.generation(),
        "state": dash.session.state(),
        "error": dash.session.error(),
        "fetched": dash.session.records().len(),
        "summaryPending": dash.summary_pending(),
        "sort": spec,
        "records": view.records,
        "stats": view.stats,
        "keywords": view.keywords.iter().map(|k| serde_json::json!({
            "word": k.word,
            "score": k.score,
            "fontSize": k.font_size(),
        })).collect::<Vec<_>>(),
    });

    json_response(&resp)
}

/// `GET /api/export.csv?…`: the current view as CSV. 204 when empty.
pub fn get_export(dash: &Dashboard, url: &str) -> ApiResult {
    let (criteria, spec) = view_params(url, dash.config.dashboard.default_sort_spec())?;
    let view = dash.session.view(&criteria, spec, 0, Utc::now());

    let Some(csv) = export::to_csv(&view.records) else {
        return Ok(Response::from_data(Vec::new()).with_status_code(StatusCode(204)));
    };

    let file_name = export::export_file_name(dash.session.query(), Utc::now().date_naive());
    let mut resp = Response::from_data(csv.into_bytes())
        .with_header(super::content_type_csv())
        .with_status_code(StatusCode(200));
    if let Some(header) = attachment_header(&file_name) {
        resp = resp.with_header(header);
    }

    Ok(resp)
}

/// `GET /api/key`: whether a key is stored, masked.
pub fn get_key(dash: &Dashboard) -> ApiResult {
    let key = dash.api_key();
    json_response(&KeyResponse {
        set: key.is_some(),
        masked: key.as_deref().map(credential::mask),
    })
}

/// `PUT /api/key` with `{ "key": "…" }`. An empty key clears it.
pub fn put_key(dash: &Dashboard, body: &str) -> ApiResult {
    let req: KeyRequest = serde_json::from_str(body)
        .map_err(|e| ApiError::bad_request(format!("invalid key request: {e}")))?;
    let path = dash
        .credential_path
        .as_deref()
        .context("could not determine home directory")?;

    credential::write_api_key(path, &req.key)?;
    get_key(dash)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

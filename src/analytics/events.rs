//! Event log: one JSONL line per search or summary.
//!
//! Diagnostics only. Nothing reads the log back except `tubestat history`,
//! and write failures are silently ignored so logging can never break a
//! search.
//!
//! Log file: `~/.tubestat/events.jsonl`

use std::fs::{self, OpenOptions, create_dir_all};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::schema::LoggingConfig;
use crate::summarizer::Summary;

// ---------------------------------------------------------------------------
// Event entry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Search,
    Summary,
}

/// A single log line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub timestamp: String,
    pub kind: EventKind,
    pub query: String,
    /// Front end that issued the search: `"cli"` or `"web"`.
    #[serde(default)]
    pub source: String,
    pub success: bool,
    /// Records fetched (search events only).
    #[serde(default)]
    pub records: usize,
    pub latency_ms: u64,
    /// Summary outcome such as `"generated"` or `"failed"`.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
}

impl Event {
    pub fn search(query: &str, source: &str, outcome: Result<usize, &str>, latency_ms: u64) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            kind: EventKind::Search,
            query: query.to_string(),
            source: source.to_string(),
            success: outcome.is_ok(),
            records: outcome.unwrap_or(0),
            latency_ms,
            status: None,
            model: None,
            error: outcome.err().map(str::to_string),
        }
    }

    pub fn summary(query: &str, source: &str, summary: &Summary) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            kind: EventKind::Summary,
            query: query.to_string(),
            source: source.to_string(),
            success: summary.error().is_none(),
            records: 0,
            latency_ms: summary.latency_ms,
            status: Some(summary.status.as_str().to_string()),
            model: summary.model.clone(),
            error: summary.error().map(str::to_string),
        }
    }

    pub fn time(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.timestamp)
            .ok()
            .map(|t| t.with_timezone(&Utc))
    }
}

// ---------------------------------------------------------------------------
// Log handle
// ---------------------------------------------------------------------------

/// Where events go. A disabled log drops everything.
#[derive(Debug, Clone)]
pub struct EventLog {
    path: Option<PathBuf>,
}

impl EventLog {
    pub fn from_config(config: &LoggingConfig) -> Self {
        Self {
            path: config.enabled.then(events_log_path).flatten(),
        }
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    pub fn disabled() -> Self {
        Self { path: None }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Append an event. Best-effort.
    pub fn record(&self, event: &Event) {
        if let Some(path) = &self.path {
            let _ = append_event(path, event);
        }
    }

    /// All readable events, oldest first.
    pub fn read(&self) -> Vec<Event> {
        self.path.as_deref().map(read_events).unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// File I/O
// ---------------------------------------------------------------------------

fn append_event(path: &Path, event: &Event) -> Result<()> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    let json = serde_json::to_string(event)?;
    writeln!(file, "{json}")?;

    Ok(())
}

/// Read every event from `path`, skipping malformed lines.
pub fn read_events(path: &Path) -> Vec<Event> {
    let Ok(file) = fs::File::open(path) else {
        return Vec::new();
    };

    BufReader::new(file)
        .lines()
        .map_while(std::io::Result::ok)
        .filter_map(|line| serde_json::from_str::<Event>(&line).ok())
        .collect()
}

pub fn events_log_path() -> Option<PathBuf> {
    crate::config::data_dir().map(|dir| dir.join("events.jsonl"))
}

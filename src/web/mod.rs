//! Embedded web dashboard for tubestat.
//!
//! Provides a lightweight HTTP server (sync, via `tiny_http`) that serves:
//! - A single-page dashboard: search, filters, sortable table, charts
//! - JSON API endpoints over one in-memory search session
//!
//! Launched via `tubestat web` (default: `http://127.0.0.1:9747`).
//!
//! Requests are handled one at a time on the server thread, which owns the
//! [`Dashboard`] state outright; no locking is needed. AI summaries run on
//! a worker thread and come back over a channel, so filter and sort
//! requests never wait on the model. Finished summaries are applied at the
//! start of the next request, gated by the search generation.

mod api;
mod frontend;

use std::io::{Cursor, Read};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use anyhow::{Context, Result};
use tiny_http::{Header, Method, Response, Server, StatusCode};

pub use api::{ApiError, ApiResult, query_pairs, view_params};

use crate::analytics::{Event, EventLog};
use crate::config::{TubestatConfig, credential};
use crate::session::{SearchTicket, Session};
use crate::summarizer::{Summarizer, Summary};

// ---------------------------------------------------------------------------
// Dashboard state
// ---------------------------------------------------------------------------

/// A summary finished on the worker thread, tagged with its search.
struct SummaryDone {
    ticket: SearchTicket,
    query: String,
    summary: Summary,
}

/// Everything the server keeps between requests.
pub struct Dashboard {
    config: TubestatConfig,
    session: Session,
    summarizer: Arc<Summarizer>,
    log: EventLog,
    credential_path: Option<PathBuf>,
    summary_tx: Sender<SummaryDone>,
    summary_rx: Receiver<SummaryDone>,
    /// Search whose summary is still being generated.
    pending_summary: Option<SearchTicket>,
}

impl Dashboard {
    pub fn new(config: TubestatConfig, credential_path: Option<PathBuf>) -> Self {
        let summarizer = Summarizer::from_config(&config.summarizer);
        let log = EventLog::from_config(&config.logging);
        let (summary_tx, summary_rx) = mpsc::channel();
        Self {
            config,
            session: Session::new(),
            summarizer: Arc::new(summarizer),
            log,
            credential_path,
            summary_tx,
            summary_rx,
            pending_summary: None,
        }
    }

    pub fn with_summarizer(mut self, summarizer: Summarizer) -> Self {
        self.summarizer = Arc::new(summarizer);
        self
    }

    pub fn with_log(mut self, log: EventLog) -> Self {
        self.log = log;
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    fn api_key(&self) -> Option<String> {
        credential::load_api_key_from(self.credential_path.as_deref())
    }

    /// Summarize the current collection on a worker thread.
    ///
    /// The records are snapshotted now; the result is applied by
    /// [`Dashboard::collect_summaries`] only if `ticket` is still current.
    fn start_summary(&mut self, ticket: SearchTicket) {
        let summarizer = Arc::clone(&self.summarizer);
        let records = self.session.records().to_vec();
        let query = self.session.query().to_string();
        let tx = self.summary_tx.clone();

        self.pending_summary = Some(ticket);
        thread::spawn(move || {
            let summary = summarizer.summarize(&records);
            // The receiver lives as long as the dashboard.
            let _ = tx.send(SummaryDone {
                ticket,
                query,
                summary,
            });
        });
    }

    /// Apply every summary that has finished since the last request.
    /// Results for a superseded search are logged and dropped.
    fn collect_summaries(&mut self) {
        while let Ok(done) = self.summary_rx.try_recv() {
            self.absorb_summary(done);
        }
    }

    fn absorb_summary(&mut self, done: SummaryDone) {
        self.log
            .record(&Event::summary(&done.query, "web", &done.summary));
        self.session.apply_summary(done.ticket, done.summary.text);
        if self.pending_summary == Some(done.ticket) {
            self.pending_summary = None;
        }
    }

    /// Whether the current search still has a summary in flight.
    pub fn summary_pending(&self) -> bool {
        self.pending_summary
            .is_some_and(|ticket| self.session.is_current(ticket))
    }

    /// Route one request and render errors as JSON.
    pub fn handle(
        &mut self,
        method: &Method,
        url: &str,
        body: Option<&str>,
    ) -> Response<Cursor<Vec<u8>>> {
        self.collect_summaries();
        match dispatch(self, method, url, body) {
            Ok(resp) => resp,
            Err(e) => error_response(&e),
        }
    }
}

// ---------------------------------------------------------------------------
// Server entry point
// ---------------------------------------------------------------------------

/// Start the dashboard server on the given address. Blocks the current
/// thread.
pub fn serve(addr: &str, config: TubestatConfig) -> Result<()> {
    let server = Server::http(addr)
        .map_err(|e| anyhow::anyhow!("failed to start HTTP server on {addr}: {e}"))?;

    let mut dashboard = Dashboard::new(config, credential::credential_path());

    println!("tubestat dashboard running at http://{addr}");
    println!("Press Ctrl+C to stop.\n");

    // Best-effort
    let _ = open_browser(&format!("http://{addr}"));

    for mut request in server.incoming_requests() {
        let method = request.method().clone();
        let url = request.url().to_string();

        let body = if matches!(method, Method::Put | Method::Post | Method::Patch) {
            let mut buf = String::new();
            let _ = request.as_reader().read_to_string(&mut buf);
            Some(buf)
        } else {
            None
        };

        let resp = dashboard.handle(&method, &url, body.as_deref());
        let status = resp.status_code().0;
        let _ = request.respond(resp);

        // Brief access log
        println!(
            "{} {} {} {}",
            method,
            url,
            status,
            chrono::Local::now().format("%H:%M:%S")
        );
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

fn dispatch(dash: &mut Dashboard, method: &Method, url: &str, body: Option<&str>) -> ApiResult {
    // Strip query string for path matching
    let path = url.split('?').next().unwrap_or(url);

    match (method, path) {
        // Frontend
        (&Method::Get, "/") | (&Method::Get, "/index.html") => Ok(serve_frontend()),

        // API: search session
        (&Method::Get, "/api/state") => api::get_state(dash),
        (&Method::Post, "/api/search") => api::post_search(dash, body.unwrap_or("{}")),
        (&Method::Post, "/api/summary") => api::post_summary(dash, url),
        (&Method::Get, "/api/view") => api::get_view(dash, url),
        (&Method::Get, "/api/export.csv") => api::get_export(dash, url),

        // API: credential
        (&Method::Get, "/api/key") => api::get_key(dash),
        (&Method::Put, "/api/key") => api::put_key(dash, body.unwrap_or("{}")),

        // 404
        _ => Ok(not_found()),
    }
}

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

fn serve_frontend() -> Response<Cursor<Vec<u8>>> {
    Response::from_data(frontend::INDEX_HTML.as_bytes().to_vec())
        .with_header(content_type_html())
        .with_status_code(StatusCode(200))
}

fn not_found() -> Response<Cursor<Vec<u8>>> {
    let body = r#"{"error": "not found"}"#;
    Response::from_data(body.as_bytes().to_vec())
        .with_header(content_type_json())
        .with_status_code(StatusCode(404))
}

fn error_response(err: &ApiError) -> Response<Cursor<Vec<u8>>> {
    let body = serde_json::json!({ "error": err.message }).to_string();
    Response::from_data(body.into_bytes())
        .with_header(content_type_json())
        .with_status_code(StatusCode(err.status))
}

fn header(value: &'static str) -> Header {
    Header::from_bytes("Content-Type", value).unwrap()
}

pub(crate) fn content_type_json() -> Header {
    header("application/json; charset=utf-8")
}

fn content_type_html() -> Header {
    header("text/html; charset=utf-8")
}

pub(crate) fn content_type_csv() -> Header {
    header("text/csv; charset=utf-8")
}

/// Attempt to open a URL in the system default browser.
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", url])
            .spawn()
            .context("failed to open browser")?;
    }

    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open")
            .arg(url)
            .spawn()
            .context("failed to open browser")?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open")
            .arg(url)
            .spawn()
            .context("failed to open browser")?;
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

/// AI trend summary over the top records of a search.
///
/// The summary is advisory: [`Summarizer::summarize`] never fails. Backend
/// errors and empty replies collapse into fixed fallback strings so the
/// dashboard always has something to show.
///
/// Backends:
///
/// - **Gemini** (`generateContent`), the default
/// - **Ollama** (`/api/chat`) for a local model
/// - **Disabled** when `summarizer.enabled = false` or `--no-summary`
use std::time::Instant;

use anyhow::Result;

pub mod gemini;
pub mod ollama;
pub mod prompts;

use crate::config::schema::{Provider, SummarizerConfig};
use crate::record::MediaRecord;
use gemini::GeminiClient;
use ollama::OllamaClient;
use prompts::{Prompt, build_prompt};

pub const NO_DATA: &str = "No data to analyze.";
pub const EMPTY_RESPONSE: &str = "Unable to generate an analysis.";
pub const FAILED: &str = "An error occurred during AI analysis.";
pub const DISABLED: &str = "AI analysis is disabled.";

/// A text-completion endpoint: system + user prompt in, reply text out.
///
/// An empty reply is `Ok("")`; the summarizer decides what that means.
/// Backends run on the dashboard's summary worker thread, hence the bounds.
pub trait Backend: Send + Sync {
    fn complete(&self, prompt: &Prompt) -> Result<String>;
    fn model_name(&self) -> &str;
}

/// How a summary came about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryStatus {
    Generated,
    NoData,
    EmptyResponse,
    Failed(String),
    Disabled,
}

impl SummaryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Generated => "generated",
            Self::NoData => "no_data",
            Self::EmptyResponse => "empty_response",
            Self::Failed(_) => "failed",
            Self::Disabled => "disabled",
        }
    }
}

/// The summary text plus how it was produced.
#[derive(Debug, Clone)]
pub struct Summary {
    pub text: String,
    pub status: SummaryStatus,
    pub model: Option<String>,
    pub latency_ms: u64,
}

impl Summary {
    fn fixed(text: &str, status: SummaryStatus) -> Self {
        Self {
            text: text.to_string(),
            status,
            model: None,
            latency_ms: 0,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.status {
            SummaryStatus::Failed(msg) => Some(msg),
            _ => None,
        }
    }
}

pub struct Summarizer {
    backend: Option<Box<dyn Backend>>,
    top_n: usize,
    language: String,
}

impl Summarizer {
    /// Build the configured backend, or a disabled summarizer.
    pub fn from_config(config: &SummarizerConfig) -> Self {
        let backend: Option<Box<dyn Backend>> = if !config.enabled {
            None
        } else {
            match config.provider {
                Provider::Gemini => Some(Box::new(GeminiClient::from_config(config))),
                Provider::Ollama => Some(Box::new(OllamaClient::from_config(config))),
            }
        };

        Self {
            backend,
            top_n: config.top_n.max(1),
            language: config.language.clone(),
        }
    }

    pub fn with_backend(backend: Box<dyn Backend>, top_n: usize, language: &str) -> Self {
        Self {
            backend: Some(backend),
            top_n: top_n.max(1),
            language: language.to_string(),
        }
    }

    pub fn disabled() -> Self {
        Self {
            backend: None,
            top_n: 1,
            language: String::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.backend.is_some()
    }

    /// Summarize the first `top_n` records in the order given.
    pub fn summarize(&self, records: &[MediaRecord]) -> Summary {
        let Some(backend) = &self.backend else {
            return Summary::fixed(DISABLED, SummaryStatus::Disabled);
        };
        if records.is_empty() {
            return Summary::fixed(NO_DATA, SummaryStatus::NoData);
        }

        let prompt = build_prompt(records, self.top_n, &self.language);
        let start = Instant::now();
        let result = backend.complete(&prompt);
        let latency_ms = start.elapsed().as_millis() as u64;

        let (text, status) = match result {
            Ok(reply) if reply.trim().is_empty() => {
                (EMPTY_RESPONSE.to_string(), SummaryStatus::EmptyResponse)
            }
            Ok(reply) => (reply.trim().to_string(), SummaryStatus::Generated),
            Err(e) => (FAILED.to_string(), SummaryStatus::Failed(format!("{e:#}"))),
        };

        Summary {
            text,
            status,
            model: Some(backend.model_name().to_string()),
            latency_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::record::RecordInput;

    struct Canned {
        reply: Result<String, String>,
        seen: Mutex<Option<Prompt>>,
    }

    impl Backend for Canned {
        fn complete(&self, prompt: &Prompt) -> Result<String> {
            *self.seen.lock().unwrap() = Some(prompt.clone());
            self.reply.clone().map_err(anyhow::Error::msg)
        }

        fn model_name(&self) -> &str {
            "canned"
        }
    }

    fn summarizer(reply: Result<&str, &str>) -> Summarizer {
        let backend = Canned {
            reply: reply.map(str::to_string).map_err(str::to_string),
            seen: Mutex::new(None),
        };
        Summarizer::with_backend(Box::new(backend), 10, "English")
    }

    fn records() -> Vec<MediaRecord> {
        vec![MediaRecord::derive(
            RecordInput {
                title: "t".into(),
                ..Default::default()
            },
            Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap(),
        )]
    }

    #[test]
    fn empty_input_short_circuits() {
        let summary = summarizer(Ok("unused")).summarize(&[]);
        assert_eq!(summary.text, NO_DATA);
        assert_eq!(summary.status, SummaryStatus::NoData);
    }

    #[test]
    fn reply_is_trimmed() {
        let summary = summarizer(Ok("  Shorts dominate.\n")).summarize(&records());
        assert_eq!(summary.text, "Shorts dominate.");
        assert_eq!(summary.status, SummaryStatus::Generated);
        assert_eq!(summary.model.as_deref(), Some("canned"));
    }

    #[test]
    fn blank_reply_falls_back() {
        let summary = summarizer(Ok("   ")).summarize(&records());
        assert_eq!(summary.text, EMPTY_RESPONSE);
    }

    #[test]
    fn error_falls_back_and_keeps_reason() {
        let summary = summarizer(Err("boom")).summarize(&records());
        assert_eq!(summary.text, FAILED);
        assert_eq!(summary.error(), Some("boom"));
    }

    #[test]
    fn disabled_config_builds_no_backend() {
        let config = SummarizerConfig {
            enabled: false,
            ..SummarizerConfig::default()
        };
        let summarizer = Summarizer::from_config(&config);
        assert!(!summarizer.is_enabled());
        assert_eq!(summarizer.summarize(&records()).status, SummaryStatus::Disabled);
    }
}

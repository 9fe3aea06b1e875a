/// Configuration schema and defaults.
///
/// Sections: `[youtube]`, `[summarizer]`, `[dashboard]`, `[logging]`. Every
/// field has a built-in default; users only set what they want to change.
use serde::{Deserialize, Serialize};

use crate::pipeline::keywords::DEFAULT_KEYWORD_LIMIT;
use crate::pipeline::{SortField, SortOrder, SortSpec};

/// Top-level configuration, mapped from `~/.tubestat/config.toml` and
/// `.tubestat.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TubestatConfig {
    pub youtube: YoutubeConfig,
    pub summarizer: SummarizerConfig,
    pub dashboard: DashboardConfig,
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// [youtube]
// ---------------------------------------------------------------------------

/// YouTube Data API settings. The API key itself lives in the credential
/// store, not here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct YoutubeConfig {
    /// Base URL of the Data API.
    pub api_url: String,
    /// Search page size (the API caps this at 50).
    pub max_results: u32,
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for YoutubeConfig {
    fn default() -> Self {
        Self {
            api_url: "https://www.googleapis.com/youtube/v3".to_string(),
            max_results: 50,
            timeout_ms: 15_000,
        }
    }
}

// ---------------------------------------------------------------------------
// [summarizer]
// ---------------------------------------------------------------------------

/// LLM backend used for the trend summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Provider {
    /// Google Gemini `generateContent`.
    #[default]
    Gemini,
    /// Local Ollama `/api/chat`.
    Ollama,
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Gemini => write!(f, "gemini"),
            Self::Ollama => write!(f, "ollama"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarizerConfig {
    /// Whether a trend summary is requested after each search.
    pub enabled: bool,
    pub provider: Provider,
    /// Model name; empty means the provider's default.
    pub model: String,
    /// Gemini API key. Prefer the `GEMINI_API_KEY` environment variable.
    pub api_key: String,
    /// Endpoint base URL; empty means the provider's default.
    pub url: String,
    pub temperature: f64,
    pub timeout_ms: u64,
    /// How many of the top records go into the prompt.
    pub top_n: usize,
    /// Language the summary should be written in.
    pub language: String,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            provider: Provider::default(),
            model: String::new(),
            api_key: String::new(),
            url: String::new(),
            temperature: 0.7,
            timeout_ms: 30_000,
            top_n: 10,
            language: "English".to_string(),
        }
    }
}

impl SummarizerConfig {
    pub fn effective_model(&self) -> &str {
        if !self.model.is_empty() {
            return &self.model;
        }
        match self.provider {
            Provider::Gemini => "gemini-2.0-flash",
            Provider::Ollama => "llama3.2:1b",
        }
    }

    pub fn effective_url(&self) -> &str {
        if !self.url.is_empty() {
            return &self.url;
        }
        match self.provider {
            Provider::Gemini => "https://generativelanguage.googleapis.com/v1beta",
            Provider::Ollama => "http://localhost:11434",
        }
    }
}

// ---------------------------------------------------------------------------
// [dashboard]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Listen address for `tubestat web`.
    pub addr: String,
    pub default_sort: SortField,
    pub default_order: SortOrder,
    /// Number of keywords in the related-keyword cloud.
    pub keyword_limit: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:9747".to_string(),
            default_sort: SortField::ViewCount,
            default_order: SortOrder::Desc,
            keyword_limit: DEFAULT_KEYWORD_LIMIT,
        }
    }
}

impl DashboardConfig {
    pub fn default_sort_spec(&self) -> SortSpec {
        SortSpec::new(self.default_sort, self.default_order)
    }
}

// ---------------------------------------------------------------------------
// [logging]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Append search/summary events to `~/.tubestat/events.jsonl`.
    pub enabled: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

// ---------------------------------------------------------------------------
// Annotated default file
// ---------------------------------------------------------------------------

impl TubestatConfig {
    /// Annotated default config written by `tubestat config init`.
    pub fn default_toml() -> &'static str {
        r#"# tubestat configuration
# Values here override built-in defaults. A .tubestat.toml in the working
# directory overrides this file, and TUBESTAT_* env vars override both.

[youtube]
api_url = "https://www.googleapis.com/youtube/v3"
max_results = 50
timeout_ms = 15000

[summarizer]
enabled = true
# gemini | ollama
provider = "gemini"
# empty = provider default
model = ""
# Gemini key; GEMINI_API_KEY takes precedence
api_key = ""
url = ""
temperature = 0.7
timeout_ms = 30000
top_n = 10
language = "English"

[dashboard]
addr = "127.0.0.1:9747"
default_sort = "viewCount"
default_order = "desc"
keyword_limit = 15

[logging]
enabled = true
"#
    }
}

/// Ollama `/api/chat` backend.
///
/// Talks to a local Ollama instance with the synchronous `ureq` client.
/// `/api/chat` applies the model's own chat template, so the prompt is sent
/// as a plain system + user message pair.
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::Backend;
use super::prompts::Prompt;
use crate::config::schema::SummarizerConfig;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// A single message in a chat conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    options: ChatOptions,
}

#[derive(Debug, Serialize)]
struct ChatOptions {
    temperature: f64,
}

/// Response body from `POST /api/chat` (non-streaming).
#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    message: Option<ChatResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: String,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct OllamaClient {
    base_url: String,
    model: String,
    temperature: f64,
    timeout: Duration,
}

impl OllamaClient {
    pub fn from_config(config: &SummarizerConfig) -> Self {
        Self {
            base_url: config.effective_url().trim_end_matches('/').to_string(),
            model: config.effective_model().to_string(),
            temperature: config.temperature,
            timeout: Duration::from_millis(config.timeout_ms),
        }
    }

    fn chat_url(&self) -> String {
        // "localhost" may resolve to ::1 first while Ollama binds IPv4 only.
        format!("{}/api/chat", self.base_url).replace("://localhost", "://127.0.0.1")
    }

    /// Send chat messages and return the assistant's reply (possibly empty).
    pub fn chat(&self, messages: &[ChatMessage]) -> Result<String> {
        let body = ChatRequest {
            model: &self.model,
            messages,
            stream: false,
            options: ChatOptions {
                temperature: self.temperature,
            },
        };

        let resp = ureq::post(&self.chat_url())
            .timeout(self.timeout)
            .send_json(&body)
            .context("Ollama chat request failed")?;

        let parsed: ChatResponse = resp
            .into_json()
            .context("failed to parse Ollama chat response")?;

        Ok(parsed.message.map(|m| m.content).unwrap_or_default())
    }
}

impl Backend for OllamaClient {
    fn complete(&self, prompt: &Prompt) -> Result<String> {
        let messages = [
            ChatMessage::system(&prompt.system),
            ChatMessage::user(&prompt.user),
        ];
        self.chat(&messages)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

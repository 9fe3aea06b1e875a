/// Google Gemini `generateContent` backend.
///
/// `POST {url}/models/{model}:generateContent?key=…` with the analyst
/// persona as `systemInstruction` and the digest as the single user turn.
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::Backend;
use super::prompts::Prompt;
use crate::config::schema::SummarizerConfig;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize, Default)]
#[serde(default)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize, Deserialize, Default)]
#[serde(default)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    system_instruction: Content,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f64,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct GenerateResponse {
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct Candidate {
    content: Content,
}

impl GenerateResponse {
    /// Text of the first candidate, parts concatenated. Empty when the model
    /// returned nothing usable.
    fn text(&self) -> String {
        self.candidates
            .first()
            .map(|c| {
                c.content
                    .parts
                    .iter()
                    .map(|p| p.text.as_str())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

fn request_body(prompt: &Prompt, temperature: f64) -> GenerateRequest {
    GenerateRequest {
        system_instruction: Content {
            role: None,
            parts: vec![Part {
                text: prompt.system.clone(),
            }],
        },
        contents: vec![Content {
            role: Some("user".to_string()),
            parts: vec![Part {
                text: prompt.user.clone(),
            }],
        }],
        generation_config: GenerationConfig { temperature },
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct GeminiClient {
    base_url: String,
    model: String,
    api_key: String,
    temperature: f64,
    timeout: Duration,
}

impl GeminiClient {
    pub fn from_config(config: &SummarizerConfig) -> Self {
        Self {
            base_url: config.effective_url().trim_end_matches('/').to_string(),
            model: config.effective_model().to_string(),
            api_key: config.api_key.trim().to_string(),
            temperature: config.temperature,
            timeout: Duration::from_millis(config.timeout_ms),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

impl Backend for GeminiClient {
    fn complete(&self, prompt: &Prompt) -> Result<String> {
        if self.api_key.is_empty() {
            anyhow::bail!("Gemini API key is not set (GEMINI_API_KEY or summarizer.api_key)");
        }

        let resp = ureq::post(&self.endpoint())
            .query("key", &self.api_key)
            .timeout(self.timeout)
            .send_json(request_body(prompt, self.temperature))
            .context("Gemini generateContent request failed")?;

        let parsed: GenerateResponse = resp
            .into_json()
            .context("failed to parse Gemini response")?;

        Ok(parsed.text())
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

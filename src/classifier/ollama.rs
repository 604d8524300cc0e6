//! Ollama-backed classifier.
//!
//! Each message is sent as its own non-streaming chat request, with a
//! system prompt that restricts the answer to the label codes of the
//! requested analysis.

use crate::classifier::Classifier;
use crate::models::AnalysisKind;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Connection settings for the Ollama classifier.
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    pub ollama_url: String,
    pub model_name: String,
    pub temperature: f32,
    pub timeout_seconds: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            ollama_url: "http://localhost:11434".to_string(),
            model_name: "llama3.2:latest".to_string(),
            temperature: 0.0,
            timeout_seconds: 120,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

/// Ollama chat API request.
#[derive(Debug, Serialize)]
struct OllamaChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
}

/// Ollama chat API response.
#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    message: ChatMessage,
}

/// Classifier that asks a local Ollama model for a label.
pub struct OllamaClassifier {
    config: OllamaConfig,
    http_client: reqwest::Client,
}

impl OllamaClassifier {
    pub fn new(config: OllamaConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            config,
            http_client,
        })
    }

    fn build_request(&self, kind: AnalysisKind, text: &str) -> OllamaChatRequest {
        OllamaChatRequest {
            model: self.config.model_name.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system_prompt(kind),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: text.to_string(),
                },
            ],
            stream: false,
            options: OllamaOptions {
                temperature: self.config.temperature,
            },
        }
    }
}

#[async_trait]
impl Classifier for OllamaClassifier {
    fn name(&self) -> String {
        format!("ollama:{}", self.config.model_name)
    }

    async fn classify(&self, kind: AnalysisKind, text: &str) -> Result<String> {
        let url = format!("{}/api/chat", self.config.ollama_url.trim_end_matches('/'));
        let request = self.build_request(kind, text);

        let response = self
            .http_client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    anyhow::anyhow!("Request timed out after {}s", self.config.timeout_seconds)
                } else if e.is_connect() {
                    anyhow::anyhow!(
                        "Cannot connect to Ollama at {}. Is Ollama running?",
                        self.config.ollama_url
                    )
                } else {
                    anyhow::anyhow!("Failed to send request: {}", e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("Ollama API error {}: {}", status, body));
        }

        let chat_response: OllamaChatResponse = response
            .json()
            .await
            .context("Failed to parse Ollama response")?;

        let label = normalize_reply(kind, &chat_response.message.content);
        debug!("{} -> {}", kind, label);
        Ok(label)
    }
}

fn system_prompt(kind: AnalysisKind) -> String {
    let task = match kind {
        AnalysisKind::Sentiment => {
            "the sentiment of the message: POS for positive, NEU for neutral, NEG for negative"
        }
        AnalysisKind::Emotion => {
            "the dominant emotion of the message, or others if none of the emotions fits"
        }
    };

    format!(
        "You classify chat messages. Determine {}.\n\
         Answer with exactly one of these labels and nothing else: {}",
        task,
        kind.codes().join(", ")
    )
}

/// Map a model reply to a label code.
///
/// Accepts the code or the display name in any case, wrapped in quotes
/// or followed by punctuation. Unrecognised replies are returned trimmed
/// so the caller can report them.
fn normalize_reply(kind: AnalysisKind, reply: &str) -> String {
    let first_line = reply.trim().lines().next().unwrap_or("").trim();
    let candidate = first_line.trim_matches(|c: char| !c.is_alphanumeric());

    kind.labels()
        .into_iter()
        .find(|(code, name)| {
            candidate.eq_ignore_ascii_case(code) || candidate.eq_ignore_ascii_case(name)
        })
        .map(|(code, _)| code.to_string())
        .unwrap_or_else(|| first_line.to_string())
}

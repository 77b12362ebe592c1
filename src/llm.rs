//! Text-generation seam used by the query translator.
//!
//! `GeminiClient` talks to the Google Generative Language `generateContent`
//! endpoint. Anything implementing `TextGenerator` can stand in for it.

use crate::config::LlmConfig;
use crate::error::{AgentError, Result};
use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, error};

/// Maximum number of response-body characters kept in error messages.
const ERROR_BODY_LIMIT: usize = 300;

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Provider label for logs (e.g. "gemini/gemini-2.5-pro")
    fn label(&self) -> String;

    /// Send one prompt, return the first candidate text.
    async fn generate(&self, prompt: &str) -> Result<String>;
}

pub struct GeminiClient {
    http: reqwest::Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn from_config(cfg: &LlmConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(cfg.timeout)
            .build()
            .map_err(|e| AgentError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            api_key: cfg.api_key.clone(),
            model: cfg.model.clone(),
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    fn label(&self) -> String {
        format!("gemini/{}", self.model)
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| AgentError::Translation("GOOGLE_GEMINI_API_KEY is not set".to_string()))?;

        let body = serde_json::json!({
            "contents": [
                {
                    "role": "user",
                    "parts": [{ "text": prompt }]
                }
            ]
        });

        debug!("LLM call -> {}", self.endpoint());

        let response = self
            .http
            .post(self.endpoint())
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await
            .map_err(|e| AgentError::Translation(format!("Gemini API call failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let snippet: String = text.chars().take(ERROR_BODY_LIMIT).collect();
            error!("Gemini API error {}: {}", status, snippet);
            return Err(AgentError::Translation(format!(
                "Gemini API returned status {}",
                status
            )));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| AgentError::Translation(format!("Failed to parse Gemini response: {}", e)))?;

        extract_candidate_text(&payload)
    }
}

/// Pull `candidates[0].content.parts[0].text` out of a `generateContent` payload.
pub fn extract_candidate_text(payload: &Value) -> Result<String> {
    payload["candidates"][0]["content"]["parts"][0]["text"]
        .as_str()
        .map(|s| s.to_string())
        .ok_or_else(|| AgentError::Translation("No candidate text in Gemini response".to_string()))
}

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::config::EngineConfig;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("authentication failed (status {status}): {message}")]
    Auth { status: u16, message: String },
    #[error("quota or rate limit exceeded (status {status}): {message}")]
    Quota { status: u16, message: String },
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("empty response from AI service")]
    EmptyResponse,
    #[error("invalid response envelope: {0}")]
    InvalidEnvelope(String),
}

impl ServiceError {
    /// Errors attributable to the AI service being unusable right now. These
    /// are degraded to fallback copy; everything else reaches the caller.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ServiceError::Auth { .. }
                | ServiceError::Quota { .. }
                | ServiceError::EmptyResponse
                | ServiceError::InvalidEnvelope(_)
        )
    }
}

/// Maps a non-success HTTP status to an error class.
pub fn classify_status(status: u16, message: String) -> ServiceError {
    match status {
        401 | 403 => ServiceError::Auth { status, message },
        402 | 429 => ServiceError::Quota { status, message },
        _ => ServiceError::Api { status, message },
    }
}

/// Remote chat-completion service. Returns the raw text of the model's reply.
#[async_trait]
pub trait GenerationService: Send + Sync {
    async fn complete(
        &self,
        system: &str,
        user: &str,
        model: &str,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, ServiceError>;
}

/// OpenAI-compatible `/chat/completions` client requesting JSON-only output.
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenAiClient {
    pub fn new(api_key: String, base_url: String, timeout: Duration) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ServiceError::Http(e.to_string()))?;
        Ok(Self { client, api_key, base_url: base_url.trim_end_matches('/').to_string() })
    }

    pub fn from_config(config: &EngineConfig) -> Result<Self, ServiceError> {
        Self::new(
            config.api_key.clone().unwrap_or_default(),
            config.api_base.clone(),
            config.request_timeout,
        )
    }

    pub(crate) fn build_request_body(system: &str, user: &str, model: &str, temperature: f32, max_tokens: u32) -> serde_json::Value {
        json!({
            "model": model,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": user}
            ],
            "temperature": temperature,
            "max_tokens": max_tokens,
            "response_format": {"type": "json_object"}
        })
    }
}

#[async_trait]
impl GenerationService for OpenAiClient {
    async fn complete(
        &self,
        system: &str,
        user: &str,
        model: &str,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, ServiceError> {
        let url = format!("{}/chat/completions", self.base_url);
        info!("🔗 Requesting completion from {} (model {})", url, model);

        let body = Self::build_request_body(system, user, model, temperature, max_tokens);
        debug!(prompt_chars = user.len(), max_tokens, "Sending chat completion request");

        let response = self.client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ServiceError::Http(e.to_string()))?;

        let status = response.status();
        debug!("📥 Response status: {}", status);
        let response_text = response.text().await
            .map_err(|e| ServiceError::Http(e.to_string()))?;

        if !status.is_success() {
            error!("❌ AI service returned {}: {}", status, truncate_for_log(&response_text, 300));
            return Err(classify_status(status.as_u16(), response_text));
        }

        extract_content(&response_text)
    }
}

pub(crate) fn extract_content(response_text: &str) -> Result<String, ServiceError> {
    let parsed: ChatResponse = serde_json::from_str(response_text)
        .map_err(|e| ServiceError::InvalidEnvelope(e.to_string()))?;
    parsed.choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .ok_or(ServiceError::EmptyResponse)
}

fn truncate_for_log(s: &str, max: usize) -> String {
    if s.chars().count() <= max { s.to_string() } else { format!("{}...", s.chars().take(max).collect::<String>()) }
}

// --- Response Parsing Helpers ---

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice { message: ChoiceMessage }

#[derive(Debug, Deserialize)]
struct ChoiceMessage { #[serde(default)] content: Option<String> }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_request_body() {
        let body = OpenAiClient::build_request_body("sys", "user", "gpt-4o-mini", 0.5, 800);
        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "user");
        assert_eq!(body["max_tokens"], 800);
        assert_eq!(body["response_format"]["type"], "json_object");
    }

    #[test]
    fn test_classify_status() {
        assert!(matches!(classify_status(401, "bad key".into()), ServiceError::Auth { status: 401, .. }));
        assert!(matches!(classify_status(403, String::new()), ServiceError::Auth { .. }));
        assert!(matches!(classify_status(429, String::new()), ServiceError::Quota { .. }));
        assert!(matches!(classify_status(402, String::new()), ServiceError::Quota { .. }));
        assert!(matches!(classify_status(500, String::new()), ServiceError::Api { status: 500, .. }));
    }

    #[test]
    fn test_recoverable_classes() {
        assert!(classify_status(401, String::new()).is_recoverable());
        assert!(classify_status(429, String::new()).is_recoverable());
        assert!(ServiceError::EmptyResponse.is_recoverable());
        assert!(ServiceError::InvalidEnvelope("eof".into()).is_recoverable());
        assert!(!classify_status(500, String::new()).is_recoverable());
        assert!(!ServiceError::Http("connection reset".into()).is_recoverable());
    }

    #[test]
    fn test_extract_content() {
        let ok = r#"{"choices":[{"message":{"role":"assistant","content":"  {\"description\":\"x\"} "}}]}"#;
        assert_eq!(extract_content(ok).unwrap(), r#"{"description":"x"}"#);

        let empty = r#"{"choices":[{"message":{"role":"assistant","content":""}}]}"#;
        assert!(matches!(extract_content(empty), Err(ServiceError::EmptyResponse)));
        assert!(matches!(extract_content(r#"{"choices":[]}"#), Err(ServiceError::EmptyResponse)));
        assert!(matches!(extract_content("<html>"), Err(ServiceError::InvalidEnvelope(_))));
    }
}

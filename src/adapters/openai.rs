//! OpenAI-compatible chat completions backend for the reasoning service.
//!
//! Requests JSON output mode and parses the first choice's message content.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use super::{AdapterError, Reasoner, ReasoningRequest};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

const SERVICE: &str = "openai";

/// Chat completions client
pub struct OpenAiReasoner {
    api_key: String,
    model: String,
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiReasoner {
    /// Create a client against the public API
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Point the client at another OpenAI-compatible endpoint
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Bound every request by a timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build OpenAI HTTP client")?;
        Ok(self)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn request_body(&self, request: &ReasoningRequest) -> Value {
        json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": request.system },
                { "role": "user", "content": request.prompt },
            ],
            "temperature": request.temperature,
            "response_format": { "type": "json_object" },
        })
    }
}

/// Extract the JSON payload from a chat completions response body
pub(crate) fn parse_completion(body: &str) -> Result<Value, AdapterError> {
    let response: ChatResponse = serde_json::from_str(body).map_err(|e| AdapterError::Malformed {
        service: SERVICE,
        detail: format!("invalid response envelope: {}", e),
    })?;

    let content = response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| AdapterError::Malformed {
            service: SERVICE,
            detail: "response has no message content".to_string(),
        })?;

    serde_json::from_str(strip_code_fence(&content)).map_err(|e| AdapterError::Malformed {
        service: SERVICE,
        detail: format!("message content is not JSON: {}", e),
    })
}

/// Remove a surrounding markdown code fence, if any
fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

#[async_trait]
impl Reasoner for OpenAiReasoner {
    fn name(&self) -> &str {
        SERVICE
    }

    async fn classify(&self, request: &ReasoningRequest) -> Result<Value> {
        debug!(model = %self.model, prompt_chars = request.prompt.len(), "Sending reasoning request");

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&self.request_body(request))
            .send()
            .await
            .map_err(|source| AdapterError::Transport {
                service: SERVICE,
                source,
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|source| AdapterError::Transport {
            service: SERVICE,
            source,
        })?;

        if !status.is_success() {
            return Err(AdapterError::Status {
                service: SERVICE,
                status: status.as_u16(),
                body: body.chars().take(500).collect(),
            }
            .into());
        }

        Ok(parse_completion(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let reasoner = OpenAiReasoner::new("sk-test", DEFAULT_MODEL);
        let body = reasoner.request_body(&ReasoningRequest::json("Classify this", 0.2));

        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "Return valid JSON only.");
        assert_eq!(body["messages"][1]["content"], "Classify this");
        assert_eq!(body["response_format"]["type"], "json_object");
        assert!((body["temperature"].as_f64().unwrap() - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_model_is_sent_as_given() {
        let reasoner = OpenAiReasoner::new("sk-test", "gpt-4o");
        assert_eq!(reasoner.model(), "gpt-4o");

        let body = reasoner.request_body(&ReasoningRequest::json("x", 0.0));
        assert_eq!(body["model"], reasoner.model());
    }

    #[test]
    fn test_custom_base_url() {
        let reasoner = OpenAiReasoner::new("k", "m").with_base_url("http://localhost:8080/v1/");
        assert_eq!(reasoner.endpoint(), "http://localhost:8080/v1/chat/completions");
    }

    #[test]
    fn test_parse_completion_object() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"{\"claims\": []}"}}]}"#;
        let value = parse_completion(body).unwrap();
        assert!(value["claims"].is_array());
    }

    #[test]
    fn test_parse_completion_fenced_content() {
        let body = r#"{"choices":[{"message":{"content":"```json\n[{\"claim_text\": \"x 1\"}]\n```"}}]}"#;
        let value = parse_completion(body).unwrap();
        assert_eq!(value[0]["claim_text"], "x 1");
    }

    #[test]
    fn test_parse_completion_rejects_prose() {
        let body = r#"{"choices":[{"message":{"content":"I think the claim is true."}}]}"#;
        let err = parse_completion(body).unwrap_err();
        assert!(matches!(err, AdapterError::Malformed { .. }));
    }

    #[test]
    fn test_parse_completion_rejects_empty_choices() {
        let err = parse_completion(r#"{"choices": []}"#).unwrap_err();
        assert!(err.to_string().contains("no message content"));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_transport_error() {
        let reasoner = OpenAiReasoner::new("k", DEFAULT_MODEL)
            .with_base_url("http://127.0.0.1:9")
            .with_timeout(Duration::from_secs(2))
            .unwrap();

        let err = reasoner
            .classify(&ReasoningRequest::json("hello", 0.0))
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AdapterError>(),
            Some(AdapterError::Transport { .. })
        ));
    }
}

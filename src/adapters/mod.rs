//! Adapter interfaces for external services.
//!
//! The pipeline depends on two capabilities: a reasoning service that turns
//! a prompt into structured JSON, and a web search service. Both are traits
//! so providers can be swapped (and faked in tests).

pub mod openai;
pub mod tavily;

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

pub use openai::OpenAiReasoner;
pub use tavily::TavilyClient;

/// System instruction sent with every reasoning request
pub const JSON_ONLY_INSTRUCTION: &str = "Return valid JSON only.";

/// A request for a structured judgment
#[derive(Debug, Clone, PartialEq)]
pub struct ReasoningRequest {
    /// System instruction
    pub system: String,

    /// User prompt
    pub prompt: String,

    /// Sampling temperature
    pub temperature: f32,
}

impl ReasoningRequest {
    /// Request strict JSON output for a prompt
    pub fn json(prompt: impl Into<String>, temperature: f32) -> Self {
        Self {
            system: JSON_ONLY_INSTRUCTION.to_string(),
            prompt: prompt.into(),
            temperature,
        }
    }
}

/// Reasoning service: maps a prompt to a structured JSON value
#[async_trait]
pub trait Reasoner: Send + Sync {
    /// Human-readable provider name
    fn name(&self) -> &str;

    /// Run the prompt and return the parsed JSON payload.
    ///
    /// Output that is not valid JSON is an error.
    async fn classify(&self, request: &ReasoningRequest) -> Result<serde_json::Value>;
}

/// Raw response from a web search service
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    /// Aggregated answer synthesized by the service
    #[serde(default)]
    pub answer: Option<String>,

    /// Individual results in ranking order
    #[serde(default)]
    pub results: Vec<SearchHit>,
}

/// One ranked search result. Fields may be missing or null.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchHit {
    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub content: Option<String>,
}

/// Web search service
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Human-readable provider name
    fn name(&self) -> &str;

    /// Search the web, asking for at most `max_results` results
    async fn search(&self, query: &str, max_results: usize) -> Result<SearchResponse>;
}

/// Failures talking to an external service
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("{service} request failed: {source}")]
    Transport {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} returned HTTP {status}: {body}")]
    Status {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("{service} returned malformed output: {detail}")]
    Malformed {
        service: &'static str,
        detail: String,
    },
}

impl AdapterError {
    /// Whether a retry could plausibly succeed
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport { .. } => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::Malformed { .. } => false,
        }
    }
}

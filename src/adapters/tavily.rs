//! Tavily web search backend.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use super::{AdapterError, SearchBackend, SearchResponse};

pub const DEFAULT_BASE_URL: &str = "https://api.tavily.com";

/// Search depth requested for every query
pub const SEARCH_DEPTH: &str = "advanced";

const SERVICE: &str = "tavily";

/// Tavily search API client
pub struct TavilyClient {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

/// Request body for POST /search
#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    search_depth: &'a str,
    include_answer: bool,
    max_results: usize,
}

impl TavilyClient {
    /// Create a client against the public API
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Bound every request by a timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build Tavily HTTP client")?;
        Ok(self)
    }

    fn api_url(&self) -> String {
        format!("{}/search", self.base_url)
    }
}

#[async_trait]
impl SearchBackend for TavilyClient {
    fn name(&self) -> &str {
        SERVICE
    }

    async fn search(&self, query: &str, max_results: usize) -> Result<SearchResponse> {
        debug!(query, max_results, "Searching the web");

        let body = SearchRequest {
            api_key: &self.api_key,
            query,
            search_depth: SEARCH_DEPTH,
            include_answer: true,
            max_results,
        };

        let response = self
            .client
            .post(self.api_url())
            .json(&body)
            .send()
            .await
            .map_err(|source| AdapterError::Transport {
                service: SERVICE,
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AdapterError::Status {
                service: SERVICE,
                status: status.as_u16(),
                body: text.chars().take(500).collect(),
            }
            .into());
        }

        let parsed = response
            .json::<SearchResponse>()
            .await
            .map_err(|e| AdapterError::Malformed {
                service: SERVICE,
                detail: e.to_string(),
            })?;

        Ok(parsed)
    }
}

//! Evidence retrieval.
//!
//! Wraps a [`SearchBackend`] and turns its response into ordered evidence
//! items. Failures are logged and reported as "no evidence"; callers never
//! see the underlying error.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, instrument, warn};

use crate::adapters::{SearchBackend, SearchResponse};
use crate::domain::EvidenceItem;

use super::retry::RetryPolicy;

pub const DEFAULT_MAX_RESULTS: usize = 5;
pub const DEFAULT_SEARCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Retrieves web evidence for a query
pub struct EvidenceRetriever {
    backend: Arc<dyn SearchBackend>,
    max_results: usize,
    timeout: Duration,
    retry: RetryPolicy,
}

impl EvidenceRetriever {
    pub fn new(backend: Arc<dyn SearchBackend>) -> Self {
        Self {
            backend,
            max_results: DEFAULT_MAX_RESULTS,
            timeout: DEFAULT_SEARCH_TIMEOUT,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn max_results(&self) -> usize {
        self.max_results
    }

    /// Search with the configured result limit
    pub async fn search(&self, query: &str) -> Vec<EvidenceItem> {
        self.search_with_limit(query, self.max_results).await
    }

    /// Search for evidence. Returns an empty vector on any failure.
    #[instrument(skip(self), fields(backend = self.backend.name()))]
    pub async fn search_with_limit(&self, query: &str, max_results: usize) -> Vec<EvidenceItem> {
        let backend = &self.backend;

        let result = self
            .retry
            .run("web search", self.timeout, move || backend.search(query, max_results))
            .await;

        match result {
            Ok(response) => {
                let evidence = evidence_from_response(response, max_results);
                debug!(items = evidence.len(), "Evidence retrieved");
                evidence
            }
            Err(e) => {
                warn!(error = %e, "Web search failed, treating as no evidence");
                Vec::new()
            }
        }
    }
}

/// Map a search response to evidence items.
///
/// A non-empty aggregated answer comes first (verbatim, even if only
/// whitespace); the remaining items keep the
/// backend's ranking and are capped at `max_results`.
pub fn evidence_from_response(response: SearchResponse, max_results: usize) -> Vec<EvidenceItem> {
    let mut evidence: Vec<EvidenceItem> = Vec::with_capacity(response.results.len() + 1);

    if let Some(answer) = response.answer.filter(|a| !a.is_empty()) {
        evidence.push(EvidenceItem::summary(answer));
    }

    evidence.extend(response.results.into_iter().take(max_results).map(|hit| {
        EvidenceItem::new(
            hit.title.unwrap_or_default(),
            hit.url.unwrap_or_default(),
            hit.content.unwrap_or_default(),
        )
    }));

    evidence
}

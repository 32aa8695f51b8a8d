//! Claim extraction.
//!
//! Asks the reasoning service for a structured claim list. When that yields
//! nothing (service failure, malformed output, or an honest empty answer),
//! every digit-bearing line of the input becomes a claim instead, so
//! extraction never fails closed on text that contains figures.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::adapters::{Reasoner, ReasoningRequest};
use crate::domain::{Claim, DEFAULT_CLAIM_TYPE};

use super::prompts;
use super::retry::RetryPolicy;

pub const DEFAULT_MAX_INPUT_CHARS: usize = 8000;
pub const DEFAULT_MAX_CLAIMS: usize = 20;
pub const EXTRACTION_TEMPERATURE: f32 = 0.3;
pub const DEFAULT_REASONING_TIMEOUT: Duration = Duration::from_secs(60);

/// Extracts candidate claims from document text
pub struct ClaimExtractor {
    reasoner: Arc<dyn Reasoner>,
    max_input_chars: usize,
    max_claims: usize,
    temperature: f32,
    timeout: Duration,
    retry: RetryPolicy,
}

impl ClaimExtractor {
    pub fn new(reasoner: Arc<dyn Reasoner>) -> Self {
        Self {
            reasoner,
            max_input_chars: DEFAULT_MAX_INPUT_CHARS,
            max_claims: DEFAULT_MAX_CLAIMS,
            temperature: EXTRACTION_TEMPERATURE,
            timeout: DEFAULT_REASONING_TIMEOUT,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_max_input_chars(mut self, max_input_chars: usize) -> Self {
        self.max_input_chars = max_input_chars;
        self
    }

    pub fn with_max_claims(mut self, max_claims: usize) -> Self {
        self.max_claims = max_claims;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
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

    /// Extract up to `max_claims` claims, in document order
    #[instrument(skip_all, fields(chars = text.chars().count()))]
    pub async fn extract(&self, text: &str) -> Vec<Claim> {
        let mut claims = self.extract_with_reasoner(text).await;

        if claims.is_empty() {
            claims = fallback_claims(text);
            warn!(
                claims = claims.len(),
                "Reasoning service returned no claims, using line heuristic"
            );
        }

        claims.truncate(self.max_claims);
        debug!(claims = claims.len(), "Extraction finished");
        claims
    }

    async fn extract_with_reasoner(&self, text: &str) -> Vec<Claim> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        let request = ReasoningRequest::json(
            prompts::extraction_prompt(prompts::truncate_chars(text, self.max_input_chars)),
            self.temperature,
        );
        let reasoner = &self.reasoner;
        let request = &request;

        match self
            .retry
            .run("claim extraction", self.timeout, move || reasoner.classify(request))
            .await
        {
            Ok(value) => parse_claims(&value),
            Err(e) => {
                warn!(error = %e, "Claim extraction request failed");
                Vec::new()
            }
        }
    }
}

/// Read claims from the reasoning service's payload.
///
/// Accepts a bare list or an object with a `claims` list. Entries without a
/// usable `claim_text` are skipped.
pub fn parse_claims(value: &Value) -> Vec<Claim> {
    let entries = match value {
        Value::Array(items) => items.as_slice(),
        Value::Object(map) => match map.get("claims") {
            Some(Value::Array(items)) => items.as_slice(),
            _ => return Vec::new(),
        },
        _ => return Vec::new(),
    };

    entries.iter().filter_map(claim_from_entry).collect()
}

fn claim_from_entry(entry: &Value) -> Option<Claim> {
    let obj = entry.as_object()?;

    let claim_text = obj.get("claim_text")?.as_str()?.trim();
    if claim_text.is_empty() {
        return None;
    }

    let claim_type = obj
        .get("claim_type")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(DEFAULT_CLAIM_TYPE);

    let key_entities = obj
        .get("key_entities")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(|e| e.trim().to_string())
                .filter(|e| !e.is_empty())
                .collect()
        })
        .unwrap_or_default();

    Some(
        Claim::new(claim_text)
            .with_type(claim_type)
            .with_entities(key_entities),
    )
}

/// One general claim per line that contains a numeric character (any script)
pub fn fallback_claims(text: &str) -> Vec<Claim> {
    text.lines()
        .filter(|line| line.chars().any(char::is_numeric))
        .map(|line| Claim::new(line.trim()))
        .collect()
}

//! Verdict classification.
//!
//! `verify` moves a claim through three stages:
//! searching, then reasoning (or the keyword fallback when reasoning fails),
//! then classified. A claim with no evidence is `False` without consulting
//! the reasoning service.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::adapters::{Reasoner, ReasoningRequest};
use crate::domain::{Claim, EvidenceItem, VerificationStatus, VerifiedClaim};

use super::extractor::DEFAULT_REASONING_TIMEOUT;
use super::prompts;
use super::retriever::EvidenceRetriever;
use super::retry::RetryPolicy;

pub const NO_EVIDENCE_EXPLANATION: &str = "No reliable sources found to support the claim.";

pub const REASONING_UNAVAILABLE_EXPLANATION: &str =
    "Verification based on live web sources. Automated reasoning was unavailable.";

/// Claims mentioning these are treated as well documented when reasoning fails
pub const HIGH_CONFIDENCE_KEYWORDS: [&str; 5] =
    ["founded", "released", "population", "height", "all-time high"];

pub const DEFAULT_EVIDENCE_SNIPPETS: usize = 3;
pub const DEFAULT_SNIPPET_CHARS: usize = 500;
pub const VERIFICATION_TEMPERATURE: f32 = 0.2;

/// Verdict fields read from the reasoning service's answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedVerdict {
    pub status: VerificationStatus,
    pub explanation: String,
    pub corrected_value: Option<String>,
}

/// Classifies claims against retrieved web evidence
pub struct VerdictClassifier {
    retriever: EvidenceRetriever,
    reasoner: Arc<dyn Reasoner>,
    evidence_snippets: usize,
    snippet_chars: usize,
    temperature: f32,
    timeout: Duration,
    retry: RetryPolicy,
}

impl VerdictClassifier {
    pub fn new(retriever: EvidenceRetriever, reasoner: Arc<dyn Reasoner>) -> Self {
        Self {
            retriever,
            reasoner,
            evidence_snippets: DEFAULT_EVIDENCE_SNIPPETS,
            snippet_chars: DEFAULT_SNIPPET_CHARS,
            temperature: VERIFICATION_TEMPERATURE,
            timeout: DEFAULT_REASONING_TIMEOUT,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_evidence_snippets(mut self, evidence_snippets: usize) -> Self {
        self.evidence_snippets = evidence_snippets;
        self
    }

    pub fn with_snippet_chars(mut self, snippet_chars: usize) -> Self {
        self.snippet_chars = snippet_chars;
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

    pub fn retriever(&self) -> &EvidenceRetriever {
        &self.retriever
    }

    /// Verify a single claim. Always returns a complete record.
    #[instrument(skip_all, fields(claim = %claim.preview(50)))]
    pub async fn verify(&self, claim: &Claim) -> VerifiedClaim {
        debug!(
            stage = "searching",
            max_results = self.retriever.max_results(),
            "Retrieving evidence"
        );
        let sources = self.retriever.search(&claim.search_query()).await;

        if sources.is_empty() {
            debug!(stage = "no_evidence", "No evidence found");
            return VerifiedClaim::from_claim(
                claim,
                VerificationStatus::False,
                NO_EVIDENCE_EXPLANATION,
                Vec::new(),
            );
        }

        debug!(stage = "reasoning", sources = sources.len(), "Classifying claim");
        match self.reason(&claim.claim_text, &sources).await {
            Ok(verdict) => {
                debug!(stage = "classified", status = %verdict.status, "Claim classified");
                VerifiedClaim::from_claim(claim, verdict.status, verdict.explanation, sources)
                    .with_corrected_value(verdict.corrected_value)
            }
            Err(e) => {
                let status = fallback_status(&claim.claim_text);
                warn!(
                    stage = "reasoning_failed",
                    error = %format!("{:#}", e),
                    status = %status,
                    "Reasoning unavailable, using keyword heuristic"
                );
                VerifiedClaim::from_claim(claim, status, REASONING_UNAVAILABLE_EXPLANATION, sources)
            }
        }
    }

    async fn reason(&self, claim_text: &str, sources: &[EvidenceItem]) -> Result<ParsedVerdict> {
        let blocks = prompts::evidence_blocks(sources, self.evidence_snippets, self.snippet_chars);
        let request = ReasoningRequest::json(
            prompts::verification_prompt(claim_text, &blocks),
            self.temperature,
        );
        let reasoner = &self.reasoner;
        let request = &request;

        let value = self
            .retry
            .run("claim verification", self.timeout, move || reasoner.classify(request))
            .await?;

        parse_verdict(&value)
    }
}

/// Read a verdict object.
///
/// Missing or unknown statuses become `Inaccurate`. A payload that is not an
/// object is an error.
pub fn parse_verdict(value: &Value) -> Result<ParsedVerdict> {
    let obj = value
        .as_object()
        .with_context(|| format!("expected a verdict object, got {}", json_kind(value)))?;

    let status = obj
        .get("verification_status")
        .and_then(Value::as_str)
        .and_then(VerificationStatus::parse)
        .unwrap_or(VerificationStatus::Inaccurate);

    let explanation = obj
        .get("explanation")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .trim()
        .to_string();

    let corrected_value = match status {
        VerificationStatus::Inaccurate => obj
            .get("corrected_value")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string),
        _ => None,
    };

    Ok(ParsedVerdict {
        status,
        explanation,
        corrected_value,
    })
}

/// Status used when the reasoning service cannot be consulted
pub fn fallback_status(claim_text: &str) -> VerificationStatus {
    let lowered = claim_text.to_lowercase();
    if HIGH_CONFIDENCE_KEYWORDS.iter().any(|k| lowered.contains(k)) {
        VerificationStatus::Verified
    } else {
        VerificationStatus::Inaccurate
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

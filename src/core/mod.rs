//! Core claim-checking logic.
//!
//! This module contains:
//! - Extractor: document text to claims, with a line heuristic fallback
//! - Retriever: web evidence for a claim
//! - Classifier: claim plus evidence to a verdict, with a keyword fallback
//! - Orchestrator: runs a whole document through the pipeline
//! - Retry and Safety: outbound call policy and input limits

pub mod classifier;
pub mod extractor;
pub mod orchestrator;
pub mod prompts;
pub mod retriever;
pub mod retry;
pub mod safety;

// Re-export commonly used types
pub use classifier::{fallback_status, parse_verdict, ParsedVerdict, VerdictClassifier};
pub use extractor::{fallback_claims, parse_claims, ClaimExtractor};
pub use orchestrator::Orchestrator;
pub use retriever::{evidence_from_response, EvidenceRetriever};
pub use retry::RetryPolicy;
pub use safety::{SafetyLimits, SafetyViolation};

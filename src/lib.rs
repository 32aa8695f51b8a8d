//! factcheck - claim extraction and verification against live web sources
//!
//! Pulls checkable factual claims out of a document, retrieves web evidence
//! for each one, and classifies every claim as Verified, Inaccurate or False.
//!
//! # Architecture
//!
//! The pipeline degrades instead of failing:
//! - Extraction falls back to a line heuristic when the reasoning service is unusable
//! - A claim without evidence is False without consulting the reasoning service
//! - Verification falls back to a keyword heuristic when reasoning fails
//!
//! # Modules
//!
//! - `adapters`: Reasoning and web-search services (OpenAI, Tavily)
//! - `core`: Extraction, retrieval, classification and orchestration
//! - `domain`: Data structures (Claim, VerifiedClaim, DocumentResult)
//! - `config`: Layered configuration
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Check a document
//! factcheck check --input report.txt
//!
//! # Verify a single claim
//! factcheck verify "The Eiffel Tower was built in 1887" --entity "Eiffel Tower"
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;

// Re-export main types at crate root for convenience
pub use adapters::{Reasoner, SearchBackend};
pub use core::Orchestrator;
pub use domain::{
    Claim, DocumentResult, EventType, EvidenceItem, ProgressEvent, Statistics, VerificationStatus,
    VerifiedClaim,
};

//! Domain types for the fact-checking pipeline.
//!
//! This module contains the core data structures:
//! - Claim: Extracted statements, evidence and verdicts
//! - Report: Document-level results and statistics
//! - Events: Progress notifications for a run

pub mod claim;
pub mod events;
pub mod report;

// Re-export commonly used types
pub use claim::{Claim, EvidenceItem, VerificationStatus, VerifiedClaim, DEFAULT_CLAIM_TYPE, SUMMARY_TITLE};
pub use events::{EventType, ProgressEvent};
pub use report::{source_digest, DocumentResult, Statistics, NO_CLAIMS_SUMMARY};

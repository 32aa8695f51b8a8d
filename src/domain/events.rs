//! Progress events emitted while a document is being checked.
//!
//! Events are delivered over a channel so callers can report per-claim
//! progress without the pipeline knowing anything about the UI.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::claim::VerificationStatus;
use super::report::Statistics;

/// A single progress notification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressEvent {
    /// Unique identifier for this event
    pub id: Uuid,

    /// When this event occurred
    pub timestamp: DateTime<Utc>,

    /// The run this event belongs to
    pub run_id: Uuid,

    /// Type of event
    pub event_type: EventType,

    /// Zero-based claim index (claim-level events only)
    pub claim_index: Option<usize>,

    /// Number of claims in the run, once known
    pub total_claims: Option<usize>,

    /// Human-readable summary
    pub payload_summary: String,

    /// Verdict (for `ClaimVerified`)
    pub status: Option<VerificationStatus>,

    /// Final counts (for `RunCompleted`)
    pub statistics: Option<Statistics>,

    /// Time taken in milliseconds
    pub duration_ms: Option<u64>,

    /// Error message if failed
    pub error: Option<String>,
}

impl ProgressEvent {
    /// Create a new event with the current timestamp
    pub fn new(run_id: Uuid, event_type: EventType, payload_summary: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            run_id,
            event_type,
            claim_index: None,
            total_claims: None,
            payload_summary: payload_summary.into(),
            status: None,
            statistics: None,
            duration_ms: None,
            error: None,
        }
    }

    pub fn with_claim(mut self, claim_index: usize, total_claims: usize) -> Self {
        self.claim_index = Some(claim_index);
        self.total_claims = Some(total_claims);
        self
    }

    pub fn with_total(mut self, total_claims: usize) -> Self {
        self.total_claims = Some(total_claims);
        self
    }

    pub fn with_status(mut self, status: VerificationStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_statistics(mut self, statistics: Statistics) -> Self {
        self.statistics = Some(statistics);
        self
    }

    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    pub fn with_error(mut self, error: String) -> Self {
        self.error = Some(error);
        self
    }

    /// Fraction of claims finished, if this is a claim-level event
    pub fn progress(&self) -> Option<f64> {
        match (self.claim_index, self.total_claims) {
            (Some(index), Some(total)) if total > 0 => Some((index + 1) as f64 / total as f64),
            _ => None,
        }
    }
}

/// Types of progress events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    /// Extraction is about to start
    RunStarted,

    /// Extraction finished
    ClaimsExtracted,

    /// Verification of one claim started
    ClaimStarted,

    /// One claim received a verdict
    ClaimVerified,

    /// Verification of one claim crashed; a `False` record was substituted
    ClaimFailed,

    /// The document result is ready
    RunCompleted,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization() {
        let event = ProgressEvent::new(Uuid::new_v4(), EventType::ClaimVerified, "Verified claim 1/2")
            .with_claim(0, 2)
            .with_status(VerificationStatus::Verified)
            .with_duration(120);

        let json = serde_json::to_string(&event).unwrap();
        let parsed: ProgressEvent = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.event_type, EventType::ClaimVerified);
        assert_eq!(parsed.status, Some(VerificationStatus::Verified));
        assert_eq!(parsed.duration_ms, Some(120));
        assert!(json.contains("\"claim_verified\""));
    }

    #[test]
    fn test_progress_fraction() {
        let run_id = Uuid::new_v4();
        let event = ProgressEvent::new(run_id, EventType::ClaimVerified, "").with_claim(1, 4);
        assert_eq!(event.progress(), Some(0.5));

        let start = ProgressEvent::new(run_id, EventType::RunStarted, "");
        assert_eq!(start.progress(), None);

        let empty = ProgressEvent::new(run_id, EventType::ClaimsExtracted, "").with_claim(0, 0);
        assert_eq!(empty.progress(), None);
    }

    #[test]
    fn test_event_with_error() {
        let event = ProgressEvent::new(Uuid::new_v4(), EventType::ClaimFailed, "Claim 3 failed")
            .with_error("task panicked".to_string());

        assert_eq!(event.error, Some("task panicked".to_string()));
    }
}

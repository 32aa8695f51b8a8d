//! Document-level results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use super::claim::{VerificationStatus, VerifiedClaim};

/// Summary used when extraction produced nothing to verify
pub const NO_CLAIMS_SUMMARY: &str = "No claims extracted.";

/// Verdict counts for one document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
    pub total: usize,
    pub verified: usize,
    pub inaccurate: usize,
    #[serde(rename = "false")]
    pub false_count: usize,
}

impl Statistics {
    /// Count verdicts across a set of verified claims
    pub fn from_claims(claims: &[VerifiedClaim]) -> Self {
        let mut stats = Self {
            total: claims.len(),
            ..Default::default()
        };

        for claim in claims {
            match claim.verification_status {
                VerificationStatus::Verified => stats.verified += 1,
                VerificationStatus::Inaccurate => stats.inaccurate += 1,
                VerificationStatus::False => stats.false_count += 1,
            }
        }

        stats
    }

    pub fn count(&self, status: VerificationStatus) -> usize {
        match status {
            VerificationStatus::Verified => self.verified,
            VerificationStatus::Inaccurate => self.inaccurate,
            VerificationStatus::False => self.false_count,
        }
    }

    /// Per-status counts add up to the total
    pub fn is_consistent(&self) -> bool {
        self.verified + self.inaccurate + self.false_count == self.total
    }

    pub fn summary_sentence(&self) -> String {
        format!(
            "Analyzed {} claims: {} verified, {} inaccurate, {} false.",
            self.total, self.verified, self.inaccurate, self.false_count
        )
    }
}

/// The outcome of one pipeline run over a document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentResult {
    /// Identifier of the run that produced this result
    pub run_id: Uuid,

    /// When the run finished
    pub checked_at: DateTime<Utc>,

    /// Short SHA256 digest of the input text
    pub source_digest: String,

    /// Verified claims in extraction order
    pub claims: Vec<VerifiedClaim>,

    pub summary: String,

    pub statistics: Statistics,
}

impl DocumentResult {
    /// Build a result from verified claims, computing statistics and summary
    pub fn from_claims(run_id: Uuid, source_digest: String, claims: Vec<VerifiedClaim>) -> Self {
        if claims.is_empty() {
            return Self::no_claims(run_id, source_digest);
        }

        let statistics = Statistics::from_claims(&claims);
        Self {
            run_id,
            checked_at: Utc::now(),
            source_digest,
            summary: statistics.summary_sentence(),
            claims,
            statistics,
        }
    }

    /// Result for a document where no claims were found
    pub fn no_claims(run_id: Uuid, source_digest: String) -> Self {
        Self {
            run_id,
            checked_at: Utc::now(),
            source_digest,
            claims: Vec::new(),
            summary: NO_CLAIMS_SUMMARY.to_string(),
            statistics: Statistics::default(),
        }
    }

    pub fn has_claims(&self) -> bool {
        !self.claims.is_empty()
    }
}

/// Digest of input text (first 16 hex chars of SHA256)
pub fn source_digest(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let result = hasher.finalize();
    hex::encode(&result[..8])
}

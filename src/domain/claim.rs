//! Claims, evidence items and verdicts.
//!
//! A [`Claim`] is produced by extraction and never changes afterwards.
//! Verification derives a new [`VerifiedClaim`] from it.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Category assigned when the extractor does not provide one
pub const DEFAULT_CLAIM_TYPE: &str = "general";

/// Title of the synthetic evidence item built from the search answer
pub const SUMMARY_TITLE: &str = "Tavily Summary";

fn default_claim_type() -> String {
    DEFAULT_CLAIM_TYPE.to_string()
}

/// A candidate factual statement extracted from a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    /// The statement itself (never empty)
    pub claim_text: String,

    /// Free-form category label
    #[serde(default = "default_claim_type")]
    pub claim_type: String,

    /// Named entities mentioned by the claim, in extraction order
    #[serde(default)]
    pub key_entities: Vec<String>,
}

impl Claim {
    /// Create a general claim with no entities
    pub fn new(claim_text: impl Into<String>) -> Self {
        Self {
            claim_text: claim_text.into(),
            claim_type: default_claim_type(),
            key_entities: Vec::new(),
        }
    }

    pub fn with_type(mut self, claim_type: impl Into<String>) -> Self {
        self.claim_type = claim_type.into();
        self
    }

    pub fn with_entities(mut self, key_entities: Vec<String>) -> Self {
        self.key_entities = key_entities;
        self
    }

    /// Web search query for this claim.
    ///
    /// Entities are appended after the claim text to narrow retrieval.
    pub fn search_query(&self) -> String {
        let entities: Vec<&str> = self
            .key_entities
            .iter()
            .map(|e| e.trim())
            .filter(|e| !e.is_empty())
            .collect();

        if entities.is_empty() {
            self.claim_text.clone()
        } else {
            format!("{} {}", self.claim_text, entities.join(" "))
        }
    }

    /// Short single-line preview for progress output
    pub fn preview(&self, max_chars: usize) -> String {
        let mut chars = self.claim_text.chars();
        let head: String = chars.by_ref().take(max_chars).collect();
        if chars.next().is_some() {
            format!("{}...", head)
        } else {
            head
        }
    }
}

/// Outcome of verifying a claim against evidence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VerificationStatus {
    /// Sources clearly confirm the claim
    Verified,

    /// Topic confirmed but values, dates or details differ
    Inaccurate,

    /// Contradicted outright or unsupported
    False,
}

impl VerificationStatus {
    pub const ALL: [VerificationStatus; 3] = [Self::Verified, Self::Inaccurate, Self::False];

    /// Parse a verdict label, ignoring case and surrounding whitespace
    pub fn parse(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(label))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Verified => "Verified",
            Self::Inaccurate => "Inaccurate",
            Self::False => "False",
        }
    }
}

impl fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single piece of retrieved web content
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceItem {
    #[serde(default)]
    pub title: String,

    /// Empty for synthetic summary items
    #[serde(default)]
    pub url: String,

    #[serde(default)]
    pub content: String,
}

impl EvidenceItem {
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            content: content.into(),
        }
    }

    /// Synthetic item carrying the search service's aggregated answer
    pub fn summary(answer: impl Into<String>) -> Self {
        Self::new(SUMMARY_TITLE, "", answer)
    }

    pub fn is_summary(&self) -> bool {
        self.title == SUMMARY_TITLE && self.url.is_empty()
    }
}

/// A claim together with its verdict and supporting evidence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedClaim {
    #[serde(flatten)]
    pub claim: Claim,

    pub verification_status: VerificationStatus,

    pub explanation: String,

    /// Only meaningful for `Inaccurate` verdicts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corrected_value: Option<String>,

    /// Evidence used for the verdict (empty when none was found)
    #[serde(default)]
    pub sources: Vec<EvidenceItem>,
}

impl VerifiedClaim {
    /// Derive a verified record from a claim
    pub fn from_claim(
        claim: &Claim,
        verification_status: VerificationStatus,
        explanation: impl Into<String>,
        sources: Vec<EvidenceItem>,
    ) -> Self {
        Self {
            claim: claim.clone(),
            verification_status,
            explanation: explanation.into(),
            corrected_value: None,
            sources,
        }
    }

    /// Attach a corrected value. Dropped unless the verdict is `Inaccurate`.
    pub fn with_corrected_value(mut self, corrected_value: Option<String>) -> Self {
        self.corrected_value = match self.verification_status {
            VerificationStatus::Inaccurate => corrected_value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            _ => None,
        };
        self
    }

    pub fn claim_text(&self) -> &str {
        &self.claim.claim_text
    }
}

//! Main orchestrator for document checks.
//!
//! Runs extraction once, then verifies every claim on a bounded task pool.
//! Results are collected by claim index, so the output order always matches
//! extraction order regardless of which verification finishes first.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::Semaphore;
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::adapters::{OpenAiReasoner, Reasoner, SearchBackend, TavilyClient};
use crate::config::ResolvedConfig;
use crate::domain::{
    source_digest, Claim, DocumentResult, EventType, EvidenceItem, ProgressEvent, VerificationStatus,
    VerifiedClaim,
};

use super::classifier::VerdictClassifier;
use super::extractor::ClaimExtractor;
use super::retriever::EvidenceRetriever;

/// Characters of claim text shown in progress events
pub const PREVIEW_CHARS: usize = 50;

/// Main pipeline orchestrator
pub struct Orchestrator {
    extractor: Arc<ClaimExtractor>,
    classifier: Arc<VerdictClassifier>,
    concurrency: usize,
}

impl Orchestrator {
    /// Create an orchestrator that verifies claims sequentially
    pub fn new(extractor: ClaimExtractor, classifier: VerdictClassifier) -> Self {
        Self {
            extractor: Arc::new(extractor),
            classifier: Arc::new(classifier),
            concurrency: 1,
        }
    }

    /// Wire the pipeline around the given services using configured limits
    pub fn from_services(
        reasoner: Arc<dyn Reasoner>,
        search: Arc<dyn SearchBackend>,
        config: &ResolvedConfig,
    ) -> Self {
        let retry = config.pipeline.retry_policy.clone();
        let reasoning_timeout = Duration::from_secs(config.reasoning.timeout_seconds);

        let extractor = ClaimExtractor::new(Arc::clone(&reasoner))
            .with_max_input_chars(config.pipeline.max_input_chars)
            .with_max_claims(config.pipeline.max_claims)
            .with_temperature(config.reasoning.extraction_temperature)
            .with_timeout(reasoning_timeout)
            .with_retry(retry.clone());

        let retriever = EvidenceRetriever::new(search)
            .with_max_results(config.search.max_results)
            .with_timeout(Duration::from_secs(config.search.timeout_seconds))
            .with_retry(retry.clone());

        let classifier = VerdictClassifier::new(retriever, reasoner)
            .with_evidence_snippets(config.pipeline.evidence_snippets)
            .with_snippet_chars(config.pipeline.snippet_chars)
            .with_temperature(config.reasoning.verification_temperature)
            .with_timeout(reasoning_timeout)
            .with_retry(retry);

        Self::new(extractor, classifier).with_concurrency(config.pipeline.concurrency)
    }

    /// Build the production pipeline (OpenAI + Tavily). Fails if a key is missing.
    pub fn from_config(config: &ResolvedConfig) -> Result<Self> {
        let reasoner = OpenAiReasoner::new(config.require_openai_key()?, &config.reasoning.model)
            .with_base_url(&config.reasoning.base_url)
            .with_timeout(Duration::from_secs(config.reasoning.timeout_seconds))?;

        let search = TavilyClient::new(config.require_tavily_key()?)
            .with_base_url(&config.search.base_url)
            .with_timeout(Duration::from_secs(config.search.timeout_seconds))?;

        info!(
            model = reasoner.model(),
            search = search.name(),
            "Using production services"
        );

        Ok(Self::from_services(
            Arc::new(reasoner),
            Arc::new(search),
            config,
        ))
    }

    /// Number of claims verified at the same time, clamped to
    /// `1..=Semaphore::MAX_PERMITS`
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.clamp(1, Semaphore::MAX_PERMITS);
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Extract claims without verifying them
    pub async fn extract(&self, text: &str) -> Vec<Claim> {
        self.extractor.extract(text).await
    }

    /// Verify a single claim
    pub async fn verify(&self, claim: &Claim) -> VerifiedClaim {
        self.classifier.verify(claim).await
    }

    /// Retrieve evidence for a free-form query
    pub async fn search(&self, query: &str) -> Vec<EvidenceItem> {
        self.classifier.retriever().search(query).await
    }

    /// Check a document
    pub async fn process(&self, text: &str) -> DocumentResult {
        self.run(text, None).await
    }

    /// Check a document, reporting progress on `events`.
    ///
    /// A closed receiver does not stop the run.
    pub async fn process_with_progress(
        &self,
        text: &str,
        events: UnboundedSender<ProgressEvent>,
    ) -> DocumentResult {
        self.run(text, Some(events)).await
    }

    #[instrument(skip_all, fields(concurrency = self.concurrency))]
    async fn run(&self, text: &str, events: Option<UnboundedSender<ProgressEvent>>) -> DocumentResult {
        let run_id = Uuid::new_v4();
        let started = Instant::now();
        let digest = source_digest(text);
        info!(%run_id, digest = %digest, "Starting document check");

        emit(
            &events,
            ProgressEvent::new(run_id, EventType::RunStarted, "Extracting claims"),
        );

        let claims = self.extractor.extract(text).await;
        let total = claims.len();
        info!(%run_id, claims = total, "Claims extracted");

        emit(
            &events,
            ProgressEvent::new(
                run_id,
                EventType::ClaimsExtracted,
                format!("Extracted {} claims", total),
            )
            .with_total(total),
        );

        let verified = self.verify_all(run_id, claims, &events).await;
        let result = DocumentResult::from_claims(run_id, digest, verified);

        let duration_ms = started.elapsed().as_millis() as u64;
        info!(%run_id, duration_ms, summary = %result.summary, "Document check complete");

        emit(
            &events,
            ProgressEvent::new(run_id, EventType::RunCompleted, result.summary.clone())
                .with_total(total)
                .with_statistics(result.statistics)
                .with_duration(duration_ms),
        );

        result
    }

    async fn verify_all(
        &self,
        run_id: Uuid,
        claims: Vec<Claim>,
        events: &Option<UnboundedSender<ProgressEvent>>,
    ) -> Vec<VerifiedClaim> {
        let total = claims.len();
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut handles = Vec::with_capacity(total);

        for (index, claim) in claims.iter().cloned().enumerate() {
            let classifier = Arc::clone(&self.classifier);
            let semaphore = Arc::clone(&semaphore);
            let events = events.clone();

            handles.push(tokio::spawn(async move {
                // Never closed
                let _permit = semaphore.acquire_owned().await.ok();

                emit(
                    &events,
                    ProgressEvent::new(run_id, EventType::ClaimStarted, claim.preview(PREVIEW_CHARS))
                        .with_claim(index, total),
                );

                let started = Instant::now();
                let verified = classifier.verify(&claim).await;
                (verified, started.elapsed().as_millis() as u64)
            }));
        }

        let mut results = Vec::with_capacity(total);

        for (index, (claim, handle)) in claims.iter().zip(handles).enumerate() {
            let preview = claim.preview(PREVIEW_CHARS);

            match handle.await {
                Ok((verified, duration_ms)) => {
                    emit(
                        events,
                        ProgressEvent::new(run_id, EventType::ClaimVerified, preview)
                            .with_claim(index, total)
                            .with_status(verified.verification_status)
                            .with_duration(duration_ms),
                    );
                    results.push(verified);
                }
                Err(e) => {
                    error!(%run_id, index, error = %e, "Claim verification task failed");
                    let record = crash_record(claim, &e.to_string());

                    emit(
                        events,
                        ProgressEvent::new(run_id, EventType::ClaimFailed, preview)
                            .with_claim(index, total)
                            .with_status(record.verification_status)
                            .with_error(e.to_string()),
                    );
                    results.push(record);
                }
            }
        }

        results
    }
}

/// Record substituted for a claim whose verification crashed
pub fn crash_record(claim: &Claim, error: &str) -> VerifiedClaim {
    VerifiedClaim::from_claim(
        claim,
        VerificationStatus::False,
        format!("Verification failed: {}", error),
        Vec::new(),
    )
}

fn emit(events: &Option<UnboundedSender<ProgressEvent>>, event: ProgressEvent) {
    if let Some(tx) = events {
        // Receiver may have been dropped; progress is best-effort
        let _ = tx.send(event);
    }
}

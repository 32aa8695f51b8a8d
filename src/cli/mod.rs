//! Command-line interface for factcheck.
//!
//! Provides commands for checking a whole document, running extraction or
//! verification on their own, querying the search backend, and showing the
//! resolved configuration.

use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tokio::sync::mpsc;

use crate::config::{self, ResolvedConfig};
use crate::core::{Orchestrator, SafetyLimits};
use crate::domain::{Claim, DocumentResult, EventType, ProgressEvent};

/// factcheck - verify factual claims in a document against live web sources
#[derive(Parser, Debug)]
#[command(name = "factcheck")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract and verify every claim in a document
    Check {
        /// Input file (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Print the full result as JSON
        #[arg(long)]
        json: bool,

        /// Also write the JSON result to this file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Claims verified at the same time (overrides config)
        #[arg(short, long)]
        concurrency: Option<usize>,
    },

    /// Extract claims without verifying them
    Extract {
        /// Input file (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Verify a single claim
    Verify {
        /// Claim text
        claim: String,

        /// Key entity to narrow the search (repeatable)
        #[arg(short, long = "entity")]
        entities: Vec<String>,
    },

    /// Search the web for evidence
    Search {
        /// Search query
        query: String,

        /// Maximum number of results
        #[arg(short, long, default_value = "5")]
        max_results: usize,
    },

    /// Show resolved configuration (debug)
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Check {
                input,
                json,
                output,
                concurrency,
            } => check_document(input, json, output, concurrency).await,
            Commands::Extract { input } => extract_claims(input).await,
            Commands::Verify { claim, entities } => verify_claim(claim, entities).await,
            Commands::Search { query, max_results } => search_evidence(&query, max_results).await,
            Commands::Config => show_config(),
        }
    }
}

/// Run the full pipeline over a document
async fn check_document(
    input_file: Option<PathBuf>,
    json: bool,
    output: Option<PathBuf>,
    concurrency: Option<usize>,
) -> Result<()> {
    let cfg = config::config()?;
    let input = read_input(input_file.as_deref(), &cfg.safety)?;

    let mut orchestrator = Orchestrator::from_config(cfg)?;
    if let Some(concurrency) = concurrency {
        orchestrator = orchestrator.with_concurrency(concurrency);
    }

    let (tx, mut rx) = mpsc::unbounded_channel();
    let reporter = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            report_progress(&event);
        }
    });

    let result = orchestrator.process_with_progress(&input, tx).await;
    // The sender was moved into the run and dropped with it, so this ends
    reporter.await.context("Progress reporter failed")?;

    if let Some(path) = output {
        write_json(&path, &result)?;
        eprintln!("Result written to {}", path.display());
    }

    if json {
        println!("{}", to_json(&result)?);
    } else {
        print_result(&result);
    }

    Ok(())
}

/// Extract claims and print them as JSON
async fn extract_claims(input_file: Option<PathBuf>) -> Result<()> {
    let cfg = config::config()?;
    let input = read_input(input_file.as_deref(), &cfg.safety)?;

    let orchestrator = Orchestrator::from_config(cfg)?;
    let claims = orchestrator.extract(&input).await;

    println!("{}", to_json(&claims)?);
    Ok(())
}

/// Verify one claim and print the record as JSON
async fn verify_claim(claim_text: String, entities: Vec<String>) -> Result<()> {
    if claim_text.trim().is_empty() {
        anyhow::bail!("Claim text is empty");
    }

    let cfg = config::config()?;
    let orchestrator = Orchestrator::from_config(cfg)?;

    let claim = Claim::new(claim_text.trim()).with_entities(entities);
    let verified = orchestrator.verify(&claim).await;

    println!("{}", to_json(&verified)?);
    Ok(())
}

/// Query the search backend directly
async fn search_evidence(query: &str, max_results: usize) -> Result<()> {
    let cfg = config::config()?;

    let mut cfg = cfg.clone();
    cfg.search.max_results = max_results;
    let orchestrator = Orchestrator::from_config(&cfg)?;

    let evidence = orchestrator.search(query).await;
    if evidence.is_empty() {
        eprintln!("No results for: {}", query);
    }

    println!("{}", to_json(&evidence)?);
    Ok(())
}

/// Show the resolved configuration (for debugging)
fn show_config() -> Result<()> {
    let cfg = config::config()?;
    print!("{}", render_config(cfg));
    Ok(())
}

/// Read document text from a file or piped stdin, applying safety limits
fn read_input(input_file: Option<&Path>, limits: &SafetyLimits) -> Result<String> {
    let input = if let Some(path) = input_file {
        // Denylisted files are never read
        limits.check_path(path)?;
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read input file: {}", path.display()))?
    } else if !io::stdin().is_terminal() {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read from stdin")?;
        buffer
    } else {
        anyhow::bail!("No input provided. Use --input <file> or pipe to stdin");
    };

    limits.validate_input(&input, input_file)?;

    if input.trim().is_empty() {
        anyhow::bail!("Input is empty");
    }

    Ok(input)
}

fn report_progress(event: &ProgressEvent) {
    match event.event_type {
        EventType::RunStarted => eprintln!("Extracting claims..."),
        EventType::ClaimsExtracted => eprintln!("{}", event.payload_summary),
        EventType::ClaimStarted => {}
        EventType::ClaimVerified | EventType::ClaimFailed => {
            if let (Some(index), Some(total)) = (event.claim_index, event.total_claims) {
                let status = event.status.map(|s| s.as_str()).unwrap_or("?");
                eprintln!(
                    "  [{}/{}] {:<10} {}",
                    index + 1,
                    total,
                    status,
                    event.payload_summary
                );
            }
        }
        EventType::RunCompleted => {
            if let Some(ms) = event.duration_ms {
                eprintln!("Done in {:.1}s", ms as f64 / 1000.0);
            }
        }
    }
}

fn print_result(result: &DocumentResult) {
    for (i, claim) in result.claims.iter().enumerate() {
        println!("{}. [{}] {}", i + 1, claim.verification_status, claim.claim_text());
        if !claim.explanation.is_empty() {
            println!("   {}", claim.explanation);
        }
        if let Some(ref corrected) = claim.corrected_value {
            println!("   Corrected: {}", corrected);
        }
        for source in claim.sources.iter().filter(|s| !s.url.is_empty()) {
            println!("   - {} ({})", source.title, source.url);
        }
        println!();
    }

    println!("{}", result.summary);
}

fn render_config(cfg: &ResolvedConfig) -> String {
    let mut out = String::new();
    let mut line = |s: String| {
        out.push_str(&s);
        out.push('\n');
    };

    line(format!(
        "Config file: {}",
        cfg.config_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none - using defaults)".to_string())
    ));
    line(String::new());
    line("Reasoning:".to_string());
    line(format!("  API key:      {}", mask_key(cfg.openai_api_key.as_deref())));
    line(format!("  Model:        {}", cfg.reasoning.model));
    line(format!("  Base URL:     {}", cfg.reasoning.base_url));
    line(format!(
        "  Temperature:  extract {} / verify {}",
        cfg.reasoning.extraction_temperature, cfg.reasoning.verification_temperature
    ));
    line(format!("  Timeout:      {}s", cfg.reasoning.timeout_seconds));
    line(String::new());
    line("Search:".to_string());
    line(format!("  API key:      {}", mask_key(cfg.tavily_api_key.as_deref())));
    line(format!("  Base URL:     {}", cfg.search.base_url));
    line(format!("  Max results:  {}", cfg.search.max_results));
    line(format!("  Timeout:      {}s", cfg.search.timeout_seconds));
    line(String::new());
    line("Pipeline:".to_string());
    line(format!("  Max input:    {} chars", cfg.pipeline.max_input_chars));
    line(format!("  Max claims:   {}", cfg.pipeline.max_claims));
    line(format!(
        "  Evidence:     {} snippets x {} chars",
        cfg.pipeline.evidence_snippets, cfg.pipeline.snippet_chars
    ));
    line(format!("  Concurrency:  {}", cfg.pipeline.concurrency));
    line(format!("  Max attempts: {}", cfg.pipeline.retry_policy.max_attempts));
    line(String::new());
    line("Safety limits:".to_string());
    line(format!("  Max input size: {} bytes", cfg.safety.max_input_bytes));
    line(format!("  Denylist:       {}", cfg.safety.denylist_patterns.join(", ")));

    out
}

/// Show only the last four characters of a secret
fn mask_key(key: Option<&str>) -> String {
    match key {
        None => "(not set)".to_string(),
        Some(k) if k.chars().count() <= 8 => "****".to_string(),
        Some(k) => {
            let tail: String = k.chars().skip(k.chars().count() - 4).collect();
            format!("****{}", tail)
        }
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("Failed to serialize output")
}

fn write_json(path: &Path, result: &DocumentResult) -> Result<()> {
    std::fs::write(path, to_json(result)?)
        .with_context(|| format!("Failed to write result: {}", path.display()))
}

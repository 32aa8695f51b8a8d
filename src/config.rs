//! Configuration for factcheck.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (OPENAI_API_KEY, TAVILY_API_KEY, FACTCHECK_MODEL,
//!    FACTCHECK_OPENAI_BASE_URL, FACTCHECK_TAVILY_BASE_URL)
//! 2. Config file (.factcheck/config.yaml)
//! 3. Defaults
//!
//! Config file discovery:
//! - Searches current directory and parents for .factcheck/config.yaml
//! - Falls back to the user config directory (e.g. ~/.config/factcheck/config.yaml)

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::adapters::{openai, tavily};
use crate::core::classifier::{
    DEFAULT_EVIDENCE_SNIPPETS, DEFAULT_SNIPPET_CHARS, VERIFICATION_TEMPERATURE,
};
use crate::core::extractor::{DEFAULT_MAX_CLAIMS, DEFAULT_MAX_INPUT_CHARS, EXTRACTION_TEMPERATURE};
use crate::core::retriever::DEFAULT_MAX_RESULTS;
use crate::core::{RetryPolicy, SafetyLimits};

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

pub const CONFIG_DIR_NAME: &str = ".factcheck";
pub const CONFIG_FILE_NAME: &str = "config.yaml";

pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_TAVILY_API_KEY: &str = "TAVILY_API_KEY";
pub const ENV_MODEL: &str = "FACTCHECK_MODEL";
pub const ENV_OPENAI_BASE_URL: &str = "FACTCHECK_OPENAI_BASE_URL";
pub const ENV_TAVILY_BASE_URL: &str = "FACTCHECK_TAVILY_BASE_URL";

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    pub version: Option<String>,
    #[serde(default)]
    pub reasoning: ReasoningSettings,
    #[serde(default)]
    pub search: SearchSettings,
    #[serde(default)]
    pub pipeline: PipelineSettings,
    #[serde(default)]
    pub safety: SafetyLimits,
}

/// Reasoning service settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReasoningSettings {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,
    #[serde(default = "default_extraction_temperature")]
    pub extraction_temperature: f32,
    #[serde(default = "default_verification_temperature")]
    pub verification_temperature: f32,
    #[serde(default = "default_reasoning_timeout")]
    pub timeout_seconds: u64,
}

fn default_model() -> String {
    openai::DEFAULT_MODEL.to_string()
}
fn default_openai_base_url() -> String {
    openai::DEFAULT_BASE_URL.to_string()
}
fn default_extraction_temperature() -> f32 {
    EXTRACTION_TEMPERATURE
}
fn default_verification_temperature() -> f32 {
    VERIFICATION_TEMPERATURE
}
fn default_reasoning_timeout() -> u64 {
    60
}

impl Default for ReasoningSettings {
    fn default() -> Self {
        Self {
            model: default_model(),
            base_url: default_openai_base_url(),
            extraction_temperature: default_extraction_temperature(),
            verification_temperature: default_verification_temperature(),
            timeout_seconds: default_reasoning_timeout(),
        }
    }
}

/// Web search settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchSettings {
    #[serde(default = "default_tavily_base_url")]
    pub base_url: String,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    #[serde(default = "default_search_timeout")]
    pub timeout_seconds: u64,
}

fn default_tavily_base_url() -> String {
    tavily::DEFAULT_BASE_URL.to_string()
}
fn default_max_results() -> usize {
    DEFAULT_MAX_RESULTS
}
fn default_search_timeout() -> u64 {
    10
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            base_url: default_tavily_base_url(),
            max_results: default_max_results(),
            timeout_seconds: default_search_timeout(),
        }
    }
}

/// Extraction and verification limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineSettings {
    #[serde(default = "default_max_input_chars")]
    pub max_input_chars: usize,
    #[serde(default = "default_max_claims")]
    pub max_claims: usize,
    #[serde(default = "default_evidence_snippets")]
    pub evidence_snippets: usize,
    #[serde(default = "default_snippet_chars")]
    pub snippet_chars: usize,
    /// Claims verified at the same time (1 = sequential)
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    #[serde(default)]
    pub retry_policy: RetryPolicy,
}

fn default_max_input_chars() -> usize {
    DEFAULT_MAX_INPUT_CHARS
}
fn default_max_claims() -> usize {
    DEFAULT_MAX_CLAIMS
}
fn default_evidence_snippets() -> usize {
    DEFAULT_EVIDENCE_SNIPPETS
}
fn default_snippet_chars() -> usize {
    DEFAULT_SNIPPET_CHARS
}
fn default_concurrency() -> usize {
    1
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            max_input_chars: default_max_input_chars(),
            max_claims: default_max_claims(),
            evidence_snippets: default_evidence_snippets(),
            snippet_chars: default_snippet_chars(),
            concurrency: default_concurrency(),
            retry_policy: RetryPolicy::default(),
        }
    }
}

/// Fully resolved configuration
#[derive(Debug, Clone, Default)]
pub struct ResolvedConfig {
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
    pub reasoning: ReasoningSettings,
    pub search: SearchSettings,
    pub pipeline: PipelineSettings,
    pub safety: SafetyLimits,
    pub openai_api_key: Option<String>,
    pub tavily_api_key: Option<String>,
}

impl ResolvedConfig {
    /// Build from a parsed config file (no environment applied)
    pub fn from_file(config_file: Option<PathBuf>, file: ConfigFile) -> Self {
        Self {
            config_file,
            reasoning: file.reasoning,
            search: file.search,
            pipeline: file.pipeline,
            safety: file.safety,
            openai_api_key: None,
            tavily_api_key: None,
        }
    }

    /// Overlay environment values. Blank values are ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(key) = get(ENV_OPENAI_API_KEY) {
            self.openai_api_key = Some(key);
        }
        if let Some(key) = get(ENV_TAVILY_API_KEY) {
            self.tavily_api_key = Some(key);
        }
        if let Some(model) = get(ENV_MODEL) {
            self.reasoning.model = model;
        }
        if let Some(url) = get(ENV_OPENAI_BASE_URL) {
            self.reasoning.base_url = url;
        }
        if let Some(url) = get(ENV_TAVILY_BASE_URL) {
            self.search.base_url = url;
        }
    }

    /// Reasoning service API key, or an error naming the variable to set
    pub fn require_openai_key(&self) -> Result<&str> {
        self.openai_api_key
            .as_deref()
            .with_context(|| format!("{} is not set", ENV_OPENAI_API_KEY))
    }

    /// Web search API key, or an error naming the variable to set
    pub fn require_tavily_key(&self) -> Result<&str> {
        self.tavily_api_key
            .as_deref()
            .with_context(|| format!("{} is not set", ENV_TAVILY_API_KEY))
    }
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let start = std::env::current_dir().ok()?;
    find_config_file_from(&start).or_else(|| {
        let user_config = dirs::config_dir()?.join("factcheck").join(CONFIG_FILE_NAME);
        user_config.exists().then_some(user_config)
    })
}

fn find_config_file_from(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    let config_file = find_config_file();

    let file = match config_file {
        Some(ref path) => load_config_file(path)?,
        None => ConfigFile::default(),
    };

    let mut config = ResolvedConfig::from_file(config_file, file);
    config.apply_env(|key| std::env::var(key).ok());
    Ok(config)
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| format!("{:#}", e)));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}

/// Force reload configuration (useful for testing)
pub fn reload_config() -> Result<ResolvedConfig> {
    load_config()
}

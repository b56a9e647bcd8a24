//! Retrieval, guardrail, generation and ingestion settings.
//!
//! Loaded from `.factguard/knowledge.yaml`; every field has a default so a
//! partial (or absent) file is valid.

use crate::embeddings::EmbeddingConfig;
use crate::guardrails::SensitiveTerms;
use factguard_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Complete knowledge configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeConfig {
    /// Product the assistant answers about
    #[serde(default = "default_product")]
    pub product: String,

    #[serde(default)]
    pub retrieval: RetrievalConfig,

    #[serde(default)]
    pub guardrails: GuardrailConfig,

    #[serde(default)]
    pub generation: GenerationConfig,

    #[serde(default)]
    pub ingestion: IngestionConfig,

    #[serde(default)]
    pub embedding: EmbeddingConfig,
}

fn default_product() -> String {
    "the product".to_string()
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            product: default_product(),
            retrieval: RetrievalConfig::default(),
            guardrails: GuardrailConfig::default(),
            generation: GenerationConfig::default(),
            ingestion: IngestionConfig::default(),
            embedding: EmbeddingConfig::default(),
        }
    }
}

/// Search depth and context bounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    #[serde(default = "default_facts_top_k")]
    pub facts_top_k: usize,

    #[serde(default = "default_external_top_k")]
    pub external_top_k: usize,

    #[serde(default = "default_max_facts_in_context")]
    pub max_facts_in_context: usize,

    #[serde(default = "default_max_external_in_context")]
    pub max_external_in_context: usize,

    /// Context length cap in characters
    #[serde(default = "default_max_context_chars")]
    pub max_context_chars: usize,
}

fn default_facts_top_k() -> usize {
    5
}

fn default_external_top_k() -> usize {
    3
}

fn default_max_facts_in_context() -> usize {
    3
}

fn default_max_external_in_context() -> usize {
    2
}

fn default_max_context_chars() -> usize {
    2000
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            facts_top_k: default_facts_top_k(),
            external_top_k: default_external_top_k(),
            max_facts_in_context: default_max_facts_in_context(),
            max_external_in_context: default_max_external_in_context(),
            max_context_chars: default_max_context_chars(),
        }
    }
}

/// Guardrail policy settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardrailConfig {
    /// Facts with distance below `1 - confidence_threshold` suffice on their own
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f32,

    /// Replacement protected-term tables
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sensitive_terms: Option<SensitiveTerms>,
}

fn default_confidence_threshold() -> f32 {
    0.7
}

impl Default for GuardrailConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: default_confidence_threshold(),
            sensitive_terms: None,
        }
    }
}

impl GuardrailConfig {
    /// The configured term tables, or the built-in defaults.
    pub fn terms(&self) -> SensitiveTerms {
        self.sensitive_terms
            .clone()
            .map(SensitiveTerms::normalized)
            .unwrap_or_default()
    }
}

/// Answer generator call settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// A generator call running longer than this is a failure
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_max_tokens() -> u32 {
    500
}

fn default_temperature() -> f32 {
    0.1
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Source files and chunking parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionConfig {
    /// Markdown file of official facts, relative to the workspace
    #[serde(default = "default_facts_file")]
    pub facts_file: PathBuf,

    /// JSON array of external records, relative to the workspace
    #[serde(default = "default_external_file")]
    pub external_file: PathBuf,

    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
}

fn default_facts_file() -> PathBuf {
    PathBuf::from("data/facts.md")
}

fn default_external_file() -> PathBuf {
    PathBuf::from("data/external.json")
}

fn default_chunk_size() -> usize {
    500
}

fn default_chunk_overlap() -> usize {
    50
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            facts_file: default_facts_file(),
            external_file: default_external_file(),
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
        }
    }
}

impl KnowledgeConfig {
    /// Check value ranges that serde cannot express.
    pub fn validate(&self) -> AppResult<()> {
        let threshold = self.guardrails.confidence_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(AppError::Config(format!(
                "guardrails.confidence_threshold must be within [0, 1], got {}",
                threshold
            )));
        }

        if self.retrieval.max_context_chars == 0 {
            return Err(AppError::Config(
                "retrieval.max_context_chars must be positive".to_string(),
            ));
        }

        // Window arithmetic divides by five-character words.
        if self.ingestion.chunk_size < 5 || self.ingestion.chunk_overlap + 5 > self.ingestion.chunk_size
        {
            return Err(AppError::Config(format!(
                "ingestion.chunk_overlap ({}) must be at least 5 below chunk_size ({})",
                self.ingestion.chunk_overlap, self.ingestion.chunk_size
            )));
        }

        if self.embedding.dimensions == 0 {
            return Err(AppError::Config(
                "embedding.dimensions must be positive".to_string(),
            ));
        }

        Ok(())
    }

    /// Resolve a configured path against the workspace.
    pub fn resolve(&self, workspace: &Path, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            workspace.join(path)
        }
    }
}

/// Load knowledge configuration.
///
/// Loads from `.factguard/knowledge.yaml` if it exists, otherwise returns
/// the defaults.
pub fn load_config(workspace: &Path) -> AppResult<KnowledgeConfig> {
    let config_path = get_config_path(workspace);

    let config = if config_path.exists() {
        let content = fs::read_to_string(&config_path).map_err(|e| {
            AppError::Config(format!("Failed to read config at {:?}: {}", config_path, e))
        })?;

        let config: KnowledgeConfig = serde_yaml::from_str(&content).map_err(|e| {
            AppError::Config(format!("Failed to parse config at {:?}: {}", config_path, e))
        })?;

        tracing::debug!("Loaded knowledge config from {:?}", config_path);
        config
    } else {
        tracing::debug!("Using default knowledge config (no config file found)");
        KnowledgeConfig::default()
    };

    config.validate()?;
    Ok(config)
}

/// Save knowledge configuration.
pub fn save_config(workspace: &Path, config: &KnowledgeConfig) -> AppResult<()> {
    let config_path = get_config_path(workspace);

    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            AppError::Config(format!("Failed to create config directory: {}", e))
        })?;
    }

    let yaml = serde_yaml::to_string(config)?;

    fs::write(&config_path, yaml).map_err(|e| {
        AppError::Config(format!("Failed to write config to {:?}: {}", config_path, e))
    })?;

    tracing::debug!("Saved knowledge config to {:?}", config_path);
    Ok(())
}

/// Get the path to the knowledge config file.
pub fn get_config_path(workspace: &Path) -> PathBuf {
    workspace.join(".factguard").join("knowledge.yaml")
}

/// Get the SQLite index path.
pub fn get_index_path(workspace: &Path) -> PathBuf {
    workspace.join(".factguard").join("index.sqlite")
}

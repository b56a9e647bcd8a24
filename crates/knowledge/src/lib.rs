//! Guarded product knowledge base.
//!
//! Answers product questions from two segregated partitions: official facts
//! and external material such as reviews and transcripts. Commercial topics
//! (pricing, warranty, availability, financing) are answered from facts only,
//! and external passages that mention them never reach the generator.

pub mod config;
pub mod embeddings;
pub mod guardrails;
pub mod index;
pub mod ingest;
pub mod rag;
pub mod types;
pub mod vector_index;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use config::KnowledgeConfig;
pub use index::SqliteIndex;
pub use rag::{ResponsePolicy, Retriever};
pub use types::{
    Citation, GuardedResponse, HealthReport, IngestStats, Passage, PassageResult,
    ResponseStatus, RetrievalOutcome, SourceKind,
};
pub use vector_index::VectorIndex;

use factguard_core::{AppError, AppResult};
use factguard_llm::LlmClient;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Retrieval plus response policy for one workspace.
pub struct GuardedAssistant {
    retriever: Retriever,
    policy: ResponsePolicy,
}

impl GuardedAssistant {
    pub fn new(retriever: Retriever, policy: ResponsePolicy) -> Self {
        Self { retriever, policy }
    }

    /// Wire an assistant over `index` with the given generator.
    pub fn from_config(
        workspace: &Path,
        config: &KnowledgeConfig,
        index: Arc<dyn VectorIndex>,
        generator: Arc<dyn LlmClient>,
        model: &str,
    ) -> Self {
        let retriever = Retriever::new(index, config);
        let policy = ResponsePolicy::new(
            generator,
            model,
            config.product.as_str(),
            workspace,
            config.generation.clone(),
        );
        Self::new(retriever, policy)
    }

    /// Answer a question.
    ///
    /// Blank questions are rejected; a failing facts search surfaces as
    /// `AppError::Index`. Generator failures are refusals, not errors.
    pub async fn ask(&self, question: &str) -> AppResult<GuardedResponse> {
        let question = question.trim();
        if question.is_empty() {
            return Err(AppError::Config("Question cannot be empty".to_string()));
        }

        let outcome = self.retriever.retrieve(question).await?;
        Ok(self.policy.respond(question, &outcome).await)
    }
}

/// Open the workspace index with the configured embedding provider.
pub fn open_index(workspace: &Path, config: &KnowledgeConfig) -> AppResult<SqliteIndex> {
    let embedder = embeddings::create_provider(&config.embedding)?;
    SqliteIndex::open(&config::get_index_path(workspace), embedder)
}

/// Answer one question against the workspace index.
pub async fn ask(
    workspace: &Path,
    question: &str,
    generator: Arc<dyn LlmClient>,
    model: &str,
) -> AppResult<GuardedResponse> {
    tracing::info!("Answering question: {}", question);

    let config = config::load_config(workspace)?;
    let index = Arc::new(open_index(workspace, &config)?);

    GuardedAssistant::from_config(workspace, &config, index, generator, model)
        .ask(question)
        .await
}

/// Ingest the configured sources into the workspace index.
pub async fn ingest(workspace: &Path, reset: bool) -> AppResult<IngestStats> {
    tracing::info!("Starting ingestion (reset: {})", reset);

    let config = config::load_config(workspace)?;
    let index = open_index(workspace, &config)?;
    let stats = ingest::ingest_sources(&index, workspace, &config, reset).await?;

    tracing::info!(
        "Ingestion complete: {} facts passages, {} external passages in {:.2}s",
        stats.facts_passages,
        stats.external_passages,
        stats.duration_secs
    );

    Ok(stats)
}

/// Write the default knowledge configuration if none exists.
///
/// Returns the config path and whether a new file was written.
pub fn init_config(workspace: &Path) -> AppResult<(PathBuf, bool)> {
    let path = config::get_config_path(workspace);
    if path.exists() {
        return Ok((path, false));
    }

    config::save_config(workspace, &KnowledgeConfig::default())?;
    Ok((path, true))
}

/// Report index readiness. Never fails: problems are reported as `unhealthy`.
pub async fn health(workspace: &Path) -> HealthReport {
    match partition_counts(workspace).await {
        Ok((facts_documents, external_documents)) => HealthReport {
            status: "healthy".to_string(),
            facts_documents,
            external_documents,
            ready: facts_documents > 0 && external_documents > 0,
            error: None,
        },
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            HealthReport {
                status: "unhealthy".to_string(),
                facts_documents: 0,
                external_documents: 0,
                ready: false,
                error: Some(e.to_string()),
            }
        }
    }
}

async fn partition_counts(workspace: &Path) -> AppResult<(usize, usize)> {
    let config = config::load_config(workspace)?;
    let index = open_index(workspace, &config)?;

    let facts = index.count(SourceKind::Facts).await?;
    let external = index.count(SourceKind::External).await?;
    Ok((facts, external))
}

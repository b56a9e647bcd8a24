//! Retrieval orchestration over the two partitions.

use crate::config::KnowledgeConfig;
use crate::guardrails::{ConfidencePolicy, ContentFilter, SensitiveTerms, SensitivityClassifier};
use crate::rag::context::ContextAssembler;
use crate::types::{PassageResult, RetrievalOutcome, SourceKind};
use crate::vector_index::VectorIndex;
use factguard_core::{AppError, AppResult};
use std::sync::Arc;

/// Runs classification, the facts search, the gated external search,
/// filtering and context assembly for one query.
pub struct Retriever {
    index: Arc<dyn VectorIndex>,
    policy: ConfidencePolicy,
    filter: ContentFilter,
    assembler: ContextAssembler,
    facts_top_k: usize,
    external_top_k: usize,
}

impl Retriever {
    /// Wire a retriever from configuration. The term tables are built once
    /// and shared by the classifier and the content filter.
    pub fn new(index: Arc<dyn VectorIndex>, config: &KnowledgeConfig) -> Self {
        let terms = Arc::new(config.guardrails.terms());
        Self::with_terms(index, config, terms)
    }

    pub fn with_terms(
        index: Arc<dyn VectorIndex>,
        config: &KnowledgeConfig,
        terms: Arc<SensitiveTerms>,
    ) -> Self {
        let classifier = SensitivityClassifier::new(Arc::clone(&terms));

        Self {
            index,
            policy: ConfidencePolicy::new(classifier, config.guardrails.confidence_threshold),
            filter: ContentFilter::new(terms),
            assembler: ContextAssembler::from_config(&config.retrieval),
            facts_top_k: config.retrieval.facts_top_k,
            external_top_k: config.retrieval.external_top_k,
        }
    }

    /// Retrieve context for `query`.
    ///
    /// A facts search failure is returned as `AppError::Index`. An external
    /// search failure degrades to "no external results".
    pub async fn retrieve(&self, query: &str) -> AppResult<RetrievalOutcome> {
        let is_sensitive = self.policy.classifier().is_sensitive(query);
        tracing::debug!(is_sensitive, "Classified query");

        let facts = self
            .index
            .search(SourceKind::Facts, query, self.facts_top_k)
            .await
            .map_err(|e| match e {
                AppError::Index(_) => e,
                other => AppError::Index(format!("Facts search failed: {}", other)),
            })?;

        let use_external = self.policy.decide(is_sensitive, &facts);
        tracing::debug!(
            facts = facts.len(),
            cutoff = self.policy.distance_cutoff(),
            use_external,
            "Confidence decision"
        );

        let external = if use_external {
            self.search_external(query).await
        } else {
            Vec::new()
        };
        let external_count = external.len();

        let eligible = self.filter.filter_external(external);
        let assembled = self.assembler.assemble(&facts, &eligible);

        let used_external = assembled
            .citations
            .iter()
            .any(|c| c.source == SourceKind::External);

        Ok(RetrievalOutcome {
            context: assembled.context,
            citations: assembled.citations,
            facts_count: facts.len(),
            external_count,
            is_sensitive,
            used_external,
        })
    }

    async fn search_external(&self, query: &str) -> Vec<PassageResult> {
        match self
            .index
            .search(SourceKind::External, query, self.external_top_k)
            .await
        {
            Ok(results) => results,
            Err(e) => {
                tracing::warn!("External search failed, continuing without it: {}", e);
                Vec::new()
            }
        }
    }
}

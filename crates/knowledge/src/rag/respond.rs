//! Response policy: turns a retrieval outcome into the final answer.

use crate::config::GenerationConfig;
use crate::types::{Citation, GuardedResponse, ResponseStatus, RetrievalOutcome};
use factguard_core::{AppError, AppResult};
use factguard_llm::{LlmClient, LlmRequest};
use factguard_prompt::{build_guardrail_prompt, GuardrailPromptInput};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

pub const SENSITIVE_NO_CONTEXT_MESSAGE: &str = "I cannot provide pricing, warranty, or availability information as it's not available in our official documentation.";

pub const SENSITIVE_NO_FACTS_MESSAGE: &str = "I can only provide pricing, warranty, and availability information from our official documentation, which doesn't contain this information.";

pub const GENERATION_FAILED_MESSAGE: &str =
    "I'm sorry, I'm unable to generate a response at the moment. Please try again later.";

/// Citations appended when the generator cited nothing itself.
const MAX_APPENDED_CITATIONS: usize = 3;

/// Decides between answering, refusing and reporting missing data.
///
/// Checked in order, first match wins:
/// 1. empty context, sensitive: refused
/// 2. empty context: no_data
/// 3. sensitive with no facts: refused
/// 4. otherwise the generator answers; any failure there is a refusal.
pub struct ResponsePolicy {
    generator: Arc<dyn LlmClient>,
    model: String,
    product: String,
    workspace: PathBuf,
    generation: GenerationConfig,
}

impl ResponsePolicy {
    pub fn new(
        generator: Arc<dyn LlmClient>,
        model: impl Into<String>,
        product: impl Into<String>,
        workspace: impl Into<PathBuf>,
        generation: GenerationConfig,
    ) -> Self {
        Self {
            generator,
            model: model.into(),
            product: product.into(),
            workspace: workspace.into(),
            generation,
        }
    }

    /// Build the response for `question`. Never fails: generator problems
    /// become a refusal without citations.
    pub async fn respond(&self, question: &str, outcome: &RetrievalOutcome) -> GuardedResponse {
        let response = if outcome.context.is_empty() {
            if outcome.is_sensitive {
                GuardedResponse::without_citations(
                    SENSITIVE_NO_CONTEXT_MESSAGE,
                    ResponseStatus::Refused,
                )
            } else {
                GuardedResponse::without_citations(
                    format!(
                        "I don't have sufficient information to answer your question about {}.",
                        self.product
                    ),
                    ResponseStatus::NoData,
                )
            }
        } else if outcome.is_sensitive && outcome.facts_count == 0 {
            GuardedResponse::without_citations(SENSITIVE_NO_FACTS_MESSAGE, ResponseStatus::Refused)
        } else {
            match self.generate(question, outcome).await {
                Ok(answer) => GuardedResponse {
                    answer: with_citation_markers(answer, &outcome.citations),
                    status: ResponseStatus::Answered,
                    citations: outcome.citations.clone(),
                },
                Err(e) => {
                    tracing::warn!("Answer generation failed: {}", e);
                    GuardedResponse::without_citations(
                        GENERATION_FAILED_MESSAGE,
                        ResponseStatus::Refused,
                    )
                }
            }
        };

        tracing::info!(
            status = %response.status,
            citations = response.citations.len(),
            sensitive = outcome.is_sensitive,
            used_external = outcome.used_external,
            "Built response"
        );

        response
    }

    async fn generate(&self, question: &str, outcome: &RetrievalOutcome) -> AppResult<String> {
        let prompt = build_guardrail_prompt(
            &self.workspace,
            &GuardrailPromptInput {
                product: &self.product,
                question,
                context: &outcome.context,
                sensitive: outcome.is_sensitive,
            },
        )?;

        let request = LlmRequest::new(prompt.user, &self.model)
            .with_system(prompt.system)
            .with_temperature(self.generation.temperature)
            .with_max_tokens(self.generation.max_tokens);

        tracing::debug!(
            provider = self.generator.provider_name(),
            model = %self.model,
            "Calling answer generator"
        );

        let timeout = Duration::from_secs(self.generation.timeout_secs);
        let response = tokio::time::timeout(timeout, self.generator.complete(&request))
            .await
            .map_err(|_| {
                AppError::Generation(format!(
                    "Generator timed out after {}s",
                    self.generation.timeout_secs
                ))
            })??;

        let answer = response.content.trim();
        if answer.is_empty() {
            return Err(AppError::Generation(
                "Generator returned an empty answer".to_string(),
            ));
        }

        Ok(answer.to_string())
    }
}

/// Append up to three `[source:doc_id:chunk_id]` markers unless the answer
/// already carries a bracketed marker.
pub fn with_citation_markers(answer: String, citations: &[Citation]) -> String {
    if citations.is_empty() || has_bracket_marker(&answer) {
        return answer;
    }

    let markers: Vec<String> = citations
        .iter()
        .take(MAX_APPENDED_CITATIONS)
        .map(Citation::marker)
        .collect();

    format!("{} {}", answer, markers.join(" "))
}

fn has_bracket_marker(text: &str) -> bool {
    text.find('[')
        .map(|open| text[open..].contains(']'))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SourceKind;

    fn citation(source: SourceKind, id: &str) -> Citation {
        Citation {
            source,
            doc_id: crate::types::doc_id_of(id).to_string(),
            chunk_id: id.to_string(),
        }
    }

    #[test]
    fn test_markers_appended_when_missing() {
        let citations = vec![
            citation(SourceKind::Facts, "F001"),
            citation(SourceKind::Facts, "F002:c1"),
            citation(SourceKind::External, "E003"),
            citation(SourceKind::External, "E004"),
        ];

        let answer = with_citation_markers("The range is 570 km.".to_string(), &citations);
        assert_eq!(
            answer,
            "The range is 570 km. [facts:F001:F001] [facts:F002:F002:c1] [external:E003:E003]"
        );
    }

    #[test]
    fn test_existing_markers_kept() {
        let citations = vec![citation(SourceKind::Facts, "F001")];
        let answer = with_citation_markers(
            "The range is 570 km [facts:F001:F001].".to_string(),
            &citations,
        );
        assert_eq!(answer, "The range is 570 km [facts:F001:F001].");
    }

    #[test]
    fn test_reversed_brackets_are_not_a_marker() {
        assert!(!has_bracket_marker("a ] then ["));
        assert!(has_bracket_marker("see [1]"));
    }

    #[test]
    fn test_no_citations_leaves_answer() {
        assert_eq!(with_citation_markers("Plain.".to_string(), &[]), "Plain.");
    }
}

//! Removes external passages that mention protected topics.

use crate::guardrails::SensitiveTerms;
use crate::types::PassageResult;
use std::sync::Arc;

/// Drops any external passage whose text mentions a protected term.
///
/// Applies regardless of query sensitivity: a review quoting a price must
/// not reach the generator even when the user asked about paint colors.
#[derive(Debug, Clone)]
pub struct ContentFilter {
    terms: Arc<SensitiveTerms>,
}

impl ContentFilter {
    pub fn new(terms: Arc<SensitiveTerms>) -> Self {
        Self { terms }
    }

    /// Whether a passage text mentions any keyword or ambiguous term.
    pub fn mentions_protected(&self, text: &str) -> bool {
        let text = text.to_lowercase();
        self.terms.all_protected().any(|term| text.contains(term))
    }

    /// Keep only clean passages, preserving order.
    pub fn filter_external(&self, results: Vec<PassageResult>) -> Vec<PassageResult> {
        let before = results.len();
        let kept: Vec<PassageResult> = results
            .into_iter()
            .filter(|passage| !self.mentions_protected(&passage.text))
            .collect();

        if kept.len() < before {
            tracing::debug!(
                dropped = before - kept.len(),
                kept = kept.len(),
                "Filtered external passages mentioning protected terms"
            );
        }

        kept
    }
}

impl Default for ContentFilter {
    fn default() -> Self {
        Self::new(Arc::new(SensitiveTerms::default()))
    }
}

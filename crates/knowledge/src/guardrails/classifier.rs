//! Query sensitivity classification.

use crate::guardrails::terms::{contains_any, SensitiveTerms};
use std::sync::Arc;

/// Decides whether a query touches a protected topic.
///
/// Rules, in order:
/// 1. An ambiguous term ("available") with a purchase-intent phrase is sensitive.
/// 2. An ambiguous term with no color/variant term is sensitive.
/// 3. Otherwise any keyword hit is sensitive.
///
/// So "what colors are available" is generic, "is it available" is not, and
/// "which colors are available and what is the price" is still caught by rule 3.
#[derive(Debug, Clone)]
pub struct SensitivityClassifier {
    terms: Arc<SensitiveTerms>,
}

impl SensitivityClassifier {
    pub fn new(terms: Arc<SensitiveTerms>) -> Self {
        Self { terms }
    }

    /// Classify a query. Pure and deterministic.
    pub fn is_sensitive(&self, query: &str) -> bool {
        let query = query.to_lowercase();

        if contains_any(&query, &self.terms.ambiguous) {
            if contains_any(&query, &self.terms.purchase_intent) {
                return true;
            }
            if !contains_any(&query, &self.terms.variant_terms) {
                return true;
            }
        }

        contains_any(&query, &self.terms.keywords)
    }

    pub fn terms(&self) -> &Arc<SensitiveTerms> {
        &self.terms
    }
}

impl Default for SensitivityClassifier {
    fn default() -> Self {
        Self::new(Arc::new(SensitiveTerms::default()))
    }
}

//! Decides whether the external partition may be consulted.

use crate::guardrails::SensitivityClassifier;
use crate::types::PassageResult;

/// Gate in front of the external search.
///
/// Sensitive queries never consult external material. Non-sensitive
/// queries skip it only when the facts already contain a close match.
#[derive(Debug, Clone)]
pub struct ConfidencePolicy {
    classifier: SensitivityClassifier,
    confidence_threshold: f32,
}

impl ConfidencePolicy {
    pub fn new(classifier: SensitivityClassifier, confidence_threshold: f32) -> Self {
        Self {
            classifier,
            confidence_threshold,
        }
    }

    /// Facts strictly closer than this are high-confidence.
    pub fn distance_cutoff(&self) -> f32 {
        1.0 - self.confidence_threshold
    }

    pub fn classifier(&self) -> &SensitivityClassifier {
        &self.classifier
    }

    /// Whether the external search should run for `query`.
    pub fn should_use_external(&self, query: &str, facts: &[PassageResult]) -> bool {
        self.decide(self.classifier.is_sensitive(query), facts)
    }

    /// Same decision with a precomputed sensitivity flag.
    pub fn decide(&self, is_sensitive: bool, facts: &[PassageResult]) -> bool {
        if is_sensitive {
            return false;
        }

        if facts.is_empty() {
            return true;
        }

        !self.has_high_confidence(facts)
    }

    /// An unknown distance never counts as high-confidence.
    fn has_high_confidence(&self, facts: &[PassageResult]) -> bool {
        let cutoff = self.distance_cutoff();
        facts
            .iter()
            .filter_map(|passage| passage.distance)
            .any(|distance| distance < cutoff)
    }
}

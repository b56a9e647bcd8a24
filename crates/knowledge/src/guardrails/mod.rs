//! Guardrail policies applied before any passage reaches the generator.
//!
//! Three pure, deterministic components share one immutable set of
//! protected-term tables:
//! - [`SensitivityClassifier`]: does a query touch a protected topic?
//! - [`ConfidencePolicy`]: may the external partition be consulted?
//! - [`ContentFilter`]: drop external passages leaking protected topics.

pub mod classifier;
pub mod confidence;
pub mod filter;
pub mod terms;

pub use classifier::SensitivityClassifier;
pub use confidence::ConfidencePolicy;
pub use filter::ContentFilter;
pub use terms::SensitiveTerms;

//! Guardrail prompt system for factguard.
//!
//! This crate owns the instruction contract handed to the answer generator:
//! - Built-in Handlebars templates for the system and user messages
//! - Optional per-workspace overrides from `.factguard/prompts/<id>.yml`
//! - Rendering of the question, the tagged context and the sensitivity flag

pub mod builder;
pub mod builtin;
pub mod loader;
pub mod types;

// Re-export main types
pub use builder::{build_guardrail_prompt, GuardrailPromptInput};
pub use builtin::{GUARDRAIL_SYSTEM_ID, GUARDRAIL_USER_ID};
pub use loader::load_prompt;
pub use types::{BuiltPrompt, BuiltPromptMetadata, PromptDefinition};

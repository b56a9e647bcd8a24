//! Prompt types for factguard.

use serde::{Deserialize, Serialize};

/// A prompt definition, either built in or loaded from YAML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptDefinition {
    /// Unique prompt identifier
    pub id: String,

    /// Human-readable title
    pub title: String,

    /// API version for schema evolution
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    /// Creator identifier
    #[serde(rename = "createdBy", default)]
    pub created_by: String,

    /// Template string with Handlebars syntax
    pub template: String,
}

/// A fully built guardrail prompt ready for the answer generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltPrompt {
    /// System instructions
    pub system: String,

    /// User message carrying the context and the question
    pub user: String,

    /// Metadata about the built prompt
    pub metadata: BuiltPromptMetadata,
}

/// Metadata about a built prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltPromptMetadata {
    /// Prompt ID used for the system message
    #[serde(rename = "systemPromptId")]
    pub system_prompt_id: String,

    /// Prompt ID used for the user message
    #[serde(rename = "userPromptId")]
    pub user_prompt_id: String,

    /// Whether the sensitive-topic rules were rendered
    pub sensitive: bool,
}

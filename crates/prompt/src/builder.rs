//! Prompt builder for rendering the guardrail instruction contract.

use crate::builtin::{GUARDRAIL_SYSTEM_ID, GUARDRAIL_USER_ID};
use crate::loader::load_prompt;
use crate::types::{BuiltPrompt, BuiltPromptMetadata};
use factguard_core::{AppError, AppResult};
use handlebars::Handlebars;
use serde::Serialize;
use std::path::Path;

/// Variables rendered into the guardrail templates.
#[derive(Debug, Clone, Serialize)]
pub struct GuardrailPromptInput<'a> {
    /// Product the assistant answers about
    pub product: &'a str,

    /// The user's question
    pub question: &'a str,

    /// Tagged, bounded context
    pub context: &'a str,

    /// Whether the question touches a protected topic
    pub sensitive: bool,
}

/// Build the system and user messages for one question.
///
/// Sensitive questions additionally carry the rule that commercial claims
/// may only cite `[FACTS]` material and must be refused otherwise.
pub fn build_guardrail_prompt(
    workspace_path: &Path,
    input: &GuardrailPromptInput<'_>,
) -> AppResult<BuiltPrompt> {
    let system_def = load_prompt(workspace_path, GUARDRAIL_SYSTEM_ID)?;
    let user_def = load_prompt(workspace_path, GUARDRAIL_USER_ID)?;

    let system = render_template(&system_def.template, input)?;
    let user = render_template(&user_def.template, input)?;

    tracing::debug!(
        sensitive = input.sensitive,
        context_chars = input.context.chars().count(),
        "Built guardrail prompt"
    );

    Ok(BuiltPrompt {
        system: collapse_blank_runs(&system),
        user,
        metadata: BuiltPromptMetadata {
            system_prompt_id: system_def.id,
            user_prompt_id: user_def.id,
            sensitive: input.sensitive,
        },
    })
}

/// Render a Handlebars template with variables.
fn render_template<T: Serialize>(template: &str, variables: &T) -> AppResult<String> {
    let mut handlebars = Handlebars::new();

    // Plain text output, no HTML escaping
    handlebars.register_escape_fn(handlebars::no_escape);

    handlebars
        .register_template_string("prompt", template)
        .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

    handlebars
        .render("prompt", variables)
        .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))
}

/// Collapse runs of blank lines left behind by conditional blocks.
fn collapse_blank_runs(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut blank_run = 0;

    for line in text.lines() {
        if line.trim().is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        out.push_str(line);
        out.push('\n');
    }

    out.trim_end().to_string()
}

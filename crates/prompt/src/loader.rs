//! Prompt loader for built-in and workspace-overridden guardrail templates.

use crate::builtin::builtin_template;
use crate::types::PromptDefinition;
use factguard_core::{AppError, AppResult};
use std::path::Path;

/// Load a prompt definition by ID.
///
/// A workspace override at `.factguard/prompts/<id>.yml` wins over the
/// built-in template of the same ID.
///
/// # Example
/// ```no_run
/// use factguard_prompt::{load_prompt, GUARDRAIL_SYSTEM_ID};
/// use std::path::Path;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let prompt = load_prompt(Path::new("."), GUARDRAIL_SYSTEM_ID)?;
/// println!("Loaded prompt: {}", prompt.title);
/// # Ok(())
/// # }
/// ```
pub fn load_prompt(workspace_path: &Path, prompt_id: &str) -> AppResult<PromptDefinition> {
    let prompt_file = workspace_path
        .join(".factguard/prompts")
        .join(format!("{}.yml", prompt_id));

    if prompt_file.exists() {
        tracing::debug!("Loading prompt override from: {:?}", prompt_file);

        let contents = std::fs::read_to_string(&prompt_file).map_err(|e| {
            AppError::Prompt(format!(
                "Failed to read prompt file {:?}: {}",
                prompt_file, e
            ))
        })?;

        let definition: PromptDefinition = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Prompt(format!(
                "Failed to parse prompt YAML {:?}: {}",
                prompt_file, e
            ))
        })?;

        validate_prompt(&definition, prompt_id)?;
        return Ok(definition);
    }

    let template = builtin_template(prompt_id)
        .ok_or_else(|| AppError::Prompt(format!("Unknown prompt: {}", prompt_id)))?;

    Ok(PromptDefinition {
        id: prompt_id.to_string(),
        title: format!("Built-in {}", prompt_id),
        api_version: "1.0".to_string(),
        created_by: "factguard".to_string(),
        template: template.to_string(),
    })
}

/// Validate a prompt definition.
fn validate_prompt(def: &PromptDefinition, expected_id: &str) -> AppResult<()> {
    if def.id != expected_id {
        return Err(AppError::Prompt(format!(
            "Prompt ID mismatch: file declares '{}', expected '{}'",
            def.id, expected_id
        )));
    }

    if def.template.trim().is_empty() {
        return Err(AppError::Prompt(
            "Prompt template cannot be empty".to_string(),
        ));
    }

    if !def.api_version.contains('.') {
        return Err(AppError::Prompt(format!(
            "Invalid apiVersion format: {}. Expected format: 'x.y'",
            def.api_version
        )));
    }

    Ok(())
}

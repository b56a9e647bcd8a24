//! Built-in guardrail templates.
//!
//! Variables available to both templates: `product`, `question`, `context`
//! and the boolean `sensitive`.

/// Prompt ID of the system instructions.
pub const GUARDRAIL_SYSTEM_ID: &str = "guardrail.system";

/// Prompt ID of the user message.
pub const GUARDRAIL_USER_ID: &str = "guardrail.user";

const GUARDRAIL_SYSTEM_TEMPLATE: &str = r#"You are a helpful assistant providing information about {{product}}.

CRITICAL RULES:
1. ONLY use information provided in the context
2. NEVER make up or hallucinate information
3. Always cite sources using the format [source:doc_id:chunk_id]
4. If information is marked as [FACTS], it comes from official documentation
5. If information is marked as [EXTERNAL], it comes from external sources like videos/reviews; say which tag backs each claim
{{#if sensitive}}
6. For pricing, warranty, availability, or purchase information:
   - ONLY use [FACTS] sources
   - REFUSE to answer if only [EXTERNAL] sources are available
   - Be explicit about the source of financial/commercial information
{{/if}}
7. Keep responses concise and factual
8. If you cannot provide a complete answer, say so clearly"#;

const GUARDRAIL_USER_TEMPLATE: &str = r#"Context:
{{context}}

Question: {{question}}

Please answer based ONLY on the provided context. Include appropriate citations."#;

/// Look up a built-in template by prompt ID.
pub fn builtin_template(id: &str) -> Option<&'static str> {
    match id {
        GUARDRAIL_SYSTEM_ID => Some(GUARDRAIL_SYSTEM_TEMPLATE),
        GUARDRAIL_USER_ID => Some(GUARDRAIL_USER_TEMPLATE),
        _ => None,
    }
}

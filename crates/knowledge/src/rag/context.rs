//! Context assembly: tagged, prioritized, length-bounded.

use crate::config::RetrievalConfig;
use crate::types::{Citation, PassageResult};

const PASSAGE_SEPARATOR: &str = "\n\n";
const TRUNCATION_MARKER: &str = "...";

/// Result of assembling a context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledContext {
    pub context: String,
    pub citations: Vec<Citation>,
    pub truncated: bool,
}

/// Builds the context handed to the answer generator.
///
/// Facts always precede external passages. When the joined text exceeds
/// `max_chars` it is cut at that many characters and `...` is appended;
/// passages that start at or past the cut lose their citation, partially
/// kept passages keep theirs.
#[derive(Debug, Clone, Copy)]
pub struct ContextAssembler {
    max_facts: usize,
    max_external: usize,
    max_chars: usize,
}

impl ContextAssembler {
    pub fn new(max_facts: usize, max_external: usize, max_chars: usize) -> Self {
        Self {
            max_facts,
            max_external,
            max_chars,
        }
    }

    pub fn from_config(config: &RetrievalConfig) -> Self {
        Self::new(
            config.max_facts_in_context,
            config.max_external_in_context,
            config.max_context_chars,
        )
    }

    /// Assemble ranked facts and (already filtered) external passages.
    ///
    /// Pass an empty `external` slice when external use was not permitted.
    pub fn assemble(&self, facts: &[PassageResult], external: &[PassageResult]) -> AssembledContext {
        let selected = facts
            .iter()
            .take(self.max_facts)
            .chain(external.iter().take(self.max_external));

        let mut context = String::new();
        let mut entries: Vec<(usize, Citation)> = Vec::new();
        let mut offset = 0;

        for passage in selected {
            if !context.is_empty() {
                context.push_str(PASSAGE_SEPARATOR);
                offset += PASSAGE_SEPARATOR.len();
            }

            let part = format!("{} {}", passage.source.context_tag(), passage.text);
            entries.push((offset, Citation::from_passage(passage)));
            offset += part.chars().count();
            context.push_str(&part);
        }

        if offset <= self.max_chars {
            return AssembledContext {
                context,
                citations: entries.into_iter().map(|(_, c)| c).collect(),
                truncated: false,
            };
        }

        let mut truncated: String = context.chars().take(self.max_chars).collect();
        truncated.push_str(TRUNCATION_MARKER);

        let kept = entries.len();
        let citations: Vec<Citation> = entries
            .into_iter()
            .filter(|(start, _)| *start < self.max_chars)
            .map(|(_, c)| c)
            .collect();

        tracing::info!(
            original_chars = offset,
            max_chars = self.max_chars,
            dropped_citations = kept - citations.len(),
            "Truncated context"
        );

        AssembledContext {
            context: truncated,
            citations,
            truncated: true,
        }
    }
}

impl Default for ContextAssembler {
    fn default() -> Self {
        Self::from_config(&RetrievalConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SourceKind;

    fn fact(id: &str, text: &str) -> PassageResult {
        PassageResult::new(id, text, SourceKind::Facts, Some(0.2))
    }

    fn external(id: &str, text: &str) -> PassageResult {
        PassageResult::new(id, text, SourceKind::External, Some(0.4))
    }

    #[test]
    fn test_facts_precede_external() {
        let facts = vec![
            fact("F001", "Range: 570 km"),
            fact("F002", "Battery: 82.5 kWh"),
            fact("F003:c1", "Charging: 150 kW"),
        ];
        let ext = vec![
            external("E001", "Quiet cabin"),
            external("E002:c0", "Smooth ride"),
        ];

        let assembled = ContextAssembler::default().assemble(&facts, &ext);

        assert_eq!(
            assembled.context,
            "[FACTS] Range: 570 km\n\n[FACTS] Battery: 82.5 kWh\n\n[FACTS] Charging: 150 kW\n\n[EXTERNAL] Quiet cabin\n\n[EXTERNAL] Smooth ride"
        );
        let ids: Vec<&str> = assembled.citations.iter().map(|c| c.chunk_id.as_str()).collect();
        assert_eq!(ids, vec!["F001", "F002", "F003:c1", "E001", "E002:c0"]);
        assert_eq!(assembled.citations[2].doc_id, "F003");
        assert_eq!(assembled.citations[4].source, SourceKind::External);
        assert!(!assembled.truncated);
    }

    #[test]
    fn test_caps_applied_in_rank_order() {
        let facts: Vec<PassageResult> = (1..=5)
            .map(|i| fact(&format!("F00{}", i), "fact"))
            .collect();
        let ext: Vec<PassageResult> = (1..=3)
            .map(|i| external(&format!("E00{}", i), "review"))
            .collect();

        let assembled = ContextAssembler::default().assemble(&facts, &ext);

        let ids: Vec<&str> = assembled.citations.iter().map(|c| c.chunk_id.as_str()).collect();
        assert_eq!(ids, vec!["F001", "F002", "F003", "E001", "E002"]);
    }

    #[test]
    fn test_empty_inputs() {
        let assembled = ContextAssembler::default().assemble(&[], &[]);
        assert!(assembled.context.is_empty());
        assert!(assembled.citations.is_empty());
    }

    #[test]
    fn test_truncation_appends_marker() {
        let facts = vec![fact("F001", &"a".repeat(3000))];
        let assembled = ContextAssembler::default().assemble(&facts, &[]);

        assert_eq!(assembled.context.chars().count(), 2003);
        assert!(assembled.context.ends_with("..."));
        assert!(assembled.context.starts_with("[FACTS] aaa"));
        assert_eq!(assembled.citations.len(), 1);
        assert!(assembled.truncated);
    }

    #[test]
    fn test_truncation_drops_citations_past_the_cut() {
        // "[FACTS] " + 40 chars = 48; separator 2; second part starts at 50
        let facts = vec![fact("F001", &"x".repeat(40)), fact("F002", &"y".repeat(40))];
        let ext = vec![external("E001", "z")];

        let assembled = ContextAssembler::new(3, 2, 60).assemble(&facts, &ext);

        let ids: Vec<&str> = assembled.citations.iter().map(|c| c.chunk_id.as_str()).collect();
        assert_eq!(ids, vec!["F001", "F002"]);
        assert_eq!(assembled.context.chars().count(), 63);
    }

    #[test]
    fn test_multibyte_text_cut_on_char_boundary() {
        let facts = vec![fact("F001", &"é".repeat(30))];
        let assembled = ContextAssembler::new(3, 2, 20).assemble(&facts, &[]);

        assert_eq!(assembled.context.chars().count(), 23);
    }

    #[test]
    fn test_assemble_is_deterministic() {
        let facts = vec![fact("F001", "Range: 570 km")];
        let assembler = ContextAssembler::default();
        assert_eq!(assembler.assemble(&facts, &[]), assembler.assemble(&facts, &[]));
    }
}

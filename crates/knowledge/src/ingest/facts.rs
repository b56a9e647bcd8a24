//! Official facts: markdown split at heading lines.

use crate::types::{Passage, SourceKind};
use factguard_core::{AppError, AppResult};
use serde_json::json;
use std::fs;
use std::path::Path;

/// Read a facts markdown file into one passage per non-empty section.
pub fn load_facts(path: &Path) -> AppResult<Vec<Passage>> {
    let content = fs::read_to_string(path).map_err(|e| {
        AppError::Ingestion(format!("Failed to read facts file {:?}: {}", path, e))
    })?;

    Ok(parse_facts(&content, &path.to_string_lossy()))
}

/// Split markdown into sections.
///
/// Every line starting with `#` opens a section. A section's text is its
/// heading line, a blank line, then its non-blank body lines. Sections
/// without body text are dropped and do not consume an id.
pub fn parse_facts(content: &str, file_path: &str) -> Vec<Passage> {
    let mut sections = SectionCollector::new(file_path);
    let mut heading = "";
    let mut body: Vec<&str> = Vec::new();

    for line in content.lines() {
        if line.starts_with('#') {
            sections.push(heading, &body);
            heading = line.trim();
            body.clear();
        } else if !line.trim().is_empty() {
            body.push(line);
        }
    }
    sections.push(heading, &body);

    sections.passages
}

struct SectionCollector<'a> {
    file_path: &'a str,
    passages: Vec<Passage>,
}

impl<'a> SectionCollector<'a> {
    fn new(file_path: &'a str) -> Self {
        Self {
            file_path,
            passages: Vec::new(),
        }
    }

    fn push(&mut self, heading: &str, body: &[&str]) {
        let text = body.join("\n");
        let text = text.trim();
        if text.is_empty() {
            return;
        }

        let section_id = self.passages.len();
        let metadata = json!({
            "section": heading,
            "file_path": self.file_path,
            "section_id": section_id,
        });

        self.passages.push(Passage {
            id: format!("F{:03}", section_id),
            text: format!("{}\n\n{}", heading, text),
            source: SourceKind::Facts,
            metadata: metadata.as_object().cloned().unwrap_or_default(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const FACTS: &str = "# BYD SEAL Facts\n\n## Range\nDriving range: 570 km\n\n## Empty\n\n## Colors\nArctic Blue\nAurora White\n";

    #[test]
    fn test_sections_become_passages() {
        let passages = parse_facts(FACTS, "data/facts.md");

        assert_eq!(passages.len(), 2);
        assert_eq!(passages[0].id, "F000");
        assert_eq!(passages[0].text, "## Range\n\nDriving range: 570 km");
        assert_eq!(passages[1].id, "F001");
        assert_eq!(passages[1].text, "## Colors\n\nArctic Blue\nAurora White");
        assert_eq!(passages[1].metadata["section"], json!("## Colors"));
        assert_eq!(passages[1].metadata["section_id"], json!(1));
        assert_eq!(passages[1].metadata["file_path"], json!("data/facts.md"));
        assert!(passages.iter().all(|p| p.source == SourceKind::Facts));
    }

    #[test]
    fn test_preamble_before_first_heading() {
        let passages = parse_facts("Intro line\n# Specs\nTorque: 670 Nm\n", "f.md");

        assert_eq!(passages.len(), 2);
        assert_eq!(passages[0].text, "\n\nIntro line");
        assert_eq!(passages[1].id, "F001");
    }

    #[test]
    fn test_missing_file_is_ingestion_error() {
        let temp = TempDir::new().unwrap();
        let result = load_facts(&temp.path().join("missing.md"));
        assert!(matches!(result, Err(AppError::Ingestion(_))));
    }
}

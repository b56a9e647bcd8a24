//! Retrieval and response type definitions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Separator between a document id and its chunk suffix (`F001:c2`).
pub const CHUNK_SEPARATOR: char = ':';

/// The two segregated knowledge partitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Authoritative, curated documentation
    Facts,
    /// Reviews, transcripts and other secondary material
    External,
}

impl SourceKind {
    /// Canonical lowercase name, also used as the partition key.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Facts => "facts",
            Self::External => "external",
        }
    }

    /// Tag rendered in front of a passage in the assembled context.
    pub fn context_tag(&self) -> &'static str {
        match self {
            Self::Facts => "[FACTS]",
            Self::External => "[EXTERNAL]",
        }
    }

    /// Parse a partition name.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "facts" => Some(Self::Facts),
            "external" => Some(Self::External),
            _ => None,
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A passage ready to be embedded and stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passage {
    /// Stable id, unique within its partition
    pub id: String,

    pub text: String,

    pub source: SourceKind,

    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

/// A single passage returned by a vector index search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassageResult {
    /// Stable id, `<DocPrefix><seq>[:c<chunkIdx>]`
    pub id: String,

    /// Passage text
    pub text: String,

    /// Partition the passage came from
    pub source: SourceKind,

    /// Vector distance in [0, 1], lower is closer; `None` when unknown
    pub distance: Option<f32>,

    /// Ingestion metadata (section, file path, channel, ...)
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl PassageResult {
    /// Create a passage with no metadata.
    pub fn new(
        id: impl Into<String>,
        text: impl Into<String>,
        source: SourceKind,
        distance: Option<f32>,
    ) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            source,
            distance,
            metadata: serde_json::Map::new(),
        }
    }

    /// The parent document id: everything before the chunk separator.
    pub fn doc_id(&self) -> &str {
        doc_id_of(&self.id)
    }
}

/// Strip the chunk suffix from a passage id.
pub fn doc_id_of(passage_id: &str) -> &str {
    passage_id
        .split(CHUNK_SEPARATOR)
        .next()
        .unwrap_or(passage_id)
}

/// A structured pointer tying an answer to a retrieved passage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub source: SourceKind,
    pub doc_id: String,
    pub chunk_id: String,
}

impl Citation {
    /// Derive the citation for a passage included in the context.
    pub fn from_passage(passage: &PassageResult) -> Self {
        Self {
            source: passage.source,
            doc_id: passage.doc_id().to_string(),
            chunk_id: passage.id.clone(),
        }
    }

    /// Inline marker in the `[source:doc_id:chunk_id]` form.
    pub fn marker(&self) -> String {
        format!("[{}:{}:{}]", self.source, self.doc_id, self.chunk_id)
    }
}

/// Everything the response policy needs to know about one retrieval.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalOutcome {
    /// Bounded, tagged context text
    pub context: String,

    /// Citations in inclusion order, facts before external
    pub citations: Vec<Citation>,

    /// Facts results found, before any capping
    pub facts_count: usize,

    /// External results returned by the external search, before filtering
    pub external_count: usize,

    /// Whether the query touches a protected topic
    pub is_sensitive: bool,

    /// Whether any external passage made it into the context
    pub used_external: bool,
}

/// Final status of a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStatus {
    Answered,
    Refused,
    NoData,
}

impl ResponseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Answered => "answered",
            Self::Refused => "refused",
            Self::NoData => "no_data",
        }
    }
}

impl fmt::Display for ResponseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The answer returned to the caller.
///
/// `Refused` and `NoData` never carry citations; `Answered` carries only
/// citations for passages present in the generator's context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardedResponse {
    pub answer: String,
    pub status: ResponseStatus,
    pub citations: Vec<Citation>,
}

impl GuardedResponse {
    /// A citation-free response with a fixed message.
    pub fn without_citations(answer: impl Into<String>, status: ResponseStatus) -> Self {
        Self {
            answer: answer.into(),
            status,
            citations: Vec::new(),
        }
    }
}

/// Readiness report for the vector index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    /// "healthy" when the index could be opened and counted
    pub status: String,

    /// Passages in the facts partition
    pub facts_documents: usize,

    /// Passages in the external partition
    pub external_documents: usize,

    /// Both partitions are populated
    pub ready: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Statistics from an ingest operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestStats {
    /// Facts passages written
    pub facts_passages: usize,

    /// External passages written
    pub external_passages: usize,

    /// True when the index was already populated and nothing was written
    pub skipped: bool,

    /// Duration in seconds
    pub duration_secs: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doc_id_strips_chunk_suffix() {
        assert_eq!(doc_id_of("F001:c2"), "F001");
        assert_eq!(doc_id_of("E014"), "E014");
    }

    #[test]
    fn test_citation_from_passage() {
        let passage = PassageResult::new("E003:c1", "smooth ride", SourceKind::External, None);
        let citation = Citation::from_passage(&passage);

        assert_eq!(citation.source, SourceKind::External);
        assert_eq!(citation.doc_id, "E003");
        assert_eq!(citation.chunk_id, "E003:c1");
        assert_eq!(citation.marker(), "[external:E003:E003:c1]");
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&ResponseStatus::NoData).unwrap();
        assert_eq!(json, "\"no_data\"");

        let response = GuardedResponse::without_citations("nothing", ResponseStatus::Refused);
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["status"], "refused");
        assert_eq!(value["citations"], serde_json::json!([]));
    }

    #[test]
    fn test_source_kind_round_trip_names() {
        assert_eq!(SourceKind::parse("facts"), Some(SourceKind::Facts));
        assert_eq!(SourceKind::parse("External"), None);
        assert_eq!(SourceKind::External.context_tag(), "[EXTERNAL]");
    }
}

//! External material: a JSON array of video records.

use crate::types::{Passage, SourceKind};
use factguard_core::{AppError, AppResult};
use serde::Deserialize;
use serde_json::json;
use std::fs;
use std::path::Path;

/// One record of the external export. Unknown fields are ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ExternalRecord {
    title: String,
    description: String,
    #[serde(rename = "transcriptText")]
    transcript_text: Option<Transcript>,
    video_id: String,
    channel_title: String,
    views: serde_json::Value,
    #[serde(rename = "publishedAt")]
    published_at: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Transcript {
    content: String,
}

/// Read an external JSON file into one passage per non-empty record.
pub fn load_external(path: &Path) -> AppResult<Vec<Passage>> {
    let content = fs::read_to_string(path).map_err(|e| {
        AppError::Ingestion(format!("Failed to read external file {:?}: {}", path, e))
    })?;

    parse_external(&content, &path.to_string_lossy())
}

/// Parse records. Ids follow the record's position in the array, so a
/// record without title, description or transcript leaves a gap.
pub fn parse_external(content: &str, file_path: &str) -> AppResult<Vec<Passage>> {
    let records: Vec<ExternalRecord> = serde_json::from_str(content).map_err(|e| {
        AppError::Ingestion(format!("Invalid external data in {}: {}", file_path, e))
    })?;

    let passages = records
        .into_iter()
        .enumerate()
        .filter_map(|(idx, record)| to_passage(idx, record, file_path))
        .collect();

    Ok(passages)
}

fn to_passage(idx: usize, record: ExternalRecord, file_path: &str) -> Option<Passage> {
    let transcript = record
        .transcript_text
        .map(|t| t.content)
        .unwrap_or_default();

    let parts: Vec<String> = [
        ("Title", &record.title),
        ("Description", &record.description),
        ("Transcript", &transcript),
    ]
    .into_iter()
    .filter(|(_, value)| !value.is_empty())
    .map(|(label, value)| format!("{}: {}", label, value))
    .collect();

    if parts.is_empty() {
        return None;
    }

    let views = if record.views.is_null() {
        json!(0)
    } else {
        record.views
    };

    let metadata = json!({
        "video_id": record.video_id,
        "channel": record.channel_title,
        "views": views,
        "published_at": record.published_at,
        "file_path": file_path,
    });

    Some(Passage {
        id: format!("E{:03}", idx),
        text: parts.join("\n\n"),
        source: SourceKind::External,
        metadata: metadata.as_object().cloned().unwrap_or_default(),
    })
}

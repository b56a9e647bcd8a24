//! Loading the facts and external sources into the vector index.

pub mod chunker;
pub mod external;
pub mod facts;

pub use chunker::Chunker;
pub use external::{load_external, parse_external};
pub use facts::{load_facts, parse_facts};

use crate::config::KnowledgeConfig;
use crate::index::SqliteIndex;
use crate::types::{IngestStats, SourceKind};
use crate::vector_index::VectorIndex;
use factguard_core::AppResult;
use std::path::Path;
use std::time::Instant;

/// Populate both partitions from the configured source files.
///
/// A populated index is left alone unless `reset` is set, so running
/// ingestion twice never duplicates passages.
pub async fn ingest_sources(
    index: &SqliteIndex,
    workspace: &Path,
    config: &KnowledgeConfig,
    reset: bool,
) -> AppResult<IngestStats> {
    let start = Instant::now();

    if reset {
        index.reset()?;
    } else {
        let facts = index.count(SourceKind::Facts).await?;
        let external = index.count(SourceKind::External).await?;
        if facts > 0 && external > 0 {
            tracing::info!(
                facts,
                external,
                "Index already populated, skipping ingestion (use --reset to rebuild)"
            );
            return Ok(IngestStats {
                skipped: true,
                duration_secs: start.elapsed().as_secs_f64(),
                ..IngestStats::default()
            });
        }
    }

    let chunker = Chunker::new(config.ingestion.chunk_size, config.ingestion.chunk_overlap);

    let facts_path = config.resolve(workspace, &config.ingestion.facts_file);
    let external_path = config.resolve(workspace, &config.ingestion.external_file);

    let facts = chunker.chunk_all(load_facts(&facts_path)?);
    let external = chunker.chunk_all(load_external(&external_path)?);

    tracing::info!(
        "Processed {} facts passages and {} external passages",
        facts.len(),
        external.len()
    );

    let facts_passages = index.upsert_passages(&facts).await?;
    let external_passages = index.upsert_passages(&external).await?;

    Ok(IngestStats {
        facts_passages,
        external_passages,
        skipped: false,
        duration_secs: start.elapsed().as_secs_f64(),
    })
}

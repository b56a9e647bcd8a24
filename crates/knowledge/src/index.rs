//! SQLite-backed vector index with one table partitioned by source.

use crate::embeddings::EmbeddingProvider;
use crate::types::{Passage, PassageResult, SourceKind};
use crate::vector_index::VectorIndex;
use chrono::Utc;
use factguard_core::{AppError, AppResult};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

/// Passages and their embeddings, stored in a single SQLite file.
///
/// Similarity is computed in process with a linear scan of the partition,
/// which is plenty for a product corpus of a few thousand passages.
pub struct SqliteIndex {
    conn: Mutex<Connection>,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl std::fmt::Debug for SqliteIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteIndex")
            .field("embedder", &self.embedder)
            .finish_non_exhaustive()
    }
}

impl SqliteIndex {
    /// Open (or create) the index at `db_path`.
    pub fn open(db_path: &Path, embedder: Arc<dyn EmbeddingProvider>) -> AppResult<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| AppError::Index(format!("Failed to create index directory: {}", e)))?;
        }

        let conn = Connection::open(db_path)
            .map_err(|e| AppError::Index(format!("Failed to open SQLite index: {}", e)))?;

        init_schema(&conn)?;

        tracing::debug!("Opened SQLite index at {:?}", db_path);
        Ok(Self {
            conn: Mutex::new(conn),
            embedder,
        })
    }

    /// In-memory index, used by tests and dry runs.
    pub fn open_in_memory(embedder: Arc<dyn EmbeddingProvider>) -> AppResult<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| AppError::Index(format!("Failed to open SQLite index: {}", e)))?;
        init_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
            embedder,
        })
    }

    fn lock(&self) -> AppResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| AppError::Index("Index connection lock poisoned".to_string()))
    }

    /// Embed and store passages, replacing any with the same id and partition.
    pub async fn upsert_passages(&self, passages: &[Passage]) -> AppResult<usize> {
        if passages.is_empty() {
            return Ok(0);
        }

        let texts: Vec<String> = passages.iter().map(|p| p.text.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;

        if embeddings.len() != passages.len() {
            return Err(AppError::Index(format!(
                "Embedder returned {} vectors for {} passages",
                embeddings.len(),
                passages.len()
            )));
        }

        let ingested_at = Utc::now().to_rfc3339();
        let mut conn = self.lock()?;
        let tx = conn
            .transaction()
            .map_err(|e| AppError::Index(format!("Failed to begin transaction: {}", e)))?;

        for (passage, embedding) in passages.iter().zip(&embeddings) {
            let metadata_json = serde_json::to_string(&passage.metadata)?;
            tx.execute(
                "INSERT OR REPLACE INTO passages (id, partition, text, embedding, metadata, ingested_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    passage.id,
                    passage.source.as_str(),
                    passage.text,
                    embedding_to_bytes(embedding),
                    metadata_json,
                    ingested_at,
                ],
            )
            .map_err(|e| AppError::Index(format!("Failed to insert passage {}: {}", passage.id, e)))?;
        }

        tx.commit()
            .map_err(|e| AppError::Index(format!("Failed to commit passages: {}", e)))?;

        tracing::debug!(count = passages.len(), "Upserted passages");
        Ok(passages.len())
    }

    /// Delete every passage in both partitions.
    pub fn reset(&self) -> AppResult<()> {
        self.lock()?
            .execute("DELETE FROM passages", [])
            .map_err(|e| AppError::Index(format!("Failed to reset index: {}", e)))?;

        tracing::info!("Reset vector index");
        Ok(())
    }

    fn load_partition(&self, partition: SourceKind) -> AppResult<Vec<StoredPassage>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare("SELECT id, text, embedding, metadata FROM passages WHERE partition = ?1")
            .map_err(|e| AppError::Index(format!("Failed to prepare query: {}", e)))?;

        let rows = stmt
            .query_map(params![partition.as_str()], |row| {
                Ok(RawRow {
                    id: row.get(0)?,
                    text: row.get(1)?,
                    embedding: row.get(2)?,
                    metadata: row.get(3)?,
                })
            })
            .map_err(|e| AppError::Index(format!("Failed to query passages: {}", e)))?;

        let mut stored = Vec::new();
        for row in rows {
            let row = row.map_err(|e| AppError::Index(format!("Failed to read passage: {}", e)))?;
            stored.push(StoredPassage {
                embedding: bytes_to_embedding(&row.embedding)?,
                metadata: serde_json::from_str(&row.metadata).map_err(|e| {
                    AppError::Index(format!("Corrupt metadata for passage {}: {}", row.id, e))
                })?,
                id: row.id,
                text: row.text,
            });
        }

        Ok(stored)
    }
}

struct RawRow {
    id: String,
    text: String,
    embedding: Vec<u8>,
    metadata: String,
}

struct StoredPassage {
    id: String,
    text: String,
    embedding: Vec<f32>,
    metadata: serde_json::Map<String, serde_json::Value>,
}

#[async_trait::async_trait]
impl VectorIndex for SqliteIndex {
    async fn search(
        &self,
        partition: SourceKind,
        query: &str,
        top_k: usize,
    ) -> AppResult<Vec<PassageResult>> {
        if top_k == 0 {
            return Ok(Vec::new());
        }

        let query_embedding = self.embedder.embed(query).await?;
        let stored = self.load_partition(partition)?;

        let mut results: Vec<PassageResult> = stored
            .into_iter()
            .map(|p| PassageResult {
                distance: Some(cosine_distance(&query_embedding, &p.embedding)),
                id: p.id,
                text: p.text,
                source: partition,
                metadata: p.metadata,
            })
            .collect();

        results.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });
        results.truncate(top_k);

        tracing::debug!(
            partition = %partition,
            "Retrieved {} passages (requested top-{})",
            results.len(),
            top_k
        );

        Ok(results)
    }

    async fn count(&self, partition: SourceKind) -> AppResult<usize> {
        let count: i64 = self
            .lock()?
            .query_row(
                "SELECT COUNT(*) FROM passages WHERE partition = ?1",
                params![partition.as_str()],
                |row| row.get(0),
            )
            .map_err(|e| AppError::Index(format!("Failed to count passages: {}", e)))?;

        Ok(count as usize)
    }
}

fn init_schema(conn: &Connection) -> AppResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS passages (
            id TEXT NOT NULL,
            partition TEXT NOT NULL,
            text TEXT NOT NULL,
            embedding BLOB NOT NULL,
            metadata TEXT NOT NULL,
            ingested_at TEXT NOT NULL,
            PRIMARY KEY (partition, id)
        );
        "#,
    )
    .map_err(|e| AppError::Index(format!("Failed to create tables: {}", e)))
}

fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|v| v.to_le_bytes()).collect()
}

fn bytes_to_embedding(bytes: &[u8]) -> AppResult<Vec<f32>> {
    if bytes.len() % 4 != 0 {
        return Err(AppError::Index("Invalid embedding bytes length".to_string()));
    }

    Ok(bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}

/// `1 - cosine`, clamped to [0, 1]. Zero or mismatched vectors are maximally distant.
fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 1.0;
    }

    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }

    (1.0 - dot / (norm_a * norm_b)).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::providers::trigram::TrigramProvider;
    use tempfile::TempDir;

    fn passage(id: &str, text: &str, source: SourceKind) -> Passage {
        Passage {
            id: id.to_string(),
            text: text.to_string(),
            source,
            metadata: serde_json::Map::new(),
        }
    }

    fn index() -> SqliteIndex {
        SqliteIndex::open_in_memory(Arc::new(TrigramProvider::new(256))).unwrap()
    }

    #[tokio::test]
    async fn test_partitions_are_separate() {
        let index = index();
        index
            .upsert_passages(&[
                passage("F001", "Driving range: 570 km", SourceKind::Facts),
                passage("F002", "Battery capacity: 82.5 kWh", SourceKind::Facts),
                passage("E001", "Driving range felt shorter in winter", SourceKind::External),
            ])
            .await
            .unwrap();

        assert_eq!(index.count(SourceKind::Facts).await.unwrap(), 2);
        assert_eq!(index.count(SourceKind::External).await.unwrap(), 1);

        let facts = index
            .search(SourceKind::Facts, "driving range", 5)
            .await
            .unwrap();
        assert_eq!(facts.len(), 2);
        assert!(facts.iter().all(|p| p.source == SourceKind::Facts));
        assert_eq!(facts[0].id, "F001");
    }

    #[tokio::test]
    async fn test_results_ascending_and_bounded() {
        let index = index();
        index
            .upsert_passages(&[
                passage("F001", "Exterior colors: Arctic Blue, Aurora White", SourceKind::Facts),
                passage("F002", "Charging: 150 kW DC fast charging", SourceKind::Facts),
                passage("F003", "Seats: ventilated front seats", SourceKind::Facts),
            ])
            .await
            .unwrap();

        let results = index
            .search(SourceKind::Facts, "fast charging speed", 2)
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, "F002");
        let distances: Vec<f32> = results.iter().map(|p| p.distance.unwrap()).collect();
        assert!(distances[0] <= distances[1]);
        assert!(distances.iter().all(|d| (0.0..=1.0).contains(d)));
    }

    #[tokio::test]
    async fn test_empty_partition_returns_empty() {
        let index = index();
        let results = index
            .search(SourceKind::External, "anything", 3)
            .await
            .unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_upsert_replaces_and_reset_clears() {
        let temp = TempDir::new().unwrap();
        let index = SqliteIndex::open(
            &temp.path().join("index.sqlite"),
            Arc::new(TrigramProvider::new(64)),
        )
        .unwrap();

        let mut first = passage("F001", "Range: 520 km", SourceKind::Facts);
        first
            .metadata
            .insert("section".to_string(), serde_json::json!("Range"));
        index.upsert_passages(&[first]).await.unwrap();
        index
            .upsert_passages(&[passage("F001", "Range: 570 km", SourceKind::Facts)])
            .await
            .unwrap();

        let results = index.search(SourceKind::Facts, "range", 5).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].text, "Range: 570 km");

        index.reset().unwrap();
        assert_eq!(index.count(SourceKind::Facts).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_corrupt_metadata_is_index_error() {
        let index = index();
        index
            .lock()
            .unwrap()
            .execute(
                "INSERT INTO passages (id, partition, text, embedding, metadata, ingested_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    "F001",
                    SourceKind::Facts.as_str(),
                    "Range: 570 km",
                    embedding_to_bytes(&[0.0; 256]),
                    "{not json",
                    "2024-01-01T00:00:00Z"
                ],
            )
            .unwrap();

        let result = index.search(SourceKind::Facts, "range", 5).await;
        assert!(matches!(result, Err(AppError::Index(_))));
    }

    #[test]
    fn test_cosine_distance() {
        assert!(cosine_distance(&[1.0, 0.0], &[1.0, 0.0]).abs() < 0.001);
        assert!((cosine_distance(&[1.0, 0.0], &[0.0, 1.0]) - 1.0).abs() < 0.001);
        assert_eq!(cosine_distance(&[1.0, 0.0], &[-1.0, 0.0]), 1.0);
        assert_eq!(cosine_distance(&[0.0, 0.0], &[1.0, 0.0]), 1.0);
    }

    #[test]
    fn test_embedding_bytes() {
        let bytes = embedding_to_bytes(&[0.5, -1.25]);
        assert_eq!(bytes.len(), 8);
        assert_eq!(bytes_to_embedding(&bytes).unwrap(), vec![0.5, -1.25]);
        assert!(bytes_to_embedding(&bytes[..3]).is_err());
    }
}

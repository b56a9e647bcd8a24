//! Vector index abstraction over the two knowledge partitions.

use crate::types::{PassageResult, SourceKind};
use factguard_core::AppResult;

/// Read side of a partitioned vector index.
///
/// The retrieval pipeline depends only on this trait, so tests can drive it
/// with scripted results and deployments can swap the storage engine.
#[async_trait::async_trait]
pub trait VectorIndex: Send + Sync {
    /// Top-`top_k` passages of `partition` for `query`, ascending distance.
    ///
    /// An empty partition yields an empty list, not an error.
    async fn search(
        &self,
        partition: SourceKind,
        query: &str,
        top_k: usize,
    ) -> AppResult<Vec<PassageResult>>;

    /// Number of passages stored in `partition`.
    async fn count(&self, partition: SourceKind) -> AppResult<usize>;
}

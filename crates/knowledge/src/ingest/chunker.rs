//! Word-window chunking with overlap.

use crate::types::Passage;

/// Approximate characters per word used to turn character budgets into word counts.
const CHARS_PER_WORD: usize = 5;

/// Splits long passages into overlapping word windows.
///
/// Passages no longer than `chunk_size` characters pass through unchanged.
/// Longer ones become windows of `chunk_size / 5` words advancing by
/// `(chunk_size - overlap) / 5` words, with ids `<parent>:c<n>`.
#[derive(Debug, Clone, Copy)]
pub struct Chunker {
    chunk_size: usize,
    chunk_words: usize,
    step: usize,
}

impl Chunker {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        let chunk_words = (chunk_size / CHARS_PER_WORD).max(1);
        let overlap_words = chunk_overlap / CHARS_PER_WORD;
        let step = chunk_words.saturating_sub(overlap_words).max(1);

        Self {
            chunk_size,
            chunk_words,
            step,
        }
    }

    /// Chunk every passage, preserving document order.
    pub fn chunk_all(&self, passages: Vec<Passage>) -> Vec<Passage> {
        passages
            .into_iter()
            .flat_map(|p| self.chunk(p))
            .collect()
    }

    /// Chunk a single passage.
    pub fn chunk(&self, passage: Passage) -> Vec<Passage> {
        if passage.text.chars().count() <= self.chunk_size {
            return vec![passage];
        }

        let words: Vec<&str> = passage.text.split_whitespace().collect();
        let mut chunks = Vec::new();
        let mut start = 0;

        while start < words.len() {
            let end = (start + self.chunk_words).min(words.len());

            let mut metadata = passage.metadata.clone();
            metadata.insert("chunk_start".to_string(), start.into());
            metadata.insert("parent_id".to_string(), passage.id.clone().into());

            chunks.push(Passage {
                id: format!("{}:c{}", passage.id, start / self.step),
                text: words[start..end].join(" "),
                source: passage.source,
                metadata,
            });

            if start + self.chunk_words >= words.len() {
                break;
            }
            start += self.step;
        }

        tracing::trace!(
            parent = %passage.id,
            chunks = chunks.len(),
            "Chunked passage"
        );

        chunks
    }
}

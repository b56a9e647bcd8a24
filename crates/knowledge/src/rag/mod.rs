//! Guarded retrieval-augmented answering.

pub mod context;
pub mod respond;
pub mod retrieve;

pub use context::{AssembledContext, ContextAssembler};
pub use respond::{with_citation_markers, ResponsePolicy};
pub use retrieve::Retriever;

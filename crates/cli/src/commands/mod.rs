//! Command handlers for the factguard CLI.

pub mod ask;
pub mod health;
pub mod ingest;

// Re-export command types for convenience
pub use ask::AskCommand;
pub use health::HealthCommand;
pub use ingest::IngestCommand;

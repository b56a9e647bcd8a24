//! Ingest command handler.

use clap::Args;
use factguard_core::{config::AppConfig, AppResult};

/// Load the facts and external sources into the index
#[derive(Args, Debug)]
pub struct IngestCommand {
    /// Clear the index and ingest again
    #[arg(long)]
    pub reset: bool,

    /// Write the default knowledge.yaml first if none exists
    #[arg(long)]
    pub init_config: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl IngestCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ingest command");

        if self.init_config {
            let (path, created) = factguard_knowledge::init_config(&config.workspace)?;
            if created {
                eprintln!("Wrote default configuration to {}", path.display());
            } else {
                tracing::debug!("Keeping existing configuration at {:?}", path);
            }
        }

        let stats = factguard_knowledge::ingest(&config.workspace, self.reset).await?;

        if self.json {
            let output = serde_json::json!({
                "factsPassages": stats.facts_passages,
                "externalPassages": stats.external_passages,
                "skipped": stats.skipped,
                "durationSecs": stats.duration_secs,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else if stats.skipped {
            println!("Index already populated; nothing to do (use --reset to rebuild)");
        } else {
            println!("✓ Ingestion complete");
            println!("  Facts passages:    {}", stats.facts_passages);
            println!("  External passages: {}", stats.external_passages);
            println!("  Duration:          {:.2}s", stats.duration_secs);
        }

        Ok(())
    }
}

//! Health command handler.

use clap::Args;
use factguard_core::{config::AppConfig, AppResult};

/// Report whether the index is populated and usable
#[derive(Args, Debug)]
pub struct HealthCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl HealthCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing health command");

        let report = factguard_knowledge::health(&config.workspace).await;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
            return Ok(());
        }

        println!("Status:             {}", report.status);
        println!("Facts documents:    {}", report.facts_documents);
        println!("External documents: {}", report.external_documents);
        println!("Ready:              {}", report.ready);
        if let Some(error) = &report.error {
            println!("Error:              {}", error);
        }

        Ok(())
    }
}

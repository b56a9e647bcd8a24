//! Ask command handler.
//!
//! Answers a product question through the guarded retrieval pipeline.

use clap::Args;
use factguard_core::{config::AppConfig, AppError, AppResult};
use factguard_knowledge::{GuardedResponse, ResponseStatus};
use factguard_llm::create_client;

/// Ask a question about the product
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub question: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    /// Execute the ask command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");

        if self.question.trim().is_empty() {
            return Err(AppError::Config("Question cannot be empty".to_string()));
        }

        config.validate()?;

        let client = create_client(&config.provider, config.endpoint.as_deref())?;

        let response =
            factguard_knowledge::ask(&config.workspace, &self.question, client, &config.model)
                .await?;

        if self.json {
            let json = serde_json::to_string_pretty(&response)?;
            println!("{}", json);
        } else {
            print_response(&response);
        }

        Ok(())
    }
}

fn print_response(response: &GuardedResponse) {
    println!("{}", response.answer);

    if response.status != ResponseStatus::Answered {
        println!();
        println!("Status: {}", response.status);
        return;
    }

    if !response.citations.is_empty() {
        println!();
        println!("Sources:");
        for citation in &response.citations {
            println!("  {}", citation.marker());
        }
    }
}

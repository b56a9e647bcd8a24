//! factguard CLI
//!
//! Main entry point for the factguard command-line tool.
//! Answers product questions from official facts and vetted external
//! material, refusing commercial claims the facts do not back.

mod commands;

use clap::{Parser, Subcommand};
use commands::{AskCommand, HealthCommand, IngestCommand};
use factguard_core::{config::AppConfig, logging, AppResult};
use std::path::PathBuf;

/// factguard - guarded product Q&A over official facts and external sources
#[derive(Parser, Debug)]
#[command(name = "factguard")]
#[command(about = "Guarded product Q&A with cited answers", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "FACTGUARD_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "FACTGUARD_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    /// Answer generator provider (ollama)
    #[arg(short, long, global = true, env = "FACTGUARD_PROVIDER")]
    provider: Option<String>,

    /// Answer generator model
    #[arg(short, long, global = true, env = "FACTGUARD_MODEL")]
    model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ask a question about the product
    Ask(AskCommand),

    /// Load the facts and external sources into the index
    Ingest(IngestCommand),

    /// Report index readiness
    Health(HealthCommand),
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Ask(_) => "ask",
            Commands::Ingest(_) => "ingest",
            Commands::Health(_) => "health",
        }
    }
}

#[tokio::main]
async fn main() -> AppResult<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    // Load base configuration from environment and config file
    let config = AppConfig::load()?;

    // Apply CLI overrides
    let config = config.with_overrides(
        cli.workspace,
        cli.config,
        cli.provider,
        cli.model,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    logging::init_logging(config.log_level.as_deref(), config.no_color)?;

    tracing::info!("factguard starting");
    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!("Provider: {}", config.provider);
    tracing::debug!("Model: {}", config.model);

    config.ensure_state_dir()?;

    let _span = tracing::info_span!("command", name = cli.command.name()).entered();

    let result = match cli.command {
        Commands::Ask(cmd) => cmd.execute(&config).await,
        Commands::Ingest(cmd) => cmd.execute(&config).await,
        Commands::Health(cmd) => cmd.execute(&config).await,
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}

mod preview;
mod run;
mod wiring;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "outreach-cli")]
#[command(about = "Personalized B2B outreach campaigns")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Generate and send one message per prospect in a record file
    Run(run::RunArgs),
    /// Generate the message for a single prospect without sending it
    Preview(preview::PreviewArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = outreach_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    // stdout carries the report; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let orchestrator = wiring::build_orchestrator(&config)?;
    match cli.command {
        Commands::Run(args) => run::run_campaign(&orchestrator, &config, &args).await,
        Commands::Preview(args) => preview::run_preview(&orchestrator, &config, &args).await,
    }
}

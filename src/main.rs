//! # Configuration Controller Entry Point

use anyhow::Context;
use clap::{Parser, Subcommand};
use controller::{
    config::ConfigLoader, server::run_server, storage::Storage, telemetry::init_tracing,
};
use tracing::info;

#[derive(Parser)]
#[command(name = "controller", version, about = "Cluster configuration controller")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the REST API (default)
    Serve,
    /// Apply pending schema migrations and exit
    Migrate,
    /// Print the effective configuration with credentials redacted
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration from layered env files and variables
    let config = ConfigLoader::new().load()?;
    init_tracing(&config)?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Config => {
            println!("{}", config.redacted_json()?);
        }
        Command::Migrate => {
            let storage = Storage::connect(&config).await?;
            storage.init().await.context("migration failed")?;
            info!("migrations applied");
        }
        Command::Serve => {
            info!(profile = %config.profile, "starting configuration controller");
            let storage = Storage::connect(&config).await?;
            run_server(config, storage).await?;
        }
    }

    Ok(())
}

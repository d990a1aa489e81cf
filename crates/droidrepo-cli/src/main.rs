//! droidrepo CLI

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use droidrepo_cli::{Cli, Commands, Settings, cmd};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let settings = Settings::from_cli(&cli)?;

    match cli.command {
        Commands::Install { manifest, serial } => {
            cmd::install::install(&manifest, serial.as_deref(), &settings).await
        }
        Commands::Fetch { app_id, repo, arch } => {
            cmd::fetch::fetch(&app_id, &repo, arch, &settings).await
        }
    }
}

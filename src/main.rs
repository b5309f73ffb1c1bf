//! Fusion Hub CLI entry point.

use anyhow::Result;
use clap::Parser;
use fusionhub::cli::{commands, Cli, Commands};
use fusionhub::config::{ApiKeys, Settings};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine; keys may come from the environment.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Load configuration
    let config_path = cli.config.as_ref().map(PathBuf::from);
    let settings = Settings::load_from(config_path.as_ref())?;

    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| settings.log_filter(cli.verbose)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let keys = ApiKeys::from_env();

    match &cli.command {
        Commands::Chat { surface } => {
            commands::run_chat(surface, settings, keys).await?;
        }

        Commands::Caption { image, prompt } => {
            commands::run_caption(image, prompt.clone(), settings, keys).await?;
        }

        Commands::Audio { file } => {
            commands::run_audio(file, settings, keys).await?;
        }

        Commands::Video { url } => {
            commands::run_video(url, settings, keys).await?;
        }

        Commands::Serve { host, port } => {
            commands::run_serve(host.clone(), *port, settings, keys).await?;
        }

        Commands::Doctor => {
            commands::run_doctor(&settings, &keys, config_path.as_deref())?;
        }

        Commands::Config { action } => {
            commands::run_config(action, settings, config_path.as_deref())?;
        }
    }

    Ok(())
}

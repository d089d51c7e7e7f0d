//! tubechat CLI entry point.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use tubechat::cli::{commands, Cli, Commands};
use tubechat::config::Settings;

#[tokio::main]
async fn main() -> Result<()> {
    // Credentials may come from a .env file in the working directory
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Initialize logging
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("tubechat={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Load configuration
    let config_path = Settings::resolve_path(cli.config.as_deref());
    let settings = Settings::load_from(Some(&config_path))?;

    match cli.command {
        None => {
            commands::run_serve(None, None, settings).await?;
        }

        Some(Commands::Serve { host, port }) => {
            commands::run_serve(host, port, settings).await?;
        }

        Some(Commands::Chat) => {
            commands::run_chat(settings).await?;
        }

        Some(Commands::Ask { question, links }) => {
            commands::run_ask(&question, &links, settings).await?;
        }

        Some(Commands::Config { action }) => {
            commands::run_config(&action, settings, &config_path)?;
        }
    }

    Ok(())
}

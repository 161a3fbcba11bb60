//! linkedin-connector CLI entry point

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod args;
mod commands;
mod config;
mod custom_handler;

use args::{Cli, Commands, LogFormat};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Loaded once; a broken config is reported by the command that needs it
    let loaded = config::AppConfig::load(cli.config.as_deref());
    let file_config = loaded.as_ref().ok();

    // Flags win over the config file
    let log_level = cli
        .log_level
        .clone()
        .or_else(|| file_config.map(|c| c.general.log_level.clone()))
        .unwrap_or_else(|| "info".to_string());
    let log_format = cli.log_format.unwrap_or_else(|| {
        match file_config.map(|c| c.general.log_format.as_str()) {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    });
    init_logging(&log_level, log_format)?;

    match cli.command {
        Commands::Handle(args) => commands::handle::execute(args, &loaded?).await,
        Commands::Serve(args) => commands::serve::execute(args, &loaded?).await,
        Commands::Config(args) => commands::config::execute(args, loaded).await,
        Commands::Doctor(args) => commands::doctor::execute(args, loaded).await,
    }
}

fn init_logging(level: &str, format: LogFormat) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;

    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormat::Pretty => registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init(),
    }

    Ok(())
}

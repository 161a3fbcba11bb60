//! CLI argument definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// linkedin-connector: publishes content hub items to LinkedIn when a queue message arrives
#[derive(Parser, Debug)]
#[command(name = "linkedin-connector")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log output format
    #[arg(long, global = true, value_enum)]
    pub log_format: Option<LogFormat>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Process a single trigger message
    Handle(HandleArgs),

    /// Run as an Azure Functions custom handler
    Serve(ServeArgs),

    /// Configuration management
    Config(ConfigArgs),

    /// Validate configuration and show status
    Doctor(DoctorArgs),
}

#[derive(Args, Debug)]
pub struct HandleArgs {
    /// Trigger message JSON, e.g. '{"saveEntityMessage": {"TargetId": 35361}}'
    #[arg(long, conflicts_with = "file")]
    pub message: Option<String>,

    /// File containing the trigger message (use - for stdin)
    #[arg(long, conflicts_with = "message")]
    pub file: Option<PathBuf>,

    /// Queue message id used for duplicate detection
    #[arg(long)]
    pub message_id: Option<String>,

    /// Resolve content without publishing
    #[arg(long)]
    pub dry_run: bool,

    /// Output the outcome as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Port to listen on (overrides FUNCTIONS_CUSTOMHANDLER_PORT and config)
    #[arg(long)]
    pub port: Option<u16>,

    /// Resolve content without publishing
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Generate example configuration file
    Init {
        /// Path to write config file
        #[arg(long, default_value = "./config.toml")]
        path: PathBuf,

        /// Overwrite existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration after environment overrides
    Show,
}

#[derive(Args, Debug)]
pub struct DoctorArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

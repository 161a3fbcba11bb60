//! Config command - configuration management

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

use crate::args::{ConfigArgs, ConfigCommands};
use crate::config::AppConfig;

/// `init` ignores the loaded configuration so it works before any file exists
pub async fn execute(args: ConfigArgs, loaded: Result<AppConfig>) -> Result<()> {
    match args.command {
        ConfigCommands::Init { path, force } => init_config(path, force).await,
        ConfigCommands::Show => show_config(&loaded?),
    }
}

async fn init_config(path: PathBuf, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            path.display()
        );
    }

    let content = AppConfig::example_toml();

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
    }

    fs::write(&path, content)
        .with_context(|| format!("Failed to write config file: {}", path.display()))?;

    println!("Created config file: {}", path.display());
    println!();
    println!("Next steps:");
    println!("  1. Set the content hub host, client id and user");
    println!("  2. Export the secret env vars named in the config");
    println!("  3. Run 'linkedin-connector doctor' to validate your setup");
    println!(
        "  4. Run 'linkedin-connector handle --dry-run --message '{{\"saveEntityMessage\":{{\"TargetId\":1}}}}'' to test"
    );

    Ok(())
}

/// Secrets are referenced by env var name, so the dump never contains them
fn show_config(config: &AppConfig) -> Result<()> {
    let rendered = toml::to_string_pretty(config).context("Failed to render configuration")?;
    print!("{}", rendered);
    Ok(())
}

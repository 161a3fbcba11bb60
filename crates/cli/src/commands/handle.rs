//! Handle command - process one trigger message

use anyhow::{Context, Result, bail};
use linkedin_connector_adapters::{
    content_hub::{ContentHubSource, PasswordGrant},
    delivery::{InMemoryDeliveryLog, SqliteDeliveryLog},
    linkedin::LinkedInPublisher,
};
use linkedin_connector_domain::{
    Clock, ContentSource, DeliveryLog, InvocationOutcome, PlannedImage, PublishedMedia,
    SocialPublisher, SystemClock, TriggerMessage,
    usecases::{InvocationConfig, InvocationHandler},
};
use secrecy::SecretString;
use std::io::{self, Read};
use std::sync::Arc;
use std::time::Duration;

use crate::args::HandleArgs;
use crate::config::AppConfig;

/// Handler wired against trait objects so every backend choice shares one type
pub(crate) type Handler =
    InvocationHandler<dyn ContentSource, dyn SocialPublisher, dyn DeliveryLog, dyn Clock>;

pub async fn execute(args: HandleArgs, config: &AppConfig) -> Result<()> {
    let raw = get_message_text(&args)?;
    if raw.trim().is_empty() {
        bail!("No trigger message provided");
    }

    let mut trigger =
        TriggerMessage::from_json(raw.trim()).context("Failed to parse trigger message")?;
    if let Some(message_id) = args.message_id {
        trigger = trigger.with_message_id(message_id);
    }

    let dry_run = args.dry_run || config.general.dry_run;
    let handler = build_handler(config, dry_run).await?;

    let outcome = handler
        .handle(&trigger)
        .await
        .context("Failed to publish content")?;

    if args.json {
        let json = serde_json::to_string_pretty(&outcome).context("Failed to serialize outcome")?;
        println!("{}", json);
    } else {
        print_outcome(&outcome);
    }

    Ok(())
}

/// Build the invocation handler from configuration.
///
/// In dry-run mode the LinkedIn publisher is disabled and no token is required.
pub(crate) async fn build_handler(config: &AppConfig, dry_run: bool) -> Result<Handler> {
    let timeout = Duration::from_secs(config.general.request_timeout_secs);

    let content_source: Arc<dyn ContentSource> = Arc::new(build_content_source(config, timeout)?);
    let publisher: Arc<dyn SocialPublisher> = Arc::new(build_publisher(config, dry_run, timeout)?);
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    tracing::info!(
        content_hub = %config.content_hub.host,
        dry_run = dry_run,
        dedupe = config.dedupe.enabled,
        "Building invocation handler"
    );

    let handler = InvocationHandler::new(
        content_source,
        publisher,
        clock,
        InvocationConfig { dry_run },
    );

    match build_delivery_log(config).await? {
        Some(log) => Ok(handler.with_delivery_log(log)),
        None => Ok(handler),
    }
}

fn build_content_source(config: &AppConfig, timeout: Duration) -> Result<ContentHubSource> {
    let hub = &config.content_hub;

    if hub.host.trim().is_empty() {
        bail!("No content hub host configured");
    }
    if hub.client_id.trim().is_empty() {
        bail!("No content hub client_id configured");
    }
    if hub.username.trim().is_empty() {
        bail!("No content hub username configured");
    }

    let grant = PasswordGrant {
        client_id: hub.client_id.clone(),
        client_secret: load_secret(&hub.client_secret_env, "content hub client secret")?,
        username: hub.username.clone(),
        password: load_secret(&hub.password_env, "content hub password")?,
    };

    Ok(ContentHubSource::with_timeout(hub.host.trim(), grant, timeout))
}

fn build_publisher(
    config: &AppConfig,
    dry_run: bool,
    timeout: Duration,
) -> Result<LinkedInPublisher> {
    if dry_run {
        return Ok(LinkedInPublisher::disabled());
    }

    let linkedin = &config.linkedin;
    if linkedin.person_id.trim().is_empty() {
        bail!("No LinkedIn person_id configured");
    }

    let token = load_secret(&linkedin.token_env, "LinkedIn access token")?;
    Ok(LinkedInPublisher::with_base_url(
        token,
        &linkedin.person_id,
        linkedin.base_url.clone(),
        timeout,
    ))
}

async fn build_delivery_log(config: &AppConfig) -> Result<Option<Arc<dyn DeliveryLog>>> {
    if !config.dedupe.enabled {
        return Ok(None);
    }

    let log: Arc<dyn DeliveryLog> = match config.dedupe.backend.trim() {
        "sqlite" => Arc::new(
            SqliteDeliveryLog::new(&config.dedupe.db_path)
                .await
                .context("Failed to initialize SQLite delivery log")?,
        ),
        "memory" => Arc::new(InMemoryDeliveryLog::new()),
        other => bail!("Invalid dedupe backend: {}", other),
    };

    Ok(Some(log))
}

/// Read a secret from the environment variable named in config
pub(crate) fn load_secret(env_var: &str, purpose: &str) -> Result<SecretString> {
    if env_var.trim().is_empty() {
        bail!("No env var configured for {}", purpose);
    }

    let value = std::env::var(env_var)
        .with_context(|| format!("Missing env var {} for {}", env_var, purpose))?;

    if value.trim().is_empty() {
        bail!("Env var {} is empty for {}", env_var, purpose);
    }

    Ok(SecretString::new(value.into()))
}

fn get_message_text(args: &HandleArgs) -> Result<String> {
    if let Some(ref message) = args.message {
        return Ok(message.clone());
    }

    if let Some(ref path) = args.file {
        if path.as_os_str() != "-" {
            return std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read file: {}", path.display()));
        }
    }

    let mut text = String::new();
    io::stdin()
        .read_to_string(&mut text)
        .context("Failed to read from stdin")?;
    Ok(text)
}

fn print_outcome(outcome: &InvocationOutcome) {
    match outcome {
        InvocationOutcome::NotFound { target_id } => {
            println!("Content {} not found, nothing published", target_id);
        }
        InvocationOutcome::Duplicate { message_id } => {
            println!("Message {} already delivered, skipped", message_id);
        }
        InvocationOutcome::DryRun {
            target_id,
            title,
            image,
        } => {
            println!("[DRY RUN] Content {}", target_id);
            println!("  Title: {}", title);
            match image {
                PlannedImage::Selected {
                    asset_id,
                    rendition,
                } => println!("  Image: asset {} ({})", asset_id, rendition.name),
                PlannedImage::Unavailable { asset_id } => {
                    println!("  Image: asset {} has no usable rendition", asset_id)
                }
                PlannedImage::NoLinkedAssets => println!("  Image: none"),
            }
        }
        InvocationOutcome::Published {
            target_id,
            post_id,
            media,
        } => {
            println!(
                "Published content {} as {}",
                target_id,
                post_id.as_deref().unwrap_or("(no post id returned)")
            );
            match media {
                PublishedMedia::Text => println!("  Media: none"),
                PublishedMedia::Image {
                    asset_urn,
                    uploaded,
                } => println!("  Media: {} (uploaded: {})", asset_urn, uploaded),
                PublishedMedia::Missing { asset_id } => {
                    println!("  Media: asset {} had no usable rendition", asset_id)
                }
            }
        }
    }
}

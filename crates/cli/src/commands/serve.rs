//! Serve command - Azure Functions custom handler

use anyhow::{Context, Result};
use std::sync::Arc;

use crate::args::ServeArgs;
use crate::commands::handle::build_handler;
use crate::config::AppConfig;
use crate::custom_handler::{self, AppState};

/// Port variable set by the Functions host for custom handlers
const PORT_ENV: &str = "FUNCTIONS_CUSTOMHANDLER_PORT";

pub async fn execute(args: ServeArgs, config: &AppConfig) -> Result<()> {
    let dry_run = args.dry_run || config.general.dry_run;
    let port = resolve_port(args.port, std::env::var(PORT_ENV).ok(), config.trigger.port)?;

    let handler = build_handler(config, dry_run).await?;
    let state = Arc::new(AppState {
        handler,
        binding: config.trigger.binding.clone(),
    });
    let app = custom_handler::router(&config.trigger.function_name, state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!(
        addr = %addr,
        function = %config.trigger.function_name,
        binding = %config.trigger.binding,
        dry_run = dry_run,
        "Custom handler ready"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("linkedin-connector serve stopped");
    Ok(())
}

/// `--port` wins over the host-provided variable, which wins over config
fn resolve_port(flag: Option<u16>, env: Option<String>, configured: u16) -> Result<u16> {
    if let Some(port) = flag {
        return Ok(port);
    }

    match env {
        Some(value) if !value.trim().is_empty() => value
            .trim()
            .parse()
            .with_context(|| format!("Invalid {}: {}", PORT_ENV, value)),
        _ => Ok(configured),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            tracing::info!("Received terminate signal");
        },
    }

    tracing::info!("Shutting down gracefully");
}

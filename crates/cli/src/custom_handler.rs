//! Azure Functions custom handler surface
//!
//! The Functions host forwards each Service Bus trigger as
//! `POST /{function_name}` with a body of the form
//! `{"Data": {"<binding>": <message>}, "Metadata": {"MessageId": "..."}}`
//! and expects `{"Outputs": {}, "Logs": [...], "ReturnValue": null}` back.
//! A non-2xx status marks the invocation failed so the host can redeliver.

use axum::{Json, Router, body::Bytes, extract::State, http::StatusCode, routing::post};
use linkedin_connector_domain::{InvocationOutcome, TriggerError, TriggerMessage};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::commands::handle::Handler;

/// Shared state for the invocation route
pub struct AppState {
    pub handler: Handler,
    pub binding: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InvokeRequest {
    #[serde(default)]
    data: Map<String, Value>,
    #[serde(default)]
    metadata: Map<String, Value>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct InvokeResponse {
    pub outputs: Map<String, Value>,
    pub logs: Vec<String>,
    pub return_value: Option<Value>,
}

impl InvokeResponse {
    fn with_log(log: impl Into<String>) -> Self {
        Self {
            outputs: Map::new(),
            logs: vec![log.into()],
            return_value: None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum RequestError {
    #[error("Invalid invocation body: {0}")]
    Body(#[source] serde_json::Error),
    #[error("Binding '{0}' missing from invocation data")]
    MissingBinding(String),
    #[error("Invalid trigger message: {0}")]
    Trigger(#[from] TriggerError),
}

pub fn router(function_name: &str, state: Arc<AppState>) -> Router {
    Router::new()
        .route(&format!("/{}", function_name.trim_matches('/')), post(invoke))
        .with_state(state)
}

async fn invoke(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> (StatusCode, Json<InvokeResponse>) {
    let trigger = match parse_invocation(&body, &state.binding) {
        Ok(trigger) => trigger,
        Err(e) => {
            tracing::warn!(error = %e, "Rejected invocation");
            return (
                StatusCode::BAD_REQUEST,
                Json(InvokeResponse::with_log(e.to_string())),
            );
        }
    };

    match state.handler.handle(&trigger).await {
        Ok(outcome) => (
            StatusCode::OK,
            Json(InvokeResponse::with_log(describe(&outcome))),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(InvokeResponse::with_log(format!(
                "Failed to publish content {}: {}",
                trigger.target_id, e
            ))),
        ),
    }
}

fn parse_invocation(body: &[u8], binding: &str) -> Result<TriggerMessage, RequestError> {
    let request: InvokeRequest = serde_json::from_slice(body).map_err(RequestError::Body)?;

    let message = request
        .data
        .get(binding)
        .ok_or_else(|| RequestError::MissingBinding(binding.to_string()))?;

    let mut trigger = parse_message(message)?;

    if let Some(message_id) = request.metadata.get("MessageId").and_then(message_id) {
        trigger = trigger.with_message_id(message_id);
    }

    Ok(trigger)
}

/// The host passes the queue body either as an object or as a JSON string,
/// sometimes encoded twice.
fn parse_message(message: &Value) -> Result<TriggerMessage, TriggerError> {
    match message {
        Value::String(raw) => match serde_json::from_str::<Value>(raw)? {
            Value::String(inner) => TriggerMessage::from_json(&inner),
            value => TriggerMessage::from_value(&value),
        },
        value => TriggerMessage::from_value(value),
    }
}

fn message_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let id = s.trim().trim_matches('"');
            (!id.is_empty()).then(|| id.to_string())
        }
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

fn describe(outcome: &InvocationOutcome) -> String {
    match outcome {
        InvocationOutcome::NotFound { target_id } => {
            format!("Content {} not found, nothing published", target_id)
        }
        InvocationOutcome::Duplicate { message_id } => {
            format!("Message {} already delivered, skipped", message_id)
        }
        InvocationOutcome::DryRun { target_id, .. } => {
            format!("Dry run for content {}, nothing published", target_id)
        }
        InvocationOutcome::Published {
            target_id, post_id, ..
        } => format!(
            "Published content {} as {}",
            target_id,
            post_id.as_deref().unwrap_or("(no post id returned)")
        ),
    }
}

//! HTTP server for Slack slash commands and interactions.

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use incident::views::{self, CREATE_INCIDENT_CALLBACK, RESOLVE_INCIDENT_CALLBACK};
use incident::{Coordinator, IncidentError, ResolutionTrigger};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::webhooks::{
    validate_request_timestamp, verify_slack_signature, InteractionEnvelope, InteractionPayload,
    SlashCommand, SubmittedView, SIGNATURE_HEADER, TIMESTAMP_HEADER,
};

/// Slash command that opens the creation form.
pub const INCIDENT_COMMAND: &str = "/incident";

/// Slash command that starts resolution.
pub const RESOLVE_COMMAND: &str = "/resolve-incident";

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Configuration.
    pub config: Arc<Config>,
    /// Incident workflow.
    pub coordinator: Arc<Coordinator>,
}

/// Build the HTTP router for the incident manager.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/slack/commands", post(slash_command_handler))
        .route("/slack/interactions", post(interaction_handler))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

/// Reject requests that are unsigned, badly signed or stale.
fn verify_request(config: &Config, headers: &HeaderMap, body: &[u8]) -> Result<(), StatusCode> {
    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());

    let Some(timestamp) = header(TIMESTAMP_HEADER) else {
        warn!("Missing X-Slack-Request-Timestamp header");
        return Err(StatusCode::UNAUTHORIZED);
    };
    let Some(signature) = header(SIGNATURE_HEADER) else {
        warn!("Missing X-Slack-Signature header");
        return Err(StatusCode::UNAUTHORIZED);
    };

    if !validate_request_timestamp(timestamp, config.max_request_age_secs) {
        warn!(timestamp = %timestamp, "Slack request timestamp is stale");
        return Err(StatusCode::UNAUTHORIZED);
    }
    if !verify_slack_signature(body, timestamp, signature, &config.signing_secret) {
        warn!("Invalid Slack request signature");
        return Err(StatusCode::UNAUTHORIZED);
    }

    debug!("Slack request signature verified");
    Ok(())
}

fn ephemeral(text: impl Into<String>) -> Response {
    Json(json!({
        "response_type": "ephemeral",
        "text": text.into()
    }))
    .into_response()
}

/// Handle incoming slash commands.
pub async fn slash_command_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, StatusCode> {
    verify_request(&state.config, &headers, &body)?;

    let command: SlashCommand = serde_urlencoded::from_bytes(&body).map_err(|e| {
        error!("Failed to parse slash command: {e}");
        StatusCode::BAD_REQUEST
    })?;

    info!(
        command = %command.command,
        user_id = %command.user_id,
        channel_id = %command.channel_id,
        "Received slash command"
    );

    let result = match command.command.as_str() {
        INCIDENT_COMMAND => state.coordinator.open_creation_form(&command.trigger_id).await,
        RESOLVE_COMMAND => {
            state
                .coordinator
                .request_resolution(&ResolutionTrigger {
                    trigger_id: command.trigger_id,
                    channel_id: command.channel_id,
                    channel_name: command.channel_name,
                })
                .await
        }
        other => {
            debug!(command = %other, "Ignoring unknown slash command");
            return Ok(ephemeral(format!("Unknown command `{other}`.")));
        }
    };

    match result {
        Ok(()) => Ok(StatusCode::OK.into_response()),
        Err(e) => {
            if let Some(message) = e.user_message() {
                info!(reason = %e, "Slash command rejected");
                Ok(ephemeral(message))
            } else {
                error!(error = %e, "Slash command failed");
                Ok(ephemeral("Something went wrong, check the incident manager logs."))
            }
        }
    }
}

/// Handle interaction payloads (modal submissions).
///
/// Submissions are acknowledged immediately; the workflow continues on a
/// spawned task.
pub async fn interaction_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, StatusCode> {
    verify_request(&state.config, &headers, &body)?;

    let envelope: InteractionEnvelope = serde_urlencoded::from_bytes(&body).map_err(|e| {
        error!("Failed to parse interaction body: {e}");
        StatusCode::BAD_REQUEST
    })?;
    let payload: InteractionPayload = serde_json::from_str(&envelope.payload).map_err(|e| {
        error!("Failed to parse interaction payload: {e}");
        StatusCode::BAD_REQUEST
    })?;

    match payload {
        InteractionPayload::ViewSubmission { user, view } => {
            info!(callback_id = %view.callback_id, user_id = %user.id, "Received view submission");
            dispatch_submission(&state, &user.id, &view);
        }
        InteractionPayload::Unknown => debug!("Ignoring unhandled interaction type"),
    }

    Ok(StatusCode::OK)
}

fn dispatch_submission(state: &AppState, user_id: &str, view: &SubmittedView) {
    let coordinator = Arc::clone(&state.coordinator);

    match view.callback_id.as_str() {
        CREATE_INCIDENT_CALLBACK => {
            let request = match views::parse_creation_submission(&view.state, user_id) {
                Ok(request) => request,
                Err(e) => {
                    warn!(error = %e, "Discarding creation submission");
                    return;
                }
            };
            tokio::spawn(async move {
                match coordinator.create_incident(&request).await {
                    Ok(created) => info!(
                        incident = %created.name,
                        channel_id = %created.channel_id,
                        "Incident creation completed"
                    ),
                    Err(e) => log_failure("create", &e),
                }
            });
        }
        RESOLVE_INCIDENT_CALLBACK => {
            let metadata = match views::parse_resolve_metadata(&view.private_metadata) {
                Ok(metadata) => metadata,
                Err(e) => {
                    warn!(error = %e, "Discarding resolution submission");
                    return;
                }
            };
            let submitter = user_id.to_string();
            tokio::spawn(async move {
                match coordinator.resolve_incident(&metadata.channel_id).await {
                    Ok(resolved) => info!(
                        incident = %metadata.incident_name,
                        channel_name = %resolved.channel_name,
                        "Incident resolution completed"
                    ),
                    Err(e) => {
                        log_failure("resolve", &e);
                        if let Some(message) = e.user_message() {
                            if let Err(e) = coordinator.message_user(&submitter, &message).await {
                                error!(user_id = %submitter, error = %e, "Failed to notify submitter");
                            }
                        }
                    }
                }
            });
        }
        other => debug!(callback_id = %other, "Ignoring unknown view submission"),
    }
}

fn log_failure(action: &str, e: &IncidentError) {
    match e {
        IncidentError::Precondition(reason) => {
            warn!(action, reason = %reason, "Incident workflow rejected");
        }
        IncidentError::FanOut(fan_out) => {
            error!(
                action,
                failed = ?fan_out.failed_labels(),
                error = %fan_out,
                "Incident workflow partially failed"
            );
        }
        _ => error!(action, error = %e, "Incident workflow failed"),
    }
}

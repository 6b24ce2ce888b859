//! Webhook server for the conversational framework
//!
//! The framework POSTs the next action name plus the tracker; the server
//! runs that action and answers with its events and collected replies.

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::actions::ActionRegistry;
use crate::dispatcher::CollectingDispatcher;
use crate::error::ActionServerError;
use crate::models::{ActionCall, ActionResponse};

/// =============================
/// Response Models
/// =============================

#[derive(Debug, Serialize, Deserialize)]
pub struct ActionError {
    pub error: String,
    pub action_name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ActionInfo {
    pub name: String,
}

/// =============================
/// API State
/// =============================

#[derive(Clone)]
pub struct ApiState {
    pub registry: Arc<ActionRegistry>,
}

/// =============================
/// Health Endpoint
/// =============================

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// =============================
/// Action Listing
/// =============================

async fn list_actions(State(state): State<ApiState>) -> Json<Vec<ActionInfo>> {
    Json(
        state
            .registry
            .list()
            .into_iter()
            .map(|name| ActionInfo {
                name: name.to_string(),
            })
            .collect(),
    )
}

/// =============================
/// Webhook Endpoint
/// =============================

async fn webhook(
    State(state): State<ApiState>,
    Json(call): Json<ActionCall>,
) -> Result<Json<ActionResponse>, (StatusCode, Json<ActionError>)> {
    let action_name = call.next_action.clone();

    let Some(action) = state.registry.get(&action_name) else {
        warn!(action = %action_name, "Unknown action requested");
        let err = ActionServerError::ActionNotFound(action_name.clone());
        return Err((
            StatusCode::NOT_FOUND,
            Json(ActionError {
                error: err.to_string(),
                action_name,
            }),
        ));
    };

    let sender_id = call
        .sender_id
        .as_deref()
        .unwrap_or(&call.tracker.sender_id)
        .to_string();
    let span = info_span!(
        "action",
        action = %action_name,
        sender_id = %sender_id,
        invocation_id = %Uuid::new_v4()
    );

    async move {
        info!("Running action");

        let mut dispatcher = CollectingDispatcher::new();
        match action.run(&mut dispatcher, &call.tracker, &call.domain).await {
            Ok(events) => {
                let responses = dispatcher.into_messages();
                info!(
                    events = events.len(),
                    responses = responses.len(),
                    "Action finished"
                );
                Ok(Json(ActionResponse { events, responses }))
            }
            Err(e) => {
                error!(error = %e, "Action failed");
                Err((
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ActionError {
                        error: ActionServerError::ActionFailed(e.to_string()).to_string(),
                        action_name,
                    }),
                ))
            }
        }
    }
    .instrument(span)
    .await
}

/// =============================
/// Router
/// =============================

pub fn create_router(registry: Arc<ActionRegistry>) -> Router {
    let state = ApiState { registry };

    Router::new()
        .route("/health", get(health))
        .route("/actions", get(list_actions))
        .route("/webhook", post(webhook))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// =============================
/// Server Startup
/// =============================

pub async fn start_server(
    registry: Arc<ActionRegistry>,
    port: u16,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let router = create_router(registry);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!("Action server listening on http://0.0.0.0:{}", port);
    info!("Webhook: http://127.0.0.1:{}/webhook", port);

    axum::serve(listener, router).await?;

    Ok(())
}

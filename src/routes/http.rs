// HTTP handlers: ingestion POST, polling view GETs, latest-data

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};

use super::AppState;
use crate::models::Topic;
use crate::normalizer;
use crate::version::{NAME, VERSION};
use crate::views;

/// GET /version — returns service name and version (from Cargo.toml at build time).
pub(super) async fn version_handler() -> impl IntoResponse {
    Json(json!({
        "name": NAME,
        "version": VERSION,
    }))
}

/// POST /iot-data — ingest one snapshot. The response is determined solely
/// by parse + persist; the per-topic fan-out afterwards is best-effort.
pub(super) async fn ingest(State(state): State<AppState>, body: Bytes) -> Response {
    let payload: Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(e) => {
            return error_response(StatusCode::BAD_REQUEST, format!("invalid JSON body: {}", e));
        }
    };

    let reading = match normalizer::normalize(&payload) {
        Ok(r) => r,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e.to_string()),
    };

    let record = match state.repo.insert(&reading).await {
        Ok(r) => r,
        Err(e) => {
            tracing::error!(error = %e, operation = "insert", "telemetry insert failed");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string());
        }
    };

    // Durable write done. Each topic recomputes and publishes independently;
    // a failure on one topic must not stop the others or change the response.
    for topic in Topic::ALL {
        match views::build_view(&state.repo, topic).await {
            Ok(view) => {
                let delivered = state.broadcaster.publish(topic, view);
                tracing::debug!(topic = %topic, delivered, "view published");
            }
            Err(e) => {
                tracing::error!(topic = %topic, error = %e, "view recompute failed, skipping publish");
            }
        }
    }

    (
        StatusCode::CREATED,
        Json(json!({ "message": "telemetry created", "id": record.id })),
    )
        .into_response()
}

/// GET /latest-data — the single most recent record, fully serialized.
pub(super) async fn latest_data(State(state): State<AppState>) -> Response {
    match state.repo.latest().await {
        Ok(Some(record)) => (StatusCode::OK, Json(record)).into_response(),
        Ok(None) => error_response(
            StatusCode::NOT_FOUND,
            "No telemetry data available".to_string(),
        ),
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

pub(super) async fn dashboard_data(State(state): State<AppState>) -> Response {
    view_response(&state, Topic::Dashboard).await
}

pub(super) async fn hardware_data(State(state): State<AppState>) -> Response {
    view_response(&state, Topic::Hardware).await
}

pub(super) async fn energy_data(State(state): State<AppState>) -> Response {
    view_response(&state, Topic::Energy).await
}

pub(super) async fn network_data(State(state): State<AppState>) -> Response {
    view_response(&state, Topic::Network).await
}

pub(super) async fn scores_data(State(state): State<AppState>) -> Response {
    view_response(&state, Topic::Scores).await
}

/// Synchronous alternative to the WebSocket subscription: same view-model shape.
async fn view_response(state: &AppState, topic: Topic) -> Response {
    match views::build_view(&state.repo, topic).await {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(e) => {
            tracing::error!(topic = %topic, error = %e, "view build failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

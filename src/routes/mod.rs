// HTTP + WebSocket routes

mod http;
mod ws;

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::broadcaster::Broadcaster;
use crate::telemetry_repo::TelemetryRepo;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) repo: Arc<TelemetryRepo>,
    pub(crate) broadcaster: Arc<Broadcaster>,
}

pub fn app(repo: Arc<TelemetryRepo>, broadcaster: Arc<Broadcaster>) -> Router {
    let state = AppState { repo, broadcaster };
    Router::new()
        .route("/version", get(http::version_handler)) // GET /version
        .route("/iot-data", post(http::ingest)) // POST /iot-data
        .route("/latest-data", get(http::latest_data)) // GET /latest-data
        .route("/dashboard-data", get(http::dashboard_data)) // GET /dashboard-data
        .route("/api/hardware", get(http::hardware_data)) // GET /api/hardware
        .route("/api/energy", get(http::energy_data)) // GET /api/energy
        .route("/api/network", get(http::network_data)) // GET /api/network
        .route("/api/scores", get(http::scores_data)) // GET /api/scores
        .route("/ws/dashboard", get(ws::ws_dashboard)) // WS /ws/dashboard
        .route("/ws/hardware", get(ws::ws_hardware)) // WS /ws/hardware
        .route("/ws/energy", get(ws::ws_energy)) // WS /ws/energy
        .route("/ws/network", get(ws::ws_network)) // WS /ws/network
        .route("/ws/scores", get(ws::ws_scores)) // WS /ws/scores
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}

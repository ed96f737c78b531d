// WebSocket subscription handlers: one endpoint per topic.
// Lifecycle per connection: subscribe -> snapshot send -> forward publishes
// until the client goes away; dropping the receiver is the unsubscribe.

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use bytes::Bytes;
use tokio::sync::broadcast;
use tokio::time::{Duration, timeout};

use super::AppState;
use crate::broadcaster::ViewPayload;
use crate::models::Topic;
use crate::views;

pub(super) const WS_PING_INTERVAL: Duration = Duration::from_secs(30);
pub(super) const WS_SEND_TIMEOUT: Duration = Duration::from_secs(10);

pub(super) async fn ws_dashboard(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws_topic(ws, state, Topic::Dashboard)
}

pub(super) async fn ws_hardware(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws_topic(ws, state, Topic::Hardware)
}

pub(super) async fn ws_energy(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws_topic(ws, state, Topic::Energy)
}

pub(super) async fn ws_network(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws_topic(ws, state, Topic::Network)
}

pub(super) async fn ws_scores(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws_topic(ws, state, Topic::Scores)
}

fn ws_topic(ws: WebSocketUpgrade, state: AppState, topic: Topic) -> impl IntoResponse {
    ws.on_upgrade(move |socket| async move {
        // Subscribe before the snapshot read so an update landing in
        // between is queued rather than lost.
        let mut rx = state.broadcaster.subscribe(topic);
        if let Err(e) = stream_topic(socket, &mut rx, &state, topic).await {
            tracing::info!(topic = %topic, "Topic stream error: {}", e);
        }
        tracing::info!(topic = %topic, "Client disconnected from topic stream");
    })
}

async fn stream_topic(
    mut socket: WebSocket,
    rx: &mut broadcast::Receiver<ViewPayload>,
    state: &AppState,
    topic: Topic,
) -> anyhow::Result<()> {
    tracing::info!(topic = %topic, "Client connected to topic stream");

    // Initial snapshot: same shape as the polling GET, no envelope.
    let snapshot = views::build_view(&state.repo, topic).await?;
    let snapshot_json = serde_json::to_string(&snapshot)?;
    let r = timeout(
        WS_SEND_TIMEOUT,
        socket.send(Message::Text(snapshot_json.into())),
    )
    .await;
    if r.is_err() || r.unwrap_or(Ok(())).is_err() {
        return Ok(());
    }

    let mut ping_interval = tokio::time::interval(WS_PING_INTERVAL);
    ping_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    loop {
        tokio::select! {
            result = rx.recv() => {
                match result {
                    Ok(view) => {
                        let envelope = serde_json::json!({ "type": "data_update", "data": &*view });
                        let json = serde_json::to_string(&envelope)?;
                        let r = timeout(WS_SEND_TIMEOUT, socket.send(Message::Text(json.into()))).await;
                        if r.is_err() || r.unwrap_or(Ok(())).is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(topic = %topic, "WebSocket client lagged, skipped {} updates", n);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
            _ = ping_interval.tick() => {
                let r = timeout(WS_SEND_TIMEOUT, socket.send(Message::Ping(Bytes::new()))).await;
                if r.is_err() || r.unwrap_or(Ok(())).is_err() {
                    break;
                }
            }
        }
    }
    Ok(())
}

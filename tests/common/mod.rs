// Shared test helpers

use iotserver::broadcaster::Broadcaster;
use iotserver::models::SensorReading;
use iotserver::routes;
use iotserver::telemetry_repo::TelemetryRepo;
use std::sync::Arc;
use tempfile::TempDir;

/// Fresh repo backed by a temp SQLite file. Keep the TempDir alive for the
/// duration of the test.
pub async fn temp_repo() -> (TempDir, Arc<TelemetryRepo>) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("telemetry.db");
    let repo = TelemetryRepo::connect(path.to_str().unwrap(), 2)
        .await
        .unwrap();
    repo.init().await.unwrap();
    (dir, Arc::new(repo))
}

#[allow(dead_code)]
pub fn reading_with_cpu(cpu: i64) -> SensorReading {
    SensorReading {
        cpu_usage: cpu,
        ..Default::default()
    }
}

#[allow(dead_code)]
pub async fn test_app() -> (TempDir, axum::Router, Arc<TelemetryRepo>, Arc<Broadcaster>) {
    let (dir, repo) = temp_repo().await;
    let broadcaster = Arc::new(Broadcaster::new(16));
    let app = routes::app(repo.clone(), broadcaster.clone());
    (dir, app, repo, broadcaster)
}

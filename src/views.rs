// View-model builders: one per topic. Chart series cover the recent window
// (oldest -> newest, left to right); averages cover the entire history.

use serde_json::{Value, json};

use crate::models::{TelemetryRecord, Topic};
use crate::telemetry_repo::TelemetryRepo;

/// Records per chart series and latest-rows table.
pub const RECENT_WINDOW: u32 = 10;

/// Build the view-model for one topic from current storage state.
/// Deterministic for a fixed storage state.
pub async fn build_view(repo: &TelemetryRepo, topic: Topic) -> anyhow::Result<Value> {
    match topic {
        Topic::Dashboard => dashboard_view(repo).await,
        Topic::Hardware => hardware_view(repo).await,
        Topic::Energy => energy_view(repo).await,
        Topic::Network => network_view(repo).await,
        Topic::Scores => scores_view(repo).await,
    }
}

async fn dashboard_view(repo: &TelemetryRepo) -> anyhow::Result<Value> {
    let recent = repo.get_recent(RECENT_WINDOW).await?;

    let cpu_data: Vec<i64> = oldest_first(&recent, |r| r.reading.cpu_usage);
    let ram_data: Vec<i64> = oldest_first(&recent, |r| r.reading.ram_usage);
    let power_data: Vec<i64> = oldest_first(&recent, |r| r.reading.power_watts);
    let eco_data: Vec<i64> = oldest_first(&recent, |r| r.reading.eco_score);
    let co2_data: Vec<i64> = oldest_first(&recent, |r| r.reading.co2_equiv_g);

    let latest_data: Vec<Value> = recent
        .iter()
        .map(|r| {
            json!({
                "id": r.id,
                "hardware_sensor_id": r.reading.hardware_sensor_id,
                "cpu_usage": r.reading.cpu_usage,
                "ram_usage": r.reading.ram_usage,
                "power_watts": r.reading.power_watts,
                "eco_score": r.reading.eco_score,
                "created_at": r.created_at.to_rfc3339(),
            })
        })
        .collect();

    Ok(json!({
        "chart_labels": chart_labels(&recent),
        "cpu_data": cpu_data,
        "ram_data": ram_data,
        "power_data": power_data,
        "eco_data": eco_data,
        "co2_data": co2_data,
        "latest_data": latest_data,
    }))
}

async fn hardware_view(repo: &TelemetryRepo) -> anyhow::Result<Value> {
    let recent = repo.get_recent(RECENT_WINDOW).await?;
    let avgs = repo
        .averages(&["cpu_usage", "ram_usage", "battery_health", "age_years"])
        .await?;

    let cpu_data: Vec<i64> = oldest_first(&recent, |r| r.reading.cpu_usage);
    let ram_data: Vec<i64> = oldest_first(&recent, |r| r.reading.ram_usage);
    let battery_data: Vec<f64> = oldest_first(&recent, |r| r.reading.battery_health);
    let age_data: Vec<i64> = oldest_first(&recent, |r| r.reading.age_years);

    let latest_data: Vec<Value> = recent
        .iter()
        .map(|r| {
            json!({
                "id": r.id,
                "hardware_sensor_id": r.reading.hardware_sensor_id,
                "cpu_usage": r.reading.cpu_usage,
                "ram_usage": r.reading.ram_usage,
                "battery_health": r.reading.battery_health,
                "age_years": r.reading.age_years,
                "created_at": r.created_at.to_rfc3339(),
            })
        })
        .collect();

    Ok(json!({
        "chart_labels": chart_labels(&recent),
        "cpu_data": cpu_data,
        "ram_data": ram_data,
        "battery_data": battery_data,
        "age_data": age_data,
        "latest_data": latest_data,
        "avg_cpu": round1(avgs[0]),
        "avg_ram": round1(avgs[1]),
        "avg_battery": round1(avgs[2]),
        "avg_age": round1(avgs[3]),
    }))
}

async fn energy_view(repo: &TelemetryRepo) -> anyhow::Result<Value> {
    let recent = repo.get_recent(RECENT_WINDOW).await?;
    let avgs = repo
        .averages(&["power_watts", "co2_equiv_g", "overheating", "active_devices"])
        .await?;

    let power_data: Vec<i64> = oldest_first(&recent, |r| r.reading.power_watts);
    let co2_data: Vec<i64> = oldest_first(&recent, |r| r.reading.co2_equiv_g);
    let overheating_data: Vec<i64> = oldest_first(&recent, |r| r.reading.overheating);
    let active_devices_data: Vec<i64> = oldest_first(&recent, |r| r.reading.active_devices);

    let latest_data: Vec<Value> = recent
        .iter()
        .map(|r| {
            json!({
                "id": r.id,
                "energy_sensor_id": r.reading.energy_sensor_id,
                "power_watts": r.reading.power_watts,
                "co2_equiv_g": r.reading.co2_equiv_g,
                "overheating": r.reading.overheating,
                "active_devices": r.reading.active_devices,
                "created_at": r.created_at.to_rfc3339(),
            })
        })
        .collect();

    Ok(json!({
        "chart_labels": chart_labels(&recent),
        "power_data": power_data,
        "co2_data": co2_data,
        "overheating_data": overheating_data,
        "active_devices_data": active_devices_data,
        "latest_data": latest_data,
        "avg_power": round1(avgs[0]),
        "avg_co2": round1(avgs[1]),
        "avg_overheating": round1(avgs[2]),
        // Device count average is reported as a whole number.
        "avg_active": round1(avgs[3]) as i64,
    }))
}

async fn network_view(repo: &TelemetryRepo) -> anyhow::Result<Value> {
    let recent = repo.get_recent(RECENT_WINDOW).await?;
    let avgs = repo
        .averages(&[
            "network_load_mbps",
            "requests_per_min",
            "cloud_dependency_score",
        ])
        .await?;

    let network_load_data: Vec<i64> = oldest_first(&recent, |r| r.reading.network_load_mbps);
    let requests_data: Vec<i64> = oldest_first(&recent, |r| r.reading.requests_per_min);
    let cloud_dependency_data: Vec<i64> =
        oldest_first(&recent, |r| r.reading.cloud_dependency_score);

    let latest_data: Vec<Value> = recent
        .iter()
        .map(|r| {
            json!({
                "id": r.id,
                "network_sensor_id": r.reading.network_sensor_id,
                "network_load_mbps": r.reading.network_load_mbps,
                "requests_per_min": r.reading.requests_per_min,
                "cloud_dependency_score": r.reading.cloud_dependency_score,
                "created_at": r.created_at.to_rfc3339(),
            })
        })
        .collect();

    Ok(json!({
        "chart_labels": chart_labels(&recent),
        "network_load_data": network_load_data,
        "requests_data": requests_data,
        "cloud_dependency_data": cloud_dependency_data,
        "latest_data": latest_data,
        "avg_network_load": round1(avgs[0]),
        "avg_requests": round1(avgs[1]) as i64,
        "avg_cloud": round1(avgs[2]),
    }))
}

async fn scores_view(repo: &TelemetryRepo) -> anyhow::Result<Value> {
    let recent = repo.get_recent(RECENT_WINDOW).await?;
    let avgs = repo
        .averages(&[
            "eco_score",
            "obsolescence_score",
            "bigtech_dependency",
            "co2_savings_kg_year",
        ])
        .await?;

    let eco_data: Vec<i64> = oldest_first(&recent, |r| r.reading.eco_score);
    let obsolescence_data: Vec<i64> = oldest_first(&recent, |r| r.reading.obsolescence_score);
    let bigtech_data: Vec<i64> = oldest_first(&recent, |r| r.reading.bigtech_dependency);
    let co2_savings_data: Vec<i64> = oldest_first(&recent, |r| r.reading.co2_savings_kg_year);

    let latest_data: Vec<Value> = recent
        .iter()
        .map(|r| {
            json!({
                "id": r.id,
                "eco_score": r.reading.eco_score,
                "obsolescence_score": r.reading.obsolescence_score,
                "bigtech_dependency": r.reading.bigtech_dependency,
                "co2_savings_kg_year": r.reading.co2_savings_kg_year,
                "created_at": r.created_at.to_rfc3339(),
            })
        })
        .collect();

    Ok(json!({
        "chart_labels": chart_labels(&recent),
        "eco_data": eco_data,
        "obsolescence_data": obsolescence_data,
        "bigtech_data": bigtech_data,
        "co2_savings_data": co2_savings_data,
        "latest_data": latest_data,
        "avg_eco": round1(avgs[0]),
        "avg_obsolescence": round1(avgs[1]),
        "avg_bigtech": round1(avgs[2]),
        "avg_co2_savings": round1(avgs[3]),
    }))
}

/// Chart labels aligned index-for-index with each data series.
/// `recent` is newest-first from the repo, so reverse for display order.
fn chart_labels(recent: &[TelemetryRecord]) -> Vec<String> {
    recent
        .iter()
        .rev()
        .map(|r| {
            r.created_at
                .with_timezone(&chrono::Local)
                .format("%H:%M:%S")
                .to_string()
        })
        .collect()
}

fn oldest_first<T>(recent: &[TelemetryRecord], f: impl Fn(&TelemetryRecord) -> T) -> Vec<T> {
    recent.iter().rev().map(f).collect()
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

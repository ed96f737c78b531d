// Telemetry record and topic models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The five fan-out topics. Each maps one-to-one to a view builder and a
/// WebSocket route, so an unknown topic cannot exist at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    Dashboard,
    Hardware,
    Energy,
    Network,
    Scores,
}

impl Topic {
    pub const ALL: [Topic; 5] = [
        Topic::Dashboard,
        Topic::Hardware,
        Topic::Energy,
        Topic::Network,
        Topic::Scores,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Topic::Dashboard => "dashboard",
            Topic::Hardware => "hardware",
            Topic::Energy => "energy",
            Topic::Network => "network",
            Topic::Scores => "scores",
        }
    }

    /// Position in [`Topic::ALL`]; used to index per-topic channels.
    pub fn index(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One normalized sensor snapshot, ready for insert. Every field has a
/// defined default so a partial payload always yields a complete reading.
/// The three agent timestamps come from agent clocks and are informational
/// only; ordering uses the server-assigned `created_at` on [`TelemetryRecord`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorReading {
    // Hardware
    pub hardware_sensor_id: String,
    pub hardware_timestamp: i64,
    pub age_years: i64,
    pub cpu_usage: i64,
    pub ram_usage: i64,
    pub battery_health: f64,
    pub os: String,
    pub win11_compat: bool,

    // Energy
    pub energy_sensor_id: String,
    pub energy_timestamp: i64,
    pub power_watts: i64,
    pub active_devices: i64,
    pub overheating: i64,
    pub co2_equiv_g: i64,

    // Network
    pub network_sensor_id: String,
    pub network_timestamp: i64,
    pub network_load_mbps: i64,
    pub requests_per_min: i64,
    pub cloud_dependency_score: i64,

    // Derived scores
    pub eco_score: i64,
    pub obsolescence_score: i64,
    pub bigtech_dependency: i64,
    pub co2_savings_kg_year: i64,
    pub recommendations: Map<String, Value>,
}

impl Default for SensorReading {
    fn default() -> Self {
        Self {
            hardware_sensor_id: "unknown".into(),
            hardware_timestamp: 0,
            age_years: 0,
            cpu_usage: 0,
            ram_usage: 0,
            battery_health: 0.0,
            os: "unknown".into(),
            win11_compat: false,
            energy_sensor_id: "unknown".into(),
            energy_timestamp: 0,
            power_watts: 0,
            active_devices: 0,
            overheating: 0,
            co2_equiv_g: 0,
            network_sensor_id: "unknown".into(),
            network_timestamp: 0,
            network_load_mbps: 0,
            requests_per_min: 0,
            cloud_dependency_score: 0,
            eco_score: 0,
            obsolescence_score: 0,
            bigtech_dependency: 0,
            co2_savings_kg_year: 0,
            recommendations: Map::new(),
        }
    }
}

/// A persisted reading: `id` and `created_at` are assigned by the store at
/// insert time. Immutable once written.
#[derive(Debug, Clone, Serialize)]
pub struct TelemetryRecord {
    pub id: i64,
    #[serde(flatten)]
    pub reading: SensorReading,
    pub created_at: DateTime<Utc>,
}

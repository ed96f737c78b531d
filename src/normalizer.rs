// Payload normalization: loosely structured flat-or-nested JSON -> complete SensorReading

use serde_json::{Map, Value};
use thiserror::Error;

use crate::models::SensorReading;

#[derive(Debug, Error)]
pub enum NormalizeError {
    /// The only failure mode: the body is not a JSON object.
    /// Missing fields are absorbed by defaults, never an error.
    #[error("request body must be a JSON object")]
    NotAnObject,
}

/// Lookup scope for one subsystem: the optional nested sub-object plus the
/// payload root. Every field resolves nested key -> root key -> default,
/// uniformly. A value of the wrong JSON type counts as absent.
struct Scope<'a> {
    nested: Option<&'a Map<String, Value>>,
    root: &'a Map<String, Value>,
}

impl<'a> Scope<'a> {
    fn new(root: &'a Map<String, Value>, section: &str) -> Self {
        let nested = root.get(section).and_then(Value::as_object);
        Self { nested, root }
    }

    fn raw(&self, nested_key: &str, root_key: &str) -> Option<&'a Value> {
        self.nested
            .and_then(|n| n.get(nested_key))
            .or_else(|| self.root.get(root_key))
    }

    fn int(&self, nested_key: &str, root_key: &str) -> i64 {
        self.raw(nested_key, root_key)
            .and_then(Value::as_i64)
            .unwrap_or(0)
    }

    fn float(&self, nested_key: &str, root_key: &str) -> f64 {
        self.raw(nested_key, root_key)
            .and_then(Value::as_f64)
            .unwrap_or(0.0)
    }

    fn string(&self, nested_key: &str, root_key: &str, default: &str) -> String {
        self.raw(nested_key, root_key)
            .and_then(Value::as_str)
            .unwrap_or(default)
            .to_string()
    }

    fn boolean(&self, nested_key: &str, root_key: &str) -> bool {
        self.raw(nested_key, root_key)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    fn object(&self, nested_key: &str, root_key: &str) -> Map<String, Value> {
        self.raw(nested_key, root_key)
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default()
    }
}

/// Normalize an inbound payload into a complete reading. Accepts both the
/// nested shape (`{"hardware": {"sensor_id": ...}, ...}`) and the flat shape
/// (`{"hardware_sensor_id": ...}`); a mix of the two also works.
pub fn normalize(payload: &Value) -> Result<SensorReading, NormalizeError> {
    let root = payload.as_object().ok_or(NormalizeError::NotAnObject)?;

    let hardware = Scope::new(root, "hardware");
    let energy = Scope::new(root, "energy");
    let network = Scope::new(root, "network");
    let scores = Scope::new(root, "scores");

    Ok(SensorReading {
        hardware_sensor_id: hardware.string("sensor_id", "hardware_sensor_id", "unknown"),
        hardware_timestamp: hardware.int("timestamp", "hardware_timestamp"),
        age_years: hardware.int("age_years", "age_years"),
        cpu_usage: hardware.int("cpu_usage", "cpu_usage"),
        ram_usage: hardware.int("ram_usage", "ram_usage"),
        battery_health: hardware.float("battery_health", "battery_health"),
        os: hardware.string("os", "os", "unknown"),
        win11_compat: hardware.boolean("win11_compat", "win11_compat"),

        energy_sensor_id: energy.string("sensor_id", "energy_sensor_id", "unknown"),
        energy_timestamp: energy.int("timestamp", "energy_timestamp"),
        power_watts: energy.int("power_watts", "power_watts"),
        active_devices: energy.int("active_devices", "active_devices"),
        overheating: energy.int("overheating", "overheating"),
        co2_equiv_g: energy.int("co2_equiv_g", "co2_equiv_g"),

        network_sensor_id: network.string("sensor_id", "network_sensor_id", "unknown"),
        network_timestamp: network.int("timestamp", "network_timestamp"),
        network_load_mbps: network.int("network_load_mbps", "network_load_mbps"),
        requests_per_min: network.int("requests_per_min", "requests_per_min"),
        cloud_dependency_score: network.int("cloud_dependency_score", "cloud_dependency_score"),

        eco_score: scores.int("eco_score", "eco_score"),
        obsolescence_score: scores.int("obsolescence_score", "obsolescence_score"),
        bigtech_dependency: scores.int("bigtech_dependency", "bigtech_dependency"),
        co2_savings_kg_year: scores.int("co2_savings_kg_year", "co2_savings_kg_year"),
        recommendations: scores.object("recommendations", "recommendations"),
    })
}

// Normalizer tests: nested/flat/mixed payloads, defaults, the sole error case

use iotserver::normalizer::{NormalizeError, normalize};
use serde_json::json;

#[test]
fn nested_payload_fills_fields() {
    let payload = json!({
        "hardware": {
            "sensor_id": "HW-1",
            "timestamp": 1700000000,
            "cpu_usage": 50,
            "ram_usage": 70,
            "battery_health": 88.5,
            "os": "Linux",
            "win11_compat": true,
            "age_years": 3
        },
        "energy": { "sensor_id": "EN-1", "power_watts": 120 },
        "network": { "sensor_id": "NET-1", "requests_per_min": 42 },
        "scores": { "eco_score": 77, "recommendations": { "upgrade": "ram" } }
    });
    let reading = normalize(&payload).unwrap();
    assert_eq!(reading.hardware_sensor_id, "HW-1");
    assert_eq!(reading.hardware_timestamp, 1700000000);
    assert_eq!(reading.cpu_usage, 50);
    assert_eq!(reading.ram_usage, 70);
    assert_eq!(reading.battery_health, 88.5);
    assert_eq!(reading.os, "Linux");
    assert!(reading.win11_compat);
    assert_eq!(reading.age_years, 3);
    assert_eq!(reading.energy_sensor_id, "EN-1");
    assert_eq!(reading.power_watts, 120);
    assert_eq!(reading.network_sensor_id, "NET-1");
    assert_eq!(reading.requests_per_min, 42);
    assert_eq!(reading.eco_score, 77);
    assert_eq!(
        reading.recommendations.get("upgrade").unwrap().as_str(),
        Some("ram")
    );
}

#[test]
fn flat_payload_fills_fields() {
    let payload = json!({
        "hardware_sensor_id": "HW-2",
        "cpu_usage": 33,
        "energy_sensor_id": "EN-2",
        "power_watts": 200,
        "network_load_mbps": 15,
        "eco_score": 60
    });
    let reading = normalize(&payload).unwrap();
    assert_eq!(reading.hardware_sensor_id, "HW-2");
    assert_eq!(reading.cpu_usage, 33);
    assert_eq!(reading.energy_sensor_id, "EN-2");
    assert_eq!(reading.power_watts, 200);
    assert_eq!(reading.network_load_mbps, 15);
    assert_eq!(reading.eco_score, 60);
}

#[test]
fn nested_value_wins_over_root() {
    let payload = json!({
        "cpu_usage": 10,
        "hardware": { "cpu_usage": 90 }
    });
    let reading = normalize(&payload).unwrap();
    assert_eq!(reading.cpu_usage, 90);
}

#[test]
fn root_fallback_when_nested_section_lacks_key() {
    let payload = json!({
        "hardware": { "sensor_id": "HW-3" },
        "cpu_usage": 25
    });
    let reading = normalize(&payload).unwrap();
    assert_eq!(reading.hardware_sensor_id, "HW-3");
    assert_eq!(reading.cpu_usage, 25);
}

#[test]
fn missing_fields_get_defaults() {
    let reading = normalize(&json!({})).unwrap();
    assert_eq!(reading.hardware_sensor_id, "unknown");
    assert_eq!(reading.os, "unknown");
    assert_eq!(reading.energy_sensor_id, "unknown");
    assert_eq!(reading.network_sensor_id, "unknown");
    assert_eq!(reading.hardware_timestamp, 0);
    assert_eq!(reading.cpu_usage, 0);
    assert_eq!(reading.battery_health, 0.0);
    assert!(!reading.win11_compat);
    assert_eq!(reading.power_watts, 0);
    assert_eq!(reading.eco_score, 0);
    assert!(reading.recommendations.is_empty());
}

#[test]
fn partial_nested_example() {
    // The example from the contract: partial nested payload, rest defaulted.
    let payload = json!({
        "hardware": { "sensor_id": "T1", "cpu_usage": 50 },
        "energy": { "power_watts": 100 }
    });
    let reading = normalize(&payload).unwrap();
    assert_eq!(reading.hardware_sensor_id, "T1");
    assert_eq!(reading.cpu_usage, 50);
    assert_eq!(reading.power_watts, 100);
    assert_eq!(reading.eco_score, 0);
    assert_eq!(reading.energy_sensor_id, "unknown");
}

#[test]
fn wrong_typed_value_counts_as_absent() {
    let payload = json!({
        "cpu_usage": "not a number",
        "os": 42,
        "win11_compat": "yes",
        "recommendations": [1, 2, 3]
    });
    let reading = normalize(&payload).unwrap();
    assert_eq!(reading.cpu_usage, 0);
    assert_eq!(reading.os, "unknown");
    assert!(!reading.win11_compat);
    assert!(reading.recommendations.is_empty());
}

#[test]
fn non_object_section_is_ignored() {
    let payload = json!({
        "hardware": "oops",
        "cpu_usage": 12
    });
    let reading = normalize(&payload).unwrap();
    assert_eq!(reading.cpu_usage, 12);
    assert_eq!(reading.hardware_sensor_id, "unknown");
}

#[test]
fn non_object_body_is_an_error() {
    for payload in [json!([1, 2]), json!("text"), json!(7), json!(null)] {
        let err = normalize(&payload).unwrap_err();
        assert!(matches!(err, NormalizeError::NotAnObject));
    }
}

// SQLite telemetry store. One row per ingested reading; created_at (epoch
// millis) is assigned here at insert time and is the sole ordering key,
// with the autoincrement id as the stable tie-break.

use chrono::{DateTime, Utc};
use sqlx::Row;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;
use tracing::instrument;

use crate::models::{SensorReading, TelemetryRecord};

pub struct TelemetryRepo {
    pool: SqlitePool,
}

impl TelemetryRepo {
    pub async fn connect(path: &str, max_pool_size: u32) -> anyhow::Result<Self> {
        if let Some(parent) = Path::new(path).parent() {
            std::fs::create_dir_all(parent)?;
        }
        let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}", path))?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .busy_timeout(std::time::Duration::from_secs(5))
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_pool_size)
            .connect_with(opts)
            .await?;
        Ok(Self { pool })
    }

    pub async fn init(&self) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS telemetry (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                created_at INTEGER NOT NULL,
                hardware_sensor_id TEXT NOT NULL,
                hardware_timestamp INTEGER NOT NULL,
                age_years INTEGER NOT NULL,
                cpu_usage INTEGER NOT NULL,
                ram_usage INTEGER NOT NULL,
                battery_health REAL NOT NULL,
                os TEXT NOT NULL,
                win11_compat INTEGER NOT NULL,
                energy_sensor_id TEXT NOT NULL,
                energy_timestamp INTEGER NOT NULL,
                power_watts INTEGER NOT NULL,
                active_devices INTEGER NOT NULL,
                overheating INTEGER NOT NULL,
                co2_equiv_g INTEGER NOT NULL,
                network_sensor_id TEXT NOT NULL,
                network_timestamp INTEGER NOT NULL,
                network_load_mbps INTEGER NOT NULL,
                requests_per_min INTEGER NOT NULL,
                cloud_dependency_score INTEGER NOT NULL,
                eco_score INTEGER NOT NULL,
                obsolescence_score INTEGER NOT NULL,
                bigtech_dependency INTEGER NOT NULL,
                co2_savings_kg_year INTEGER NOT NULL,
                recommendations TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_telemetry_created_at ON telemetry(created_at)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Atomic single-row insert. Returns the stored record with the
    /// generated id and server-assigned created_at.
    #[instrument(skip(self, reading), fields(repo = "telemetry", operation = "insert"))]
    pub async fn insert(&self, reading: &SensorReading) -> anyhow::Result<TelemetryRecord> {
        let now_ms = Utc::now().timestamp_millis();
        let recommendations = serde_json::to_string(&reading.recommendations)?;

        let result = sqlx::query(
            r#"
            INSERT INTO telemetry (
                created_at,
                hardware_sensor_id, hardware_timestamp, age_years, cpu_usage,
                ram_usage, battery_health, os, win11_compat,
                energy_sensor_id, energy_timestamp, power_watts, active_devices,
                overheating, co2_equiv_g,
                network_sensor_id, network_timestamp, network_load_mbps,
                requests_per_min, cloud_dependency_score,
                eco_score, obsolescence_score, bigtech_dependency,
                co2_savings_kg_year, recommendations
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13,
                      $14, $15, $16, $17, $18, $19, $20, $21, $22, $23, $24, $25)
            "#,
        )
        .bind(now_ms)
        .bind(&reading.hardware_sensor_id)
        .bind(reading.hardware_timestamp)
        .bind(reading.age_years)
        .bind(reading.cpu_usage)
        .bind(reading.ram_usage)
        .bind(reading.battery_health)
        .bind(&reading.os)
        .bind(reading.win11_compat)
        .bind(&reading.energy_sensor_id)
        .bind(reading.energy_timestamp)
        .bind(reading.power_watts)
        .bind(reading.active_devices)
        .bind(reading.overheating)
        .bind(reading.co2_equiv_g)
        .bind(&reading.network_sensor_id)
        .bind(reading.network_timestamp)
        .bind(reading.network_load_mbps)
        .bind(reading.requests_per_min)
        .bind(reading.cloud_dependency_score)
        .bind(reading.eco_score)
        .bind(reading.obsolescence_score)
        .bind(reading.bigtech_dependency)
        .bind(reading.co2_savings_kg_year)
        .bind(&recommendations)
        .execute(&self.pool)
        .await?;

        Ok(TelemetryRecord {
            id: result.last_insert_rowid(),
            reading: reading.clone(),
            created_at: millis_to_datetime(now_ms),
        })
    }

    /// The `limit` most recent records, newest first. Ties in created_at
    /// break by id, i.e. insertion order.
    #[instrument(skip(self), fields(repo = "telemetry", operation = "get_recent"))]
    pub async fn get_recent(&self, limit: u32) -> anyhow::Result<Vec<TelemetryRecord>> {
        let rows = sqlx::query(
            "SELECT * FROM telemetry ORDER BY created_at DESC, id DESC LIMIT $1",
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(Self::parse_record_row(&row)?);
        }
        Ok(out)
    }

    /// The single most recent record, if any.
    pub async fn latest(&self) -> anyhow::Result<Option<TelemetryRecord>> {
        let row = sqlx::query(
            "SELECT * FROM telemetry ORDER BY created_at DESC, id DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;
        row.map(|r| Self::parse_record_row(&r)).transpose()
    }

    /// Full-history arithmetic mean per field, 0.0 when the table is empty.
    /// Computed in SQL so the unbounded history is never loaded into memory;
    /// the observable values match a full scan. Field names are compile-time
    /// constants from the view definitions, never caller input.
    #[instrument(skip(self), fields(repo = "telemetry", operation = "averages"))]
    pub async fn averages(&self, fields: &[&str]) -> anyhow::Result<Vec<f64>> {
        let select = fields
            .iter()
            .map(|f| format!("AVG({})", f))
            .collect::<Vec<_>>()
            .join(", ");
        let row = sqlx::query(&format!("SELECT {} FROM telemetry", select))
            .fetch_one(&self.pool)
            .await?;

        let mut out = Vec::with_capacity(fields.len());
        for i in 0..fields.len() {
            let avg: Option<f64> = row.try_get(i)?;
            out.push(avg.unwrap_or(0.0));
        }
        Ok(out)
    }

    pub async fn count(&self) -> anyhow::Result<i64> {
        let n = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM telemetry")
            .fetch_one(&self.pool)
            .await?;
        Ok(n)
    }

    fn parse_record_row(row: &sqlx::sqlite::SqliteRow) -> anyhow::Result<TelemetryRecord> {
        let recommendations_json: String = row.try_get("recommendations")?;
        let recommendations = serde_json::from_str(&recommendations_json).unwrap_or_else(|e| {
            tracing::debug!(error = %e, "bad recommendations JSON in row, using empty");
            serde_json::Map::new()
        });

        Ok(TelemetryRecord {
            id: row.try_get("id")?,
            reading: SensorReading {
                hardware_sensor_id: row.try_get("hardware_sensor_id")?,
                hardware_timestamp: row.try_get("hardware_timestamp")?,
                age_years: row.try_get("age_years")?,
                cpu_usage: row.try_get("cpu_usage")?,
                ram_usage: row.try_get("ram_usage")?,
                battery_health: row.try_get("battery_health")?,
                os: row.try_get("os")?,
                win11_compat: row.try_get("win11_compat")?,
                energy_sensor_id: row.try_get("energy_sensor_id")?,
                energy_timestamp: row.try_get("energy_timestamp")?,
                power_watts: row.try_get("power_watts")?,
                active_devices: row.try_get("active_devices")?,
                overheating: row.try_get("overheating")?,
                co2_equiv_g: row.try_get("co2_equiv_g")?,
                network_sensor_id: row.try_get("network_sensor_id")?,
                network_timestamp: row.try_get("network_timestamp")?,
                network_load_mbps: row.try_get("network_load_mbps")?,
                requests_per_min: row.try_get("requests_per_min")?,
                cloud_dependency_score: row.try_get("cloud_dependency_score")?,
                eco_score: row.try_get("eco_score")?,
                obsolescence_score: row.try_get("obsolescence_score")?,
                bigtech_dependency: row.try_get("bigtech_dependency")?,
                co2_savings_kg_year: row.try_get("co2_savings_kg_year")?,
                recommendations,
            },
            created_at: millis_to_datetime(row.try_get("created_at")?),
        })
    }
}

fn millis_to_datetime(ms: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp_millis(ms).unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

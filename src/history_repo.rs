// SQLite time-series history. One row per (cycle, measurement, field).

use crate::error::SinkError;
use crate::models::Batch;
use crate::sink::Sink;
use serde::Serialize;
use sqlx::Row;
use sqlx::sqlite::SqlitePool;
use std::collections::BTreeMap;
use tracing::instrument;

/// A point read back from history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredPoint {
    pub created_at: i64,
    pub measurement: String,
    pub fields: BTreeMap<String, f64>,
}

pub struct HistoryRepo {
    pool: SqlitePool,
    retention_ms: i64,
}

impl HistoryRepo {
    pub fn new(pool: SqlitePool, retention_days: u32) -> Self {
        let retention_ms = (retention_days as i64) * 24 * 60 * 60 * 1000;
        Self { pool, retention_ms }
    }

    pub async fn init(&self) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS metric_history (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                created_at INTEGER NOT NULL,
                measurement TEXT NOT NULL,
                field TEXT NOT NULL,
                value REAL NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_metric_history_measurement_created_at ON metric_history(measurement, created_at)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    #[instrument(skip(self), fields(repo = "history", operation = "prune_old_data"))]
    pub async fn prune_old_data(&self) -> anyhow::Result<u64> {
        let cutoff = chrono::Utc::now().timestamp_millis() - self.retention_ms;
        let result = sqlx::query("DELETE FROM metric_history WHERE created_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// The `limit` most recent points of `measurement`, oldest first.
    pub async fn get_recent_points(
        &self,
        measurement: &str,
        limit: u32,
    ) -> anyhow::Result<Vec<StoredPoint>> {
        let rows = sqlx::query(
            "SELECT created_at, field, value FROM metric_history
             WHERE measurement = $1 AND created_at IN (
                 SELECT DISTINCT created_at FROM metric_history
                 WHERE measurement = $1 ORDER BY created_at DESC LIMIT $2
             )
             ORDER BY created_at ASC, id ASC",
        )
        .bind(measurement)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;
        Self::collect_points(measurement, rows)
    }

    /// Points of `measurement` in [from_ts, to_ts), ascending.
    pub async fn get_points_by_time_range(
        &self,
        measurement: &str,
        from_ts: i64,
        to_ts: i64,
    ) -> anyhow::Result<Vec<StoredPoint>> {
        let rows = sqlx::query(
            "SELECT created_at, field, value FROM metric_history
             WHERE measurement = $1 AND created_at >= $2 AND created_at < $3
             ORDER BY created_at ASC, id ASC",
        )
        .bind(measurement)
        .bind(from_ts)
        .bind(to_ts)
        .fetch_all(&self.pool)
        .await?;
        Self::collect_points(measurement, rows)
    }

    fn collect_points(
        measurement: &str,
        rows: Vec<sqlx::sqlite::SqliteRow>,
    ) -> anyhow::Result<Vec<StoredPoint>> {
        let mut by_ts: BTreeMap<i64, BTreeMap<String, f64>> = BTreeMap::new();
        for row in rows {
            let created_at: i64 = row.try_get("created_at")?;
            let field: String = row.try_get("field")?;
            let value: f64 = row.try_get("value")?;
            by_ts.entry(created_at).or_default().insert(field, value);
        }
        Ok(by_ts
            .into_iter()
            .map(|(created_at, fields)| StoredPoint {
                created_at,
                measurement: measurement.to_string(),
                fields,
            })
            .collect())
    }
}

#[async_trait::async_trait]
impl Sink for HistoryRepo {
    #[instrument(skip(self, batch), fields(repo = "history", operation = "write_batch", points_count = batch.points.len()))]
    async fn write_batch(&self, batch: &Batch) -> Result<(), SinkError> {
        if batch.points.is_empty() {
            return Ok(());
        }
        let mut tx = self.pool.begin().await?;
        for point in &batch.points {
            for (field, value) in &point.fields {
                sqlx::query(
                    "INSERT INTO metric_history (created_at, measurement, field, value) VALUES ($1, $2, $3, $4)",
                )
                .bind(batch.timestamp_ms)
                .bind(point.measurement)
                .bind(*field)
                .bind(*value)
                .execute(&mut *tx)
                .await?;
            }
        }
        tx.commit().await?;
        Ok(())
    }
}

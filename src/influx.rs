// InfluxDB 1.x sink: line protocol over HTTP `/write`, millisecond precision.

use crate::error::SinkError;
use crate::models::{Batch, Point};
use crate::sink::Sink;
use std::fmt::Write as _;
use std::time::Duration;
use tracing::instrument;

pub struct InfluxSink {
    client: reqwest::Client,
    write_url: String,
    database: String,
}

impl InfluxSink {
    pub fn new(url: &str, database: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| anyhow::anyhow!("http client: {}", e))?;
        Ok(Self {
            client,
            write_url: format!("{}/write", url.trim_end_matches('/')),
            database: database.to_string(),
        })
    }
}

#[async_trait::async_trait]
impl Sink for InfluxSink {
    #[instrument(skip(self, batch), fields(sink = "influx", operation = "write_batch", points_count = batch.points.len()))]
    async fn write_batch(&self, batch: &Batch) -> Result<(), SinkError> {
        let body = encode_batch(batch);
        if body.is_empty() {
            return Ok(());
        }
        let resp = self
            .client
            .post(&self.write_url)
            .query(&[("db", self.database.as_str()), ("precision", "ms")])
            .body(body)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SinkError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

/// Line protocol for the whole batch, one line per point. Non-finite values are
/// dropped; a point left without fields is skipped.
pub fn encode_batch(batch: &Batch) -> String {
    let mut out = String::new();
    for point in &batch.points {
        if let Some(line) = encode_point(point, batch.timestamp_ms) {
            out.push_str(&line);
            out.push('\n');
        }
    }
    out
}

fn encode_point(point: &Point, timestamp_ms: i64) -> Option<String> {
    let mut fields = String::new();
    for (name, value) in point.fields.iter().filter(|(_, v)| v.is_finite()) {
        if !fields.is_empty() {
            fields.push(',');
        }
        let _ = write!(fields, "{}={}", name, value);
    }
    if fields.is_empty() {
        return None;
    }
    Some(format!("{} {} {}", point.measurement, fields, timestamp_ms))
}

// Collector state: previous raw counters per group, latest rates, latest stat record.
// SQLite key/value table; each key is overwritten wholesale every cycle.

mod blob;

use crate::error::StoreError;
use crate::models::{CounterSet, Group, STAT_MEASUREMENT, StatRecord};
use sqlx::Row;
use sqlx::sqlite::SqlitePool;
use tracing::instrument;

#[async_trait::async_trait]
pub trait StateStore: Send + Sync {
    /// Previous cycle's raw counters. `Ok(None)` on cold start.
    async fn get_previous(&self, group: Group) -> Result<Option<CounterSet>, StoreError>;

    async fn set_previous(&self, counters: &CounterSet) -> Result<(), StoreError>;

    async fn set_latest_rate(&self, rates: &CounterSet) -> Result<(), StoreError>;

    async fn set_latest_stat(&self, stat: &StatRecord) -> Result<(), StoreError>;
}

pub struct SqliteStateStore {
    pool: SqlitePool,
}

impl SqliteStateStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn init(&self) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS collector_state (
                key TEXT PRIMARY KEY,
                updated_at INTEGER NOT NULL,
                data BLOB NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Most recent rates for `group`, for point lookups.
    pub async fn get_latest_rate(&self, group: Group) -> Result<Option<CounterSet>, StoreError> {
        let key = group.latest_key();
        match self.get_blob(key).await? {
            Some(data) => decode_counters(group, key, &data).map(Some),
            None => Ok(None),
        }
    }

    pub async fn get_latest_stat(&self) -> Result<Option<StatRecord>, StoreError> {
        let Some(data) = self.get_blob(STAT_MEASUREMENT).await? else {
            return Ok(None);
        };
        let payload = blob::blob_payload(&data)
            .map_err(|v| version_err(STAT_MEASUREMENT, v))?;
        let stat = wincode::deserialize(payload).map_err(decode_err(STAT_MEASUREMENT))?;
        Ok(Some(stat))
    }

    async fn get_blob(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let row = sqlx::query("SELECT data FROM collector_state WHERE key = $1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        Ok(Some(row.try_get("data")?))
    }

    async fn put_blob(&self, key: &str, data: Vec<u8>) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO collector_state (key, updated_at, data) VALUES ($1, $2, $3)
             ON CONFLICT(key) DO UPDATE SET updated_at = excluded.updated_at, data = excluded.data",
        )
        .bind(key)
        .bind(chrono::Utc::now().timestamp_millis())
        .bind(data)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl StateStore for SqliteStateStore {
    #[instrument(skip(self), fields(repo = "state", operation = "get_previous"))]
    async fn get_previous(&self, group: Group) -> Result<Option<CounterSet>, StoreError> {
        let key = group.previous_key();
        match self.get_blob(key).await? {
            Some(data) => decode_counters(group, key, &data).map(Some),
            None => Ok(None),
        }
    }

    #[instrument(skip(self, counters), fields(repo = "state", operation = "set_previous", group = %counters.group()))]
    async fn set_previous(&self, counters: &CounterSet) -> Result<(), StoreError> {
        let key = counters.group().previous_key();
        self.put_blob(key, encode_counters(key, counters)?).await
    }

    #[instrument(skip(self, rates), fields(repo = "state", operation = "set_latest_rate", group = %rates.group()))]
    async fn set_latest_rate(&self, rates: &CounterSet) -> Result<(), StoreError> {
        let key = rates.group().latest_key();
        self.put_blob(key, encode_counters(key, rates)?).await
    }

    #[instrument(skip(self, stat), fields(repo = "state", operation = "set_latest_stat"))]
    async fn set_latest_stat(&self, stat: &StatRecord) -> Result<(), StoreError> {
        let payload = wincode::serialize(stat).map_err(encode_err(STAT_MEASUREMENT))?;
        self.put_blob(STAT_MEASUREMENT, blob::with_version_prefix(payload))
            .await
    }
}

fn encode_counters(key: &str, set: &CounterSet) -> Result<Vec<u8>, StoreError> {
    let payload = match set {
        CounterSet::Bandwidth(c) => wincode::serialize(c),
        CounterSet::Packet(c) => wincode::serialize(c),
        CounterSet::Flow(c) => wincode::serialize(c),
        CounterSet::Login(c) => wincode::serialize(c),
    }
    .map_err(encode_err(key))?;
    Ok(blob::with_version_prefix(payload))
}

fn decode_counters(group: Group, key: &str, data: &[u8]) -> Result<CounterSet, StoreError> {
    let payload = blob::blob_payload(data).map_err(|v| version_err(key, v))?;
    let set = match group {
        Group::Bandwidth => wincode::deserialize(payload).map(CounterSet::Bandwidth),
        Group::Packet => wincode::deserialize(payload).map(CounterSet::Packet),
        Group::Flow => wincode::deserialize(payload).map(CounterSet::Flow),
        Group::Login => wincode::deserialize(payload).map(CounterSet::Login),
    }
    .map_err(decode_err(key))?;
    Ok(set)
}

fn encode_err<E: std::fmt::Display>(key: &str) -> impl Fn(E) -> StoreError + '_ {
    move |e| StoreError::Encode {
        key: key.to_string(),
        reason: format!("wincode: {}", e),
    }
}

fn decode_err<E: std::fmt::Display>(key: &str) -> impl Fn(E) -> StoreError + '_ {
    move |e| StoreError::Decode {
        key: key.to_string(),
        reason: format!("wincode: {}", e),
    }
}

fn version_err(key: &str, version: u8) -> StoreError {
    StoreError::Decode {
        key: key.to_string(),
        reason: format!("unsupported blob version {}", version),
    }
}

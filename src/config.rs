use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub upstream: UpstreamConfig,
    pub database: DatabaseConfig,
    pub collector: CollectorConfig,
    pub sink: SinkConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamConfig {
    /// Base URL of the summary endpoints, e.g. `http://192.168.253.61:9095`.
    pub base_url: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_timeout_ms() -> u64 {
    10_000
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
    pub max_pool_size: u32,
    /// History retention for the sqlite sink.
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,
}

fn default_retention_days() -> u32 {
    30
}

#[derive(Debug, Clone, Deserialize)]
pub struct CollectorConfig {
    /// Rate normalization window. Should match the collection interval.
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Optional cron expression (local time); replaces `interval_secs` when set.
    #[serde(default)]
    pub schedule: Option<String>,
    #[serde(default = "default_prune_interval_secs")]
    pub prune_interval_secs: u64,
    /// How often to log app stats (cycles ok/failed, write failures) at INFO level.
    pub stats_log_interval_secs: u64,
}

fn default_window_secs() -> u64 {
    crate::rate_engine::DEFAULT_WINDOW_SECS
}

fn default_interval_secs() -> u64 {
    60
}

fn default_prune_interval_secs() -> u64 {
    3600
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    Sqlite,
    Influx,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SinkConfig {
    pub kind: SinkKind,
    /// InfluxDB base URL (influx only).
    #[serde(default)]
    pub url: Option<String>,
    /// InfluxDB database name (influx only).
    #[serde(default)]
    pub database: Option<String>,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.upstream.base_url.starts_with("http://")
                || self.upstream.base_url.starts_with("https://"),
            "upstream.base_url must be an http(s) URL, got {:?}",
            self.upstream.base_url
        );
        anyhow::ensure!(
            self.upstream.timeout_ms > 0,
            "upstream.timeout_ms must be > 0, got {}",
            self.upstream.timeout_ms
        );
        anyhow::ensure!(
            !self.database.path.is_empty(),
            "database.path must be non-empty"
        );
        anyhow::ensure!(
            self.database.max_pool_size > 0,
            "database.max_pool_size must be > 0, got {}",
            self.database.max_pool_size
        );
        anyhow::ensure!(
            self.database.retention_days > 0,
            "database.retention_days must be > 0, got {}",
            self.database.retention_days
        );
        anyhow::ensure!(
            self.collector.window_secs > 0,
            "collector.window_secs must be > 0, got {}",
            self.collector.window_secs
        );
        anyhow::ensure!(
            self.collector.interval_secs > 0,
            "collector.interval_secs must be > 0, got {}",
            self.collector.interval_secs
        );
        if let Some(schedule) = &self.collector.schedule {
            use std::str::FromStr;
            cron::Schedule::from_str(schedule).map_err(|e| {
                anyhow::anyhow!("collector.schedule is not a valid cron expression: {}", e)
            })?;
        }
        anyhow::ensure!(
            self.collector.prune_interval_secs > 0,
            "collector.prune_interval_secs must be > 0, got {}",
            self.collector.prune_interval_secs
        );
        anyhow::ensure!(
            self.collector.stats_log_interval_secs > 0,
            "collector.stats_log_interval_secs must be > 0, got {}",
            self.collector.stats_log_interval_secs
        );
        if self.sink.kind == SinkKind::Influx {
            anyhow::ensure!(
                self.sink.url.as_deref().is_some_and(|u| !u.is_empty()),
                "sink.url is required for the influx sink"
            );
            anyhow::ensure!(
                self.sink.database.as_deref().is_some_and(|d| !d.is_empty()),
                "sink.database is required for the influx sink"
            );
        }
        anyhow::ensure!(
            self.sink.timeout_ms > 0,
            "sink.timeout_ms must be > 0, got {}",
            self.sink.timeout_ms
        );
        Ok(())
    }
}

// Config loading and validation tests

use netrate::config::{AppConfig, SinkKind};

const VALID_CONFIG: &str = r#"
[upstream]
base_url = "http://192.168.253.61:9095"
timeout_ms = 5000

[database]
path = "data/netrate.db"
max_pool_size = 4

[collector]
window_secs = 60
interval_secs = 60
stats_log_interval_secs = 300

[sink]
kind = "sqlite"
"#;

#[test]
fn test_config_loads_from_str() {
    let config = AppConfig::load_from_str(VALID_CONFIG).expect("load_from_str");
    assert_eq!(config.upstream.base_url, "http://192.168.253.61:9095");
    assert_eq!(config.upstream.timeout_ms, 5000);
    assert_eq!(config.database.path, "data/netrate.db");
    assert_eq!(config.database.retention_days, 30);
    assert_eq!(config.collector.window_secs, 60);
    assert_eq!(config.collector.prune_interval_secs, 3600);
    assert!(config.collector.schedule.is_none());
    assert_eq!(config.sink.kind, SinkKind::Sqlite);
}

#[test]
fn test_config_defaults_window_and_interval() {
    let cfg = VALID_CONFIG
        .replace("window_secs = 60\n", "")
        .replace("interval_secs = 60\n", "");
    let config = AppConfig::load_from_str(&cfg).unwrap();
    assert_eq!(config.collector.window_secs, 60);
    assert_eq!(config.collector.interval_secs, 60);
}

#[test]
fn test_config_validation_rejects_non_http_base_url() {
    let bad = VALID_CONFIG.replace("http://192.168.253.61:9095", "192.168.253.61:9095");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("upstream.base_url"));
}

#[test]
fn test_config_validation_rejects_empty_db_path() {
    let bad = VALID_CONFIG.replace("path = \"data/netrate.db\"", "path = \"\"");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("database.path"));
}

#[test]
fn test_config_validation_rejects_window_zero() {
    let bad = VALID_CONFIG.replace("window_secs = 60", "window_secs = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("window_secs"));
}

#[test]
fn test_config_validation_rejects_bad_cron() {
    let bad = VALID_CONFIG.replace(
        "interval_secs = 60\n",
        "interval_secs = 60\nschedule = \"every minute\"\n",
    );
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("collector.schedule"));
}

#[test]
fn test_config_accepts_cron_schedule() {
    let cfg = VALID_CONFIG.replace(
        "interval_secs = 60\n",
        "interval_secs = 60\nschedule = \"0 * * * * *\"\n",
    );
    let config = AppConfig::load_from_str(&cfg).unwrap();
    assert_eq!(config.collector.schedule.as_deref(), Some("0 * * * * *"));
}

#[test]
fn test_config_influx_requires_url_and_database() {
    let bad = VALID_CONFIG.replace("kind = \"sqlite\"", "kind = \"influx\"");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("sink.url"));

    let ok = VALID_CONFIG.replace(
        "kind = \"sqlite\"",
        "kind = \"influx\"\nurl = \"http://localhost:8086\"\ndatabase = \"networkdb\"",
    );
    let config = AppConfig::load_from_str(&ok).unwrap();
    assert_eq!(config.sink.kind, SinkKind::Influx);
    assert_eq!(config.sink.database.as_deref(), Some("networkdb"));
}

#[test]
fn test_config_rejects_unknown_sink_kind() {
    let bad = VALID_CONFIG.replace("kind = \"sqlite\"", "kind = \"csv\"");
    assert!(AppConfig::load_from_str(&bad).is_err());
}

use anyhow::Result;
use netrate::*;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();

    let app_config = config::AppConfig::load()?;
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        upstream = %app_config.upstream.base_url,
        sink = ?app_config.sink.kind,
        "starting netrate"
    );

    let pool = db::connect(&app_config.database.path, app_config.database.max_pool_size).await?;
    let state_store = Arc::new(state_repo::SqliteStateStore::new(pool.clone()));
    state_store.init().await?;

    let (series_sink, history): (Arc<dyn sink::Sink>, Option<Arc<history_repo::HistoryRepo>>) =
        match app_config.sink.kind {
            config::SinkKind::Sqlite => {
                let repo = Arc::new(history_repo::HistoryRepo::new(
                    pool.clone(),
                    app_config.database.retention_days,
                ));
                repo.init().await?;
                let as_sink: Arc<dyn sink::Sink> = repo.clone();
                (as_sink, Some(repo))
            }
            config::SinkKind::Influx => {
                let url = app_config.sink.url.as_deref().unwrap_or_default();
                let database = app_config.sink.database.as_deref().unwrap_or_default();
                let influx = influx::InfluxSink::new(
                    url,
                    database,
                    std::time::Duration::from_millis(app_config.sink.timeout_ms),
                )?;
                let as_sink: Arc<dyn sink::Sink> = Arc::new(influx);
                (as_sink, None)
            }
        };

    let source = Arc::new(source::HttpSummarySource::new(
        &app_config.upstream.base_url,
        std::time::Duration::from_millis(app_config.upstream.timeout_ms),
    )?);
    let window = rate_engine::RateWindow::from_secs(app_config.collector.window_secs)
        .ok_or_else(|| anyhow::anyhow!("collector.window_secs must be > 0"))?;
    if app_config.collector.schedule.is_none()
        && app_config.collector.interval_secs != app_config.collector.window_secs
    {
        tracing::warn!(
            interval_secs = app_config.collector.interval_secs,
            window_secs = app_config.collector.window_secs,
            "collection interval differs from rate window; rates will be scaled incorrectly"
        );
    }
    let collector = Arc::new(collector::Collector::new(
        source,
        state_store,
        series_sink,
        window,
    ));

    let trigger = match &app_config.collector.schedule {
        Some(expr) => worker::CycleTrigger::cron(expr)?,
        None => worker::CycleTrigger::every(std::time::Duration::from_secs(
            app_config.collector.interval_secs,
        )),
    };

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    let worker_handle = worker::spawn(
        worker::WorkerDeps {
            collector,
            history_repo: history,
            shutdown_rx,
        },
        worker::WorkerConfig {
            trigger,
            stats_log_interval_secs: app_config.collector.stats_log_interval_secs,
            prune_interval_secs: app_config.collector.prune_interval_secs,
        },
    );

    #[cfg(unix)]
    {
        let mut sigterm =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await?;
    }

    tracing::info!("Received shutdown signal");
    let _ = shutdown_tx.send(());
    let stats = worker_handle.await?;
    tracing::info!(
        cycles_ok = stats.cycles_ok,
        cycles_failed = stats.cycles_failed,
        write_failures = stats.write_failures,
        "stopped"
    );
    Ok(())
}

// Background collection worker: runs a cycle on every trigger (fixed interval or cron),
// prunes sqlite history on its own interval, logs app stats, stops on shutdown.

use crate::collector::Collector;
use crate::history_repo::HistoryRepo;
use std::str::FromStr;
use std::sync::Arc;
use tokio::time::{Duration, Interval, interval};
use tracing::{info, warn};

/// What fires a collection cycle.
pub enum CycleTrigger {
    Interval(Interval),
    /// Cron schedule evaluated in local time.
    Cron(cron::Schedule),
}

impl CycleTrigger {
    pub fn every(period: Duration) -> Self {
        let mut tick = interval(period);
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        CycleTrigger::Interval(tick)
    }

    pub fn cron(expr: &str) -> anyhow::Result<Self> {
        let schedule = cron::Schedule::from_str(expr)
            .map_err(|e| anyhow::anyhow!("invalid cron expression {:?}: {}", expr, e))?;
        Ok(CycleTrigger::Cron(schedule))
    }

    /// Waits for the next trigger. Cancel-safe: a dropped wait recomputes the same next time.
    pub async fn wait(&mut self) {
        match self {
            CycleTrigger::Interval(tick) => {
                tick.tick().await;
            }
            CycleTrigger::Cron(schedule) => {
                let now = chrono::Local::now();
                match schedule.after(&now).next() {
                    Some(next) => {
                        let delay = (next - now).to_std().unwrap_or(Duration::from_secs(1));
                        tokio::time::sleep(delay).await;
                    }
                    None => std::future::pending::<()>().await,
                }
            }
        }
    }
}

pub struct WorkerDeps {
    pub collector: Arc<Collector>,
    /// Present when history lives in sqlite and needs pruning.
    pub history_repo: Option<Arc<HistoryRepo>>,
    pub shutdown_rx: tokio::sync::oneshot::Receiver<()>,
}

/// Stats logging and pruning use real-time intervals, independent of the trigger.
pub struct WorkerConfig {
    pub trigger: CycleTrigger,
    pub stats_log_interval_secs: u64,
    pub prune_interval_secs: u64,
}

/// Totals since start, returned when the worker stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerStats {
    pub cycles_ok: u64,
    pub cycles_failed: u64,
    pub write_failures: u64,
}

pub fn spawn(deps: WorkerDeps, config: WorkerConfig) -> tokio::task::JoinHandle<WorkerStats> {
    let WorkerDeps {
        collector,
        history_repo,
        mut shutdown_rx,
    } = deps;
    let WorkerConfig {
        mut trigger,
        stats_log_interval_secs,
        prune_interval_secs,
    } = config;

    tokio::spawn(async move {
        let mut stats_log_tick = interval(Duration::from_secs(stats_log_interval_secs));
        stats_log_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        let mut prune_tick = interval(Duration::from_secs(prune_interval_secs));
        prune_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        let mut stats = WorkerStats::default();

        loop {
            tokio::select! {
                _ = trigger.wait() => {
                    match collector.run_cycle().await {
                        Ok(report) => {
                            stats.cycles_ok += 1;
                            stats.write_failures += report.write_failures.len() as u64;
                        }
                        // Already logged by the collector.
                        Err(_) => stats.cycles_failed += 1,
                    }
                }
                _ = &mut shutdown_rx => {
                    tracing::debug!("Worker shutting down");
                    break;
                }
                _ = stats_log_tick.tick() => {
                    info!(
                        cycles_ok = stats.cycles_ok,
                        cycles_failed = stats.cycles_failed,
                        write_failures = stats.write_failures,
                        "app stats"
                    );
                }
                _ = prune_tick.tick(), if history_repo.is_some() => {
                    if let Some(repo) = &history_repo {
                        match repo.prune_old_data().await {
                            Ok(rows) => tracing::debug!(operation = "prune_old_data", rows, "Old history pruned"),
                            Err(e) => warn!(error = %e, operation = "prune_old_data", "Failed to prune old data"),
                        }
                    }
                }
            }
        }
        stats
    })
}

// One collection cycle: fetch -> derive -> persist state -> write time series.
// Only a failed fetch ends a cycle early; store and sink failures are logged and reported.

use crate::error::{FetchError, SinkError, StoreError};
use crate::models::{Batch, CounterSet, Counters, Group, Point, STAT_MEASUREMENT, StatRecord};
use crate::rate_engine::{RateWindow, compute_rates, derive_stat};
use crate::sink::Sink;
use crate::source::SummarySource;
use crate::state_repo::StateStore;
use futures_util::future::join_all;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CyclePhase {
    Fetching,
    Deriving,
    Persisting,
    Done,
    Failed,
}

/// A write that failed while persisting. Siblings are not affected.
#[derive(Debug)]
pub enum WriteFailure {
    State { key: &'static str, error: StoreError },
    Sink(SinkError),
}

/// Per-group result of the derive phase.
#[derive(Debug)]
pub struct GroupOutcome {
    pub group: Group,
    /// Raw counters fetched this cycle; becomes the next cycle's baseline.
    pub current: CounterSet,
    pub rates: CounterSet,
    /// Set when the previous counters could not be read; the zero baseline was used.
    pub read_error: Option<StoreError>,
}

#[derive(Debug)]
pub struct CycleReport {
    pub timestamp_ms: i64,
    pub groups: Vec<GroupOutcome>,
    pub stat: StatRecord,
    pub write_failures: Vec<WriteFailure>,
}

impl CycleReport {
    pub fn rates(&self, group: Group) -> Option<&CounterSet> {
        self.groups
            .iter()
            .find(|g| g.group == group)
            .map(|g| &g.rates)
    }

    pub fn read_failures(&self) -> usize {
        self.groups.iter().filter(|g| g.read_error.is_some()).count()
    }

    /// True when every read and write in the cycle succeeded.
    pub fn is_clean(&self) -> bool {
        self.write_failures.is_empty() && self.read_failures() == 0
    }
}

pub struct Collector {
    source: Arc<dyn SummarySource>,
    store: Arc<dyn StateStore>,
    sink: Arc<dyn Sink>,
    window: RateWindow,
}

impl Collector {
    pub fn new(
        source: Arc<dyn SummarySource>,
        store: Arc<dyn StateStore>,
        sink: Arc<dyn Sink>,
        window: RateWindow,
    ) -> Self {
        Self {
            source,
            store,
            sink,
            window,
        }
    }

    pub fn window(&self) -> RateWindow {
        self.window
    }

    /// Runs one cycle. `Err` only when the fetch failed, in which case nothing was written.
    #[instrument(skip(self), fields(window_secs = self.window.as_secs_f64()))]
    pub async fn run_cycle(&self) -> Result<CycleReport, FetchError> {
        debug!(phase = ?CyclePhase::Fetching, "cycle started");
        let summaries = match self.source.fetch_all().await {
            Ok(s) => s,
            Err(e) => {
                warn!(
                    phase = ?CyclePhase::Failed,
                    operation = "fetch_all",
                    summary = %e.kind(),
                    error = %e,
                    "fetch failed; cycle aborted"
                );
                return Err(e);
            }
        };
        let timestamp_ms = chrono::Utc::now().timestamp_millis();

        debug!(phase = ?CyclePhase::Deriving);
        let (bandwidth, packet, flow, login) = tokio::join!(
            self.derive(summaries.stat.bandwidth()),
            self.derive(summaries.stat.packet()),
            self.derive(summaries.flow.flow()),
            self.derive(summaries.session.login()),
        );
        let groups = vec![bandwidth, packet, flow, login];
        let stat = derive_stat(&summaries.session, &summaries.flow);

        debug!(phase = ?CyclePhase::Persisting);
        let mut write_failures = self.persist_state(&groups, &stat).await;

        let batch = Batch {
            timestamp_ms,
            points: groups
                .iter()
                .map(|g| Point::from_rates(&g.rates))
                .chain(std::iter::once(Point::from_stat(&stat)))
                .collect(),
        };
        if let Err(e) = self.sink.write_batch(&batch).await {
            warn!(operation = "write_batch", error = %e, "time-series write failed");
            write_failures.push(WriteFailure::Sink(e));
        }

        let report = CycleReport {
            timestamp_ms,
            groups,
            stat,
            write_failures,
        };
        info!(
            phase = ?CyclePhase::Done,
            read_failures = report.read_failures(),
            write_failures = report.write_failures.len(),
            "cycle complete"
        );
        Ok(report)
    }

    async fn derive<C: Counters>(&self, current: C) -> GroupOutcome {
        let group = C::GROUP;
        let (previous, read_error) = match self.store.get_previous(group).await {
            Ok(Some(set)) => match C::from_set(set) {
                Some(c) => (Some(c), None),
                None => (
                    None,
                    Some(StoreError::Decode {
                        key: group.previous_key().to_string(),
                        reason: format!("stored counters belong to {}", set.group()),
                    }),
                ),
            },
            Ok(None) => {
                debug!(%group, "no previous counters; zero baseline");
                (None, None)
            }
            Err(e) => (None, Some(e)),
        };
        if let Some(e) = &read_error {
            warn!(
                %group,
                operation = "get_previous",
                error = %e,
                "previous counters unreadable; zero baseline"
            );
        }
        let rates = compute_rates(previous.as_ref(), &current, self.window);
        GroupOutcome {
            group,
            current: current.into_set(),
            rates: rates.into_set(),
            read_error,
        }
    }

    /// Issues every state write concurrently and returns the ones that failed.
    async fn persist_state(&self, groups: &[GroupOutcome], stat: &StatRecord) -> Vec<WriteFailure> {
        let mut keys = Vec::with_capacity(groups.len() * 2 + 1);
        let mut writes = Vec::with_capacity(groups.len() * 2 + 1);
        for g in groups {
            keys.push(g.group.previous_key());
            writes.push(self.store.set_previous(&g.current));
            keys.push(g.group.latest_key());
            writes.push(self.store.set_latest_rate(&g.rates));
        }
        keys.push(STAT_MEASUREMENT);
        writes.push(self.store.set_latest_stat(stat));

        let results = join_all(writes).await;
        keys.into_iter()
            .zip(results)
            .filter_map(|(key, result)| {
                let error = result.err()?;
                warn!(key, operation = "state_write", error = %error, "state write failed");
                Some(WriteFailure::State { key, error })
            })
            .collect()
    }
}

// Shared test helpers: in-memory collaborators with failure injection
#![allow(dead_code)]

use netrate::error::{FetchError, SinkError, StoreError};
use netrate::models::*;
use netrate::sink::Sink;
use netrate::source::{SummaryKind, SummarySource};
use netrate::state_repo::StateStore;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

pub fn summaries(scale: f64) -> Summaries {
    Summaries {
        session: SessionSummary {
            active_devices: 40.0,
            active_users: 20.0,
            active_dual_stacks: 3.0,
            active_pure_v4: 10.0,
            active_pure_v6: 5.0,
            login_pure_v4: 60.0 * scale,
            login_pure_v6: 120.0 * scale,
            login_dual_stacks: 180.0 * scale,
            logout_pure_v4: 240.0 * scale,
            logout_pure_v6: 300.0 * scale,
            logout_dual_stacks: 360.0 * scale,
        },
        flow: FlowSummary {
            active_v4: 7.0,
            active_v6: 2.0,
            v4: 600.0 * scale,
            v6: 1200.0 * scale,
            icmp_v4: 60.0 * scale,
            icmp_v6: 60.0 * scale,
            tcp_v4: 60.0 * scale,
            tcp_v6: 60.0 * scale,
            udp_v4: 60.0 * scale,
            udp_v6: 60.0 * scale,
            other_v4: 60.0 * scale,
            other_v6: 60.0 * scale,
            http_in: 60.0 * scale,
            http_out: 60.0 * scale,
        },
        stat: StatSummary {
            byte_v4_in: 6000.0 * scale,
            byte_v6_in: 600.0 * scale,
            byte_v4_out: 3000.0 * scale,
            byte_v6_out: 300.0 * scale,
            pkt_v4_in: 60.0 * scale,
            pkt_v6_in: 60.0 * scale,
            pkt_v4_out: 60.0 * scale,
            pkt_v6_out: 60.0 * scale,
        },
    }
}

/// Returns the configured summaries, or fails with the first failing kind.
pub struct FakeSource {
    pub summaries: Mutex<Summaries>,
    pub failing: Mutex<Option<SummaryKind>>,
    pub calls: AtomicUsize,
}

impl FakeSource {
    pub fn new(summaries: Summaries) -> Self {
        Self {
            summaries: Mutex::new(summaries),
            failing: Mutex::new(None),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn set(&self, summaries: Summaries) {
        *self.summaries.lock().unwrap() = summaries;
    }

    pub fn fail(&self, kind: Option<SummaryKind>) {
        *self.failing.lock().unwrap() = kind;
    }
}

#[async_trait::async_trait]
impl SummarySource for FakeSource {
    async fn fetch_all(&self) -> Result<Summaries, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(kind) = *self.failing.lock().unwrap() {
            return Err(FetchError::Status { kind, status: 503 });
        }
        Ok(self.summaries.lock().unwrap().clone())
    }
}

/// Key/value state in memory. Keys listed in `fail_reads` / `fail_writes` error out.
#[derive(Default)]
pub struct MemoryStore {
    pub previous: Mutex<HashMap<Group, CounterSet>>,
    pub latest: Mutex<HashMap<Group, CounterSet>>,
    pub stat: Mutex<Option<StatRecord>>,
    pub fail_reads: Mutex<HashSet<&'static str>>,
    pub fail_writes: Mutex<HashSet<&'static str>>,
    pub writes: AtomicUsize,
}

impl MemoryStore {
    pub fn fail_read(&self, key: &'static str) {
        self.fail_reads.lock().unwrap().insert(key);
    }

    pub fn fail_write(&self, key: &'static str) {
        self.fail_writes.lock().unwrap().insert(key);
    }

    pub fn previous(&self, group: Group) -> Option<CounterSet> {
        self.previous.lock().unwrap().get(&group).copied()
    }

    pub fn latest(&self, group: Group) -> Option<CounterSet> {
        self.latest.lock().unwrap().get(&group).copied()
    }

    pub fn stat(&self) -> Option<StatRecord> {
        *self.stat.lock().unwrap()
    }

    fn check_write(&self, key: &str) -> Result<(), StoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.lock().unwrap().contains(key) {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl StateStore for MemoryStore {
    async fn get_previous(&self, group: Group) -> Result<Option<CounterSet>, StoreError> {
        if self.fail_reads.lock().unwrap().contains(group.previous_key()) {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(self.previous(group))
    }

    async fn set_previous(&self, counters: &CounterSet) -> Result<(), StoreError> {
        self.check_write(counters.group().previous_key())?;
        self.previous
            .lock()
            .unwrap()
            .insert(counters.group(), *counters);
        Ok(())
    }

    async fn set_latest_rate(&self, rates: &CounterSet) -> Result<(), StoreError> {
        self.check_write(rates.group().latest_key())?;
        self.latest.lock().unwrap().insert(rates.group(), *rates);
        Ok(())
    }

    async fn set_latest_stat(&self, stat: &StatRecord) -> Result<(), StoreError> {
        self.check_write(STAT_MEASUREMENT)?;
        *self.stat.lock().unwrap() = Some(*stat);
        Ok(())
    }
}

/// Records every batch; optionally rejects writes.
#[derive(Default)]
pub struct RecordingSink {
    pub batches: Mutex<Vec<Batch>>,
    pub failing: Mutex<bool>,
}

impl RecordingSink {
    pub fn batches(&self) -> Vec<Batch> {
        self.batches.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Sink for RecordingSink {
    async fn write_batch(&self, batch: &Batch) -> Result<(), SinkError> {
        if *self.failing.lock().unwrap() {
            return Err(SinkError::Status {
                status: 500,
                body: "down".into(),
            });
        }
        self.batches.lock().unwrap().push(batch.clone());
        Ok(())
    }
}

// Domain models: counter groups, upstream summaries, derived stat record, sink points

mod counters;
mod point;
mod stat;
mod summary;

pub use counters::{
    BandwidthCounters, CounterSet, Counters, FlowCounters, Group, LoginCounters, PacketCounters,
};
pub use point::{Batch, Point};
pub use stat::{STAT_MEASUREMENT, StatRecord};
pub use summary::{FlowSummary, SessionSummary, StatSummary, Summaries};

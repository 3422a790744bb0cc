// Time-series points: one per measurement, tagged only by measurement name.

use super::counters::CounterSet;
use super::stat::{STAT_MEASUREMENT, StatRecord};

#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub measurement: &'static str,
    pub fields: Vec<(&'static str, f64)>,
}

impl Point {
    pub fn from_rates(rates: &CounterSet) -> Self {
        Self {
            measurement: rates.group().measurement(),
            fields: rates.fields(),
        }
    }

    pub fn from_stat(stat: &StatRecord) -> Self {
        Self {
            measurement: STAT_MEASUREMENT,
            fields: stat.fields(),
        }
    }

    pub fn field(&self, name: &str) -> Option<f64> {
        self.fields.iter().find(|(n, _)| *n == name).map(|(_, v)| *v)
    }
}

/// One cycle's output: all points share the cycle timestamp (unix ms).
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    pub timestamp_ms: i64,
    pub points: Vec<Point>,
}

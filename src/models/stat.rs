// Derived gauges. No history: computed from the current session and flow summaries only.

use serde::{Deserialize, Serialize};
use wincode::{SchemaRead, SchemaWrite};

pub const STAT_MEASUREMENT: &str = "stat";

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, SchemaRead, SchemaWrite)]
pub struct StatRecord {
    pub active_devices: f64,
    pub active_users: f64,
    pub active_dual_stacks: f64,
    pub active_pure_v4: f64,
    pub active_pure_v6: f64,
    /// Pure v4 + pure v6 + 2 per dual-stack session.
    pub active_ip_all: f64,
    pub active_flow_v4: f64,
    pub active_flow_v6: f64,
    pub active_flow_all: f64,
}

impl StatRecord {
    pub const FIELDS: &'static [&'static str] = &[
        "active_devices",
        "active_users",
        "active_dual_stacks",
        "active_pure_v4",
        "active_pure_v6",
        "active_ip_all",
        "active_flow_v4",
        "active_flow_v6",
        "active_flow_all",
    ];

    pub fn fields(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("active_devices", self.active_devices),
            ("active_users", self.active_users),
            ("active_dual_stacks", self.active_dual_stacks),
            ("active_pure_v4", self.active_pure_v4),
            ("active_pure_v6", self.active_pure_v6),
            ("active_ip_all", self.active_ip_all),
            ("active_flow_v4", self.active_flow_v4),
            ("active_flow_v6", self.active_flow_v6),
            ("active_flow_all", self.active_flow_all),
        ]
    }
}

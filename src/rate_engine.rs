// Rate derivation: cumulative counters -> per-second rates over a fixed window.
// Pure; no I/O. The window is not measured from the actual gap between cycles.

use crate::models::{Counters, FlowSummary, SessionSummary, StatRecord};
use std::time::Duration;

pub const DEFAULT_WINDOW_SECS: u64 = 60;

/// Normalization window for the rate formula.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateWindow {
    secs: f64,
}

impl RateWindow {
    /// Returns `None` for a zero window.
    pub fn from_secs(secs: u64) -> Option<Self> {
        (secs > 0).then_some(Self { secs: secs as f64 })
    }

    pub fn as_secs_f64(&self) -> f64 {
        self.secs
    }

    pub fn as_duration(&self) -> Duration {
        Duration::from_secs_f64(self.secs)
    }
}

impl Default for RateWindow {
    fn default() -> Self {
        Self {
            secs: DEFAULT_WINDOW_SECS as f64,
        }
    }
}

/// `(current - previous) / window` per field. A missing previous uses the group's zero
/// baseline, so the first cycle reports `current / window`. Negative results (counter
/// reset) are passed through.
pub fn compute_rates<C: Counters>(previous: Option<&C>, current: &C, window: RateWindow) -> C {
    let baseline = previous.copied().unwrap_or(C::ZERO);
    let secs = window.as_secs_f64();
    current.zip_with(&baseline, |cur, prev| (cur - prev) / secs)
}

pub fn derive_stat(session: &SessionSummary, flow: &FlowSummary) -> StatRecord {
    StatRecord {
        active_devices: session.active_devices,
        active_users: session.active_users,
        active_dual_stacks: session.active_dual_stacks,
        active_pure_v4: session.active_pure_v4,
        active_pure_v6: session.active_pure_v6,
        active_ip_all: session.active_pure_v4
            + session.active_pure_v6
            + 2.0 * session.active_dual_stacks,
        active_flow_v4: flow.active_v4,
        active_flow_v6: flow.active_v6,
        active_flow_all: flow.active_v4 + flow.active_v6,
    }
}

// Upstream summary payloads. Unknown fields are ignored; missing counters decode as 0.

use super::counters::{BandwidthCounters, FlowCounters, LoginCounters, PacketCounters};
use serde::{Deserialize, Serialize};

/// `/getSessionSummary`: active session gauges plus login/logout counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSummary {
    pub active_devices: f64,
    pub active_users: f64,
    pub active_dual_stacks: f64,
    pub active_pure_v4: f64,
    pub active_pure_v6: f64,
    pub login_pure_v4: f64,
    pub login_pure_v6: f64,
    pub login_dual_stacks: f64,
    pub logout_pure_v4: f64,
    pub logout_pure_v6: f64,
    pub logout_dual_stacks: f64,
}

/// `/getFlowSummary`: active flow gauges plus cumulative flow counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowSummary {
    pub active_v4: f64,
    pub active_v6: f64,
    pub v4: f64,
    pub v6: f64,
    pub icmp_v4: f64,
    pub icmp_v6: f64,
    pub tcp_v4: f64,
    pub tcp_v6: f64,
    pub udp_v4: f64,
    pub udp_v6: f64,
    pub other_v4: f64,
    pub other_v6: f64,
    pub http_in: f64,
    pub http_out: f64,
}

/// `/getStatSummary`: byte and packet counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatSummary {
    pub byte_v4_in: f64,
    pub byte_v6_in: f64,
    pub byte_v4_out: f64,
    pub byte_v6_out: f64,
    pub pkt_v4_in: f64,
    pub pkt_v6_in: f64,
    pub pkt_v4_out: f64,
    pub pkt_v6_out: f64,
}

impl SessionSummary {
    pub fn login(&self) -> LoginCounters {
        LoginCounters {
            login_pure_v4: self.login_pure_v4,
            login_pure_v6: self.login_pure_v6,
            login_dual_stacks: self.login_dual_stacks,
            logout_pure_v4: self.logout_pure_v4,
            logout_pure_v6: self.logout_pure_v6,
            logout_dual_stacks: self.logout_dual_stacks,
        }
    }
}

impl FlowSummary {
    pub fn flow(&self) -> FlowCounters {
        FlowCounters {
            v4: self.v4,
            v6: self.v6,
            icmp_v4: self.icmp_v4,
            icmp_v6: self.icmp_v6,
            tcp_v4: self.tcp_v4,
            tcp_v6: self.tcp_v6,
            udp_v4: self.udp_v4,
            udp_v6: self.udp_v6,
            other_v4: self.other_v4,
            other_v6: self.other_v6,
            http_in: self.http_in,
            http_out: self.http_out,
        }
    }
}

impl StatSummary {
    pub fn bandwidth(&self) -> BandwidthCounters {
        BandwidthCounters {
            byte_v4_in: self.byte_v4_in,
            byte_v6_in: self.byte_v6_in,
            byte_v4_out: self.byte_v4_out,
            byte_v6_out: self.byte_v6_out,
        }
    }

    pub fn packet(&self) -> PacketCounters {
        PacketCounters {
            pkt_v4_in: self.pkt_v4_in,
            pkt_v6_in: self.pkt_v6_in,
            pkt_v4_out: self.pkt_v4_out,
            pkt_v6_out: self.pkt_v6_out,
        }
    }
}

/// The joined result of one fetch: all three summaries from the same cycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Summaries {
    pub session: SessionSummary,
    pub flow: FlowSummary,
    pub stat: StatSummary,
}

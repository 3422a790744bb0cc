// Counter groups: fixed field sets for bandwidth, packet, flow and login.
// The same structs carry raw cumulative counters (previous/current) and the derived rates.

use serde::{Deserialize, Serialize};
use wincode::{SchemaRead, SchemaWrite};

/// One of the four counter families. Each has its own field set and previous-state slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Group {
    Bandwidth,
    Packet,
    Flow,
    Login,
}

impl Group {
    pub const ALL: [Group; 4] = [Group::Bandwidth, Group::Packet, Group::Flow, Group::Login];

    /// Time-series measurement name, also the latest-rate state key.
    pub fn measurement(self) -> &'static str {
        match self {
            Group::Bandwidth => "bandwidth",
            Group::Packet => "packet",
            Group::Flow => "flow",
            Group::Login => "login",
        }
    }

    /// State key holding the previous cycle's raw counters.
    pub fn previous_key(self) -> &'static str {
        match self {
            Group::Bandwidth => "bandwidth-old",
            Group::Packet => "packet-old",
            Group::Flow => "flow-old",
            Group::Login => "login-old",
        }
    }

    pub fn latest_key(self) -> &'static str {
        self.measurement()
    }

    pub fn field_names(self) -> &'static [&'static str] {
        match self {
            Group::Bandwidth => BandwidthCounters::FIELDS,
            Group::Packet => PacketCounters::FIELDS,
            Group::Flow => FlowCounters::FIELDS,
            Group::Login => LoginCounters::FIELDS,
        }
    }
}

impl std::fmt::Display for Group {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.measurement())
    }
}

/// Behaviour shared by every counter group struct.
pub trait Counters: Copy + Send + Sync + 'static {
    const GROUP: Group;
    const FIELDS: &'static [&'static str];
    /// All-zero baseline used when no previous counters exist.
    const ZERO: Self;

    /// (field, value) pairs in declaration order.
    fn fields(&self) -> Vec<(&'static str, f64)>;

    /// Applies `f(self.field, other.field)` field by field.
    fn zip_with(&self, other: &Self, f: impl Fn(f64, f64) -> f64) -> Self;

    fn into_set(self) -> CounterSet;

    /// Extracts this group's counters; `None` when the set belongs to another group.
    fn from_set(set: CounterSet) -> Option<Self>;
}

macro_rules! counter_group {
    ($(#[$meta:meta])* $name:ident, $variant:ident { $($field:ident),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, SchemaRead, SchemaWrite)]
        pub struct $name {
            $(
                #[serde(default)]
                pub $field: f64,
            )+
        }

        impl Counters for $name {
            const GROUP: Group = Group::$variant;
            const FIELDS: &'static [&'static str] = &[$(stringify!($field)),+];
            const ZERO: Self = Self { $($field: 0.0,)+ };

            fn fields(&self) -> Vec<(&'static str, f64)> {
                vec![$((stringify!($field), self.$field)),+]
            }

            fn zip_with(&self, other: &Self, f: impl Fn(f64, f64) -> f64) -> Self {
                Self { $($field: f(self.$field, other.$field),)+ }
            }

            fn into_set(self) -> CounterSet {
                CounterSet::$variant(self)
            }

            fn from_set(set: CounterSet) -> Option<Self> {
                match set {
                    CounterSet::$variant(c) => Some(c),
                    _ => None,
                }
            }
        }
    };
}

counter_group!(
    /// Byte counters from the stat summary.
    BandwidthCounters,
    Bandwidth {
        byte_v4_in,
        byte_v6_in,
        byte_v4_out,
        byte_v6_out,
    }
);

counter_group!(
    /// Packet counters from the stat summary.
    PacketCounters,
    Packet {
        pkt_v4_in,
        pkt_v6_in,
        pkt_v4_out,
        pkt_v6_out,
    }
);

counter_group!(
    /// Flow counters from the flow summary.
    FlowCounters,
    Flow {
        v4,
        v6,
        icmp_v4,
        icmp_v6,
        tcp_v4,
        tcp_v6,
        udp_v4,
        udp_v6,
        other_v4,
        other_v6,
        http_in,
        http_out,
    }
);

counter_group!(
    /// Login/logout counters from the session summary.
    LoginCounters,
    Login {
        login_pure_v4,
        login_pure_v6,
        login_dual_stacks,
        logout_pure_v4,
        logout_pure_v6,
        logout_dual_stacks,
    }
);

/// Counters (or rates) of any group, for the object-safe store and sink seams.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CounterSet {
    Bandwidth(BandwidthCounters),
    Packet(PacketCounters),
    Flow(FlowCounters),
    Login(LoginCounters),
}

impl CounterSet {
    pub fn group(&self) -> Group {
        match self {
            CounterSet::Bandwidth(_) => Group::Bandwidth,
            CounterSet::Packet(_) => Group::Packet,
            CounterSet::Flow(_) => Group::Flow,
            CounterSet::Login(_) => Group::Login,
        }
    }

    pub fn fields(&self) -> Vec<(&'static str, f64)> {
        match self {
            CounterSet::Bandwidth(c) => c.fields(),
            CounterSet::Packet(c) => c.fields(),
            CounterSet::Flow(c) => c.fields(),
            CounterSet::Login(c) => c.fields(),
        }
    }

    pub fn zero(group: Group) -> Self {
        match group {
            Group::Bandwidth => CounterSet::Bandwidth(BandwidthCounters::ZERO),
            Group::Packet => CounterSet::Packet(PacketCounters::ZERO),
            Group::Flow => CounterSet::Flow(FlowCounters::ZERO),
            Group::Login => CounterSet::Login(LoginCounters::ZERO),
        }
    }
}

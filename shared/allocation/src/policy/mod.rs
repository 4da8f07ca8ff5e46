use crate::{AllocationError, TcbSummary, Trace};
use std::fmt;
use std::str::FromStr;

mod least_tcb;
mod max_utilization;
mod random_pick;
mod round_robin;

pub use least_tcb::{LeastTcb, WindowStats};
pub use max_utilization::MaxUtilization;
pub use random_pick::RandomPick;
pub use round_robin::RoundRobin;

/// A way of choosing which nodes serve each operation of a trace.
pub trait AssignmentPolicy {
    fn kind(&self) -> PolicyKind;

    /// Replays `trace` from an empty pool and reports the resulting TCB sizes.
    fn run(&mut self, trace: &Trace) -> Result<TcbSummary, AllocationError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PolicyKind {
    MaxUtilization,
    RandomPick,
    RoundRobin,
    LeastTcb,
}

impl PolicyKind {
    /// Column order of the comparison table.
    pub const ALL: [PolicyKind; 4] = [
        PolicyKind::MaxUtilization,
        PolicyKind::RandomPick,
        PolicyKind::RoundRobin,
        PolicyKind::LeastTcb,
    ];

    pub fn column(&self) -> &'static str {
        match self {
            PolicyKind::MaxUtilization => "maxUtilization",
            PolicyKind::RandomPick => "randomPick",
            PolicyKind::RoundRobin => "roundRobin",
            PolicyKind::LeastTcb => "leastTCB",
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyKind::MaxUtilization => write!(f, "max-utilization"),
            PolicyKind::RandomPick => write!(f, "random-pick"),
            PolicyKind::RoundRobin => write!(f, "round-robin"),
            PolicyKind::LeastTcb => write!(f, "least-tcb"),
        }
    }
}

impl FromStr for PolicyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PolicyKind::ALL
            .into_iter()
            .find(|kind| kind.to_string() == s)
            .ok_or_else(|| format!("unknown policy {s:?}"))
    }
}

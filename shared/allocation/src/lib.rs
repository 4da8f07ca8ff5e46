mod config;
mod error;
mod ledger;
mod metrics;
pub mod policy;
mod simulator;
mod trace;

pub use config::{ConfigError, SimulationConfig, SweepConfig};
pub use error::AllocationError;
pub use ledger::Ledger;
pub use metrics::{ComparisonRow, ComparisonTable, TcbSummary, TcbView};
pub use policy::{AssignmentPolicy, PolicyKind};
pub use simulator::Simulator;
pub use trace::{Trace, TraceError};

pub type NodeId = usize;
pub type UserId = usize;

use super::{AssignmentPolicy, PolicyKind};
use crate::{AllocationError, Ledger, SimulationConfig, TcbSummary, Trace};
use tracing::info;

/// Hands out nodes in a fixed cycle, ignoring load.
#[derive(Debug, Clone)]
pub struct RoundRobin {
    nodes: usize,
    nodes_per_op: usize,
}

impl RoundRobin {
    pub fn new(config: &SimulationConfig) -> Self {
        RoundRobin {
            nodes: config.nodes,
            nodes_per_op: config.nodes_per_op,
        }
    }
}

impl AssignmentPolicy for RoundRobin {
    fn kind(&self) -> PolicyKind {
        PolicyKind::RoundRobin
    }

    fn run(&mut self, trace: &Trace) -> Result<TcbSummary, AllocationError> {
        let mut ledger = Ledger::new(self.nodes, trace.total_users());
        let mut cursor = (0..self.nodes).cycle();
        for &user in trace.users() {
            for node in cursor.by_ref().take(self.nodes_per_op) {
                ledger.record(node, user);
            }
        }
        let summary = ledger.summary();
        info!(
            policy = %self.kind(),
            operations = trace.len(),
            per_node = summary.per_node,
            per_user = summary.per_user,
            "replayed trace"
        );
        Ok(summary)
    }
}

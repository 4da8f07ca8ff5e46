use super::{AssignmentPolicy, PolicyKind};
use crate::{AllocationError, Ledger, NodeId, SimulationConfig, TcbSummary, Trace};
use pileus_core::deterministic_rng;
use rand::seq::index;
use rand_chacha::ChaCha8Rng;
use tracing::{info, warn};

/// Serves each operation with nodes sampled uniformly from those still
/// under capacity. Full nodes retire for the rest of the run.
#[derive(Debug, Clone)]
pub struct RandomPick {
    nodes: usize,
    capacity: usize,
    nodes_per_op: usize,
    rng: ChaCha8Rng,
}

impl RandomPick {
    pub fn new(config: &SimulationConfig, seed: u64) -> Self {
        RandomPick {
            nodes: config.nodes,
            capacity: config.capacity,
            nodes_per_op: config.nodes_per_op,
            rng: deterministic_rng(seed),
        }
    }
}

impl AssignmentPolicy for RandomPick {
    fn kind(&self) -> PolicyKind {
        PolicyKind::RandomPick
    }

    fn run(&mut self, trace: &Trace) -> Result<TcbSummary, AllocationError> {
        let mut ledger = Ledger::new(self.nodes, trace.total_users());
        let mut load = vec![0usize; self.nodes];
        let mut eligible: Vec<NodeId> = (0..self.nodes).collect();
        let mut short_ops = 0usize;

        for &user in trace.users() {
            let picks: Vec<NodeId> = if eligible.len() <= self.nodes_per_op {
                if eligible.len() < self.nodes_per_op {
                    short_ops += 1;
                }
                eligible.clone()
            } else {
                index::sample(&mut self.rng, eligible.len(), self.nodes_per_op)
                    .into_iter()
                    .map(|i| eligible[i])
                    .collect()
            };
            for &node in &picks {
                load[node] += 1;
                ledger.record(node, user);
            }
            if picks.iter().any(|&node| load[node] >= self.capacity) {
                eligible.retain(|&node| load[node] < self.capacity);
            }
        }

        if short_ops > 0 {
            warn!(
                policy = %self.kind(),
                short_ops,
                "pool ran out of eligible nodes, some operations got fewer than {} nodes",
                self.nodes_per_op
            );
        }
        let summary = ledger.summary();
        info!(
            policy = %self.kind(),
            operations = trace.len(),
            retired = self.nodes - eligible.len(),
            per_node = summary.per_node,
            per_user = summary.per_user,
            "replayed trace"
        );
        Ok(summary)
    }
}

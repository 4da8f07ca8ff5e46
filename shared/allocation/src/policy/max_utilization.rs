use super::{AssignmentPolicy, PolicyKind};
use crate::ledger::ratio;
use crate::{AllocationError, SimulationConfig, TcbSummary, Trace};
use pileus_core::IdSet;
use tracing::info;

/// Best case bound: every node runs at full capacity and each batch of
/// `capacity` consecutive operations shares one group of `nodes_per_op` nodes.
///
/// Nothing is actually assigned; the per-node figure is
/// `capacity * sum(distinct users per full batch) / operations`, so a trailing
/// partial batch adds operations but no users. A user's TCB is `nodes_per_op`
/// for every batch they appear in, the partial one included.
#[derive(Debug, Clone)]
pub struct MaxUtilization {
    capacity: usize,
    nodes_per_op: usize,
}

impl MaxUtilization {
    pub fn new(config: &SimulationConfig) -> Self {
        MaxUtilization {
            capacity: config.capacity,
            nodes_per_op: config.nodes_per_op,
        }
    }
}

impl AssignmentPolicy for MaxUtilization {
    fn kind(&self) -> PolicyKind {
        PolicyKind::MaxUtilization
    }

    fn run(&mut self, trace: &Trace) -> Result<TcbSummary, AllocationError> {
        let mut batches_per_user = vec![0usize; trace.total_users()];
        let mut distinct_total = 0;
        let mut batches = 0;
        let mut batch = IdSet::new();
        for chunk in trace.users().chunks(self.capacity) {
            batch.clear();
            for &user in chunk {
                if batch.insert(user) {
                    batches_per_user[user] += 1;
                }
            }
            if chunk.len() == self.capacity {
                distinct_total += batch.len();
            }
            batches += 1;
        }

        let (users_served, user_batches) = batches_per_user
            .iter()
            .filter(|&&count| count > 0)
            .fold((0usize, 0usize), |(users, total), count| (users + 1, total + count));
        let summary = TcbSummary {
            per_node: ratio(self.capacity * distinct_total, trace.len()),
            per_user: ratio(self.nodes_per_op * user_batches, users_served),
            nodes_used: batches * self.nodes_per_op,
            users_served,
        };
        info!(
            policy = %self.kind(),
            operations = trace.len(),
            batches,
            per_node = summary.per_node,
            per_user = summary.per_user,
            "computed utilization bound"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(capacity: usize, nodes_per_op: usize) -> MaxUtilization {
        MaxUtilization::new(&SimulationConfig {
            capacity,
            nodes_per_op,
            ..Default::default()
        })
    }

    #[test]
    fn test_single_repeated_user() {
        let trace = Trace::new(vec![3; 20], 4).unwrap();
        let summary = policy(10, 5).run(&trace).unwrap();
        // two batches, one distinct user each
        assert_eq!(summary.per_node, 1.0);
        assert_eq!(summary.per_user, 10.0);
        assert_eq!(summary.nodes_used, 10);
        assert_eq!(summary.users_served, 1);
    }

    #[test]
    fn test_partial_batch() {
        let trace = Trace::new(vec![0, 1, 0, 2, 2], 3).unwrap();
        let summary = policy(3, 2).run(&trace).unwrap();
        // batches {0, 1} and a trailing {2} that only adds operations
        assert_eq!(summary.per_node, 3.0 * 2.0 / 5.0);
        assert_eq!(summary.per_user, 2.0);
        assert_eq!(summary.nodes_used, 4);
    }

    #[test]
    fn test_trailing_user_dilutes_full_batch() {
        let trace = Trace::new((0..11).collect(), 11).unwrap();
        let summary = policy(10, 5).run(&trace).unwrap();
        assert_eq!(summary.per_node, 100.0 / 11.0);
        assert_eq!(summary.per_user, 5.0);
        assert_eq!(summary.users_served, 11);
    }

    #[test]
    fn test_empty_trace() {
        let trace = Trace::new(vec![], 4).unwrap();
        assert_eq!(policy(10, 5).run(&trace).unwrap(), TcbSummary::default());
    }
}

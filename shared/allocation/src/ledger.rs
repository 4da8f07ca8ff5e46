use crate::{NodeId, TcbSummary, UserId};
use pileus_core::IdSet;

/// Run-wide record of which users each node has served, and which nodes
/// each user has been served by.
///
/// Both sides only grow: a `(node, user)` pair is recorded once no matter
/// how many operations repeat it.
#[derive(Debug, Clone)]
pub struct Ledger {
    served: Vec<IdSet<UserId>>,
    tcbs: Vec<IdSet<NodeId>>,
}

impl Ledger {
    pub fn new(nodes: usize, total_users: usize) -> Self {
        Ledger {
            served: vec![IdSet::new(); nodes],
            tcbs: vec![IdSet::new(); total_users],
        }
    }

    /// Returns `true` if this is the first time `node` serves `user`.
    pub fn record(&mut self, node: NodeId, user: UserId) -> bool {
        self.tcbs[user].insert(node);
        self.served[node].insert(user)
    }

    pub fn tcb(&self, user: UserId) -> &IdSet<NodeId> {
        &self.tcbs[user]
    }

    pub fn users_of(&self, node: NodeId) -> &IdSet<UserId> {
        &self.served[node]
    }

    pub fn summary(&self) -> TcbSummary {
        let (nodes_used, node_total) = occupied(&self.served);
        let (users_served, user_total) = occupied(&self.tcbs);
        TcbSummary {
            per_node: ratio(node_total, nodes_used),
            per_user: ratio(user_total, users_served),
            nodes_used,
            users_served,
        }
    }
}

fn occupied<T>(sets: &[IdSet<T>]) -> (usize, usize)
where
    T: Copy + Eq + std::hash::Hash,
{
    sets.iter()
        .filter(|set| !set.is_empty())
        .fold((0, 0), |(count, total), set| (count + 1, total + set.len()))
}

pub(crate) fn ratio(total: usize, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        total as f64 / count as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_is_idempotent() {
        let mut ledger = Ledger::new(4, 3);
        assert!(ledger.record(1, 2));
        assert!(!ledger.record(1, 2));
        assert!(ledger.record(3, 2));
        assert_eq!(ledger.tcb(2).as_slice(), &[1, 3]);
        assert_eq!(ledger.users_of(1).len(), 1);
    }

    #[test]
    fn test_summary_ignores_idle() {
        let mut ledger = Ledger::new(10, 5);
        // node 0 serves users 0, 1; node 1 serves user 0
        ledger.record(0, 0);
        ledger.record(0, 1);
        ledger.record(1, 0);
        let summary = ledger.summary();
        assert_eq!(summary.nodes_used, 2);
        assert_eq!(summary.users_served, 2);
        assert_eq!(summary.per_node, 1.5);
        assert_eq!(summary.per_user, 1.5);
    }

    #[test]
    fn test_empty_summary() {
        let summary = Ledger::new(3, 3).summary();
        assert_eq!(summary.per_node, 0.0);
        assert_eq!(summary.nodes_used, 0);
    }
}

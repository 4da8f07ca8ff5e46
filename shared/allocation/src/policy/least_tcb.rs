use super::{AssignmentPolicy, PolicyKind};
use crate::{AllocationError, Ledger, NodeId, SimulationConfig, TcbSummary, Trace, UserId};
use pileus_core::IdSet;
use tracing::{debug, info};

/// Greedy policy that keeps each user's TCB small.
///
/// An operation first reuses nodes already in the user's TCB. Any shortfall
/// is filled from the active window, preferring nodes that have served the
/// fewest distinct users (ties go to the lower node index). When the window
/// has no headroom left it moves forward, its load counters start over and
/// the user's TCB is offered again before any fresh node.
#[derive(Debug, Clone)]
pub struct LeastTcb {
    nodes: usize,
    capacity: usize,
    nodes_per_op: usize,
    window: usize,
    recenter_divisor: usize,
    stats: WindowStats,
}

/// Bookkeeping from the last run, mostly useful for tests and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WindowStats {
    pub advances: usize,
    /// Highest number of operations any node served within a single window.
    pub peak_load: usize,
    pub final_start: NodeId,
}

#[derive(Debug, Clone, Default)]
struct Slot {
    load: usize,
    users: IdSet<UserId>,
}

/// Window-local view of nodes `start..end`.
#[derive(Debug)]
struct Window {
    start: NodeId,
    slots: Vec<Slot>,
}

impl Window {
    fn new(start: NodeId, width: usize, nodes: usize) -> Self {
        let end = start.saturating_add(width).min(nodes);
        Window {
            start,
            slots: vec![Slot::default(); end.saturating_sub(start)],
        }
    }

    fn slot(&self, node: NodeId) -> Option<&Slot> {
        node.checked_sub(self.start)
            .and_then(|offset| self.slots.get(offset))
    }

    fn has_headroom(&self, node: NodeId, capacity: usize) -> bool {
        self.slot(node).is_some_and(|slot| slot.load < capacity)
    }

    fn assign(&mut self, node: NodeId, user: UserId) -> usize {
        let slot = &mut self.slots[node - self.start];
        slot.load += 1;
        slot.users.insert(user);
        slot.load
    }

    /// Window nodes ordered by (distinct users, node index).
    fn ranked(&self) -> Vec<NodeId> {
        let mut order: Vec<NodeId> = (self.start..self.start + self.slots.len()).collect();
        order.sort_by_key(|&node| (self.slots[node - self.start].users.len(), node));
        order
    }
}

impl LeastTcb {
    pub fn new(config: &SimulationConfig) -> Self {
        LeastTcb {
            nodes: config.nodes,
            capacity: config.capacity,
            nodes_per_op: config.nodes_per_op,
            window: config.window_size(),
            recenter_divisor: config.recenter_divisor,
            stats: WindowStats::default(),
        }
    }

    pub fn stats(&self) -> WindowStats {
        self.stats
    }

    fn assign(&mut self, window: &mut Window, ledger: &mut Ledger, node: NodeId, user: UserId) {
        let load = window.assign(node, user);
        self.stats.peak_load = self.stats.peak_load.max(load);
        ledger.record(node, user);
    }

    /// Start of the window that replaces `current` after `progress` operations.
    fn next_start(&self, current: NodeId, progress: usize) -> Option<NodeId> {
        let proposed = progress / self.recenter_divisor;
        let start = if proposed > current {
            proposed
        } else {
            current + 1
        };
        (start < self.nodes).then_some(start)
    }
}

impl AssignmentPolicy for LeastTcb {
    fn kind(&self) -> PolicyKind {
        PolicyKind::LeastTcb
    }

    fn run(&mut self, trace: &Trace) -> Result<TcbSummary, AllocationError> {
        self.stats = WindowStats::default();
        let mut ledger = Ledger::new(self.nodes, trace.total_users());
        let mut window = Window::new(0, self.window, self.nodes);

        for (progress, &user) in trace.users().iter().enumerate() {
            let mut chosen: IdSet<NodeId> = IdSet::new();
            loop {
                let reusable: Vec<NodeId> = ledger
                    .tcb(user)
                    .iter()
                    .copied()
                    .filter(|node| {
                        !chosen.contains(node) && window.has_headroom(*node, self.capacity)
                    })
                    .take(self.nodes_per_op - chosen.len())
                    .collect();
                for node in reusable {
                    self.assign(&mut window, &mut ledger, node, user);
                    chosen.insert(node);
                }

                for node in window.ranked() {
                    if chosen.len() == self.nodes_per_op {
                        break;
                    }
                    if chosen.contains(&node) || !window.has_headroom(node, self.capacity) {
                        continue;
                    }
                    self.assign(&mut window, &mut ledger, node, user);
                    chosen.insert(node);
                }
                if chosen.len() == self.nodes_per_op {
                    break;
                }

                let Some(start) = self.next_start(window.start, progress) else {
                    return Err(AllocationError::AssignmentImpossible {
                        operation: progress,
                        user,
                        window_start: window.start,
                    });
                };
                debug!(
                    operation = progress,
                    from = window.start,
                    to = start,
                    "least-TCB window exhausted, advancing"
                );
                window = Window::new(start, self.window, self.nodes);
                self.stats.advances += 1;
            }
        }

        self.stats.final_start = window.start;
        let summary = ledger.summary();
        info!(
            policy = %self.kind(),
            operations = trace.len(),
            advances = self.stats.advances,
            per_node = summary.per_node,
            per_user = summary.per_user,
            "replayed trace"
        );
        Ok(summary)
    }
}

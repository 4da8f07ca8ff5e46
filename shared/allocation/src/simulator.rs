use crate::policy::{AssignmentPolicy, LeastTcb, MaxUtilization, RandomPick, RoundRobin};
use crate::{
    AllocationError, ComparisonRow, ComparisonTable, PolicyKind, SimulationConfig, SweepConfig,
    TcbSummary, Trace,
};
use pileus_core::derive_seed;
use tracing::info;

// seed streams derived from the configured seed
const RANDOM_PICK_STREAM: u64 = 1;
const TRACE_STREAM_BASE: u64 = 1 << 32;

/// Replays traces against the configured node pool.
#[derive(Debug, Clone)]
pub struct Simulator {
    config: SimulationConfig,
}

impl Simulator {
    pub fn new(config: SimulationConfig) -> Result<Self, AllocationError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn policy(&self, kind: PolicyKind) -> Box<dyn AssignmentPolicy> {
        match kind {
            PolicyKind::MaxUtilization => Box::new(MaxUtilization::new(&self.config)),
            PolicyKind::RandomPick => Box::new(RandomPick::new(
                &self.config,
                derive_seed(self.config.seed, RANDOM_PICK_STREAM),
            )),
            PolicyKind::RoundRobin => Box::new(RoundRobin::new(&self.config)),
            PolicyKind::LeastTcb => Box::new(LeastTcb::new(&self.config)),
        }
    }

    /// A synthetic trace of `len` operations drawn from the configured users.
    pub fn generate_trace(&self, len: usize, stream: u64) -> Trace {
        Trace::generate(
            len,
            self.config.total_users,
            derive_seed(self.config.seed, TRACE_STREAM_BASE + stream),
        )
    }

    pub fn run(&self, kind: PolicyKind, trace: &Trace) -> Result<TcbSummary, AllocationError> {
        let trace = trace.clone().with_total_users(self.config.total_users)?;
        self.policy(kind).run(&trace)
    }

    /// Replays the same trace under every policy.
    pub fn compare(&self, trace: &Trace) -> Result<ComparisonRow, AllocationError> {
        Ok(ComparisonRow {
            trial_size: trace.len(),
            max_utilization: self.run(PolicyKind::MaxUtilization, trace)?,
            random_pick: self.run(PolicyKind::RandomPick, trace)?,
            round_robin: self.run(PolicyKind::RoundRobin, trace)?,
            least_tcb: self.run(PolicyKind::LeastTcb, trace)?,
        })
    }

    /// One comparison per trial size, each on a freshly generated trace.
    pub fn sweep(&self, sweep: &SweepConfig) -> Result<ComparisonTable, AllocationError> {
        sweep.validate()?;
        let mut table = ComparisonTable::default();
        for (trial, size) in sweep.trial_sizes().enumerate() {
            let trial_sim = Simulator {
                config: SimulationConfig {
                    seed: derive_seed(self.config.seed, trial as u64),
                    ..self.config.clone()
                },
            };
            let trace = trial_sim.generate_trace(size, 0);
            let row = trial_sim.compare(&trace)?;
            info!(
                trial,
                size,
                least_tcb = row.least_tcb.per_node,
                random_pick = row.random_pick.per_node,
                "finished trial"
            );
            table.rows.push(row);
        }
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_invalid_config() {
        let err = Simulator::new(SimulationConfig {
            capacity: 0,
            ..Default::default()
        })
        .unwrap_err();
        assert_eq!(err, AllocationError::Config(crate::ConfigError::NoCapacity));
    }

    #[test]
    fn test_run_widens_user_population() {
        let sim = Simulator::new(SimulationConfig {
            total_users: 3,
            ..Default::default()
        })
        .unwrap();
        let trace = Trace::new(vec![0, 5], 6).unwrap();
        assert!(matches!(
            sim.run(PolicyKind::RoundRobin, &trace),
            Ok(TcbSummary { users_served: 2, .. })
        ));
        let parsed = Trace::parse("1 0\n2 2\n").unwrap();
        assert_eq!(parsed.total_users(), 3);
        assert!(sim.run(PolicyKind::RoundRobin, &parsed).is_ok());
    }

    #[test]
    fn test_sweep_is_reproducible() {
        let sim = Simulator::new(SimulationConfig {
            nodes: 100,
            total_users: 40,
            seed: 5,
            ..Default::default()
        })
        .unwrap();
        let sweep = SweepConfig {
            start: 10,
            end: 60,
            step: 25,
        };
        let a = sim.sweep(&sweep).unwrap();
        let b = sim.sweep(&sweep).unwrap();
        assert_eq!(a, b);
        assert_eq!(
            a.rows.iter().map(|r| r.trial_size).collect::<Vec<_>>(),
            vec![10, 35, 60]
        );
    }
}

use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("each operation must use at least one node")]
    NoNodesPerOp,

    #[error("node capacity must be at least 1")]
    NoCapacity,

    #[error("operations need {per_op} distinct nodes but the pool only has {nodes}")]
    NodesPerOpExceedsPool { per_op: usize, nodes: usize },

    #[error("window of {window} nodes is invalid for a pool of {nodes}")]
    InvalidWindow { window: usize, nodes: usize },

    #[error("window recenter divisor must be at least 1")]
    ZeroRecenterDivisor,

    #[error("at least one user is required")]
    NoUsers,

    #[error("trial sweep {start}..={end} step {step} is empty")]
    EmptySweep {
        start: usize,
        end: usize,
        step: usize,
    },
}

/// Shape of the node pool and the synthetic workload replayed against it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub nodes: usize,
    /// Maximum operations a node may service (per window for least-TCB).
    pub capacity: usize,
    pub nodes_per_op: usize,
    pub total_users: usize,
    /// Nodes eligible for new least-TCB assignments at once. Defaults to the whole pool.
    pub window: Option<usize>,
    /// On window exhaustion the window restarts at `progress / recenter_divisor`.
    pub recenter_divisor: usize,
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            nodes: 1000,
            capacity: 10,
            nodes_per_op: 5,
            total_users: 400,
            window: None,
            recenter_divisor: 2,
            seed: 0,
        }
    }
}

impl SimulationConfig {
    pub fn window_size(&self) -> usize {
        self.window.unwrap_or(self.nodes)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.nodes_per_op == 0 {
            return Err(ConfigError::NoNodesPerOp);
        }
        if self.capacity == 0 {
            return Err(ConfigError::NoCapacity);
        }
        if self.nodes_per_op > self.nodes {
            return Err(ConfigError::NodesPerOpExceedsPool {
                per_op: self.nodes_per_op,
                nodes: self.nodes,
            });
        }
        let window = self.window_size();
        if window == 0 || window > self.nodes {
            return Err(ConfigError::InvalidWindow {
                window,
                nodes: self.nodes,
            });
        }
        if self.recenter_divisor == 0 {
            return Err(ConfigError::ZeroRecenterDivisor);
        }
        if self.total_users == 0 {
            return Err(ConfigError::NoUsers);
        }
        Ok(())
    }
}

/// Trace lengths to compare policies on: `start..=end` in increments of `step`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    pub start: usize,
    pub end: usize,
    pub step: usize,
}

impl Default for SweepConfig {
    fn default() -> Self {
        SweepConfig {
            start: 50,
            end: 2000,
            step: 50,
        }
    }
}

impl SweepConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.start == 0 || self.step == 0 || self.start > self.end {
            return Err(ConfigError::EmptySweep {
                start: self.start,
                end: self.end,
                step: self.step,
            });
        }
        Ok(())
    }

    pub fn trial_sizes(&self) -> impl Iterator<Item = usize> {
        (self.start..=self.end).step_by(self.step.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert_eq!(SimulationConfig::default().validate(), Ok(()));
        assert_eq!(SweepConfig::default().validate(), Ok(()));
        assert_eq!(SimulationConfig::default().window_size(), 1000);
    }

    #[test]
    fn test_rejects_bad_pool() {
        let base = SimulationConfig::default();
        let check = |config: SimulationConfig| config.validate().unwrap_err();

        assert_eq!(
            check(SimulationConfig {
                nodes_per_op: 0,
                ..base.clone()
            }),
            ConfigError::NoNodesPerOp
        );
        assert_eq!(
            check(SimulationConfig {
                capacity: 0,
                ..base.clone()
            }),
            ConfigError::NoCapacity
        );
        assert_eq!(
            check(SimulationConfig {
                nodes: 4,
                ..base.clone()
            }),
            ConfigError::NodesPerOpExceedsPool {
                per_op: 5,
                nodes: 4
            }
        );
        assert_eq!(
            check(SimulationConfig {
                window: Some(1001),
                ..base.clone()
            }),
            ConfigError::InvalidWindow {
                window: 1001,
                nodes: 1000
            }
        );
        assert_eq!(
            check(SimulationConfig {
                recenter_divisor: 0,
                ..base.clone()
            }),
            ConfigError::ZeroRecenterDivisor
        );
        assert_eq!(
            check(SimulationConfig {
                total_users: 0,
                ..base
            }),
            ConfigError::NoUsers
        );
    }

    #[test]
    fn test_trial_sizes() {
        let sweep = SweepConfig {
            start: 50,
            end: 200,
            step: 50,
        };
        assert_eq!(sweep.trial_sizes().collect::<Vec<_>>(), vec![50, 100, 150, 200]);
        assert_eq!(SweepConfig::default().trial_sizes().count(), 40);
        assert!(SweepConfig {
            start: 10,
            end: 5,
            step: 1
        }
        .validate()
        .is_err());
    }
}

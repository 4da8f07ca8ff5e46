use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExposureError {
    #[error("draw size must be at least 1")]
    EmptyDraw,

    #[error("draw size {draw} exceeds pool of {nodes} nodes")]
    DrawExceedsPool { draw: u64, nodes: u64 },

    #[error("at least one round is required")]
    NoRounds,

    #[error("mitigation window {start}..={end} does not fit rounds 1..={rounds}")]
    MitigationOutOfRange { start: u64, end: u64, rounds: u64 },
}

/// Parameters for one probability table: `draw` nodes picked uniformly out
/// of `nodes` every round, for `rounds` rounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ExposureConfig {
    pub nodes: u64,
    pub draw: u64,
    pub rounds: u64,
}

impl Default for ExposureConfig {
    fn default() -> Self {
        ExposureConfig {
            nodes: 1000,
            draw: 5,
            rounds: 3000,
        }
    }
}

impl ExposureConfig {
    pub fn new(nodes: u64, draw: u64, rounds: u64) -> Self {
        ExposureConfig {
            nodes,
            draw,
            rounds,
        }
    }

    pub fn validate(&self) -> Result<(), ExposureError> {
        if self.draw == 0 {
            return Err(ExposureError::EmptyDraw);
        }
        if self.draw > self.nodes {
            return Err(ExposureError::DrawExceedsPool {
                draw: self.draw,
                nodes: self.nodes,
            });
        }
        if self.rounds == 0 {
            return Err(ExposureError::NoRounds);
        }
        Ok(())
    }
}

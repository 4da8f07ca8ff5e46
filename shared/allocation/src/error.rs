use crate::{ConfigError, TraceError, UserId};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AllocationError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Trace(#[from] TraceError),

    #[error("assignment impossible: operation {operation} for user {user} found no headroom after the window reached node {window_start}")]
    AssignmentImpossible {
        operation: usize,
        user: UserId,
        window_start: usize,
    },
}

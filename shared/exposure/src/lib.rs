mod config;
mod curve;
mod engine;
mod mitigation;
mod table;

pub use config::{ExposureConfig, ExposureError};
pub use curve::{ExposureCurve, ExposurePoint};
pub use engine::ProbabilityEngine;
pub use mitigation::Mitigation;
pub use table::ProbabilityTable;

/// Tolerance used when comparing probabilities and row sums.
pub const PROBABILITY_TOLERANCE: f64 = 1e-9;

mod binomial;
mod id_set;
mod seed;

pub use binomial::{binomial, binomial_f64, checked_binomial};
pub use id_set::IdSet;
pub use seed::{deterministic_rng, derive_seed};

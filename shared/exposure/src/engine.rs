use crate::{ExposureConfig, ExposureCurve, ExposureError, ExposurePoint, ProbabilityTable};
use pileus_core::binomial_f64;
use tracing::{debug, info};

/// Computes the probability that exactly `touched` distinct nodes have been
/// drawn after `round` rounds of picking `draw` nodes out of `nodes`.
///
/// One engine owns the memo table for its `(nodes, draw)` pair. Every cell is
/// computed at most once, by the recurrence
///
/// ```text
/// P(t, r) = sum_{i=0}^{min(b, t-b)} P(t-i, r-1) * C(t-i, b-i) * C(m-t+i, i) / C(m, b)
/// ```
///
/// where `i` is the number of nodes first touched in round `r`.
#[derive(Debug, Clone)]
pub struct ProbabilityEngine {
    config: ExposureConfig,
    table: ProbabilityTable,
    // rounds whose every reachable cell is in the table
    filled_rounds: u64,
    // weights[t - b][i]: chance that a draw adds exactly i new nodes to t - i touched ones
    weights: Vec<Vec<f64>>,
}

impl ProbabilityEngine {
    pub fn new(config: ExposureConfig) -> Result<Self, ExposureError> {
        config.validate()?;
        let ExposureConfig { nodes, draw, .. } = config;
        let total = binomial_f64(nodes, draw);
        let weights = (draw..=nodes)
            .map(|touched| {
                (0..=draw.min(touched - draw))
                    .map(|i| {
                        binomial_f64(touched - i, draw - i) * binomial_f64(nodes - touched + i, i)
                            / total
                    })
                    .collect()
            })
            .collect();
        Ok(Self {
            config,
            table: ProbabilityTable::new(nodes),
            filled_rounds: 0,
            weights,
        })
    }

    pub fn config(&self) -> &ExposureConfig {
        &self.config
    }

    pub fn table(&self) -> &ProbabilityTable {
        &self.table
    }

    /// Largest touched count reachable after `round` rounds.
    pub fn max_touched(&self, round: u64) -> u64 {
        round.saturating_mul(self.config.draw).min(self.config.nodes)
    }

    /// `P(touched, round)`. Unreachable combinations are exactly zero.
    pub fn probability(&mut self, touched: u64, round: u64) -> f64 {
        // keep the recursion one row deep
        self.fill_through(round.saturating_sub(1));
        self.lookup(touched, round)
    }

    /// Fills every reachable cell of rounds `1..=round`, in order.
    pub fn fill_through(&mut self, round: u64) {
        for r in (self.filled_rounds + 1)..=round {
            for touched in self.config.draw..=self.max_touched(r) {
                self.lookup(touched, r);
            }
            self.filled_rounds = r;
            debug!(
                round = r,
                reachable = self.max_touched(r) - self.config.draw + 1,
                "filled probability row"
            );
        }
    }

    pub fn row_sum(&mut self, round: u64) -> f64 {
        self.fill_through(round);
        (self.config.draw..=self.max_touched(round))
            .map(|touched| self.lookup(touched, round))
            .sum()
    }

    /// Expected number of distinct nodes touched after `round` rounds.
    pub fn expected_exposure(&mut self, round: u64) -> f64 {
        self.fill_through(round);
        (self.config.draw..=self.max_touched(round))
            .map(|touched| self.lookup(touched, round) * touched as f64)
            .sum()
    }

    /// Expected exposure for every round `1..=rounds` of the config.
    pub fn exposure_curve(&mut self) -> ExposureCurve {
        let rounds = self.config.rounds;
        self.fill_through(rounds);
        let points = (1..=rounds)
            .map(|round| ExposurePoint {
                round,
                expected: self.expected_exposure(round),
            })
            .collect::<Vec<_>>();
        info!(
            nodes = self.config.nodes,
            draw = self.config.draw,
            rounds,
            final_exposure = points.last().map(|p| p.expected).unwrap_or_default(),
            "built exposure curve"
        );
        ExposureCurve::new(points)
    }

    fn boundary(&self, touched: u64, round: u64) -> Option<f64> {
        let draw = self.config.draw;
        if round == 0 || touched < draw || touched > self.config.nodes {
            return Some(0.0);
        }
        if round.saturating_mul(draw) < touched {
            return Some(0.0);
        }
        if touched == draw && round == 1 {
            return Some(1.0);
        }
        None
    }

    fn lookup(&mut self, touched: u64, round: u64) -> f64 {
        if let Some(p) = self.boundary(touched, round) {
            return p;
        }
        if let Some(p) = self.table.get(touched, round) {
            return p;
        }
        let draw = self.config.draw;
        let row = (touched - draw) as usize;
        let mut probability = 0.0;
        for i in 0..=draw.min(touched - draw) {
            let weight = self.weights[row][i as usize];
            probability += self.lookup(touched - i, round - 1) * weight;
        }
        self.table.record(touched, round, probability)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn engine(nodes: u64, draw: u64, rounds: u64) -> ProbabilityEngine {
        ProbabilityEngine::new(ExposureConfig::new(nodes, draw, rounds)).unwrap()
    }

    #[test]
    fn test_first_round() {
        let mut e = engine(10, 5, 3);
        assert_eq!(e.probability(5, 1), 1.0);
        for touched in 0..=10 {
            if touched != 5 {
                assert_eq!(e.probability(touched, 1), 0.0);
            }
        }
    }

    #[test]
    fn test_second_round_by_hand() {
        // m = 4, b = 2: the second draw repeats both nodes with prob 1/6,
        // one node with prob 4/6, and neither with prob 1/6.
        let mut e = engine(4, 2, 2);
        assert_abs_diff_eq!(e.probability(2, 2), 1.0 / 6.0, epsilon = 1e-12);
        assert_abs_diff_eq!(e.probability(3, 2), 4.0 / 6.0, epsilon = 1e-12);
        assert_abs_diff_eq!(e.probability(4, 2), 1.0 / 6.0, epsilon = 1e-12);
        assert_abs_diff_eq!(e.expected_exposure(2), 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_unreachable_cells_are_zero() {
        let mut e = engine(10, 5, 3);
        assert_eq!(e.probability(4, 2), 0.0);
        assert_eq!(e.probability(11, 3), 0.0);
        assert_eq!(e.probability(5, 0), 0.0);
        assert_eq!(e.probability(10, 1), 0.0);
    }

    #[test]
    fn test_cells_computed_once() {
        let mut e = engine(20, 3, 6);
        e.fill_through(6);
        let filled = e.table().filled_cells();
        let first = e.probability(12, 5);
        assert_eq!(e.table().filled_cells(), filled);
        assert_eq!(e.probability(12, 5), first);
    }

    #[test]
    fn test_full_draw_pool() {
        let mut e = engine(5, 5, 4);
        for round in 1..=4 {
            assert_abs_diff_eq!(e.probability(5, round), 1.0, epsilon = 1e-12);
            assert_abs_diff_eq!(e.expected_exposure(round), 5.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_invalid_config() {
        assert_eq!(
            ProbabilityEngine::new(ExposureConfig::new(3, 5, 1)).unwrap_err(),
            ExposureError::DrawExceedsPool { draw: 5, nodes: 3 }
        );
    }
}

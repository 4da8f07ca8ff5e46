use crate::{ExposureCurve, ExposureError, ExposurePoint};
use pileus_core::deterministic_rng;
use rand::Rng;
use serde::Deserialize;

/// Models what happens to the exposure curve when compromised nodes stop
/// counting after some round.
///
/// Past the cut-off, exposure settles on a plateau plus a small jitter of
/// 1..=3 nodes drawn from a seeded generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mitigation {
    /// Credentials expire after `after` rounds; exposure freezes at that round's value.
    Expiration { after: u64 },
    /// Revocation kicks in at `start` and is fully effective at `full`.
    /// Between the two, exposure ramps linearly towards the mean of the
    /// unmitigated curve over `(start, full]`.
    Revocation { start: u64, full: u64 },
}

const JITTER: std::ops::RangeInclusive<u64> = 1..=3;

impl Mitigation {
    pub fn validate(&self, rounds: u64) -> Result<(), ExposureError> {
        let (start, end) = match *self {
            Mitigation::Expiration { after } => (after, after),
            Mitigation::Revocation { start, full } => (start, full),
        };
        if start == 0 || start > end || end > rounds {
            return Err(ExposureError::MitigationOutOfRange { start, end, rounds });
        }
        Ok(())
    }

    pub fn apply(&self, curve: &ExposureCurve, seed: u64) -> Result<ExposureCurve, ExposureError> {
        self.validate(curve.len() as u64)?;
        let mut rng = deterministic_rng(seed);
        let mut jitter = move || rng.gen_range(JITTER) as f64;
        let value = |round: u64| curve.points()[round as usize - 1].expected;

        let points = match *self {
            Mitigation::Expiration { after } => {
                let plateau = value(after);
                curve
                    .points()
                    .iter()
                    .map(|p| ExposurePoint {
                        round: p.round,
                        expected: if p.round <= after {
                            p.expected
                        } else {
                            plateau + jitter()
                        },
                    })
                    .collect()
            }
            Mitigation::Revocation { start, full } => {
                let at_start = value(start);
                let mean = if full == start {
                    at_start
                } else {
                    ((start + 1)..=full).map(value).sum::<f64>() / (full - start) as f64
                };
                curve
                    .points()
                    .iter()
                    .map(|p| {
                        let expected = if p.round <= start {
                            p.expected
                        } else if p.round <= full {
                            let progress = (p.round - start) as f64 / (full - start) as f64;
                            at_start + (mean - at_start) * progress
                        } else {
                            mean + jitter()
                        };
                        ExposurePoint {
                            round: p.round,
                            expected,
                        }
                    })
                    .collect()
            }
        };
        Ok(ExposureCurve::new(points))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn linear(rounds: u64) -> ExposureCurve {
        ExposureCurve::new(
            (1..=rounds)
                .map(|round| ExposurePoint {
                    round,
                    expected: round as f64 * 10.0,
                })
                .collect(),
        )
    }

    #[test]
    fn test_expiration_plateau() {
        let curve = linear(10);
        let mitigated = Mitigation::Expiration { after: 4 }.apply(&curve, 7).unwrap();
        assert_eq!(mitigated.len(), 10);
        for round in 1..=4 {
            assert_eq!(mitigated.at(round), curve.at(round));
        }
        for round in 5..=10 {
            let v = mitigated.at(round).unwrap();
            assert!((41.0..=43.0).contains(&v), "round {round}: {v}");
        }
    }

    #[test]
    fn test_revocation_ramp() {
        let curve = linear(10);
        let mitigated = Mitigation::Revocation { start: 2, full: 6 }
            .apply(&curve, 7)
            .unwrap();
        // mean of 30, 40, 50, 60
        let mean = 45.0;
        assert_eq!(mitigated.at(2), Some(20.0));
        assert_relative_eq!(mitigated.at(4).unwrap(), 20.0 + (mean - 20.0) * 0.5);
        assert_relative_eq!(mitigated.at(6).unwrap(), mean);
        for round in 7..=10 {
            let v = mitigated.at(round).unwrap();
            assert!((46.0..=48.0).contains(&v), "round {round}: {v}");
        }
    }

    #[test]
    fn test_seeded_jitter_is_reproducible() {
        let curve = linear(20);
        let mitigation = Mitigation::Expiration { after: 3 };
        assert_eq!(
            mitigation.apply(&curve, 11).unwrap(),
            mitigation.apply(&curve, 11).unwrap()
        );
    }

    #[test]
    fn test_out_of_range() {
        let curve = linear(5);
        assert_eq!(
            Mitigation::Expiration { after: 6 }.apply(&curve, 0),
            Err(ExposureError::MitigationOutOfRange {
                start: 6,
                end: 6,
                rounds: 5
            })
        );
        assert!(Mitigation::Revocation { start: 4, full: 2 }
            .validate(5)
            .is_err());
        assert!(Mitigation::Revocation { start: 0, full: 2 }
            .validate(5)
            .is_err());
    }
}

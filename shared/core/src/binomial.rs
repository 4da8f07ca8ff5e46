/// Number of `k`-subsets of `n` items, or `None` if `k > n` or the value
/// does not fit in a `u128`.
///
/// Uses the multiplicative form `C(n-k+i, i) = C(n-k+i-1, i-1) * (n-k+i) / i`,
/// which divides exactly at every step, so no factorial is ever formed.
pub fn checked_binomial(n: u64, k: u64) -> Option<u128> {
    if k > n {
        return None;
    }
    let k = k.min(n - k);
    let base = (n - k) as u128;
    let mut result: u128 = 1;
    for i in 1..=k as u128 {
        result = result.checked_mul(base + i)? / i;
    }
    Some(result)
}

/// Exact binomial coefficient. Callers must keep `k <= n`.
///
/// Returns 0 when the coefficient does not fit in a `u128`; use
/// [`checked_binomial`] where that can happen. Large pools go through
/// [`binomial_f64`] instead.
pub fn binomial(n: u64, k: u64) -> u128 {
    debug_assert!(k <= n, "binomial({n}, {k}) is outside the domain n >= k");
    checked_binomial(n, k).unwrap_or(0)
}

/// Floating point binomial coefficient, for pool sizes where the exact value
/// overflows integers but still fits an `f64`.
pub fn binomial_f64(n: u64, k: u64) -> f64 {
    debug_assert!(k <= n, "binomial({n}, {k}) is outside the domain n >= k");
    if k > n {
        return 0.0;
    }
    let k = k.min(n - k);
    let base = (n - k) as f64;
    (1..=k).fold(1.0, |acc, i| acc * (base + i as f64) / i as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[test]
    fn test_small_values() {
        assert_eq!(binomial(0, 0), 1);
        assert_eq!(binomial(5, 0), 1);
        assert_eq!(binomial(5, 5), 1);
        assert_eq!(binomial(5, 2), 10);
        assert_eq!(binomial(10, 5), 252);
        assert_eq!(binomial(1000, 5), 8_250_291_250_200);
    }

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(7)]
    #[case(30)]
    #[case(64)]
    fn test_symmetry(#[case] n: u64) {
        for k in 0..=n {
            assert_eq!(binomial(n, k), binomial(n, n - k), "C({n}, {k})");
        }
        assert_eq!(binomial(n, 0), 1);
        assert_eq!(binomial(n, n), 1);
    }

    #[test]
    fn test_pascal_rule() {
        for n in 1..40u64 {
            for k in 1..n {
                assert_eq!(binomial(n, k), binomial(n - 1, k - 1) + binomial(n - 1, k));
            }
        }
    }

    #[test]
    fn test_overflow_reads_as_zero() {
        assert_eq!(binomial(200, 100), 0);
        assert_eq!(binomial(200, 3), 1_313_400);
    }

    #[test]
    fn test_checked_out_of_domain() {
        assert_eq!(checked_binomial(3, 4), None);
        // C(200, 100) is about 9e58, far beyond u128
        assert_eq!(checked_binomial(200, 100), None);
        assert!(checked_binomial(120, 60).is_some());
    }

    #[test]
    fn test_float_matches_exact() {
        for (n, k) in [(10, 3), (1000, 5), (995, 2), (60, 30)] {
            assert_relative_eq!(
                binomial_f64(n, k),
                binomial(n, k) as f64,
                max_relative = 1e-12
            );
        }
    }

    #[test]
    fn test_float_large_pool() {
        let value = binomial_f64(1000, 500);
        assert!(value.is_finite());
        assert!(value > 1e299);
    }
}

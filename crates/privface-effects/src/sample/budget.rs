// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Privacy budget split across clusters, and the per-cluster bound on how many
// pixels may be retained.

/// Stabilizer added to the denominator of the selection ratio.
pub const RATIO_STABILIZER: f64 = 1e-9;

/// Split `epsilon` across clusters in proportion to their populations.
///
/// The shares sum to `epsilon`. An all-empty population yields all zeros.
pub fn allocate_budget(epsilon: f64, counts: &[usize]) -> Vec<f64> {
    let total: usize = counts.iter().sum();
    if total == 0 {
        return vec![0.0; counts.len()];
    }
    counts
        .iter()
        .map(|&count| epsilon * count as f64 / total as f64)
        .collect()
}

/// Largest `x <= num_pixels` whose selection ratio stays within `exp(ε_i · x)`.
///
/// Starting from `num_pixels`, `x` is decremented while
/// `C(n, x) / (C(n - m, x) + 1e-9) > exp(ε_i · x)` and fewer than
/// `max_iterations` steps have been taken. Populations no larger than
/// `num_pixels` make the ratio infinite, which accepts immediately. The
/// result is clamped to `[0, population]`.
pub fn retained_count(population: usize, num_pixels: usize, epsilon_i: f64, max_iterations: u32) -> usize {
    let mut x = num_pixels;
    if population > num_pixels {
        let mut iteration = 0;
        while iteration < max_iterations && x > 0 {
            if ln_selection_ratio(population, num_pixels, x) <= epsilon_i * x as f64 {
                break;
            }
            x -= 1;
            iteration += 1;
        }
    }
    x.min(population)
}

/// `ln(C(n, x) / (C(n - m, x) + 1e-9))`, for `n > m`.
fn ln_selection_ratio(n: usize, m: usize, x: usize) -> f64 {
    let numerator = ln_binomial(n, x).unwrap_or(f64::NEG_INFINITY);
    let denominator = match ln_binomial(n - m, x) {
        // Past this point the stabilizer is far below f64 resolution.
        Some(ln_c) if ln_c > 700.0 => ln_c,
        Some(ln_c) => (ln_c.exp() + RATIO_STABILIZER).ln(),
        None => RATIO_STABILIZER.ln(),
    };
    numerator - denominator
}

/// `ln C(n, k)`, or `None` when `k > n` (the coefficient is zero).
fn ln_binomial(n: usize, k: usize) -> Option<f64> {
    if k > n {
        return None;
    }
    let k = k.min(n - k);
    Some(
        (0..k)
            .map(|i| ((n - i) as f64).ln() - ((i + 1) as f64).ln())
            .sum(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budget_is_proportional_and_sums_to_epsilon() {
        let shares = allocate_budget(10.0, &[1, 3, 0, 6]);
        assert_eq!(shares.len(), 4);
        assert!((shares[0] - 1.0).abs() < 1e-12);
        assert!((shares[1] - 3.0).abs() < 1e-12);
        assert_eq!(shares[2], 0.0);
        assert!((shares.iter().sum::<f64>() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn empty_population_gets_no_budget() {
        assert_eq!(allocate_budget(5.0, &[0, 0]), vec![0.0, 0.0]);
    }

    #[test]
    fn ln_binomial_matches_small_values() {
        assert!((ln_binomial(5, 2).unwrap() - 10f64.ln()).abs() < 1e-12);
        assert!((ln_binomial(10, 10).unwrap()).abs() < 1e-12);
        assert_eq!(ln_binomial(3, 4), None);
    }

    /// Small populations accept `num_pixels` at once, limited by population.
    #[test]
    fn small_population_is_capped_by_size() {
        assert_eq!(retained_count(5, 12, 0.0, 1000), 5);
        assert_eq!(retained_count(12, 12, 0.0, 1000), 12);
    }

    /// A large budget accepts the starting value without any decrement.
    #[test]
    fn generous_budget_keeps_num_pixels() {
        assert_eq!(retained_count(50_000, 12, 10.0, 1000), 12);
    }

    /// With no budget the ratio only falls under 1 at x = 0.
    #[test]
    fn zero_budget_suppresses_everything() {
        assert_eq!(retained_count(10_000, 12, 0.0, 1000), 0);
    }

    #[test]
    fn iteration_cap_stops_the_search() {
        assert_eq!(retained_count(10_000, 12, 0.0, 5), 7);
    }

    /// `C(100, x) / C(90, x)` grows roughly like `(100/90)^x`, so a budget just
    /// above `ln(100/90)` per pixel admits some pixels but not all ten.
    #[test]
    fn intermediate_budget_lands_between_bounds() {
        let x = retained_count(100, 10, 0.11, 1000);
        assert!(x > 0 && x < 10, "retained {x}");
    }

    #[test]
    fn never_exceeds_population_or_num_pixels() {
        for population in [0, 1, 3, 12, 13, 400] {
            for epsilon_i in [0.0, 0.05, 1.0, 50.0] {
                let x = retained_count(population, 12, epsilon_i, 1000);
                assert!(x <= population.min(12));
            }
        }
    }
}

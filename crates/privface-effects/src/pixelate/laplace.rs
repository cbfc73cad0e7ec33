// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Laplace distribution centred on zero.

use rand::Rng;
use rand_distr::{Distribution, Exp1};

/// Laplace distribution with location 0 and the given scale.
///
/// Sampled as a fair random sign times a standard exponential draw, which
/// has exactly the Laplace density `exp(-|x| / b) / 2b`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Laplace {
    scale: f64,
}

impl Laplace {
    /// Returns `None` for a negative or NaN scale. A zero scale is allowed
    /// and always yields `0.0`.
    pub fn new(scale: f64) -> Option<Self> {
        (scale >= 0.0).then_some(Self { scale })
    }
}

impl Distribution<f64> for Laplace {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let magnitude: f64 = Exp1.sample(rng);
        let signed = if rng.random_bool(0.5) {
            magnitude
        } else {
            -magnitude
        };
        signed * self.scale
    }
}

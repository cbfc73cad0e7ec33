// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// privface-effects — Privacy-oriented image obfuscation transforms.
//
// Provides DP Pix (block pixelation with Laplace noise), DP Snow (stochastic
// channel corruption), and DP Samp (cluster-adaptive sampling with linear
// interpolation). Every transform is a pure function of its input image,
// its parameters, and a caller-supplied random source.

pub mod canvas;
pub mod pixelate;
pub mod processor;
pub mod sample;
pub mod snow;

use rand::SeedableRng;
use rand::rngs::StdRng;

// Re-export the entry points so callers can use `privface_effects::dp_pix` etc.
pub use pixelate::dp_pix;
pub use processor::ImageObfuscator;
pub use sample::{dp_samp, dp_samp_detailed};
pub use snow::dp_snow;

/// Random source for the transforms: seeded when `seed` is given, otherwise
/// drawn from OS entropy.
pub fn rng_from_seed(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

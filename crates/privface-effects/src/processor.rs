// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image obfuscator — wraps an in-memory image and dispatches an obfuscation
// request to the matching transform.

use image::DynamicImage;
use privface_core::{Obfuscation, PixParams, Result, SampParams, SnowParams};
use rand::Rng;
use tracing::{info, instrument};

use crate::pixelate::dp_pix;
use crate::sample::dp_samp;
use crate::snow::dp_snow;

/// Obfuscation pipeline operating on a single in-memory image.
///
/// Each method consumes `self` and returns a new `ImageObfuscator` wrapping
/// a freshly allocated result, so transforms can be chained. The caller's
/// buffer is never aliased by the output.
///
/// ```ignore
/// let mut rng = rng_from_seed(Some(7));
/// let out = ImageObfuscator::from_dynamic(photo)
///     .apply(&Obfuscation::Snow(SnowParams { delta: 0.3 }), &mut rng)?
///     .into_dynamic();
/// ```
pub struct ImageObfuscator {
    /// The current working image.
    image: DynamicImage,
}

impl ImageObfuscator {
    // -- Construction ---------------------------------------------------------

    /// Wrap an already-decoded `DynamicImage`.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self { image }
    }

    // -- Accessors ------------------------------------------------------------

    /// Current image width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Current image height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Borrow the underlying `DynamicImage`.
    pub fn as_dynamic(&self) -> &DynamicImage {
        &self.image
    }

    /// Consume the obfuscator and return the underlying `DynamicImage`.
    pub fn into_dynamic(self) -> DynamicImage {
        self.image
    }

    // -- Transformations (consume self, return new Self) ----------------------

    /// Run the transform selected by `request`.
    #[instrument(skip(self, rng), fields(method = %request.method()))]
    pub fn apply<R: Rng + ?Sized>(self, request: &Obfuscation, rng: &mut R) -> Result<Self> {
        info!(
            width = self.image.width(),
            height = self.image.height(),
            "Dispatching obfuscation"
        );
        match request {
            Obfuscation::Pix(params) => self.pixelate(params, rng),
            Obfuscation::Snow(params) => self.snow(params, rng),
            Obfuscation::Samp(params) => self.sample(params, rng),
        }
    }

    /// Block pixelation with Laplace noise.
    pub fn pixelate<R: Rng + ?Sized>(self, params: &PixParams, rng: &mut R) -> Result<Self> {
        let out = dp_pix(&self.image, params, rng)?;
        Ok(Self::from_dynamic(DynamicImage::ImageRgb8(out)))
    }

    /// Stochastic channel corruption.
    pub fn snow<R: Rng + ?Sized>(self, params: &SnowParams, rng: &mut R) -> Result<Self> {
        let out = dp_snow(&self.image, params, rng)?;
        Ok(Self::from_dynamic(DynamicImage::ImageRgb8(out)))
    }

    /// Cluster-adaptive sampling with interpolation.
    pub fn sample<R: Rng + ?Sized>(self, params: &SampParams, rng: &mut R) -> Result<Self> {
        let out = dp_samp(&self.image, params, rng)?;
        Ok(Self::from_dynamic(DynamicImage::ImageRgb8(out)))
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types: per-method parameter bundles and the closed set of
// obfuscation methods a caller can dispatch to.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{PrivfaceError, Result};

/// Side length of the square canvas used by DP Snow and DP Samp.
pub const CANONICAL_SIZE: u32 = 224;

/// Intensity written into a channel at every position selected by DP Snow.
pub const SNOW_MARKER: u8 = 127;

/// Default iteration ceiling for the DP Samp retained-pixel search.
pub const DEFAULT_MAX_ITERATIONS: u32 = 1000;

/// Parameters for block pixelation with Laplace noise (DP Pix).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PixParams {
    /// Privacy budget. Must be positive; larger means less noise.
    pub epsilon: f64,
    /// Side length of each square block, in pixels.
    pub block_size: u32,
    /// Sensitivity bound `m`: how many pixels one privacy unit may affect.
    pub num_pixels: u32,
}

impl Default for PixParams {
    fn default() -> Self {
        Self {
            epsilon: 5.0,
            block_size: 12,
            num_pixels: 16,
        }
    }
}

impl PixParams {
    /// Check the parameters that do not depend on the input image.
    pub fn validate(&self) -> Result<()> {
        check_epsilon(self.epsilon)?;
        check_positive("block_size", self.block_size)?;
        check_positive("num_pixels", self.num_pixels)
    }

    /// Laplace scale `255 * m / (b^2 * epsilon)`.
    pub fn noise_scale(&self) -> f64 {
        let block_area = f64::from(self.block_size) * f64::from(self.block_size);
        255.0 * f64::from(self.num_pixels) / (block_area * self.epsilon)
    }
}

/// Parameters for stochastic channel corruption (DP Snow).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnowParams {
    /// Fraction of pixel positions to mark, in `[0, 1]`.
    pub delta: f64,
}

impl Default for SnowParams {
    fn default() -> Self {
        Self { delta: 0.5 }
    }
}

impl SnowParams {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.delta) {
            return Err(PrivfaceError::invalid(
                "delta",
                format!("must lie in [0, 1], got {}", self.delta),
            ));
        }
        Ok(())
    }
}

/// Parameters for cluster-adaptive sampling with interpolation (DP Samp).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SampParams {
    /// Total privacy budget, split across clusters by population.
    pub epsilon: f64,
    /// Number of k-means clusters over grayscale intensity.
    pub num_clusters: u32,
    /// Sensitivity bound `m` and upper limit on pixels kept per cluster.
    pub num_pixels: u32,
    /// Ceiling on the retained-pixel search per cluster.
    pub max_iterations: u32,
}

impl Default for SampParams {
    fn default() -> Self {
        Self {
            epsilon: 25.0,
            num_clusters: 24,
            num_pixels: 12,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl SampParams {
    pub fn validate(&self) -> Result<()> {
        check_epsilon(self.epsilon)?;
        check_positive("num_clusters", self.num_clusters)?;
        check_positive("num_pixels", self.num_pixels)?;
        check_positive("max_iterations", self.max_iterations)
    }
}

fn check_epsilon(epsilon: f64) -> Result<()> {
    // NaN fails the comparison as well.
    if !(epsilon > 0.0) {
        return Err(PrivfaceError::invalid(
            "epsilon",
            format!("must be positive, got {epsilon}"),
        ));
    }
    Ok(())
}

fn check_positive(name: &'static str, value: u32) -> Result<()> {
    if value == 0 {
        return Err(PrivfaceError::invalid(name, "must be at least 1"));
    }
    Ok(())
}

/// Key identifying one of the obfuscation methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Method {
    /// Block pixelation with Laplace noise.
    Pix,
    /// Stochastic channel corruption.
    Snow,
    /// Cluster-adaptive sampling with interpolation.
    Samp,
}

impl Method {
    /// Human-readable label for menus and status text.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Pix => "DP Pix",
            Self::Snow => "DP Snow",
            Self::Samp => "DP Samp",
        }
    }

    /// Lowercase hyphenated key, suitable for derived file names.
    pub const fn slug(&self) -> &'static str {
        match self {
            Self::Pix => "dp-pix",
            Self::Snow => "dp-snow",
            Self::Samp => "dp-samp",
        }
    }

    pub fn all() -> &'static [Self] {
        const ALL: [Method; 3] = [Method::Snow, Method::Pix, Method::Samp];
        &ALL
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Method {
    type Err = PrivfaceError;

    /// Accepts the label ("DP Pix"), the slug ("dp-pix"), or the short name
    /// ("pix"), ignoring case.
    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim().to_ascii_lowercase().replace(' ', "-");
        let short = key.strip_prefix("dp-").unwrap_or(&key);
        match short {
            "pix" => Ok(Self::Pix),
            "snow" => Ok(Self::Snow),
            "samp" => Ok(Self::Samp),
            _ => Err(PrivfaceError::UnknownMethod(s.to_string())),
        }
    }
}

/// A fully parameterised obfuscation request. One handler per variant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "kebab-case")]
pub enum Obfuscation {
    Pix(PixParams),
    Snow(SnowParams),
    Samp(SampParams),
}

impl Obfuscation {
    pub fn method(&self) -> Method {
        match self {
            Self::Pix(_) => Method::Pix,
            Self::Snow(_) => Method::Snow,
            Self::Samp(_) => Method::Samp,
        }
    }

    /// Validate the image-independent parameters of the selected method.
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Pix(p) => p.validate(),
            Self::Snow(p) => p.validate(),
            Self::Samp(p) => p.validate(),
        }
    }
}

impl From<PixParams> for Obfuscation {
    fn from(params: PixParams) -> Self {
        Self::Pix(params)
    }
}

impl From<SnowParams> for Obfuscation {
    fn from(params: SnowParams) -> Self {
        Self::Snow(params)
    }
}

impl From<SampParams> for Obfuscation {
    fn from(params: SampParams) -> Self {
        Self::Samp(params)
    }
}

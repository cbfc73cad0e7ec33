// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Effect configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Result;
use crate::types::{Method, Obfuscation, PixParams, SampParams, SnowParams};

/// Default parameters for every method, plus an optional fixed seed.
///
/// Any field missing from a JSON document falls back to its default, so a
/// config file only needs to name what it changes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectsConfig {
    /// Defaults for DP Pix.
    pub pix: PixParams,
    /// Defaults for DP Snow.
    pub snow: SnowParams,
    /// Defaults for DP Samp.
    pub samp: SampParams,
    /// Seed for the random source. `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl EffectsConfig {
    /// Parse a configuration from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&text)
    }

    /// Write this configuration to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), text)?;
        Ok(())
    }

    /// Build the request for `method` from the configured defaults.
    pub fn obfuscation(&self, method: Method) -> Obfuscation {
        match method {
            Method::Pix => Obfuscation::Pix(self.pix),
            Method::Snow => Obfuscation::Snow(self.snow),
            Method::Samp => Obfuscation::Samp(self.samp),
        }
    }
}

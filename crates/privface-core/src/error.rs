// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for PrivFace.

use thiserror::Error;

/// Top-level error type for all PrivFace operations.
#[derive(Debug, Error)]
pub enum PrivfaceError {
    // -- Validation errors --
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("unsupported input image: {0}")]
    UnsupportedInput(String),

    #[error("unknown obfuscation method: {0}")]
    UnknownMethod(String),

    // -- Configuration / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PrivfaceError {
    /// Shorthand for building an [`PrivfaceError::InvalidParameter`].
    pub fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, PrivfaceError>;

#[cfg(test)]
mod tests {
    use super::*;

    /// Every variant is produced somewhere: validation, input checks, method
    /// parsing, or configuration persistence.
    fn origin(err: &PrivfaceError) -> &'static str {
        match err {
            PrivfaceError::InvalidParameter { .. } => "validate",
            PrivfaceError::UnsupportedInput(_) => "input",
            PrivfaceError::UnknownMethod(_) => "method",
            PrivfaceError::Io(_) | PrivfaceError::Serialization(_) => "config",
        }
    }

    #[test]
    fn invalid_names_the_parameter() {
        let err = PrivfaceError::invalid("delta", "must lie in [0, 1], got 2");
        assert_eq!(origin(&err), "validate");
        assert_eq!(
            err.to_string(),
            "invalid parameter `delta`: must lie in [0, 1], got 2"
        );
    }

    #[test]
    fn json_errors_convert() {
        let err: PrivfaceError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert_eq!(origin(&err), "config");
        assert!(err.to_string().starts_with("serialization error:"));
    }
}

//! Domain error types
//!
//! This module defines the error hierarchy for the de-identifier. The two
//! outcomes the engine itself can produce are [`DeidError::Rejected`] and
//! [`DeidError::Policy`]; the remaining variants belong to the layers around
//! it (codec, configuration, I/O). No variant exposes third-party types.

use thiserror::Error;

/// Justification used when an element-level `Reject` rule carries none.
pub const NO_JUSTIFICATION: &str = "no justification provided";

/// Main de-identification error type
#[derive(Debug, Error)]
pub enum DeidError {
    /// The record may not be released under the active procedure.
    ///
    /// The justification is never empty.
    #[error("Rejected: {justification}")]
    Rejected { justification: String },

    /// The procedure names an action, default or value representation the
    /// engine does not implement. Never to be read as "keep the data".
    #[error("Policy error: {0}")]
    Policy(String),

    /// Dataset could not be decoded or encoded by the codec
    #[error("Codec error: {0}")]
    Codec(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl DeidError {
    /// Builds a rejection, substituting `fallback` for a missing or blank
    /// justification.
    pub fn rejected(justification: Option<&str>, fallback: impl Into<String>) -> Self {
        let justification = match justification.map(str::trim) {
            Some(text) if !text.is_empty() => text.to_string(),
            _ => fallback.into(),
        };
        DeidError::Rejected { justification }
    }

    /// Returns true for a policy-driven rejection of the record
    pub fn is_rejection(&self) -> bool {
        matches!(self, DeidError::Rejected { .. })
    }

    /// Returns true when the procedure itself is at fault
    pub fn is_policy_error(&self) -> bool {
        matches!(self, DeidError::Policy(_))
    }

    /// Justification carried by a rejection
    pub fn justification(&self) -> Option<&str> {
        match self {
            DeidError::Rejected { justification } => Some(justification),
            _ => None,
        }
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for DeidError {
    fn from(err: std::io::Error) -> Self {
        DeidError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for DeidError {
    fn from(err: serde_json::Error) -> Self {
        DeidError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for DeidError {
    fn from(err: toml::de::Error) -> Self {
        DeidError::Configuration(format!("TOML parse error: {err}"))
    }
}

//! Error context extension trait
//!
//! Similar to `anyhow::Context`, but for `Result<T, DeidError>`. Context is
//! prefixed to the message while the variant is kept, so callers can still
//! tell a policy error from an I/O failure after context has been added.
//!
//! # Examples
//!
//! ```rust
//! use dicom_deid::domain::Result;
//! use dicom_deid::domain::context::ResultExt;
//!
//! fn read_record(path: &str) -> Result<Vec<u8>> {
//!     std::fs::read(path).with_context(|| format!("Failed to read {path}"))
//! }
//! ```

use crate::domain::errors::DeidError;
use crate::domain::result::Result;
use std::fmt::Display;

/// Adds `.context()` and `.with_context()` to results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static;

    /// Add context computed only when an error occurs
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<DeidError>,
{
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        self.map_err(|e| prefix(e.into(), context))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|e| prefix(e.into(), f()))
    }
}

// Rejections pass through untouched: the justification is reported verbatim.
fn prefix(err: DeidError, context: impl Display) -> DeidError {
    match err {
        DeidError::Rejected { .. } => err,
        DeidError::Policy(m) => DeidError::Policy(format!("{context}: {m}")),
        DeidError::Codec(m) => DeidError::Codec(format!("{context}: {m}")),
        DeidError::Configuration(m) => DeidError::Configuration(format!("{context}: {m}")),
        DeidError::Serialization(m) => DeidError::Serialization(format!("{context}: {m}")),
        DeidError::Io(m) => DeidError::Io(format!("{context}: {m}")),
        DeidError::Other(m) => DeidError::Other(format!("{context}: {m}")),
    }
}

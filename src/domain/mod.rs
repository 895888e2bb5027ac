//! Domain types shared by every layer of the de-identifier.
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, DeidError>`]:
//!
//! ```rust
//! use dicom_deid::domain::{DeidError, Result};
//!
//! fn example() -> Result<()> {
//!     let procedure = dicom_deid::procedure::load_procedure("procedure.json")?;
//!     println!("loaded {}", procedure.version());
//!     Ok(())
//! }
//! ```
//!
//! A [`DeidError::Rejected`] means the record cannot be released under the
//! procedure; a [`DeidError::Policy`] means the procedure is malformed and
//! should stop a batch rather than be handled per record.

pub mod context;
pub mod errors;
pub mod result;

pub use errors::{DeidError, NO_JUSTIFICATION};
pub use result::Result;

//! De-identification engine
//!
//! This module applies a [`Procedure`](crate::procedure::Procedure) to
//! datasets.
//!
//! # Architecture
//!
//! - **Resolution**: tag rule → class default → global default
//! - **Substitution**: VR-shaped dummy values
//! - **Pseudonyms**: memoised UID remapping, scoped to one engine
//! - **Provenance**: De-identification Method stamp after a successful walk
//!
//! # Usage
//!
//! ```rust,no_run
//! use dicom_deid::dataset::JsonCodec;
//! use dicom_deid::deid::DeIdentifier;
//! use dicom_deid::procedure::load_procedure;
//! use std::fs::File;
//!
//! # fn example() -> dicom_deid::domain::Result<()> {
//! let procedure = load_procedure("procedure.json")?;
//! let mut deidentifier = DeIdentifier::new(procedure);
//!
//! let mut input = File::open("study.json")?;
//! let mut output = File::create("study.deid.json")?;
//! deidentifier.deidentify_and_serialize(&JsonCodec::new(), &mut input, &mut output)?;
//! # Ok(())
//! # }
//! ```

pub mod dummy;
pub mod engine;
pub mod provenance;
pub mod pseudonym;
pub mod report;
pub mod resolve;

pub use dummy::{dummy_for, dummy_for_code};
pub use engine::DeIdentifier;
pub use provenance::{Clock, FixedClock, SystemClock};
pub use pseudonym::{PseudonymStore, UidRoot};
pub use report::DeidentificationReport;
pub use resolve::{resolve_class, resolve_rule, ResolvedRule, RuleSource};

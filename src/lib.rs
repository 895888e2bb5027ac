//! # dicom-deid
//!
//! Procedure-driven de-identification of DICOM datasets.
//!
//! A [`procedure::Procedure`] says, per SOP class and per tag, what happens
//! to each element of a record: remove it, keep it, replace it with a
//! placeholder, remap its UIDs to stable pseudonyms, or reject the whole
//! record. The [`deid::DeIdentifier`] applies it, descends into sequences
//! and stamps the De-identification Method element on success.
//!
//! ## Architecture
//!
//! - [`dataset`] - Record accessors over `dicom-object`, DICOM JSON and Part 10 codecs
//! - [`procedure`] - Policy model, builder and document loader
//! - [`deid`] - Resolution, substitution, pseudonyms and provenance
//! - [`audit`] - Per-record audit trail
//! - [`domain`] - Error type and result alias
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//! - [`cli`] - Command-line interface
//!
//! ## Quick Start
//!
//! ```rust
//! use dicom_deid::dataset::{tags, DatasetExt, InMemDicomObject, VR};
//! use dicom_deid::deid::DeIdentifier;
//! use dicom_deid::procedure::Procedure;
//!
//! # fn main() -> dicom_deid::domain::Result<()> {
//! let procedure = Procedure::from_json_str(r#"{
//!     "version": "2025.1",
//!     "default": "R",
//!     "sopClass": {
//!         "1.2.840.10008.5.1.4.1.1.2": {
//!             "default": "X",
//!             "tags": {
//!                 "(0008,0060)": { "default": "K" },
//!                 "(0020,000D)": { "default": "U" }
//!             }
//!         }
//!     }
//! }"#)?;
//!
//! let mut dataset = InMemDicomObject::new_empty();
//! dataset.put_text(tags::SOP_CLASS_UID, VR::UI, "1.2.840.10008.5.1.4.1.1.2");
//! dataset.put_text(tags::PATIENT_NAME, VR::PN, "Test^Patient");
//! dataset.put_text(tags::MODALITY, VR::CS, "CT");
//! dataset.put_text(tags::STUDY_INSTANCE_UID, VR::UI, "1.2.3.4");
//!
//! let mut deidentifier = DeIdentifier::new(procedure);
//! deidentifier.deidentify(&mut dataset)?;
//!
//! assert!(!dataset.has_element(tags::PATIENT_NAME));
//! assert_ne!(dataset.text(tags::STUDY_INSTANCE_UID).as_deref(), Some("1.2.3.4"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! All library operations return [`domain::Result`]. A
//! [`domain::DeidError::Rejected`] is a normal per-record outcome; a
//! [`domain::DeidError::Policy`] means the procedure itself is at fault.
//! Either way the record that was being processed must be discarded.

pub mod audit;
pub mod cli;
pub mod config;
pub mod dataset;
pub mod deid;
pub mod domain;
pub mod logging;
pub mod procedure;

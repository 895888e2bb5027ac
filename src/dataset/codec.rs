//! Codec seam between byte streams and records
//!
//! The engine never parses bytes itself. Anything that can turn a stream
//! into a [`DicomRecord`] and back implements [`DatasetCodec`] and can be
//! handed to [`DeIdentifier::deidentify_and_serialize`](crate::deid::DeIdentifier::deidentify_and_serialize).

use super::InMemDicomObject;
use crate::domain::Result;
use std::io::{Read, Write};

/// A decoded record plus what its codec needs to encode it again
#[derive(Debug, Clone)]
pub struct DicomRecord {
    pub dataset: InMemDicomObject,
    /// Transfer syntax UID of the source, when it was a Part 10 file
    pub transfer_syntax: Option<String>,
}

impl DicomRecord {
    pub fn new(dataset: InMemDicomObject) -> Self {
        Self {
            dataset,
            transfer_syntax: None,
        }
    }
}

impl From<InMemDicomObject> for DicomRecord {
    fn from(dataset: InMemDicomObject) -> Self {
        Self::new(dataset)
    }
}

/// Parses and serialises records
pub trait DatasetCodec: Send + Sync {
    /// Short name used in log fields
    fn name(&self) -> &'static str;

    /// Reads one record from the input
    fn read_record(&self, input: &mut dyn Read) -> Result<DicomRecord>;

    /// Writes one record to the output
    fn write_record(&self, record: &DicomRecord, output: &mut dyn Write) -> Result<()>;
}

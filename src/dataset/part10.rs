//! DICOM Part 10 file codec
//!
//! Reads and writes the binary file format (PS3.10): a 128 byte preamble,
//! the `DICM` magic code, the file meta group and the data set. Decoding
//! and encoding are done by `dicom-object`.
//!
//! The file meta group is rebuilt on write from the de-identified data set,
//! so the Media Storage SOP Instance UID always matches the (possibly
//! remapped) SOP Instance UID and never carries the original one. The
//! source transfer syntax is kept.

use super::codec::{DatasetCodec, DicomRecord};
use super::DatasetExt;
use crate::domain::{DeidError, Result};
use dicom_object::meta::FileMetaTableBuilder;
use std::io::{Cursor, Read, Write};

const PREAMBLE_LEN: usize = 128;
const MAGIC: &[u8; 4] = b"DICM";

/// Explicit VR Little Endian, used when the source carried no transfer syntax
pub const DEFAULT_TRANSFER_SYNTAX: &str = "1.2.840.10008.1.2.1";

/// Codec for DICOM Part 10 files
#[derive(Debug, Clone, Default)]
pub struct Part10Codec {
    transfer_syntax: Option<String>,
}

impl Part10Codec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transfer syntax for records that were not read from a Part 10 file
    pub fn with_transfer_syntax(mut self, uid: impl Into<String>) -> Self {
        self.transfer_syntax = Some(uid.into());
        self
    }
}

impl DatasetCodec for Part10Codec {
    fn name(&self) -> &'static str {
        "dicom-part10"
    }

    fn read_record(&self, input: &mut dyn Read) -> Result<DicomRecord> {
        let mut head = [0u8; PREAMBLE_LEN + 4];
        input
            .read_exact(&mut head)
            .map_err(|e| DeidError::Codec(format!("Not a DICOM Part 10 stream: {e}")))?;

        // Streams without a preamble start with the magic code directly
        let start = if &head[PREAMBLE_LEN..] == MAGIC {
            PREAMBLE_LEN
        } else if &head[..4] == MAGIC {
            0
        } else {
            return Err(DeidError::Codec(
                "Not a DICOM Part 10 stream: missing DICM magic code".to_string(),
            ));
        };

        let source = Cursor::new(head[start..].to_vec()).chain(input);
        let file = dicom_object::from_reader(source)
            .map_err(|e| DeidError::Codec(format!("Failed to read DICOM file: {e}")))?;

        let transfer_syntax = file.meta().transfer_syntax().to_string();
        tracing::trace!(transfer_syntax = %transfer_syntax, "Read Part 10 record");

        Ok(DicomRecord {
            dataset: file.into_inner(),
            transfer_syntax: Some(transfer_syntax),
        })
    }

    fn write_record(&self, record: &DicomRecord, output: &mut dyn Write) -> Result<()> {
        let sop_class_uid = record.dataset.sop_class_uid().ok_or_else(|| {
            DeidError::Codec("Cannot write a Part 10 file without a SOP Class UID".to_string())
        })?;
        let sop_instance_uid = record.dataset.sop_instance_uid().ok_or_else(|| {
            DeidError::Codec("Cannot write a Part 10 file without a SOP Instance UID".to_string())
        })?;
        let transfer_syntax = record
            .transfer_syntax
            .as_deref()
            .or(self.transfer_syntax.as_deref())
            .unwrap_or(DEFAULT_TRANSFER_SYNTAX);

        let meta = FileMetaTableBuilder::new()
            .transfer_syntax(transfer_syntax)
            .media_storage_sop_class_uid(sop_class_uid)
            .media_storage_sop_instance_uid(sop_instance_uid);

        let file = record
            .dataset
            .clone()
            .with_meta(meta)
            .map_err(|e| DeidError::Codec(format!("Failed to build file meta group: {e}")))?;
        file.write_all(&mut *output)
            .map_err(|e| DeidError::Codec(format!("Failed to write DICOM file: {e}")))?;
        output.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{tags, InMemDicomObject, VR};

    fn record() -> DicomRecord {
        let mut dataset = InMemDicomObject::new_empty();
        dataset.put_text(tags::SOP_CLASS_UID, VR::UI, "1.2.840.10008.5.1.4.1.1.2");
        dataset.put_text(tags::SOP_INSTANCE_UID, VR::UI, "1.2.3.4.5");
        dataset.put_text(tags::PATIENT_NAME, VR::PN, "Doe^John");
        DicomRecord::new(dataset)
    }

    #[test]
    fn test_write_then_read_keeps_elements() {
        let codec = Part10Codec::new();
        let mut bytes = Vec::new();
        codec.write_record(&record(), &mut bytes).unwrap();

        assert_eq!(&bytes[PREAMBLE_LEN..PREAMBLE_LEN + 4], MAGIC);

        let back = codec.read_record(&mut bytes.as_slice()).unwrap();
        assert_eq!(back.dataset.text(tags::PATIENT_NAME).as_deref(), Some("Doe^John"));
        assert_eq!(back.transfer_syntax.as_deref(), Some(DEFAULT_TRANSFER_SYNTAX));
    }

    #[test]
    fn test_stream_without_preamble() {
        let codec = Part10Codec::new();
        let mut bytes = Vec::new();
        codec.write_record(&record(), &mut bytes).unwrap();

        let back = codec
            .read_record(&mut &bytes[PREAMBLE_LEN..])
            .unwrap();
        assert_eq!(back.dataset.sop_instance_uid().as_deref(), Some("1.2.3.4.5"));
    }

    #[test]
    fn test_not_dicom_is_codec_error() {
        let junk = vec![0x42u8; 400];
        let err = Part10Codec::new().read_record(&mut junk.as_slice()).unwrap_err();
        assert!(matches!(err, DeidError::Codec(_)));
    }

    #[test]
    fn test_missing_instance_uid_cannot_be_written() {
        let mut record = record();
        record.dataset.remove_element(tags::SOP_INSTANCE_UID);

        let err = Part10Codec::new()
            .write_record(&record, &mut Vec::new())
            .unwrap_err();
        assert!(err.to_string().contains("SOP Instance UID"));
    }
}

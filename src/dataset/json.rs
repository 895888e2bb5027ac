//! DICOM JSON model codec (PS3.18 Annex F)
//!
//! Encoding and decoding are done by `dicom-json`. Person names travel as
//! `Alphabetic` components, binary data as base64 `InlineBinary`.
//! `BulkDataURI` references are not resolved.

use super::codec::{DatasetCodec, DicomRecord};
use super::InMemDicomObject;
use crate::domain::{DeidError, Result};
use std::io::{Read, Write};

/// Codec for the DICOM JSON model
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec {
    pretty: bool,
}

impl JsonCodec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit indented JSON
    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

impl DatasetCodec for JsonCodec {
    fn name(&self) -> &'static str {
        "dicom-json"
    }

    fn read_record(&self, input: &mut dyn Read) -> Result<DicomRecord> {
        let mut document = String::new();
        input.read_to_string(&mut document)?;

        let dataset: InMemDicomObject = dicom_json::from_str(&document)
            .map_err(|e| DeidError::Codec(format!("Failed to parse DICOM JSON: {e}")))?;
        Ok(DicomRecord::new(dataset))
    }

    fn write_record(&self, record: &DicomRecord, output: &mut dyn Write) -> Result<()> {
        let document = dicom_json::to_value(&record.dataset)
            .map_err(|e| DeidError::Codec(format!("Failed to encode DICOM JSON: {e}")))?;
        if self.pretty {
            serde_json::to_writer_pretty(&mut *output, &document)?;
        } else {
            serde_json::to_writer(&mut *output, &document)?;
        }
        output.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{tags, DatasetExt, Header, VR};
    use serde_json::json;

    fn read(document: serde_json::Value) -> Result<DicomRecord> {
        let bytes = serde_json::to_vec(&document).unwrap();
        JsonCodec::new().read_record(&mut bytes.as_slice())
    }

    #[test]
    fn test_person_name_uses_alphabetic_component() {
        let record = read(json!({
            "00100010": { "vr": "PN", "Value": [{ "Alphabetic": "Test^Patient" }] }
        }))
        .unwrap();

        assert_eq!(record.dataset.text(tags::PATIENT_NAME).as_deref(), Some("Test^Patient"));
        assert_eq!(record.dataset.element(tags::PATIENT_NAME).unwrap().vr(), VR::PN);
        assert_eq!(record.transfer_syntax, None);
    }

    #[test]
    fn test_write_then_read_keeps_text() {
        let mut dataset = InMemDicomObject::new_empty();
        dataset.put_text(tags::MODALITY, VR::CS, "MR");
        dataset.put_text(tags::SOP_CLASS_UID, VR::UI, "1.2.840.10008.5.1.4.1.1.4");

        let mut bytes = Vec::new();
        JsonCodec::new()
            .pretty(true)
            .write_record(&DicomRecord::new(dataset), &mut bytes)
            .unwrap();

        let document: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(document["00080060"]["vr"], "CS");

        let record = JsonCodec::new().read_record(&mut bytes.as_slice()).unwrap();
        assert_eq!(record.dataset.text(tags::MODALITY).as_deref(), Some("MR"));
    }

    #[test]
    fn test_malformed_document_is_codec_error() {
        let err = JsonCodec::new()
            .read_record(&mut "[1, 2".as_bytes())
            .unwrap_err();
        assert!(matches!(err, DeidError::Codec(_)));
    }
}

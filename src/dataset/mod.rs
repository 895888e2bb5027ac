//! DICOM records as the engine sees them
//!
//! Records are [`InMemDicomObject`]s from `dicom-object`; tags, VRs and
//! values are the `dicom-core` types, and well-known tags come from the
//! standard dictionary. This module adds what the engine needs on top:
//! - [`DatasetExt`] accessors for the SOP Class UID and the
//!   De-identification Method (provenance) element
//! - the [`DatasetCodec`] seam with a DICOM JSON and a Part 10 codec
//! - [`parse_tag`] for the tag keys of procedure documents
//!
//! Elements of an [`InMemDicomObject`] are kept in tag order, so traversal
//! is stable for a given input.

pub mod codec;
pub mod json;
pub mod part10;
pub mod tag;

pub use codec::{DatasetCodec, DicomRecord};
pub use json::JsonCodec;
pub use part10::Part10Codec;
pub use tag::parse_tag;

pub use dicom_core::header::Header;
pub use dicom_core::value::{DataSetSequence, PrimitiveValue, Value};
pub use dicom_core::{DataElement, Tag, VR};
pub use dicom_dictionary_std::tags;
pub use dicom_object::mem::InMemElement;
pub use dicom_object::InMemDicomObject;

/// Value of an element of an [`InMemDicomObject`]
pub type ElementValue = Value<InMemDicomObject, Vec<u8>>;

/// Record-level accessors used by the engine and the CLI
pub trait DatasetExt {
    /// Character data of an element with trailing padding removed
    ///
    /// Multiple values are joined with `\`. Missing, blank or non-textual
    /// elements yield `None`.
    fn text(&self, tag: Tag) -> Option<String>;

    /// Whether the element is present
    fn has_element(&self, tag: Tag) -> bool;

    /// Tags currently present, in traversal order
    fn tag_snapshot(&self) -> Vec<Tag>;

    /// Inserts character data, replacing any element with the same tag
    fn put_text(&mut self, tag: Tag, vr: VR, text: &str);

    /// SOP Class UID identifying the record class
    fn sop_class_uid(&self) -> Option<String> {
        self.text(tags::SOP_CLASS_UID)
    }

    fn sop_instance_uid(&self) -> Option<String> {
        self.text(tags::SOP_INSTANCE_UID)
    }

    /// Current De-identification Method text
    fn deidentification_method(&self) -> Option<String> {
        self.text(tags::DEIDENTIFICATION_METHOD)
    }

    /// Overwrites the De-identification Method element
    fn set_deidentification_method(&mut self, text: &str) {
        self.put_text(tags::DEIDENTIFICATION_METHOD, VR::LO, text);
    }
}

impl DatasetExt for InMemDicomObject {
    fn text(&self, tag: Tag) -> Option<String> {
        let element = self.element(tag).ok()?;
        let text = element.to_str().ok()?;
        let text = text.trim_end_matches(['\0', ' ']);
        (!text.is_empty()).then(|| text.to_string())
    }

    fn has_element(&self, tag: Tag) -> bool {
        self.element(tag).is_ok()
    }

    fn tag_snapshot(&self) -> Vec<Tag> {
        self.iter().map(|element| element.tag()).collect()
    }

    fn put_text(&mut self, tag: Tag, vr: VR, text: &str) {
        self.put(DataElement::new(tag, vr, PrimitiveValue::from(text)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> InMemDicomObject {
        let mut ds = InMemDicomObject::new_empty();
        ds.put_text(tags::PATIENT_NAME, VR::PN, "Test^Patient");
        ds.put_text(tags::MODALITY, VR::CS, "CT");
        ds.put_text(tags::SOP_CLASS_UID, VR::UI, "1.2.840.10008.5.1.4.1.1.2");
        ds
    }

    #[test]
    fn test_tag_snapshot_is_in_tag_order() {
        assert_eq!(
            sample().tag_snapshot(),
            vec![tags::SOP_CLASS_UID, tags::MODALITY, tags::PATIENT_NAME]
        );
    }

    #[test]
    fn test_sop_class_uid_strips_padding() {
        let mut ds = InMemDicomObject::new_empty();
        ds.put_text(tags::SOP_CLASS_UID, VR::UI, "1.2.3\0");
        assert_eq!(ds.sop_class_uid().as_deref(), Some("1.2.3"));
    }

    #[test]
    fn test_missing_or_blank_sop_class_uid() {
        let mut ds = InMemDicomObject::new_empty();
        assert_eq!(ds.sop_class_uid(), None);
        ds.put_text(tags::SOP_CLASS_UID, VR::UI, "");
        assert_eq!(ds.sop_class_uid(), None);
    }

    #[test]
    fn test_deidentification_method_get_set() {
        let mut ds = InMemDicomObject::new_empty();
        assert_eq!(ds.deidentification_method(), None);
        ds.set_deidentification_method("v1 20250101000000");
        assert_eq!(ds.deidentification_method().as_deref(), Some("v1 20250101000000"));
        assert_eq!(ds.element(tags::DEIDENTIFICATION_METHOD).unwrap().vr(), VR::LO);
    }

    #[test]
    fn test_has_element() {
        let ds = sample();
        assert!(ds.has_element(tags::MODALITY));
        assert!(!ds.has_element(tags::PATIENT_ID));
    }
}

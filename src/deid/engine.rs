//! Main de-identification engine
//!
//! This module provides the [`DeIdentifier`] that applies a [`Procedure`] to
//! DICOM datasets.
//!
//! # Processing
//!
//! Each call runs through the same steps:
//! 1. **Resolve class**: pick the rule set for the record's SOP Class UID, or
//!    fall back to the procedure default (may reject the record)
//! 2. **Walk elements**: resolve and apply an action for every element in tag
//!    order, descending into sequence items (may reject mid-walk)
//! 3. **Finalize**: stamp the De-identification Method element
//!
//! A rejected or failed record may already be partially modified and must
//! be discarded by the caller.
//!
//! # Examples
//!
//! ```
//! use dicom_deid::dataset::{tags, DatasetExt, InMemDicomObject, VR};
//! use dicom_deid::deid::DeIdentifier;
//! use dicom_deid::procedure::{ActionKind, ClassProcedure, ProcedureBuilder};
//!
//! let procedure = ProcedureBuilder::new("2025.1")
//!     .class(
//!         "1.2.840.10008.5.1.4.1.1.2",
//!         ClassProcedure::new(ActionKind::Remove)
//!             .with_tag(tags::SOP_CLASS_UID, ActionKind::Keep)
//!             .with_tag(tags::MODALITY, ActionKind::Keep),
//!     )
//!     .build()?;
//!
//! let mut dataset = InMemDicomObject::new_empty();
//! dataset.put_text(tags::SOP_CLASS_UID, VR::UI, "1.2.840.10008.5.1.4.1.1.2");
//! dataset.put_text(tags::PATIENT_NAME, VR::PN, "Test^Patient");
//! dataset.put_text(tags::MODALITY, VR::CS, "CT");
//!
//! let mut deidentifier = DeIdentifier::new(procedure);
//! deidentifier.deidentify(&mut dataset)?;
//!
//! assert!(!dataset.has_element(tags::PATIENT_NAME));
//! assert_eq!(dataset.text(tags::MODALITY).as_deref(), Some("CT"));
//! # Ok::<(), dicom_deid::domain::DeidError>(())
//! ```

use super::dummy::dummy_for;
use super::provenance::{self, Clock, SystemClock};
use super::pseudonym::{PseudonymStore, UidRoot};
use super::report::DeidentificationReport;
use super::resolve::{resolve_class, resolve_rule};
use crate::dataset::{
    DataElement, DataSetSequence, DatasetCodec, DatasetExt, ElementValue, Header,
    InMemDicomObject, PrimitiveValue, Value, VR,
};
use crate::domain::{DeidError, Result, NO_JUSTIFICATION};
use crate::procedure::{ActionKind, ClassProcedure, Procedure};
use std::borrow::Cow;
use std::io::{Read, Write};

/// Procedure-bound de-identification engine
///
/// Owns its procedure and a [`PseudonymStore`]. Every `RemapUid` action
/// goes through the store, so the same identifier maps to the same
/// pseudonym across all records processed by one instance.
///
/// # Thread Safety
///
/// Processing takes `&mut self`. To keep pseudonyms consistent across
/// workers, share one instance behind a mutex; one instance per worker is
/// faster but each worker then mints its own pseudonyms.
pub struct DeIdentifier {
    procedure: Procedure,
    pseudonyms: PseudonymStore,
    clock: Box<dyn Clock>,
}

impl DeIdentifier {
    /// Creates an engine minting UIDs under the default `2.25` root
    pub fn new(procedure: Procedure) -> Self {
        Self {
            procedure,
            pseudonyms: PseudonymStore::default(),
            clock: Box::new(SystemClock),
        }
    }

    /// Mints pseudonyms under `root`
    ///
    /// Replaces the pseudonym store, so call it before processing.
    pub fn with_uid_root(mut self, root: UidRoot) -> Self {
        self.pseudonyms = PseudonymStore::new(root);
        self
    }

    /// Uses `clock` for provenance timestamps
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn procedure(&self) -> &Procedure {
        &self.procedure
    }

    pub fn pseudonyms(&self) -> &PseudonymStore {
        &self.pseudonyms
    }

    /// De-identifies a dataset in place
    ///
    /// # Errors
    ///
    /// - [`DeidError::Rejected`] if the procedure does not allow the record
    ///   to be released
    /// - [`DeidError::Policy`] if the procedure asks for something the
    ///   engine cannot do with this record
    ///
    /// The dataset may be partially modified in both cases.
    pub fn deidentify(&mut self, dataset: &mut InMemDicomObject) -> Result<()> {
        self.deidentify_with_report(dataset).map(|_| ())
    }

    /// De-identifies a dataset in place and reports what was done
    pub fn deidentify_with_report(
        &mut self,
        dataset: &mut InMemDicomObject,
    ) -> Result<DeidentificationReport> {
        let sop_class_uid = dataset.sop_class_uid();

        let class = match resolve_class(&self.procedure, sop_class_uid.as_deref()) {
            Ok(class) => class,
            Err(e) => {
                if let Some(justification) = e.justification() {
                    crate::log_record_rejected!(sop_class_uid.as_deref(), justification);
                }
                return Err(e);
            }
        };

        let class_matched = matches!(class, Cow::Borrowed(_));
        tracing::debug!(
            sop_class_uid = sop_class_uid.as_deref().unwrap_or("(missing)"),
            class_matched,
            tag_rules = class.tag_rules.len(),
            "Resolved class procedure"
        );

        let mut report = DeidentificationReport::new(sop_class_uid.as_deref(), class_matched);
        let prior_provenance = dataset.deidentification_method();

        if let Err(e) = walk(dataset, &class, &mut self.pseudonyms, &mut report) {
            if let Some(justification) = e.justification() {
                crate::log_record_rejected!(sop_class_uid.as_deref(), justification);
            }
            return Err(e);
        }

        report.provenance = provenance::stamp(
            dataset,
            prior_provenance.as_deref(),
            self.procedure.version(),
            self.clock.now(),
        );

        crate::log_record_processed!(&report);
        Ok(report)
    }

    /// Reads a record with `codec`, de-identifies it and writes it back out
    ///
    /// Nothing is written when processing fails.
    pub fn deidentify_and_serialize(
        &mut self,
        codec: &dyn DatasetCodec,
        input: &mut dyn Read,
        output: &mut dyn Write,
    ) -> Result<DeidentificationReport> {
        let mut record = codec.read_record(input)?;
        let report = self.deidentify_with_report(&mut record.dataset)?;
        codec.write_record(&record, output)?;
        tracing::trace!(codec = codec.name(), "Serialized de-identified record");
        Ok(report)
    }
}

/// Applies the class procedure to every element of `dataset`
///
/// Iterates over a snapshot of the tags so removals never disturb the walk.
/// Sequence items of elements that survive their own action are walked with
/// the same class procedure.
fn walk(
    dataset: &mut InMemDicomObject,
    class: &ClassProcedure,
    pseudonyms: &mut PseudonymStore,
    report: &mut DeidentificationReport,
) -> Result<()> {
    for tag in dataset.tag_snapshot() {
        let rule = resolve_rule(class, tag);
        tracing::trace!(tag = %tag, action = %rule.action, source = ?rule.source, "Applying action");

        let Ok(element) = dataset.element(tag) else {
            continue;
        };
        let vr = element.vr();

        match rule.action {
            ActionKind::Reject => {
                return Err(DeidError::rejected(rule.justification, NO_JUSTIFICATION));
            }
            ActionKind::Remove => {
                dataset.remove_element(tag);
                report.record(rule.action);
                continue;
            }
            ActionKind::Keep => {}
            ActionKind::RemapUid => {
                let remapped = match element.value() {
                    Value::Primitive(PrimitiveValue::Empty) => None,
                    Value::Primitive(PrimitiveValue::Str(text)) => {
                        Some(pseudonyms.remap_value(vr, text))
                    }
                    Value::Primitive(PrimitiveValue::Strs(values)) => {
                        Some(pseudonyms.remap_value(vr, &values.join("\\")))
                    }
                    other => {
                        return Err(DeidError::Policy(format!(
                            "action {} cannot remap the {} value of {tag} ({vr})",
                            rule.action,
                            shape(other)
                        )));
                    }
                };
                if let Some(components) = remapped {
                    let value = PrimitiveValue::Strs(components.into_iter().collect());
                    dataset.put(DataElement::new(tag, vr, value));
                }
            }
            ActionKind::ReplaceWithDummy | ActionKind::ReplaceWithZeroLength => {
                dataset.put(DataElement::new(tag, vr, dummy_for(vr)));
            }
        }
        report.record(rule.action);

        let items = dataset
            .element(tag)
            .ok()
            .and_then(|element| element.items())
            .map(<[InMemDicomObject]>::to_vec);
        if let Some(mut items) = items {
            for item in items.iter_mut() {
                walk(item, class, pseudonyms, report)?;
            }
            dataset.put(DataElement::new(
                tag,
                VR::SQ,
                Value::Sequence(DataSetSequence::from(items)),
            ));
        }
    }

    Ok(())
}

/// Short name of a value's shape for error messages
fn shape(value: &ElementValue) -> &'static str {
    match value {
        Value::Primitive(PrimitiveValue::U8(_)) => "binary",
        Value::Primitive(PrimitiveValue::Tags(_)) => "tag",
        Value::Primitive(
            PrimitiveValue::Date(_) | PrimitiveValue::DateTime(_) | PrimitiveValue::Time(_),
        ) => "date/time",
        Value::Primitive(PrimitiveValue::Empty | PrimitiveValue::Str(_) | PrimitiveValue::Strs(_)) => {
            "text"
        }
        Value::Primitive(_) => "numeric",
        Value::Sequence(_) => "sequence",
        _ => "encapsulated pixel data",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{tags, Tag};
    use crate::deid::provenance::FixedClock;
    use crate::procedure::{ElementRule, ProcedureBuilder};
    use chrono::{TimeZone, Utc};

    const CT: &str = "1.2.840.10008.5.1.4.1.1.2";

    fn engine(class: ClassProcedure) -> DeIdentifier {
        let procedure = ProcedureBuilder::new("test-procedure")
            .class(CT, class)
            .build()
            .unwrap();
        DeIdentifier::new(procedure)
            .with_clock(FixedClock(Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap()))
    }

    fn ct_dataset() -> InMemDicomObject {
        let mut ds = InMemDicomObject::new_empty();
        ds.put_text(tags::SOP_CLASS_UID, VR::UI, CT);
        ds.put_text(tags::PATIENT_NAME, VR::PN, "Test^Patient");
        ds.put_text(tags::PATIENT_ID, VR::LO, "12345");
        ds.put_text(tags::MODALITY, VR::CS, "CT");
        ds
    }

    fn sequence_of(item: InMemDicomObject) -> ElementValue {
        Value::Sequence(DataSetSequence::from(vec![item]))
    }

    #[test]
    fn test_report_counts_and_provenance() {
        let mut deid = engine(
            ClassProcedure::new(ActionKind::Remove)
                .with_tag(tags::MODALITY, ActionKind::Keep)
                .with_tag(tags::PATIENT_NAME, ActionKind::ReplaceWithDummy),
        );
        let mut ds = ct_dataset();

        let report = deid.deidentify_with_report(&mut ds).unwrap();

        assert!(report.class_matched);
        assert_eq!(report.sop_class_uid.as_deref(), Some(CT));
        assert_eq!(report.removed, 2);
        assert_eq!(report.kept, 1);
        assert_eq!(report.replaced, 1);
        assert_eq!(report.provenance, "test-procedure 20250102030405");
        assert_eq!(ds.text(tags::PATIENT_NAME).as_deref(), Some("DUMMY^PERSON"));
        assert!(!ds.has_element(tags::SOP_CLASS_UID));
    }

    #[test]
    fn test_prior_provenance_survives_removal_of_its_element() {
        let procedure = ProcedureBuilder::new("v1")
            .class(
                "A",
                ClassProcedure::new(ActionKind::Remove)
                    .with_tag(tags::SOP_CLASS_UID, ActionKind::Keep),
            )
            .build()
            .unwrap();
        let mut deid = DeIdentifier::new(procedure)
            .with_clock(FixedClock(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()));

        let mut ds = InMemDicomObject::new_empty();
        ds.put_text(tags::SOP_CLASS_UID, VR::UI, "A");
        ds.put_text(tags::DEIDENTIFICATION_METHOD, VR::LO, "Prior");

        let report = deid.deidentify_with_report(&mut ds).unwrap();

        assert_eq!(report.provenance, "Prior; v1 20240101000000");
        assert_eq!(
            ds.deidentification_method().as_deref(),
            Some("Prior; v1 20240101000000")
        );
    }

    #[test]
    fn test_prior_provenance_survives_dummy_replacement() {
        let mut deid = engine(
            ClassProcedure::new(ActionKind::Keep)
                .with_tag(tags::DEIDENTIFICATION_METHOD, ActionKind::ReplaceWithDummy),
        );
        let mut ds = ct_dataset();
        ds.put_text(tags::DEIDENTIFICATION_METHOD, VR::LO, "Prior");

        let report = deid.deidentify_with_report(&mut ds).unwrap();
        assert_eq!(report.provenance, "Prior; test-procedure 20250102030405");
    }

    #[test]
    fn test_element_reject_without_justification() {
        let mut deid = engine(
            ClassProcedure::new(ActionKind::Keep).with_tag(tags::PATIENT_ID, ActionKind::Reject),
        );
        let err = deid.deidentify(&mut ct_dataset()).unwrap_err();
        assert_eq!(err.justification(), Some(NO_JUSTIFICATION));
    }

    #[test]
    fn test_element_reject_with_justification() {
        let mut deid = engine(ClassProcedure::new(ActionKind::Keep).with_tag(
            tags::PATIENT_ID,
            ElementRule::new(ActionKind::Reject).with_justification("IDs must be removed upstream"),
        ));
        let err = deid.deidentify(&mut ct_dataset()).unwrap_err();
        assert_eq!(err.justification(), Some("IDs must be removed upstream"));
    }

    #[test]
    fn test_rejected_record_is_not_stamped() {
        let mut deid = engine(
            ClassProcedure::new(ActionKind::Remove).with_tag(tags::PATIENT_ID, ActionKind::Reject),
        );
        let mut ds = ct_dataset();
        assert!(deid.deidentify(&mut ds).is_err());
        assert_eq!(ds.deidentification_method(), None);
    }

    #[test]
    fn test_remap_non_text_is_policy_error() {
        let mut deid = engine(
            ClassProcedure::new(ActionKind::Keep).with_tag(tags::PIXEL_DATA, ActionKind::RemapUid),
        );
        let mut ds = ct_dataset();
        ds.put(DataElement::new(
            tags::PIXEL_DATA,
            VR::OW,
            PrimitiveValue::U8(vec![1, 2].into_iter().collect()),
        ));

        let err = deid.deidentify(&mut ds).unwrap_err();
        assert!(err.is_policy_error());
        assert!(err.to_string().contains("(7FE0,0010)"));
        assert!(err.to_string().contains("binary"));
    }

    #[test]
    fn test_remap_empty_value_is_noop() {
        let mut deid = engine(
            ClassProcedure::new(ActionKind::Keep)
                .with_tag(tags::STUDY_INSTANCE_UID, ActionKind::RemapUid),
        );
        let mut ds = ct_dataset();
        ds.put(DataElement::new(tags::STUDY_INSTANCE_UID, VR::UI, PrimitiveValue::Empty));

        deid.deidentify(&mut ds).unwrap();
        assert!(matches!(
            ds.element(tags::STUDY_INSTANCE_UID).unwrap().value(),
            Value::Primitive(PrimitiveValue::Empty)
        ));
        assert!(deid.pseudonyms().is_empty());
    }

    #[test]
    fn test_remap_short_text_keeps_backslash() {
        let mut deid = engine(
            ClassProcedure::new(ActionKind::Keep)
                .with_tag(tags::DERIVATION_DESCRIPTION, ActionKind::RemapUid),
        );
        let mut ds = ct_dataset();
        ds.put_text(tags::DERIVATION_DESCRIPTION, VR::ST, "scan\\0001");

        deid.deidentify(&mut ds).unwrap();

        let remapped = ds.text(tags::DERIVATION_DESCRIPTION).unwrap();
        assert!(!remapped.contains('\\'));
        assert_eq!(deid.pseudonyms().len(), 1);
    }

    #[test]
    fn test_sequence_items_are_walked() {
        let mut deid = engine(
            ClassProcedure::new(ActionKind::Remove)
                .with_tag(tags::REFERENCED_IMAGE_SEQUENCE, ActionKind::Keep)
                .with_tag(tags::REFERENCED_SOP_INSTANCE_UID, ActionKind::RemapUid)
                .with_tag(tags::SOP_INSTANCE_UID, ActionKind::RemapUid),
        );

        let mut item = InMemDicomObject::new_empty();
        item.put_text(tags::REFERENCED_SOP_INSTANCE_UID, VR::UI, "1.2.3.4");
        item.put_text(tags::PATIENT_NAME, VR::PN, "Nested^Name");

        let mut ds = ct_dataset();
        ds.put_text(tags::SOP_INSTANCE_UID, VR::UI, "1.2.3.4");
        ds.put(DataElement::new(
            tags::REFERENCED_IMAGE_SEQUENCE,
            VR::SQ,
            sequence_of(item),
        ));

        deid.deidentify(&mut ds).unwrap();

        let remapped = ds.text(tags::SOP_INSTANCE_UID).unwrap();
        let sequence = ds.element(tags::REFERENCED_IMAGE_SEQUENCE).unwrap();
        let items = sequence.items().unwrap();
        assert_eq!(items[0].text(tags::REFERENCED_SOP_INSTANCE_UID), Some(remapped));
        assert!(!items[0].has_element(tags::PATIENT_NAME));
        // Sequence items carry no provenance of their own
        assert_eq!(items[0].deidentification_method(), None);
    }

    #[test]
    fn test_removed_sequence_is_not_walked() {
        let mut deid = engine(
            ClassProcedure::new(ActionKind::Keep)
                .with_tag(tags::REFERENCED_IMAGE_SEQUENCE, ActionKind::Remove)
                .with_tag(tags::PATIENT_NAME, ActionKind::Reject),
        );
        let mut item = InMemDicomObject::new_empty();
        item.put_text(tags::PATIENT_NAME, VR::PN, "Nested^Name");

        let mut ds = InMemDicomObject::new_empty();
        ds.put_text(tags::SOP_CLASS_UID, VR::UI, CT);
        ds.put(DataElement::new(
            tags::REFERENCED_IMAGE_SEQUENCE,
            VR::SQ,
            sequence_of(item),
        ));

        assert!(deid.deidentify(&mut ds).is_ok());
    }

    #[test]
    fn test_zero_length_uses_vr_placeholder() {
        let rows = Tag(0x0028, 0x0010);
        let mut deid = engine(
            ClassProcedure::new(ActionKind::Keep).with_tag(rows, ActionKind::ReplaceWithZeroLength),
        );
        let mut ds = ct_dataset();
        ds.put(DataElement::new(
            rows,
            VR::US,
            PrimitiveValue::U16(std::iter::once(512).collect()),
        ));

        deid.deidentify(&mut ds).unwrap();
        let element = ds.element(rows).unwrap();
        assert_eq!(element.vr(), VR::US);
        assert_eq!(element.to_str().unwrap(), "0");
    }

    #[test]
    fn test_deidentify_and_serialize_writes_nothing_on_rejection() {
        use crate::dataset::{DicomRecord, JsonCodec};

        let mut deid = engine(
            ClassProcedure::new(ActionKind::Keep).with_tag(tags::PATIENT_ID, ActionKind::Reject),
        );
        let codec = JsonCodec::new();
        let mut input = Vec::new();
        codec
            .write_record(&DicomRecord::new(ct_dataset()), &mut input)
            .unwrap();

        let mut output = Vec::new();
        let result = deid.deidentify_and_serialize(&codec, &mut input.as_slice(), &mut output);
        assert!(result.unwrap_err().is_rejection());
        assert!(output.is_empty());
    }
}

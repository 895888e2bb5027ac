//! Dummy values by value representation
//!
//! Used by the `ReplaceWithDummy` and `ReplaceWithZeroLength` actions. Each
//! placeholder has the value shape of its VR and satisfies the VR's length
//! and character set constraints, so a replaced element still encodes.

use crate::dataset::{DataSetSequence, ElementValue, PrimitiveValue, Tag, Value, VR};
use crate::domain::{DeidError, Result};

const DUMMY_TEXT: &str = "DUMMY";

fn text(value: &str) -> ElementValue {
    PrimitiveValue::from(value).into()
}

/// Placeholder value for a value representation
pub fn dummy_for(vr: VR) -> ElementValue {
    match vr {
        VR::AE | VR::CS | VR::LO | VR::LT | VR::SH | VR::ST | VR::UC | VR::UT => text(DUMMY_TEXT),
        VR::AS => text("000Y"),
        VR::DA => text("20000101"),
        VR::DT => text("20000101000000.000000"),
        VR::TM => text("000000.000000"),
        VR::DS | VR::IS => text("0"),
        VR::PN => text("DUMMY^PERSON"),
        VR::UI => text("2.25.0"),
        VR::UR => text("urn:dummy"),
        VR::AT => PrimitiveValue::Tags(std::iter::once(Tag(0x0000, 0x0000)).collect()).into(),
        VR::FL => PrimitiveValue::F32(std::iter::once(0.0).collect()).into(),
        VR::FD => PrimitiveValue::F64(std::iter::once(0.0).collect()).into(),
        VR::SS => PrimitiveValue::I16(std::iter::once(0).collect()).into(),
        VR::US => PrimitiveValue::U16(std::iter::once(0).collect()).into(),
        VR::SL => PrimitiveValue::I32(std::iter::once(0).collect()).into(),
        VR::UL => PrimitiveValue::U32(std::iter::once(0).collect()).into(),
        VR::SV => PrimitiveValue::I64(std::iter::once(0).collect()).into(),
        VR::UV => PrimitiveValue::U64(std::iter::once(0).collect()).into(),
        // One zero-filled unit of the VR's word size, padded to even length
        VR::OB | VR::OW | VR::UN => zeros(2),
        VR::OF | VR::OL => zeros(4),
        VR::OD | VR::OV => zeros(8),
        VR::SQ => Value::Sequence(DataSetSequence::from(Vec::new())),
    }
}

fn zeros(len: usize) -> ElementValue {
    PrimitiveValue::U8(std::iter::repeat(0u8).take(len).collect()).into()
}

/// Placeholder value for a VR named by its two-letter code
///
/// # Errors
///
/// Returns [`DeidError::Policy`] for an unknown code. There is no fallback
/// placeholder.
pub fn dummy_for_code(code: &str) -> Result<ElementValue> {
    let vr = match code.trim().as_bytes() {
        [a, b] => VR::from_binary([*a, *b]),
        _ => None,
    }
    .ok_or_else(|| DeidError::Policy(format!("Unknown value representation '{code}'")))?;
    Ok(dummy_for(vr))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn as_text(value: &ElementValue) -> String {
        value.to_str().unwrap().into_owned()
    }

    #[test_case(VR::AE ; "application entity")]
    #[test_case(VR::CS ; "code string")]
    #[test_case(VR::SH ; "short string")]
    fn test_text_placeholders_fit_short_vrs(vr: VR) {
        // AE, CS and SH allow at most 16 characters
        let text = as_text(&dummy_for(vr));
        assert!(text.len() <= 16);
        assert!(!text.contains('\\'));
        assert!(text.chars().all(|c| c.is_ascii_uppercase()));
    }

    #[test]
    fn test_date_time_formats() {
        assert_eq!(as_text(&dummy_for(VR::DA)).len(), 8);
        assert_eq!(as_text(&dummy_for(VR::AS)).len(), 4);
        assert_eq!(as_text(&dummy_for(VR::PN)), "DUMMY^PERSON");
    }

    #[test_case(VR::US ; "unsigned short")]
    #[test_case(VR::SL ; "signed long")]
    #[test_case(VR::UV ; "unsigned very long")]
    #[test_case(VR::FD ; "double")]
    fn test_numeric_placeholders_are_zero(vr: VR) {
        match dummy_for(vr) {
            Value::Primitive(primitive) => {
                assert_eq!(primitive.multiplicity(), 1);
                assert_eq!(primitive.to_str(), "0");
            }
            other => panic!("unexpected placeholder for {vr}: {other:?}"),
        }
    }

    #[test]
    fn test_tag_placeholder() {
        match dummy_for(VR::AT) {
            Value::Primitive(PrimitiveValue::Tags(tags)) => {
                assert_eq!(tags.as_slice(), &[Tag(0x0000, 0x0000)])
            }
            other => panic!("unexpected placeholder for AT: {other:?}"),
        }
    }

    #[test]
    fn test_binary_placeholders_have_even_length() {
        for vr in [VR::OB, VR::OW, VR::OF, VR::OL, VR::OD, VR::OV, VR::UN] {
            match dummy_for(vr) {
                Value::Primitive(PrimitiveValue::U8(bytes)) => {
                    assert_eq!(bytes.len() % 2, 0);
                    assert!(bytes.iter().all(|b| *b == 0));
                }
                other => panic!("unexpected placeholder for {vr}: {other:?}"),
            }
        }
    }

    #[test]
    fn test_sequence_placeholder_is_empty() {
        let value = dummy_for(VR::SQ);
        assert_eq!(value.items().map(|items| items.len()), Some(0));
    }

    #[test]
    fn test_dummy_for_code() {
        assert_eq!(as_text(&dummy_for_code("PN").unwrap()), "DUMMY^PERSON");
        assert!(dummy_for_code("QQ").unwrap_err().is_policy_error());
        assert!(dummy_for_code("PNX").unwrap_err().is_policy_error());
    }
}

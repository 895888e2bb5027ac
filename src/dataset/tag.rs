//! Tag keys in procedure documents
//!
//! Procedures spell tags as `(GGGG,EEEE)` in hexadecimal; the DICOM JSON
//! model spells them as `GGGGEEEE`. Both forms are accepted and yield a
//! [`dicom_core::Tag`].

use crate::domain::errors::DeidError;
use dicom_core::Tag;

/// Parses a procedure tag key
///
/// # Examples
///
/// ```
/// use dicom_deid::dataset::{parse_tag, tags};
///
/// assert_eq!(parse_tag("(0010,0010)").unwrap(), tags::PATIENT_NAME);
/// assert_eq!(parse_tag("00100010").unwrap(), tags::PATIENT_NAME);
/// ```
///
/// # Errors
///
/// Returns [`DeidError::Policy`] for anything else, since a malformed tag
/// key makes the whole procedure unusable.
pub fn parse_tag(key: &str) -> Result<Tag, DeidError> {
    let trimmed = key.trim();
    let (group, element) = if let Some(inner) = trimmed
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'))
    {
        inner
            .split_once(',')
            .map(|(g, e)| (g.trim(), e.trim()))
            .ok_or_else(|| invalid_tag(key))?
    } else if trimmed.len() == 8 && trimmed.is_ascii() {
        trimmed.split_at(4)
    } else {
        return Err(invalid_tag(key));
    };

    Ok(Tag(parse_hex_u16(group, key)?, parse_hex_u16(element, key)?))
}

fn parse_hex_u16(part: &str, key: &str) -> Result<u16, DeidError> {
    if part.len() != 4 || !part.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid_tag(key));
    }
    u16::from_str_radix(part, 16).map_err(|_| invalid_tag(key))
}

fn invalid_tag(key: &str) -> DeidError {
    DeidError::Policy(format!(
        "Invalid tag '{key}'. Expected format: (GGGG,EEEE) or GGGGEEEE in hexadecimal"
    ))
}

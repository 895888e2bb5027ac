//! Provenance stamping
//!
//! After a successful walk the record's De-identification Method element
//! `(0012,0063)` records which procedure version processed it and when.
//! A value that was present before the walk is extended with a `; `
//! separator rather than replaced.

use crate::dataset::{DatasetExt, InMemDicomObject};
use chrono::{DateTime, Utc};

/// Source of the provenance timestamp
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always returns the same instant, for reproducible output
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Provenance entry for one pass: `<version> <YYYYMMDDHHMMSS>`
pub fn provenance_entry(version: &str, at: DateTime<Utc>) -> String {
    format!("{version} {}", at.format("%Y%m%d%H%M%S"))
}

/// Joins a new entry onto any prior provenance text
pub fn append_provenance(prior: Option<&str>, entry: &str) -> String {
    match prior.map(str::trim).filter(|p| !p.is_empty()) {
        Some(prior) => format!("{prior}; {entry}"),
        None => entry.to_string(),
    }
}

/// Stamps the dataset and returns the new provenance text
///
/// `prior` is the De-identification Method text read before the walk. The
/// walk may have removed or replaced the element itself, so its current
/// content is not consulted.
pub fn stamp(
    dataset: &mut InMemDicomObject,
    prior: Option<&str>,
    version: &str,
    at: DateTime<Utc>,
) -> String {
    let entry = provenance_entry(version, at);
    let text = append_provenance(prior, &entry);
    dataset.set_deidentification_method(&text);
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn instant() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, 15, 9, 26).unwrap()
    }

    #[test]
    fn test_entry_format() {
        assert_eq!(provenance_entry("v1", instant()), "v1 20250314150926");
    }

    #[test]
    fn test_append_to_nothing() {
        assert_eq!(append_provenance(None, "v1 x"), "v1 x");
        assert_eq!(append_provenance(Some("  "), "v1 x"), "v1 x");
    }

    #[test]
    fn test_append_to_prior() {
        assert_eq!(
            append_provenance(Some("Basic Application Confidentiality Profile "), "v1 x"),
            "Basic Application Confidentiality Profile; v1 x"
        );
    }

    #[test]
    fn test_stamp_twice_concatenates() {
        let mut ds = InMemDicomObject::new_empty();
        let first = stamp(&mut ds, None, "v1", instant());
        let text = stamp(&mut ds, Some(&first), "v2", instant());
        assert_eq!(text, "v1 20250314150926; v2 20250314150926");
        assert_eq!(ds.deidentification_method(), Some(text));
    }

    #[test]
    fn test_stamp_ignores_current_element_content() {
        let mut ds = InMemDicomObject::new_empty();
        ds.set_deidentification_method("DUMMY");
        let text = stamp(&mut ds, Some("Prior"), "v1", instant());
        assert_eq!(text, "Prior; v1 20250314150926");
        assert_eq!(ds.deidentification_method().as_deref(), Some("Prior; v1 20250314150926"));
    }

    #[test]
    fn test_fixed_clock() {
        let clock = FixedClock(instant());
        assert_eq!(clock.now(), clock.now());
    }
}

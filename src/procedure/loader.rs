//! Procedure documents
//!
//! Procedures are authored as nested mappings, in JSON or TOML:
//!
//! ```json
//! {
//!   "default": "R",
//!   "version": "2025.1",
//!   "justification": "Only CT is accepted",
//!   "sopClass": {
//!     "1.2.840.10008.5.1.4.1.1.2": {
//!       "default": "X",
//!       "tags": {
//!         "(0008,0060)": { "default": "K" },
//!         "(0010,0020)": { "default": "U" }
//!       }
//!     }
//!   }
//! }
//! ```
//!
//! The document is deserialised into a loosely typed raw form first so that
//! validation can name the exact location of a problem, then converted into
//! the typed [`Procedure`].

use super::action::ActionKind;
use super::builder::ProcedureBuilder;
use super::model::{ClassProcedure, ElementRule, Procedure};
use crate::dataset::parse_tag;
use crate::domain::{DeidError, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct RawProcedure {
    default: Option<String>,
    version: Option<String>,
    justification: Option<String>,
    #[serde(rename = "sopClass", default)]
    sop_class: BTreeMap<String, RawClassProcedure>,
}

#[derive(Debug, Deserialize)]
struct RawClassProcedure {
    default: Option<String>,
    justification: Option<String>,
    #[serde(default)]
    tags: BTreeMap<String, RawRule>,
}

#[derive(Debug, Deserialize)]
struct RawRule {
    default: Option<String>,
    justification: Option<String>,
}

fn parse_rule(
    location: &str,
    action: Option<&str>,
    justification: Option<&str>,
) -> Result<ElementRule> {
    let action = action
        .ok_or_else(|| DeidError::Policy(format!("{location}: missing \"default\" action")))?;
    let action: ActionKind = action
        .parse()
        .map_err(|e: DeidError| DeidError::Policy(format!("{location}: {}", policy_detail(&e))))?;

    let rule = ElementRule::new(action);
    Ok(match justification {
        Some(text) => rule.with_justification(text),
        None => rule,
    })
}

fn policy_detail(err: &DeidError) -> String {
    match err {
        DeidError::Policy(detail) => detail.clone(),
        other => other.to_string(),
    }
}

impl TryFrom<RawProcedure> for Procedure {
    type Error = DeidError;

    fn try_from(raw: RawProcedure) -> Result<Self> {
        let version = raw
            .version
            .ok_or_else(|| DeidError::Policy("procedure: missing \"version\"".to_string()))?;

        // An unspecified top-level default fails closed
        let default = parse_rule(
            "procedure",
            Some(raw.default.as_deref().unwrap_or(ActionKind::Reject.code())),
            raw.justification.as_deref(),
        )?;

        let mut builder = ProcedureBuilder::new(version).default(default);

        for (uid, raw_class) in raw.sop_class {
            let location = format!("sopClass[\"{uid}\"]");
            let class_default = parse_rule(
                &location,
                raw_class.default.as_deref(),
                raw_class.justification.as_deref(),
            )?;

            let mut class = ClassProcedure::new(class_default);
            for (key, raw_rule) in raw_class.tags {
                let tag_location = format!("{location}.tags[\"{key}\"]");
                let tag = parse_tag(&key).map_err(|e| {
                    DeidError::Policy(format!("{tag_location}: {}", policy_detail(&e)))
                })?;
                if class.tag_rule(tag).is_some() {
                    return Err(DeidError::Policy(format!(
                        "{tag_location}: tag {tag} is configured more than once"
                    )));
                }
                let rule = parse_rule(
                    &tag_location,
                    raw_rule.default.as_deref(),
                    raw_rule.justification.as_deref(),
                )?;
                class = class.with_tag(tag, rule);
            }

            builder = builder.class(uid, class);
        }

        builder.build()
    }
}

impl Procedure {
    /// Parses a procedure from a JSON document
    ///
    /// # Errors
    ///
    /// Returns [`DeidError::Policy`] for malformed documents, unknown actions,
    /// malformed tags and invalid defaults.
    pub fn from_json_str(document: &str) -> Result<Self> {
        let raw: RawProcedure = serde_json::from_str(document)
            .map_err(|e| DeidError::Policy(format!("Failed to parse procedure JSON: {e}")))?;
        raw.try_into()
    }

    /// Parses a procedure from an already decoded JSON value
    pub fn from_json_value(document: serde_json::Value) -> Result<Self> {
        let raw: RawProcedure = serde_json::from_value(document)
            .map_err(|e| DeidError::Policy(format!("Failed to parse procedure JSON: {e}")))?;
        raw.try_into()
    }

    /// Parses a procedure from a TOML document
    pub fn from_toml_str(document: &str) -> Result<Self> {
        let raw: RawProcedure = toml::from_str(document)
            .map_err(|e| DeidError::Policy(format!("Failed to parse procedure TOML: {e}")))?;
        raw.try_into()
    }
}

/// Loads a procedure from a `.json` or `.toml` file
///
/// # Errors
///
/// Returns [`DeidError::Configuration`] if the file is missing or has an
/// unsupported extension, [`DeidError::Io`] if it cannot be read and
/// [`DeidError::Policy`] if its content is invalid.
pub fn load_procedure(path: impl AsRef<Path>) -> Result<Procedure> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(DeidError::Configuration(format!(
            "Procedure file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        DeidError::Io(format!(
            "Failed to read procedure file {}: {}",
            path.display(),
            e
        ))
    })?;

    let procedure = match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Procedure::from_json_str(&contents)?,
        Some("toml") => Procedure::from_toml_str(&contents)?,
        _ => {
            return Err(DeidError::Configuration(format!(
                "Procedure file must be .json or .toml: {}",
                path.display()
            )));
        }
    };

    tracing::info!(
        path = %path.display(),
        version = %procedure.version(),
        classes = procedure.class_rules.len(),
        "Loaded de-identification procedure"
    );

    Ok(procedure)
}

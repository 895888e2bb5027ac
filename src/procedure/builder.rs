//! Fallible builder for [`Procedure`]

use super::action::ActionKind;
use super::model::{ClassProcedure, ElementRule, Procedure};
use crate::domain::{DeidError, Result};
use std::collections::HashMap;

/// Builds a validated [`Procedure`]
///
/// The global default starts as `Reject`, so a procedure that never names a
/// default fails closed.
///
/// # Examples
///
/// ```
/// use dicom_deid::dataset::tags;
/// use dicom_deid::procedure::{ActionKind, ClassProcedure, ProcedureBuilder};
///
/// let procedure = ProcedureBuilder::new("2025.1")
///     .class(
///         "1.2.840.10008.5.1.4.1.1.2",
///         ClassProcedure::new(ActionKind::Remove)
///             .with_tag(tags::MODALITY, ActionKind::Keep),
///     )
///     .build()?;
///
/// assert_eq!(procedure.global_default().action, ActionKind::Reject);
/// # Ok::<(), dicom_deid::domain::DeidError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ProcedureBuilder {
    version: String,
    global_default: ElementRule,
    classes: Vec<(String, ClassProcedure)>,
}

impl ProcedureBuilder {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            global_default: ElementRule::new(ActionKind::Reject),
            classes: Vec::new(),
        }
    }

    /// Sets the default for records whose class has no rule set
    pub fn default(mut self, rule: impl Into<ElementRule>) -> Self {
        self.global_default = rule.into();
        self
    }

    /// Adds the rule set for a SOP class
    pub fn class(mut self, class_uid: impl Into<String>, procedure: ClassProcedure) -> Self {
        self.classes.push((class_uid.into(), procedure));
        self
    }

    /// Validates and builds the procedure
    ///
    /// # Errors
    ///
    /// Returns [`DeidError::Policy`] if:
    /// - the version is blank
    /// - the global default is neither `Keep` nor `Reject`
    /// - a SOP class UID is blank or configured twice
    pub fn build(self) -> Result<Procedure> {
        let version = self.version.trim().to_string();
        if version.is_empty() {
            return Err(DeidError::Policy(
                "procedure version cannot be empty".to_string(),
            ));
        }

        match self.global_default.action {
            ActionKind::Keep | ActionKind::Reject => {}
            other => {
                return Err(DeidError::Policy(format!(
                    "default action {other} ({}) not implemented; the procedure default must be Keep (K) or Reject (R)",
                    other.code()
                )));
            }
        }

        let mut class_rules = HashMap::with_capacity(self.classes.len());
        for (uid, procedure) in self.classes {
            let uid = uid.trim().to_string();
            if uid.is_empty() {
                return Err(DeidError::Policy("SOP class UID cannot be empty".to_string()));
            }
            if class_rules.insert(uid.clone(), procedure).is_some() {
                return Err(DeidError::Policy(format!(
                    "SOP class {uid} is configured more than once"
                )));
            }
        }

        Ok(Procedure {
            global_default: self.global_default,
            version,
            class_rules,
        })
    }
}

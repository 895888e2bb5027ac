//! Typed de-identification procedure
//!
//! A [`Procedure`] is immutable once built. Construction goes through
//! [`ProcedureBuilder`](super::ProcedureBuilder) or the document loader, both
//! of which enforce the invariants documented on each type.

use super::action::ActionKind;
use dicom_core::Tag;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Action plus optional justification
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ElementRule {
    pub action: ActionKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub justification: Option<String>,
}

impl ElementRule {
    pub fn new(action: ActionKind) -> Self {
        Self {
            action,
            justification: None,
        }
    }

    /// Attaches a justification; blank text is treated as absent
    pub fn with_justification(mut self, justification: impl Into<String>) -> Self {
        let justification = justification.into();
        self.justification = (!justification.trim().is_empty()).then_some(justification);
        self
    }

    pub fn justification(&self) -> Option<&str> {
        self.justification.as_deref()
    }
}

impl From<ActionKind> for ElementRule {
    fn from(action: ActionKind) -> Self {
        Self::new(action)
    }
}

/// Rule set for one SOP class
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassProcedure {
    pub default: ElementRule,
    pub tag_rules: HashMap<Tag, ElementRule>,
}

impl ClassProcedure {
    pub fn new(default: impl Into<ElementRule>) -> Self {
        Self {
            default: default.into(),
            tag_rules: HashMap::new(),
        }
    }

    /// Procedure used for records of an unmatched class when the global
    /// default is `Keep`: every element passes through unchanged.
    pub fn permissive() -> Self {
        Self::new(ActionKind::Keep)
    }

    /// Adds or replaces the rule for a tag
    pub fn with_tag(mut self, tag: Tag, rule: impl Into<ElementRule>) -> Self {
        self.tag_rules.insert(tag, rule.into());
        self
    }

    /// Rule configured for a specific tag
    pub fn tag_rule(&self, tag: Tag) -> Option<&ElementRule> {
        self.tag_rules.get(&tag)
    }
}

/// Root de-identification policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Procedure {
    pub(crate) global_default: ElementRule,
    pub(crate) version: String,
    pub(crate) class_rules: HashMap<String, ClassProcedure>,
}

impl Procedure {
    /// Default applied to records whose class has no rule set.
    /// Always `Keep` or `Reject`.
    pub fn global_default(&self) -> &ElementRule {
        &self.global_default
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Rule set for a SOP class
    pub fn class_procedure(&self, class_uid: &str) -> Option<&ClassProcedure> {
        self.class_rules.get(class_uid)
    }

    /// Configured SOP classes, sorted
    pub fn class_uids(&self) -> Vec<&str> {
        let mut uids: Vec<&str> = self.class_rules.keys().map(String::as_str).collect();
        uids.sort_unstable();
        uids
    }

    /// Counts used by `validate-procedure`
    pub fn summary(&self) -> ProcedureSummary {
        let mut actions: BTreeMap<ActionKind, usize> = BTreeMap::new();
        let mut tag_rules = 0;

        for class in self.class_rules.values() {
            *actions.entry(class.default.action).or_default() += 1;
            for rule in class.tag_rules.values() {
                *actions.entry(rule.action).or_default() += 1;
                tag_rules += 1;
            }
        }

        ProcedureSummary {
            version: self.version.clone(),
            global_default: self.global_default.action,
            classes: self.class_rules.len(),
            tag_rules,
            actions,
        }
    }
}

/// Shape of a procedure, without the rules themselves
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcedureSummary {
    pub version: String,
    pub global_default: ActionKind,
    pub classes: usize,
    pub tag_rules: usize,
    /// Number of rules (class defaults and tag rules) per action
    pub actions: BTreeMap<ActionKind, usize>,
}

//! Rule resolution
//!
//! Resolution happens at two levels. [`resolve_class`] picks the rule set
//! for a record's SOP class, falling back to the procedure's global default.
//! [`resolve_rule`] picks the rule for one element, falling back from the
//! tag rule to the class default. Together they form the full
//! tag → class → global precedence chain.

use crate::dataset::Tag;
use crate::domain::{DeidError, Result};
use crate::procedure::{ActionKind, ClassProcedure, Procedure};
use std::borrow::Cow;

/// Where a resolved element rule came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleSource {
    /// Tag-specific rule
    Tag,
    /// Class default
    ClassDefault,
}

/// Action and justification chosen for one element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedRule<'a> {
    pub action: ActionKind,
    pub justification: Option<&'a str>,
    pub source: RuleSource,
}

/// Justification used when a record of an unmatched class is rejected and
/// the procedure supplies none
pub fn unsupported_class_message(class_uid: Option<&str>) -> String {
    format!("SOP class {} is not supported", class_uid.unwrap_or("(missing)"))
}

/// Selects the rule set governing a record of the given class
///
/// # Errors
///
/// - [`DeidError::Rejected`] when the class is unmatched and the global
///   default is `Reject`
/// - [`DeidError::Policy`] when the class is unmatched and the global
///   default is anything other than `Keep` or `Reject`
pub fn resolve_class<'p>(
    procedure: &'p Procedure,
    class_uid: Option<&str>,
) -> Result<Cow<'p, ClassProcedure>> {
    if let Some(class) = class_uid.and_then(|uid| procedure.class_procedure(uid)) {
        return Ok(Cow::Borrowed(class));
    }

    let default = procedure.global_default();
    match default.action {
        ActionKind::Reject => Err(DeidError::rejected(
            default.justification(),
            unsupported_class_message(class_uid),
        )),
        ActionKind::Keep => Ok(Cow::Owned(ClassProcedure::permissive())),
        other => Err(DeidError::Policy(format!(
            "default action {other} ({}) not implemented",
            other.code()
        ))),
    }
}

/// Selects the rule for one element: the tag rule if present, otherwise
/// the class default
pub fn resolve_rule(class: &ClassProcedure, tag: Tag) -> ResolvedRule<'_> {
    match class.tag_rule(tag) {
        Some(rule) => ResolvedRule {
            action: rule.action,
            justification: rule.justification(),
            source: RuleSource::Tag,
        },
        None => ResolvedRule {
            action: class.default.action,
            justification: class.default.justification(),
            source: RuleSource::ClassDefault,
        },
    }
}

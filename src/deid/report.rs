//! Per-record outcome of a successful de-identification

use crate::procedure::ActionKind;
use serde::{Deserialize, Serialize};

/// What the engine did to one record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeidentificationReport {
    /// SOP Class UID read before the walk
    pub sop_class_uid: Option<String>,

    /// Whether the class had its own rule set (false means the global
    /// `Keep` default let it through)
    pub class_matched: bool,

    /// Elements visited, including those inside sequence items
    pub elements_visited: usize,

    pub removed: usize,
    pub kept: usize,
    pub replaced: usize,
    pub remapped: usize,

    /// De-identification Method text written to the record
    pub provenance: String,
}

impl DeidentificationReport {
    pub(crate) fn new(sop_class_uid: Option<&str>, class_matched: bool) -> Self {
        Self {
            sop_class_uid: sop_class_uid.map(str::to_string),
            class_matched,
            ..Self::default()
        }
    }

    pub(crate) fn record(&mut self, action: ActionKind) {
        self.elements_visited += 1;
        match action {
            ActionKind::Remove => self.removed += 1,
            ActionKind::Keep => self.kept += 1,
            ActionKind::ReplaceWithDummy | ActionKind::ReplaceWithZeroLength => {
                self.replaced += 1
            }
            ActionKind::RemapUid => self.remapped += 1,
            ActionKind::Reject => {}
        }
    }

    /// Elements whose value was changed or dropped
    pub fn modified(&self) -> usize {
        self.removed + self.replaced + self.remapped
    }
}

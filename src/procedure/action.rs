//! De-identification actions

use crate::domain::errors::DeidError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Action applied to an element, or to a record as a whole
///
/// Procedures spell actions with the PS3.15 action codes. The variant names
/// are accepted as well, case-insensitively.
///
/// | Variant | Code |
/// |---------|------|
/// | `Remove` | `X` |
/// | `Keep` | `K` |
/// | `ReplaceWithDummy` | `D` |
/// | `ReplaceWithZeroLength` | `Z` |
/// | `RemapUid` | `U` |
/// | `Reject` | `R` |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ActionKind {
    Remove,
    Keep,
    ReplaceWithDummy,
    ReplaceWithZeroLength,
    RemapUid,
    Reject,
}

impl ActionKind {
    pub const ALL: [ActionKind; 6] = [
        ActionKind::Remove,
        ActionKind::Keep,
        ActionKind::ReplaceWithDummy,
        ActionKind::ReplaceWithZeroLength,
        ActionKind::RemapUid,
        ActionKind::Reject,
    ];

    /// PS3.15 action code
    pub fn code(&self) -> &'static str {
        match self {
            ActionKind::Remove => "X",
            ActionKind::Keep => "K",
            ActionKind::ReplaceWithDummy => "D",
            ActionKind::ReplaceWithZeroLength => "Z",
            ActionKind::RemapUid => "U",
            ActionKind::Reject => "R",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ActionKind::Remove => "Remove",
            ActionKind::Keep => "Keep",
            ActionKind::ReplaceWithDummy => "ReplaceWithDummy",
            ActionKind::ReplaceWithZeroLength => "ReplaceWithZeroLength",
            ActionKind::RemapUid => "RemapUid",
            ActionKind::Reject => "Reject",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ActionKind {
    type Err = DeidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        ActionKind::ALL
            .iter()
            .copied()
            .find(|action| action.code() == s || action.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| DeidError::Policy(format!("unknown action \"{s}\"")))
    }
}

impl Serialize for ActionKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

impl<'de> Deserialize<'de> for ActionKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

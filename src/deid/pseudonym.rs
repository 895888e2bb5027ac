//! Stable pseudonymous UIDs
//!
//! A [`PseudonymStore`] maps original values to freshly minted UIDs and
//! remembers every mapping for its own lifetime, so the same identifier
//! remapped in two elements (or two records) yields the same pseudonym.
//! Stores are never shared: two stores, even under the same root, mint
//! different UIDs for the same input.

use crate::dataset::VR;
use crate::domain::{DeidError, Result};
use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use uuid::Uuid;

static UID_ROOT_REGEX: OnceLock<Regex> = OnceLock::new();

/// Maximum length of a DICOM UID
pub const UID_MAX_LENGTH: usize = 64;

const UID_ROOT_MAX_LENGTH: usize = 32;
const UID_ROOT_DEFAULT_VALUE: &str = "2.25";

/// Root under which pseudonymous UIDs are minted
///
/// Must be a syntactically valid UID (dot separated numeric components
/// without leading zeros) of at most 32 characters. A trailing dot is
/// accepted and ignored. The default is `2.25`, the UUID-derived root.
///
/// # Examples
///
/// ```
/// use dicom_deid::deid::UidRoot;
///
/// let root: UidRoot = "1.2.826.0.1.3680043.8.498.".parse().unwrap();
/// assert_eq!(root.as_str(), "1.2.826.0.1.3680043.8.498");
///
/// assert!("1.02.3".parse::<UidRoot>().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UidRoot(String);

impl UidRoot {
    pub fn new(root: &str) -> Result<Self> {
        let regex = UID_ROOT_REGEX.get_or_init(|| {
            Regex::new(r"^(0|[1-9][0-9]*)(\.(0|[1-9][0-9]*))*$").expect("UID root pattern is valid")
        });

        let root = root.trim().trim_end_matches('.');
        if root.len() > UID_ROOT_MAX_LENGTH || !regex.is_match(root) {
            return Err(DeidError::Configuration(format!(
                "Invalid UID root '{root}'. Must be dot separated numbers without leading zeros and no longer than {UID_ROOT_MAX_LENGTH} characters"
            )));
        }

        Ok(Self(root.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Mints a new UID under this root from a random UUID
    fn mint(&self) -> String {
        let digits = Uuid::new_v4().as_u128().to_string();
        let prefix = format!("{}.", self.0);
        let available = UID_MAX_LENGTH - prefix.len();
        let digits = &digits[..digits.len().min(available)];
        format!("{prefix}{digits}")
    }
}

impl Default for UidRoot {
    fn default() -> Self {
        Self(UID_ROOT_DEFAULT_VALUE.to_string())
    }
}

impl FromStr for UidRoot {
    type Err = DeidError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl fmt::Display for UidRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn is_single_valued(vr: VR) -> bool {
    matches!(vr, VR::LT | VR::ST | VR::UT | VR::UR)
}

/// Memoised original-value to pseudonym mapping
#[derive(Debug, Default)]
pub struct PseudonymStore {
    root: UidRoot,
    cache: HashMap<String, String>,
}

impl PseudonymStore {
    pub fn new(root: UidRoot) -> Self {
        Self {
            root,
            cache: HashMap::new(),
        }
    }

    pub fn root(&self) -> &UidRoot {
        &self.root
    }

    /// Returns the pseudonym for `original`, minting one on first sight
    pub fn remap(&mut self, original: &str) -> String {
        if let Some(existing) = self.cache.get(original) {
            return existing.clone();
        }

        let minted = self.root.mint();
        self.cache.insert(original.to_string(), minted.clone());
        minted
    }

    /// Remaps the components of an element value
    ///
    /// Multi-valued VRs separate components with `\`. LT, ST, UT and UR
    /// are single-valued, so a backslash there is ordinary text and the
    /// whole value is one identifier. Trailing NUL/space padding is not
    /// part of the identifier and empty components stay empty.
    pub fn remap_value(&mut self, vr: VR, value: &str) -> Vec<String> {
        let components: Vec<&str> = if is_single_valued(vr) {
            vec![value]
        } else {
            value.split('\\').collect()
        };

        components
            .into_iter()
            .map(|component| {
                let component = component.trim_matches(['\0', ' ']);
                if component.is_empty() {
                    String::new()
                } else {
                    self.remap(component)
                }
            })
            .collect()
    }

    /// Number of distinct original values seen
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

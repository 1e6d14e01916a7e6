//! User tag keys and tag values.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Label used for an AP that does not carry the requested tag.
pub const MISSING_TAG_LABEL: &str = "Z";

/// Label used for an AP whose tag is present but has an empty value.
pub const EMPTY_TAG_LABEL: &str = "EMPTY";

/// A user-defined tag key from `tagKeys.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagKey {
    /// Tag key identifier (referenced by `tags[].tagKeyId`)
    pub id: String,
    /// Display name of the key (e.g., "Building")
    pub key: String,
}

/// Wire wrapper: `{"tagKeys": [...]}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagKeysDocument {
    /// Tag keys in document order
    #[serde(default)]
    pub tag_keys: Vec<TagKey>,
}

/// The value an access point carries for one tag key.
///
/// Ordering places every real value first (lexicographic), then `Empty`,
/// then `Missing`, so untagged APs always come last.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TagValue {
    /// Tag present with a non-empty value
    Present(String),
    /// Tag present with an empty value
    Empty,
    /// Tag not on the AP, or tag keys unavailable for the project
    Missing,
}

impl TagValue {
    /// Builds a tag value from an optional raw string.
    pub fn from_raw(raw: Option<&str>) -> Self {
        match raw {
            None => Self::Missing,
            Some("") => Self::Empty,
            Some(value) => Self::Present(value.to_string()),
        }
    }

    /// Text used when the value appears in a name or report.
    pub fn label(&self) -> &str {
        match self {
            Self::Present(value) => value,
            Self::Empty => EMPTY_TAG_LABEL,
            Self::Missing => MISSING_TAG_LABEL,
        }
    }

    const fn rank(&self) -> u8 {
        match self {
            Self::Present(_) => 0,
            Self::Empty => 1,
            Self::Missing => 2,
        }
    }
}

impl Ord for TagValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Present(a), Self::Present(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for TagValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for TagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

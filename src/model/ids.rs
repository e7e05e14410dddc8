//! Newtype identifiers for labels.
//!
//! Label ids are plain strings on the wire, but wrapping them keeps a label
//! id from being confused with an interval id or a display name.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Identifier of a semantic label (a facial action such as `jawOpen`).
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelId(pub String);

impl LabelId {
    /// Creates a new LabelId.
    #[inline]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the underlying string.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the id is the empty string.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for LabelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LabelId({})", self.0)
    }
}

impl fmt::Display for LabelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LabelId {
    fn from(id: &str) -> Self {
        LabelId::new(id)
    }
}

impl From<String> for LabelId {
    fn from(id: String) -> Self {
        LabelId(id)
    }
}

impl Borrow<str> for LabelId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_id_equality() {
        assert_eq!(LabelId::from("jawOpen"), LabelId::new("jawOpen"));
        assert_ne!(LabelId::from("jawOpen"), LabelId::from("tongueOut"));
    }

    #[test]
    fn test_label_id_is_transparent_in_json() {
        let json = serde_json::to_string(&LabelId::from("cheekPuff")).unwrap();
        assert_eq!(json, "\"cheekPuff\"");
    }

    #[test]
    fn test_label_id_borrow_lookup() {
        use std::collections::HashSet;
        let mut set = HashSet::new();
        set.insert(LabelId::from("mouthLeft"));
        assert!(set.contains("mouthLeft"));
    }
}

//! The label catalog: the fixed, ordered universe of label ids.
//!
//! The catalog decides the layout of every exported label vector (index `i`
//! of the vector is entry `i` of the catalog), which labels belong to the
//! tongue category, and which two labels the cascade rules raise. It is an
//! immutable value built once and passed by reference; lookups are O(1).
//!
//! Unknown ids are never an error here. Callers treat a failed lookup as
//! "not in the catalog" and skip the label.

mod facial;

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

use crate::model::LabelId;

/// Anatomical group of a label.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelCategory {
    Brow,
    Cheek,
    Nose,
    Jaw,
    Mouth,
    Tongue,
}

impl fmt::Display for LabelCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LabelCategory::Brow => "brow",
            LabelCategory::Cheek => "cheek",
            LabelCategory::Nose => "nose",
            LabelCategory::Jaw => "jaw",
            LabelCategory::Mouth => "mouth",
            LabelCategory::Tongue => "tongue",
        };
        f.write_str(name)
    }
}

/// A single catalog entry.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LabelEntry {
    pub id: LabelId,
    /// English display name.
    pub name: String,
    /// Name shown to annotators in the localized UI.
    pub localized_name: String,
    pub category: LabelCategory,
}

impl LabelEntry {
    /// Creates an entry, deriving the English name from the camelCase id.
    pub fn new(
        id: impl Into<LabelId>,
        localized_name: impl Into<String>,
        category: LabelCategory,
    ) -> Self {
        let id = id.into();
        let name = facial::display_name(id.as_str());
        Self {
            id,
            name,
            localized_name: localized_name.into(),
            category,
        }
    }
}

/// Problems building a custom catalog.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum CatalogError {
    #[error("catalog has no entries")]
    Empty,

    #[error("label '{0}' appears more than once in the catalog")]
    DuplicateLabel(LabelId),

    #[error("cascade label '{0}' is not in the catalog")]
    MissingAnchor(LabelId),

    #[error("cascade label '{label}' must {expectation}")]
    AnchorCategory {
        label: LabelId,
        expectation: &'static str,
    },
}

/// Ordered label catalog with category metadata and cascade anchors.
#[derive(Clone, Debug)]
pub struct LabelCatalog {
    entries: Vec<LabelEntry>,
    index: HashMap<String, usize>,
    jaw_open: usize,
    canonical_tongue: usize,
}

impl LabelCatalog {
    /// The standard 45-label facial action catalog.
    pub fn facial_actions() -> Self {
        let entries: Vec<LabelEntry> = facial::FACIAL_ACTIONS
            .iter()
            .map(|(id, localized, category)| LabelEntry::new(*id, *localized, *category))
            .collect();
        let index = entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.id.0.clone(), i))
            .collect();

        Self {
            entries,
            index,
            jaw_open: facial::JAW_OPEN_INDEX,
            canonical_tongue: facial::TONGUE_OUT_INDEX,
        }
    }

    /// Builds a catalog from explicit entries.
    ///
    /// `jaw_open` must be a non-tongue entry and `canonical_tongue` a tongue
    /// entry; ids must be unique.
    pub fn from_entries(
        entries: Vec<LabelEntry>,
        jaw_open: impl Into<LabelId>,
        canonical_tongue: impl Into<LabelId>,
    ) -> Result<Self, CatalogError> {
        if entries.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut index = HashMap::with_capacity(entries.len());
        for (i, entry) in entries.iter().enumerate() {
            if index.insert(entry.id.0.clone(), i).is_some() {
                return Err(CatalogError::DuplicateLabel(entry.id.clone()));
            }
        }

        let jaw_open = jaw_open.into();
        let canonical_tongue = canonical_tongue.into();

        let jaw_idx = *index
            .get(jaw_open.as_str())
            .ok_or_else(|| CatalogError::MissingAnchor(jaw_open.clone()))?;
        let tongue_idx = *index
            .get(canonical_tongue.as_str())
            .ok_or_else(|| CatalogError::MissingAnchor(canonical_tongue.clone()))?;

        if entries[jaw_idx].category == LabelCategory::Tongue {
            return Err(CatalogError::AnchorCategory {
                label: jaw_open,
                expectation: "not be a tongue label",
            });
        }
        if entries[tongue_idx].category != LabelCategory::Tongue {
            return Err(CatalogError::AnchorCategory {
                label: canonical_tongue,
                expectation: "be a tongue label",
            });
        }

        Ok(Self {
            entries,
            index,
            jaw_open: jaw_idx,
            canonical_tongue: tongue_idx,
        })
    }

    /// Number of labels, which is also the exported vector width.
    #[inline]
    pub fn label_count(&self) -> usize {
        self.entries.len()
    }

    /// Position of `label` in the catalog, if known.
    #[inline]
    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.index.get(label).copied()
    }

    /// Returns true if `label` is in the catalog.
    pub fn contains(&self, label: &str) -> bool {
        self.index.contains_key(label)
    }

    /// Returns true if `label` is a known tongue-category label.
    pub fn is_tongue_category(&self, label: &str) -> bool {
        self.index_of(label)
            .is_some_and(|i| self.is_tongue_index(i))
    }

    /// Returns true if catalog position `index` is a tongue-category label.
    pub fn is_tongue_index(&self, index: usize) -> bool {
        self.entries
            .get(index)
            .is_some_and(|e| e.category == LabelCategory::Tongue)
    }

    /// The tongue label raised when any other tongue label is active.
    pub fn canonical_tongue_label(&self) -> &LabelId {
        &self.entries[self.canonical_tongue].id
    }

    pub fn canonical_tongue_index(&self) -> usize {
        self.canonical_tongue
    }

    /// The label raised whenever any tongue label is active.
    pub fn jaw_open_label(&self) -> &LabelId {
        &self.entries[self.jaw_open].id
    }

    pub fn jaw_open_index(&self) -> usize {
        self.jaw_open
    }

    /// All entries in vector order.
    pub fn entries(&self) -> &[LabelEntry] {
        &self.entries
    }

    /// Entry for `label`, if known.
    pub fn entry(&self, label: &str) -> Option<&LabelEntry> {
        self.index_of(label).map(|i| &self.entries[i])
    }

    /// Tongue-category ids in catalog order.
    pub fn tongue_labels(&self) -> impl Iterator<Item = &LabelId> {
        self.entries
            .iter()
            .filter(|e| e.category == LabelCategory::Tongue)
            .map(|e| &e.id)
    }
}

impl Default for LabelCatalog {
    fn default() -> Self {
        Self::facial_actions()
    }
}

impl fmt::Display for LabelCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} labels:", self.label_count())?;
        for (i, entry) in self.entries.iter().enumerate() {
            let marker = if i == self.jaw_open || i == self.canonical_tongue {
                " *"
            } else {
                ""
            };
            writeln!(
                f,
                "  {:>2}  {:<20} {:<7} {}{}",
                i, entry.id, entry.category, entry.localized_name, marker
            )?;
        }
        Ok(())
    }
}

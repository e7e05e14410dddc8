//! Per-frame label vector encoding.
//!
//! A label vector has one value per catalog entry, in catalog order. It is
//! built from an interval's label configs at a given progress, then passed
//! through the cascade rules:
//!
//! 1. if any tongue label is active (value > 0), `jawOpen` is raised to 1.0;
//! 2. if a tongue label other than the canonical `tongueOut` is active, the
//!    canonical tongue label is raised to 1.0 as well.
//!
//! The rules only ever raise values, and running them twice is the same as
//! running them once.

use std::fmt::Write as _;

use crate::catalog::LabelCatalog;
use crate::model::{clamp_intensity, LabelConfig};

/// Human readable statement of the cascade rules, for manifests.
pub const CASCADE_RULES: [&str; 2] = [
    "When any tongue action has a value above 0, jawOpen is set to 1.0",
    "When a tongue action other than tongueOut has a value above 0, tongueOut is set to 1.0",
];

/// Fixed-width vector of label values in catalog order.
#[derive(Clone, Debug, PartialEq)]
pub struct LabelVector {
    values: Vec<f64>,
}

impl LabelVector {
    /// An all-zero vector sized for `catalog`.
    pub fn zeros(catalog: &LabelCatalog) -> Self {
        Self {
            values: vec![0.0; catalog.label_count()],
        }
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value for `label`, or `None` if the catalog does not know it.
    pub fn get(&self, label: &str, catalog: &LabelCatalog) -> Option<f64> {
        catalog
            .index_of(label)
            .and_then(|i| self.values.get(i).copied())
    }

    /// Count of entries with a value above zero.
    pub fn active_count(&self) -> usize {
        self.values.iter().filter(|v| **v > 0.0).count()
    }

    /// Label file body: one `%.6f` value per line.
    pub fn to_text(&self) -> String {
        let mut out = String::with_capacity(self.values.len() * 9);
        for value in &self.values {
            // Writing into a String cannot fail.
            let _ = writeln!(out, "{:.6}", value);
        }
        out
    }

    fn raise_to_one(&mut self, index: usize) {
        if let Some(slot) = self.values.get_mut(index) {
            if *slot < 1.0 {
                *slot = 1.0;
            }
        }
    }
}

/// Encodes `labels` at `progress` into a catalog-ordered vector and applies
/// the cascade rules.
///
/// Labels the catalog does not know are skipped. If the same label appears
/// twice, the later config wins.
pub fn encode(labels: &[LabelConfig], progress: f64, catalog: &LabelCatalog) -> LabelVector {
    let mut vector = LabelVector::zeros(catalog);

    for config in labels {
        let Some(index) = catalog.index_of(config.label.as_str()) else {
            continue;
        };
        vector.values[index] = clamp_intensity(config.value_at(progress));
    }

    apply_cascade(&mut vector, catalog);
    vector
}

/// Applies the tongue -> jaw-open -> canonical tongue cascade in place.
pub fn apply_cascade(vector: &mut LabelVector, catalog: &LabelCatalog) {
    let canonical = catalog.canonical_tongue_index();

    let mut tongue_active = false;
    let mut other_tongue_active = false;
    for (index, value) in vector.values.iter().enumerate() {
        if *value > 0.0 && catalog.is_tongue_index(index) {
            tongue_active = true;
            if index != canonical {
                other_tongue_active = true;
            }
        }
    }

    if tongue_active {
        vector.raise_to_one(catalog.jaw_open_index());
        if other_tongue_active {
            vector.raise_to_one(canonical);
        }
    }
}

//! Annotation intervals and their per-label configuration.
//!
//! Like the rest of the model, these types can represent invalid data (an
//! imported interval may have `start_time >= end_time`, or an intensity of
//! 1.4) so that validation can report problems instead of the parser
//! refusing the whole file. The checked constructors are what interactive
//! code should use.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use super::ids::LabelId;

/// Default display tag for new intervals.
pub const DEFAULT_COLOR: &str = "#2196F3";

/// How a label's value evolves across the frames of its interval.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Progression {
    /// Ramps from 0 at the first frame to the full intensity at the last.
    #[default]
    #[serde(alias = "Linear", alias = "LINEAR")]
    Linear,
    /// Holds the full intensity on every frame.
    #[serde(alias = "Constant", alias = "CONSTANT")]
    Constant,
}

impl Progression {
    /// Stable lowercase name, as used in project files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Progression::Linear => "linear",
            Progression::Constant => "constant",
        }
    }
}

impl fmt::Display for Progression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One label's intensity and progression within an interval.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LabelConfig {
    pub label: LabelId,
    #[serde(default = "full_intensity")]
    pub intensity: f64,
    #[serde(default)]
    pub progression: Progression,
}

fn full_intensity() -> f64 {
    1.0
}

/// Clamps an intensity into [0, 1]. NaN maps to 0.
pub fn clamp_intensity(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

impl LabelConfig {
    /// Creates a label config, clamping the intensity into [0, 1].
    pub fn new(label: impl Into<LabelId>, intensity: f64, progression: Progression) -> Self {
        Self {
            label: label.into(),
            intensity: clamp_intensity(intensity),
            progression,
        }
    }

    /// Shorthand for a linear config.
    pub fn linear(label: impl Into<LabelId>, intensity: f64) -> Self {
        Self::new(label, intensity, Progression::Linear)
    }

    /// Shorthand for a constant config.
    pub fn constant(label: impl Into<LabelId>, intensity: f64) -> Self {
        Self::new(label, intensity, Progression::Constant)
    }

    /// Value of this label at `progress` in [0, 1], clamped into [0, 1].
    pub fn value_at(&self, progress: f64) -> f64 {
        let raw = match self.progression {
            Progression::Constant => self.intensity,
            Progression::Linear => self.intensity * progress,
        };
        clamp_intensity(raw)
    }
}

/// Reasons the checked interval constructor refuses its input.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum IntervalError {
    #[error("interval times must be finite (got {start}..{end})")]
    NonFiniteTime { start: f64, end: f64 },

    #[error("interval start {start} must not be negative")]
    NegativeStart { start: f64 },

    #[error("interval start {start} must be before end {end}")]
    InvalidTimeRange { start: f64, end: f64 },

    #[error("interval needs at least one label")]
    NoLabels,

    #[error("label '{0}' appears more than once in the interval")]
    DuplicateLabel(LabelId),
}

/// A time region of the video carrying one or more labels.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnnotationInterval {
    #[serde(default)]
    pub id: String,
    pub start_time: f64,
    pub end_time: f64,
    pub labels: Vec<LabelConfig>,
    #[serde(default = "default_color")]
    pub color: String,
}

fn default_color() -> String {
    DEFAULT_COLOR.to_string()
}

/// Generates a fresh interval id.
pub fn generate_interval_id() -> String {
    format!("marker_{}", Uuid::new_v4().simple())
}

impl AnnotationInterval {
    /// Creates an interval after checking its invariants.
    ///
    /// A fresh id and the default color are assigned; use [`with_id`] and
    /// [`with_color`] to override them.
    ///
    /// [`with_id`]: AnnotationInterval::with_id
    /// [`with_color`]: AnnotationInterval::with_color
    pub fn new(
        start_time: f64,
        end_time: f64,
        labels: Vec<LabelConfig>,
    ) -> Result<Self, IntervalError> {
        if !start_time.is_finite() || !end_time.is_finite() {
            return Err(IntervalError::NonFiniteTime {
                start: start_time,
                end: end_time,
            });
        }
        if start_time < 0.0 {
            return Err(IntervalError::NegativeStart { start: start_time });
        }
        if start_time >= end_time {
            return Err(IntervalError::InvalidTimeRange {
                start: start_time,
                end: end_time,
            });
        }
        if labels.is_empty() {
            return Err(IntervalError::NoLabels);
        }
        let mut seen = HashSet::new();
        for config in &labels {
            if !seen.insert(config.label.as_str()) {
                return Err(IntervalError::DuplicateLabel(config.label.clone()));
            }
        }

        Ok(Self {
            id: generate_interval_id(),
            start_time,
            end_time,
            labels,
            color: default_color(),
        })
    }

    /// Replaces the generated id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Sets the display color tag.
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    /// Length of the interval in seconds.
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }

    /// Half-open overlap test used for insertion: touching endpoints do not
    /// overlap.
    pub fn overlaps(&self, other: &AnnotationInterval) -> bool {
        !(self.end_time <= other.start_time || self.start_time >= other.end_time)
    }

    /// Closed containment test used for point queries.
    pub fn contains_time(&self, time: f64) -> bool {
        self.start_time <= time && time <= self.end_time
    }

    /// Closed intersection test used for range queries. Unlike [`overlaps`],
    /// an interval ending exactly at `from` is included.
    ///
    /// [`overlaps`]: AnnotationInterval::overlaps
    pub fn intersects_range(&self, from: f64, to: f64) -> bool {
        !(self.end_time < from || self.start_time > to)
    }

    /// Returns true if the interval carries `label`.
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|c| c.label.as_str() == label)
    }

    /// Label ids in interval order.
    pub fn label_ids(&self) -> impl Iterator<Item = &LabelId> {
        self.labels.iter().map(|c| &c.label)
    }

    /// Label ids joined with `+`, for messages.
    pub fn display_labels(&self) -> String {
        self.labels
            .iter()
            .map(|c| c.label.as_str())
            .collect::<Vec<_>>()
            .join("+")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_config_clamps_on_construction() {
        assert_eq!(LabelConfig::linear("jawOpen", 1.7).intensity, 1.0);
        assert_eq!(LabelConfig::linear("jawOpen", -0.2).intensity, 0.0);
        assert_eq!(LabelConfig::linear("jawOpen", f64::NAN).intensity, 0.0);
    }

    #[test]
    fn test_value_at_follows_progression() {
        let linear = LabelConfig::linear("jawOpen", 0.8);
        let constant = LabelConfig::constant("jawOpen", 0.8);
        assert_eq!(linear.value_at(0.0), 0.0);
        assert!((linear.value_at(0.5) - 0.4).abs() < 1e-12);
        assert_eq!(constant.value_at(0.0), 0.8);
        assert_eq!(constant.value_at(1.0), 0.8);
    }

    #[test]
    fn test_progression_serde_names() {
        assert_eq!(
            serde_json::to_string(&Progression::Constant).unwrap(),
            "\"constant\""
        );
        let parsed: Progression = serde_json::from_str("\"LINEAR\"").unwrap();
        assert_eq!(parsed, Progression::Linear);
    }

    #[test]
    fn test_checked_constructor_rejects_bad_input() {
        let labels = || vec![LabelConfig::linear("jawOpen", 1.0)];
        assert!(matches!(
            AnnotationInterval::new(2.0, 1.0, labels()),
            Err(IntervalError::InvalidTimeRange { .. })
        ));
        assert!(matches!(
            AnnotationInterval::new(1.0, 1.0, labels()),
            Err(IntervalError::InvalidTimeRange { .. })
        ));
        assert!(matches!(
            AnnotationInterval::new(-1.0, 1.0, labels()),
            Err(IntervalError::NegativeStart { .. })
        ));
        assert_eq!(
            AnnotationInterval::new(0.0, 1.0, vec![]),
            Err(IntervalError::NoLabels)
        );
        assert_eq!(
            AnnotationInterval::new(
                0.0,
                1.0,
                vec![
                    LabelConfig::linear("jawOpen", 1.0),
                    LabelConfig::constant("jawOpen", 0.5)
                ]
            ),
            Err(IntervalError::DuplicateLabel(LabelId::from("jawOpen")))
        );
    }

    #[test]
    fn test_generated_ids_are_distinct() {
        let a = AnnotationInterval::new(0.0, 1.0, vec![LabelConfig::linear("jawOpen", 1.0)])
            .unwrap();
        let b = AnnotationInterval::new(0.0, 1.0, vec![LabelConfig::linear("jawOpen", 1.0)])
            .unwrap();
        assert!(a.id.starts_with("marker_"));
        assert_ne!(a.id, b.id);
        assert_eq!(a.color, DEFAULT_COLOR);
    }

    #[test]
    fn test_overlap_is_half_open_but_range_query_is_closed() {
        let labels = vec![LabelConfig::linear("jawOpen", 1.0)];
        let a = AnnotationInterval::new(0.0, 1.0, labels.clone()).unwrap();
        let b = AnnotationInterval::new(1.0, 2.0, labels).unwrap();

        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
        assert!(a.intersects_range(1.0, 1.5));
        assert!(a.contains_time(1.0));
        assert!(b.contains_time(1.0));
    }

    #[test]
    fn test_display_labels() {
        let interval = AnnotationInterval::new(
            0.0,
            1.0,
            vec![
                LabelConfig::linear("jawOpen", 1.0),
                LabelConfig::constant("tongueOut", 0.5),
            ],
        )
        .unwrap();
        assert_eq!(interval.display_labels(), "jawOpen+tongueOut");
        assert!(interval.has_label("tongueOut"));
        assert!(!interval.has_label("cheekPuff"));
        assert!((interval.duration() - 1.0).abs() < 1e-12);
    }
}

//! Stats report types and terminal formatting.
//!
//! These records are rendered as text (Display), serialized into project
//! files and printed as JSON by the CLI.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Statistics over every interval in a store.
///
/// The empty store produces `StoreStatistics::default()`: all counts,
/// averages and percentages are zero.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreStatistics {
    /// Number of intervals.
    pub total_count: usize,
    /// Sum of interval durations in seconds.
    pub total_duration: f64,
    /// Mean interval duration in seconds.
    pub average_duration: f64,
    /// Per-label usage, keyed by label id.
    pub labels: BTreeMap<String, LabelUsage>,
    pub multi_label_stats: MultiLabelStats,
    pub progression_stats: ProgressionStats,
}

/// Usage of one label across the store.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelUsage {
    /// Intervals carrying the label.
    pub count: usize,
    /// Total duration of those intervals.
    pub duration: f64,
    pub avg_intensity: f64,
    pub linear_count: usize,
    pub constant_count: usize,
}

/// How many labels intervals carry.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MultiLabelStats {
    pub single_label_count: usize,
    pub multi_label_count: usize,
    pub max_labels_per_annotation: usize,
    pub total_labels: usize,
    pub avg_labels_per_annotation: f64,
}

/// Label configs by progression type.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressionStats {
    pub linear_count: usize,
    pub constant_count: usize,
    pub linear_percentage: f64,
    pub constant_percentage: f64,
}

/// Used labels split by category.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelGrouping {
    pub tongue_actions: Vec<String>,
    pub other_actions: Vec<String>,
    pub all_actions: Vec<String>,
}

impl fmt::Display for StoreStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Annotation statistics")?;
        writeln!(f, "  intervals:        {}", self.total_count)?;
        writeln!(f, "  total duration:   {:.2}s", self.total_duration)?;
        writeln!(f, "  average duration: {:.2}s", self.average_duration)?;
        writeln!(f)?;

        let m = &self.multi_label_stats;
        writeln!(
            f,
            "  single-label: {}, multi-label: {}, max labels per interval: {}",
            m.single_label_count, m.multi_label_count, m.max_labels_per_annotation
        )?;

        let p = &self.progression_stats;
        writeln!(
            f,
            "  linear: {} ({:.1}%), constant: {} ({:.1}%)",
            p.linear_count, p.linear_percentage, p.constant_count, p.constant_percentage
        )?;

        if self.labels.is_empty() {
            return Ok(());
        }

        writeln!(f)?;
        writeln!(f, "  {:<22} {:>6} {:>10} {:>9}", "label", "count", "duration", "avg int.")?;
        for (label, usage) in &self.labels {
            writeln!(
                f,
                "  {:<22} {:>6} {:>9.2}s {:>9.3}",
                label, usage.count, usage.duration, usage.avg_intensity
            )?;
        }

        Ok(())
    }
}

//! Export statistics and the end-of-run summary.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Number of trailing errors shown in the summary.
const SUMMARY_ERRORS: usize = 5;

/// What happened to one interval.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IntervalStatus {
    /// Every frame was written.
    Completed,
    /// Some frames were written.
    Partial,
    /// No frame was written.
    Failed,
    /// Cancellation stopped the interval.
    Cancelled,
}

/// Per-interval result.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct IntervalOutcome {
    pub index: usize,
    pub id: String,
    pub labels: String,
    pub frames_planned: u64,
    pub frames_written: u64,
    pub status: IntervalStatus,
}

/// Label configs seen by the export, by progression type.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ProgressionCounts {
    pub linear_count: usize,
    pub constant_count: usize,
}

/// Single- vs multi-label intervals seen by the export.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MultiLabelCounts {
    pub single_label: usize,
    pub multi_label: usize,
    pub max_labels_per_annotation: usize,
}

/// Counters accumulated by one export run.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ExportStatistics {
    pub exported_images: u64,
    pub exported_labels: u64,
    pub total_annotations: usize,
    /// Frames written per label id, over every catalog label.
    pub label_distribution: BTreeMap<String, u64>,
    pub progression_stats: ProgressionCounts,
    pub multi_label_stats: MultiLabelCounts,
    pub intervals_processed: usize,
    pub intervals_failed: usize,
    pub intervals: Vec<IntervalOutcome>,
    /// Non-fatal errors in the order they happened.
    pub errors: Vec<String>,
    pub cancelled: bool,
    pub output_dir: PathBuf,
}

impl ExportStatistics {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// The most recent errors, oldest first.
    pub fn recent_errors(&self, n: usize) -> &[String] {
        let start = self.errors.len().saturating_sub(n);
        &self.errors[start..]
    }

    /// Path of the manifest for this run.
    pub fn manifest_path(&self) -> PathBuf {
        self.output_dir.join(super::manifest::MANIFEST_FILE)
    }
}

impl fmt::Display for ExportStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.cancelled {
            "Export cancelled"
        } else {
            "Export completed"
        };
        writeln!(f, "{}: {}", status, self.output_dir.display())?;
        writeln!(f, "  images written:      {}", self.exported_images)?;
        writeln!(f, "  label files written: {}", self.exported_labels)?;
        writeln!(
            f,
            "  intervals: {} processed, {} failed, {} total",
            self.intervals_processed, self.intervals_failed, self.total_annotations
        )?;

        if self.errors.is_empty() {
            return Ok(());
        }

        writeln!(f)?;
        writeln!(f, "{} problem(s), most recent:", self.errors.len())?;
        for error in self.recent_errors(SUMMARY_ERRORS) {
            writeln!(f, "  - {}", error)?;
        }
        writeln!(f, "See {} for the full list.", self.manifest_path().display())
    }
}

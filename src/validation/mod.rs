//! Annotation validation for facelabel.
//!
//! This module checks a set of intervals for problems that interactive
//! editing prevents but imported project files can still contain:
//! - Time validity (finite, ordered, inside the video)
//! - Label validity (present, non-empty ids, intensities in range, known)
//! - Store invariants (no overlaps, unique interval ids)
//!
//! Validation never modifies anything; see
//! [`AnnotationStore::optimize`](crate::store::AnnotationStore::optimize)
//! for the fixes that can be applied automatically.

mod report;

pub use report::{IssueCode, IssueContext, Severity, ValidationIssue, ValidationReport};

use std::collections::{HashMap, HashSet};

use crate::catalog::LabelCatalog;
use crate::model::{AnnotationInterval, VideoInfo};

/// Options for validation behavior.
#[derive(Clone, Debug, Default)]
pub struct ValidateOptions {
    /// If true, treat warnings as errors.
    pub strict: bool,
}

/// Validates `intervals` (in store order) and returns every issue found.
pub fn validate_intervals(
    intervals: &[AnnotationInterval],
    video: &VideoInfo,
    catalog: &LabelCatalog,
    _opts: &ValidateOptions,
) -> ValidationReport {
    let mut report = ValidationReport::new();

    let mut seen_ids: HashMap<&str, usize> = HashMap::new();
    for (index, interval) in intervals.iter().enumerate() {
        let context = IssueContext::Interval {
            index,
            id: interval.id.clone(),
        };

        if let Some(first) = seen_ids.get(interval.id.as_str()) {
            report.add(ValidationIssue::error(
                IssueCode::DuplicateIntervalId,
                format!(
                    "Duplicate interval id '{}' (first seen at interval {})",
                    interval.id,
                    first + 1
                ),
                context.clone(),
            ));
        } else {
            seen_ids.insert(&interval.id, index);
        }

        validate_times(interval, video, &context, &mut report);
        validate_labels(index, interval, catalog, &mut report);
    }

    validate_overlaps(intervals, &mut report);

    report
}

/// Time checks for one interval.
fn validate_times(
    interval: &AnnotationInterval,
    video: &VideoInfo,
    context: &IssueContext,
    report: &mut ValidationReport,
) {
    let (start, end) = (interval.start_time, interval.end_time);

    if !start.is_finite() || !end.is_finite() {
        report.add(ValidationIssue::error(
            IssueCode::NonFiniteTime,
            format!("Non-finite time range {}..{}", start, end),
            context.clone(),
        ));
        return;
    }

    if start >= end {
        report.add(ValidationIssue::error(
            IssueCode::InvalidTimeRange,
            format!("Start time {:.3} is not before end time {:.3}", start, end),
            context.clone(),
        ));
    }

    if start < 0.0 {
        report.add(ValidationIssue::warning(
            IssueCode::NegativeStartTime,
            format!("Start time {:.3} is negative", start),
            context.clone(),
        ));
    }

    if video.duration > 0.0 && end > video.duration {
        report.add(ValidationIssue::warning(
            IssueCode::BeyondVideoDuration,
            format!(
                "End time {:.3} is past the video duration {:.3}",
                end, video.duration
            ),
            context.clone(),
        ));
    }
}

/// Label checks for one interval.
fn validate_labels(
    index: usize,
    interval: &AnnotationInterval,
    catalog: &LabelCatalog,
    report: &mut ValidationReport,
) {
    if interval.labels.is_empty() {
        report.add(ValidationIssue::error(
            IssueCode::EmptyLabels,
            "No labels set",
            IssueContext::Interval {
                index,
                id: interval.id.clone(),
            },
        ));
        return;
    }

    let mut seen: HashSet<&str> = HashSet::new();
    for (label_index, config) in interval.labels.iter().enumerate() {
        let context = IssueContext::Label {
            interval: index,
            id: interval.id.clone(),
            label_index,
        };

        if config.label.is_empty() {
            report.add(ValidationIssue::error(
                IssueCode::EmptyLabelId,
                "Empty label id",
                context.clone(),
            ));
        } else {
            if !seen.insert(config.label.as_str()) {
                report.add(ValidationIssue::warning(
                    IssueCode::DuplicateLabel,
                    format!("Label '{}' appears more than once", config.label),
                    context.clone(),
                ));
            }
            if !catalog.contains(config.label.as_str()) {
                report.add(ValidationIssue::warning(
                    IssueCode::UnknownLabel,
                    format!(
                        "Label '{}' is not in the catalog and will not be exported",
                        config.label
                    ),
                    context.clone(),
                ));
            }
        }

        if !(0.0..=1.0).contains(&config.intensity) {
            report.add(ValidationIssue::error(
                IssueCode::IntensityOutOfRange,
                format!("Intensity {} outside 0.0-1.0", config.intensity),
                context,
            ));
        }
    }
}

/// Pairwise overlap check over start-sorted intervals.
fn validate_overlaps(intervals: &[AnnotationInterval], report: &mut ValidationReport) {
    let mut order: Vec<usize> = (0..intervals.len())
        .filter(|&i| intervals[i].start_time.is_finite() && intervals[i].end_time.is_finite())
        .collect();
    order.sort_by(|&a, &b| intervals[a].start_time.total_cmp(&intervals[b].start_time));

    for (pos, &a) in order.iter().enumerate() {
        for &b in &order[pos + 1..] {
            if intervals[b].start_time >= intervals[a].end_time {
                break;
            }
            if intervals[a].overlaps(&intervals[b]) {
                report.add(ValidationIssue::error(
                    IssueCode::OverlappingIntervals,
                    format!(
                        "Overlaps interval {} ({}) at {:.3}..{:.3}",
                        b + 1,
                        intervals[b].id,
                        intervals[b].start_time,
                        intervals[b].end_time
                    ),
                    IssueContext::Interval {
                        index: a,
                        id: intervals[a].id.clone(),
                    },
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LabelConfig, Progression};

    fn interval(id: &str, start: f64, end: f64) -> AnnotationInterval {
        AnnotationInterval {
            id: id.to_string(),
            start_time: start,
            end_time: end,
            labels: vec![LabelConfig::linear("jawOpen", 1.0)],
            color: "#2196F3".into(),
        }
    }

    fn run(intervals: &[AnnotationInterval]) -> ValidationReport {
        validate_intervals(
            intervals,
            &VideoInfo::default(),
            &LabelCatalog::facial_actions(),
            &ValidateOptions::default(),
        )
    }

    #[test]
    fn test_valid_intervals() {
        let report = run(&[interval("a", 0.0, 1.0), interval("b", 1.0, 2.0)]);
        assert!(
            report.is_clean(),
            "Expected no issues, got: {:?}",
            report.issues
        );
    }

    #[test]
    fn test_invalid_time_range() {
        let report = run(&[interval("a", 2.0, 1.0)]);
        assert_eq!(report.error_count(), 1);
        assert!(report.has(IssueCode::InvalidTimeRange));
    }

    #[test]
    fn test_non_finite_time() {
        let report = run(&[interval("a", f64::NAN, 1.0)]);
        assert!(report.has(IssueCode::NonFiniteTime));
        assert!(!report.has(IssueCode::InvalidTimeRange));
    }

    #[test]
    fn test_empty_labels() {
        let mut bad = interval("a", 0.0, 1.0);
        bad.labels.clear();
        let report = run(&[bad]);
        assert_eq!(report.error_count(), 1);
        assert!(report.has(IssueCode::EmptyLabels));
    }

    #[test]
    fn test_empty_label_id_and_intensity() {
        let mut bad = interval("a", 0.0, 1.0);
        bad.labels = vec![LabelConfig {
            label: "".into(),
            intensity: 1.5,
            progression: Progression::Linear,
        }];
        let report = run(&[bad]);
        assert_eq!(report.error_count(), 2);
        assert!(report.has(IssueCode::EmptyLabelId));
        assert!(report.has(IssueCode::IntensityOutOfRange));
    }

    #[test]
    fn test_duplicate_and_unknown_labels_warn() {
        let mut bad = interval("a", 0.0, 1.0);
        bad.labels.push(LabelConfig::constant("jawOpen", 0.5));
        bad.labels.push(LabelConfig::constant("eyeBlinkLeft", 0.5));
        let report = run(&[bad]);
        assert_eq!(report.error_count(), 0);
        assert_eq!(report.warning_count(), 2);
        assert!(report.has(IssueCode::DuplicateLabel));
        assert!(report.has(IssueCode::UnknownLabel));
    }

    #[test]
    fn test_overlap_detected_once() {
        let report = run(&[interval("a", 0.0, 2.0), interval("b", 1.0, 3.0)]);
        assert_eq!(report.error_count(), 1);
        assert!(report.has(IssueCode::OverlappingIntervals));
    }

    #[test]
    fn test_duplicate_interval_id() {
        let report = run(&[interval("a", 0.0, 1.0), interval("a", 5.0, 6.0)]);
        assert!(report.has(IssueCode::DuplicateIntervalId));
    }

    #[test]
    fn test_beyond_video_duration() {
        let video = VideoInfo::default().with_geometry(10.0, 640, 480);
        let report = validate_intervals(
            &[interval("a", 9.0, 11.0)],
            &video,
            &LabelCatalog::facial_actions(),
            &ValidateOptions::default(),
        );
        assert_eq!(report.warning_count(), 1);
        assert!(report.has(IssueCode::BeyondVideoDuration));
    }
}

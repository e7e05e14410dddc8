//! Annotation statistics.
//!
//! This module summarizes a set of intervals into a [`StoreStatistics`]
//! record and groups the labels in use by category.

mod report;

pub use report::{LabelGrouping, LabelUsage, MultiLabelStats, ProgressionStats, StoreStatistics};

use std::collections::{BTreeMap, BTreeSet};

use crate::catalog::LabelCatalog;
use crate::model::{AnnotationInterval, Progression};

/// Computes statistics for `intervals`.
pub fn compute_statistics(intervals: &[AnnotationInterval]) -> StoreStatistics {
    if intervals.is_empty() {
        return StoreStatistics::default();
    }

    let count = intervals.len();
    let total_duration: f64 = intervals.iter().map(AnnotationInterval::duration).sum();

    let mut labels: BTreeMap<String, LabelUsage> = BTreeMap::new();
    let mut multi = MultiLabelStats::default();
    let mut progression = ProgressionStats::default();

    for interval in intervals {
        let label_count = interval.labels.len();
        multi.total_labels += label_count;
        multi.max_labels_per_annotation = multi.max_labels_per_annotation.max(label_count);
        if label_count == 1 {
            multi.single_label_count += 1;
        } else {
            multi.multi_label_count += 1;
        }

        for config in &interval.labels {
            let usage = labels.entry(config.label.0.clone()).or_default();
            usage.count += 1;
            usage.duration += interval.duration();
            usage.avg_intensity += config.intensity;

            match config.progression {
                Progression::Linear => {
                    progression.linear_count += 1;
                    usage.linear_count += 1;
                }
                Progression::Constant => {
                    progression.constant_count += 1;
                    usage.constant_count += 1;
                }
            }
        }
    }

    for usage in labels.values_mut() {
        if usage.count > 0 {
            usage.avg_intensity /= usage.count as f64;
        }
    }

    multi.avg_labels_per_annotation = multi.total_labels as f64 / count as f64;
    if multi.total_labels > 0 {
        let total = multi.total_labels as f64;
        progression.linear_percentage = progression.linear_count as f64 / total * 100.0;
        progression.constant_percentage = progression.constant_count as f64 / total * 100.0;
    }

    StoreStatistics {
        total_count: count,
        total_duration,
        average_duration: total_duration / count as f64,
        labels,
        multi_label_stats: multi,
        progression_stats: progression,
    }
}

/// Groups the distinct labels used by `intervals` into tongue and other
/// actions, each sorted.
pub fn group_labels(intervals: &[AnnotationInterval], catalog: &LabelCatalog) -> LabelGrouping {
    let used: BTreeSet<&str> = intervals
        .iter()
        .flat_map(|i| i.labels.iter().map(|c| c.label.as_str()))
        .collect();

    let (tongue, other): (Vec<&str>, Vec<&str>) = used
        .iter()
        .copied()
        .partition(|label| catalog.is_tongue_category(label));

    LabelGrouping {
        tongue_actions: tongue.into_iter().map(String::from).collect(),
        other_actions: other.into_iter().map(String::from).collect(),
        all_actions: used.into_iter().map(String::from).collect(),
    }
}

//! The annotation interval store.
//!
//! An [`AnnotationStore`] owns the intervals of one video, kept sorted by
//! start time. It guarantees that no two intervals overlap under the
//! half-open test (an interval ending at 2.0 and one starting at 2.0 may
//! coexist) and that interval ids are unique. Every successful mutation
//! marks the store dirty; saving or loading clears the flag.
//!
//! The store is single-owner and not synchronized. Export borrows it
//! immutably, which keeps edits from racing an export in progress.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::catalog::LabelCatalog;
use crate::model::{clamp_intensity, AnnotationInterval, VideoInfo};
use crate::stats::{self, LabelGrouping, StoreStatistics};
use crate::validation::{self, ValidateOptions, ValidationReport};

/// Why the store refused a mutation. The store is unchanged in every case.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum Rejected {
    #[error("interval '{candidate}' overlaps existing interval '{existing}' ({start:.3}..{end:.3})")]
    Overlap {
        candidate: String,
        existing: String,
        start: f64,
        end: f64,
    },

    #[error("an interval with id '{0}' already exists")]
    DuplicateId(String),

    #[error("no interval with id '{0}'")]
    NotFound(String),
}

/// Ordered, non-overlapping collection of annotation intervals for one video.
#[derive(Clone, Debug, Default)]
pub struct AnnotationStore {
    intervals: Vec<AnnotationInterval>,
    video_info: VideoInfo,
    dirty: bool,
    project_path: Option<PathBuf>,
}

impl AnnotationStore {
    /// Creates an empty, clean store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty, clean store for `video_info`.
    pub fn with_video(video_info: VideoInfo) -> Self {
        Self {
            video_info,
            ..Default::default()
        }
    }

    /// Intervals in start-time order.
    pub fn intervals(&self) -> &[AnnotationInterval] {
        &self.intervals
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    pub fn video_info(&self) -> &VideoInfo {
        &self.video_info
    }

    /// Replaces the video metadata and marks the store dirty.
    pub fn set_video_info(&mut self, video_info: VideoInfo) {
        self.video_info = video_info;
        self.dirty = true;
    }

    /// Looks an interval up by id.
    pub fn get(&self, id: &str) -> Option<&AnnotationInterval> {
        self.intervals.iter().find(|i| i.id == id)
    }

    /// Returns true if there are unsaved mutations.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Clears the dirty flag after a successful save or load.
    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }

    /// Path of the project file this store was last loaded from or saved to.
    pub fn project_path(&self) -> Option<&Path> {
        self.project_path.as_deref()
    }

    pub fn set_project_path(&mut self, path: impl Into<PathBuf>) {
        self.project_path = Some(path.into());
    }

    /// First member overlapping `candidate`, skipping the member with id
    /// `exclude`.
    pub fn find_overlap(
        &self,
        candidate: &AnnotationInterval,
        exclude: Option<&str>,
    ) -> Option<&AnnotationInterval> {
        self.intervals
            .iter()
            .filter(|existing| Some(existing.id.as_str()) != exclude)
            .find(|existing| existing.overlaps(candidate))
    }

    /// Inserts `interval`, keeping start-time order.
    ///
    /// Rejected if it overlaps a member or reuses a member's id.
    pub fn add(&mut self, interval: AnnotationInterval) -> Result<(), Rejected> {
        if self.get(&interval.id).is_some() {
            return Err(Rejected::DuplicateId(interval.id));
        }
        if let Some(existing) = self.find_overlap(&interval, None) {
            return Err(overlap(&interval, existing));
        }

        debug!(id = %interval.id, start = interval.start_time, end = interval.end_time, "interval added");
        self.intervals.push(interval);
        self.sort();
        self.dirty = true;
        Ok(())
    }

    /// Replaces the interval `old_id` with `interval`.
    ///
    /// The overlap check ignores the interval being replaced. The new
    /// interval may carry a different id as long as no other member uses it.
    pub fn update(&mut self, old_id: &str, interval: AnnotationInterval) -> Result<(), Rejected> {
        let position = self
            .intervals
            .iter()
            .position(|i| i.id == old_id)
            .ok_or_else(|| Rejected::NotFound(old_id.to_string()))?;

        if interval.id != old_id && self.get(&interval.id).is_some() {
            return Err(Rejected::DuplicateId(interval.id));
        }
        if let Some(existing) = self.find_overlap(&interval, Some(old_id)) {
            return Err(overlap(&interval, existing));
        }

        debug!(old = old_id, new = %interval.id, "interval updated");
        self.intervals[position] = interval;
        self.sort();
        self.dirty = true;
        Ok(())
    }

    /// Removes the interval `id`. Returns false if there was none.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.intervals.len();
        self.intervals.retain(|i| i.id != id);
        let removed = self.intervals.len() != before;
        if removed {
            self.dirty = true;
        }
        removed
    }

    /// Removes every interval.
    pub fn clear(&mut self) {
        self.intervals.clear();
        self.dirty = true;
    }

    /// Intervals with `start <= time <= end`.
    pub fn query_at_time(&self, time: f64) -> Vec<&AnnotationInterval> {
        self.intervals
            .iter()
            .filter(|i| i.contains_time(time))
            .collect()
    }

    /// Intervals intersecting the closed range `[from, to]`.
    pub fn query_range(&self, from: f64, to: f64) -> Vec<&AnnotationInterval> {
        self.intervals
            .iter()
            .filter(|i| i.intersects_range(from, to))
            .collect()
    }

    /// Reports problems in the stored intervals.
    pub fn validate(&self, catalog: &LabelCatalog) -> ValidationReport {
        self.validate_with(catalog, &ValidateOptions::default())
    }

    pub fn validate_with(&self, catalog: &LabelCatalog, opts: &ValidateOptions) -> ValidationReport {
        validation::validate_intervals(&self.intervals, &self.video_info, catalog, opts)
    }

    /// Drops repeated labels (keeping the first occurrence) and re-clamps
    /// intensities. Returns the number of corrections made.
    pub fn optimize(&mut self) -> usize {
        let mut corrections = 0;

        for interval in &mut self.intervals {
            let mut seen = HashSet::new();
            let before = interval.labels.len();
            interval.labels.retain(|c| seen.insert(c.label.clone()));
            corrections += before - interval.labels.len();

            for config in &mut interval.labels {
                let clamped = clamp_intensity(config.intensity);
                // NaN != NaN, so a NaN intensity counts as a correction too.
                if clamped != config.intensity {
                    config.intensity = clamped;
                    corrections += 1;
                }
            }
        }

        if corrections > 0 {
            debug!(corrections, "store optimized");
            self.dirty = true;
        }
        corrections
    }

    /// Summary statistics over the stored intervals.
    pub fn statistics(&self) -> StoreStatistics {
        stats::compute_statistics(&self.intervals)
    }

    /// Labels in use, grouped by category.
    pub fn label_grouping(&self, catalog: &LabelCatalog) -> LabelGrouping {
        stats::group_labels(&self.intervals, catalog)
    }

    fn sort(&mut self) {
        self.intervals
            .sort_by(|a, b| a.start_time.total_cmp(&b.start_time));
    }
}

fn overlap(candidate: &AnnotationInterval, existing: &AnnotationInterval) -> Rejected {
    Rejected::Overlap {
        candidate: candidate.id.clone(),
        existing: existing.id.clone(),
        start: existing.start_time,
        end: existing.end_time,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LabelConfig, Progression};

    fn interval(id: &str, start: f64, end: f64) -> AnnotationInterval {
        AnnotationInterval::new(start, end, vec![LabelConfig::linear("jawOpen", 1.0)])
            .unwrap()
            .with_id(id)
    }

    #[test]
    fn test_add_keeps_start_order_and_marks_dirty() {
        let mut store = AnnotationStore::new();
        assert!(!store.is_dirty());

        store.add(interval("b", 5.0, 6.0)).unwrap();
        store.add(interval("a", 1.0, 2.0)).unwrap();

        let ids: Vec<_> = store.intervals().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert!(store.is_dirty());
    }

    #[test]
    fn test_touching_intervals_are_accepted() {
        let mut store = AnnotationStore::new();
        store.add(interval("a", 0.0, 1.0)).unwrap();
        store.add(interval("b", 1.0, 2.0)).unwrap();
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_overlap_is_rejected_without_side_effects() {
        let mut store = AnnotationStore::new();
        store.add(interval("a", 0.0, 2.0)).unwrap();
        store.mark_saved();

        let err = store.add(interval("b", 1.5, 3.0)).unwrap_err();
        assert!(matches!(err, Rejected::Overlap { ref existing, .. } if existing == "a"));
        assert_eq!(store.len(), 1);
        assert!(!store.is_dirty());
    }

    #[test]
    fn test_duplicate_id_is_rejected() {
        let mut store = AnnotationStore::new();
        store.add(interval("a", 0.0, 1.0)).unwrap();
        assert_eq!(
            store.add(interval("a", 5.0, 6.0)),
            Err(Rejected::DuplicateId("a".into()))
        );
    }

    #[test]
    fn test_update_excludes_itself_from_overlap_check() {
        let mut store = AnnotationStore::new();
        store.add(interval("a", 0.0, 2.0)).unwrap();
        store.add(interval("b", 3.0, 4.0)).unwrap();

        // Growing "a" within its own footprint plus free space is fine.
        store.update("a", interval("a", 0.5, 3.0)).unwrap();
        assert_eq!(store.get("a").unwrap().end_time, 3.0);

        // Growing it into "b" is not.
        assert!(matches!(
            store.update("a", interval("a", 0.5, 3.5)),
            Err(Rejected::Overlap { .. })
        ));
        assert_eq!(
            store.update("zzz", interval("zzz", 10.0, 11.0)),
            Err(Rejected::NotFound("zzz".into()))
        );
        assert_eq!(
            store.update("a", interval("b", 10.0, 11.0)),
            Err(Rejected::DuplicateId("b".into()))
        );
    }

    #[test]
    fn test_update_resorts() {
        let mut store = AnnotationStore::new();
        store.add(interval("a", 0.0, 1.0)).unwrap();
        store.add(interval("b", 3.0, 4.0)).unwrap();
        store.update("a", interval("a", 5.0, 6.0)).unwrap();
        assert_eq!(store.intervals()[0].id, "b");
    }

    #[test]
    fn test_remove_and_clear() {
        let mut store = AnnotationStore::new();
        store.add(interval("a", 0.0, 1.0)).unwrap();
        store.mark_saved();

        assert!(!store.remove("missing"));
        assert!(!store.is_dirty());
        assert!(store.remove("a"));
        assert!(store.is_dirty());

        store.add(interval("b", 0.0, 1.0)).unwrap();
        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn test_queries() {
        let mut store = AnnotationStore::new();
        store.add(interval("a", 0.0, 1.0)).unwrap();
        store.add(interval("b", 1.0, 2.0)).unwrap();
        store.add(interval("c", 5.0, 6.0)).unwrap();

        let at_one: Vec<_> = store.query_at_time(1.0).iter().map(|i| i.id.clone()).collect();
        assert_eq!(at_one, vec!["a", "b"]);
        assert!(store.query_at_time(3.0).is_empty());

        let range: Vec<_> = store.query_range(2.0, 5.0).iter().map(|i| i.id.clone()).collect();
        assert_eq!(range, vec!["b", "c"]);
    }

    #[test]
    fn test_optimize_dedupes_and_clamps() {
        let mut store = AnnotationStore::new();
        let mut raw = interval("a", 0.0, 1.0);
        raw.labels = vec![
            LabelConfig::linear("jawOpen", 0.5),
            LabelConfig::constant("jawOpen", 0.9),
            LabelConfig {
                label: "cheekPuff".into(),
                intensity: 1.4,
                progression: Progression::Constant,
            },
        ];
        store.add(raw).unwrap();
        store.mark_saved();

        assert_eq!(store.optimize(), 2);
        let labels = &store.get("a").unwrap().labels;
        assert_eq!(labels.len(), 2);
        assert_eq!(labels[0].intensity, 0.5);
        assert_eq!(labels[1].intensity, 1.0);
        assert!(store.is_dirty());

        store.mark_saved();
        assert_eq!(store.optimize(), 0);
        assert!(!store.is_dirty());
    }

    #[test]
    fn test_statistics_delegate() {
        let store = AnnotationStore::new();
        assert_eq!(store.statistics(), StoreStatistics::default());
    }

    #[test]
    fn test_validate_delegates() {
        let mut store = AnnotationStore::new();
        store.add(interval("a", 0.0, 1.0)).unwrap();
        assert!(store.validate(&LabelCatalog::facial_actions()).is_clean());
    }
}

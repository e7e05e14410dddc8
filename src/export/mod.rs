//! Per-frame dataset export.
//!
//! The [`Exporter`] walks the annotation intervals in order, maps each onto
//! its video frames, and for every frame writes the decoded image plus a
//! label file holding the encoded label vector. The output layout is:
//!
//! ```text
//! <output_dir>/
//!   images/<base>_frame_NNNN.<ext>
//!   labels/<base>_frame_NNNN.txt
//!   dataset_info.json
//! ```
//!
//! Only problems that make the whole job impossible (output directories
//! that cannot be created or written, no usable frame rate) are returned
//! as errors, and they are detected before any frame is touched. Anything
//! that goes wrong for a single frame or interval is recorded in
//! [`ExportStatistics::errors`] and the export moves on.
//!
//! Export is cooperative and single threaded. The progress callback runs
//! between intervals and every `checkpoint_every` frames; returning `false`
//! from it, or setting the [`Exporter::cancel_handle`] flag, stops the run
//! at the next frame boundary. A cancelled run still writes its manifest
//! and returns `Ok` with `cancelled` set.

mod manifest;
mod report;
mod source;
mod writer;

pub use manifest::{write_manifest, DatasetManifest, MANIFEST_FILE};
pub use report::{
    ExportStatistics, IntervalOutcome, IntervalStatus, MultiLabelCounts, ProgressionCounts,
};
pub use source::{DecodeError, Frame, FrameSource, ImageSequenceSource};
pub use writer::{
    EncodedImageWriter, ImageFormat, ImageWriter, LabelWriter, TextLabelWriter,
};

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::catalog::LabelCatalog;
use crate::encode::encode;
use crate::error::FacelabelError;
use crate::model::{AnnotationInterval, Progression};
use crate::timing::FrameSpan;

/// Knobs for one export run.
#[derive(Clone, Debug)]
pub struct ExportOptions {
    /// Root of the dataset; `images/` and `labels/` are created below it.
    pub output_dir: PathBuf,
    pub image_format: ImageFormat,
    /// Encoder quality, 1-100.
    pub quality: u8,
    /// Frames between progress checkpoints within an interval.
    pub checkpoint_every: u64,
    /// Upper bound on the length of generated file base names.
    pub max_base_name_len: usize,
    /// Frame rate to use when the source does not report a usable one.
    pub fallback_fps: Option<f64>,
    /// Overrides the source description recorded in the manifest.
    pub source_video: Option<String>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("dataset"),
            image_format: ImageFormat::Jpeg,
            quality: 95,
            checkpoint_every: 10,
            max_base_name_len: 60,
            fallback_fps: None,
            source_video: None,
        }
    }
}

/// Where in the run a progress report comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportStage {
    Preparing,
    /// About to start interval `index` of `total`.
    Interval { index: usize, total: usize },
    /// Inside interval `index`, after writing `frame_offset`.
    Checkpoint { index: usize, frame_offset: u64 },
    WritingManifest,
    Finished,
}

/// A progress report passed to the export callback.
#[derive(Clone, Debug, PartialEq)]
pub struct ExportProgress {
    /// Overall completion, 0-100.
    pub percent: u8,
    pub message: String,
    pub stage: ExportStage,
}

/// Drives a dataset export.
pub struct Exporter<'c> {
    catalog: &'c LabelCatalog,
    options: ExportOptions,
    image_writer: Box<dyn ImageWriter>,
    label_writer: Box<dyn LabelWriter>,
    cancel: Arc<AtomicBool>,
}

impl<'c> Exporter<'c> {
    /// Creates an exporter with the default writers for `options`.
    pub fn new(catalog: &'c LabelCatalog, options: ExportOptions) -> Self {
        let image_writer = EncodedImageWriter::new(options.image_format);
        Self {
            catalog,
            options,
            image_writer: Box::new(image_writer),
            label_writer: Box::new(TextLabelWriter),
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Replaces the image writer.
    pub fn with_image_writer(mut self, writer: impl ImageWriter + 'static) -> Self {
        self.image_writer = Box::new(writer);
        self
    }

    /// Replaces the label writer.
    pub fn with_label_writer(mut self, writer: impl LabelWriter + 'static) -> Self {
        self.label_writer = Box::new(writer);
        self
    }

    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    /// Flag that cancels the running export when set. It is cleared when
    /// an export starts.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }

    /// Sends a progress report; a `false` reply cancels the run.
    fn report(
        &self,
        callback: &mut dyn FnMut(&ExportProgress) -> bool,
        percent: u8,
        message: String,
        stage: ExportStage,
    ) -> bool {
        let keep_going = callback(&ExportProgress {
            percent,
            message,
            stage,
        });
        if !keep_going {
            debug!(?stage, "export cancelled by progress callback");
            self.cancel.store(true, Ordering::Relaxed);
        }
        keep_going
    }

    /// Exports `intervals` using frames from `source`.
    ///
    /// # Errors
    /// Returns an error only when the output directories cannot be
    /// prepared or no usable frame rate is available. Cancelling before
    /// the output directories are created returns empty statistics and
    /// writes nothing.
    ///
    /// The 95% `WritingManifest` report is still a cancellation point. A
    /// `false` reply there marks the run cancelled (in the statistics and
    /// the manifest) even when every interval was already written.
    pub fn export(
        &mut self,
        source: &mut dyn FrameSource,
        intervals: &[AnnotationInterval],
        progress: &mut dyn FnMut(&ExportProgress) -> bool,
    ) -> Result<ExportStatistics, FacelabelError> {
        self.cancel.store(false, Ordering::Relaxed);

        let mut stats = ExportStatistics {
            total_annotations: intervals.len(),
            label_distribution: self
                .catalog
                .entries()
                .iter()
                .map(|e| (e.id.to_string(), 0))
                .collect(),
            output_dir: self.options.output_dir.clone(),
            ..Default::default()
        };

        if !self.report(
            progress,
            0,
            "Creating output directories".into(),
            ExportStage::Preparing,
        ) {
            stats.cancelled = true;
            return Ok(stats);
        }

        let (images_dir, labels_dir) = prepare_output(&self.options.output_dir)?;
        let fps = self.resolve_fps(source)?;
        info!(
            output = %self.options.output_dir.display(),
            intervals = intervals.len(),
            fps,
            "export started"
        );

        let total = intervals.len();
        if self.report(
            progress,
            5,
            format!("Processing {} annotation(s)", total),
            ExportStage::Preparing,
        ) {
            for (index, interval) in intervals.iter().enumerate() {
                if self.is_cancelled() {
                    break;
                }
                let percent = 5 + (90 * index / total) as u8;
                let message = format!(
                    "Annotation {}/{}: {} label(s)",
                    index + 1,
                    total,
                    interval.labels.len()
                );
                if !self.report(progress, percent, message, ExportStage::Interval { index, total }) {
                    break;
                }

                count_labels(interval, &mut stats);
                let outcome = self.export_interval(
                    source,
                    index,
                    interval,
                    fps,
                    (&images_dir, &labels_dir),
                    progress,
                    &mut stats,
                );
                stats.intervals_processed += 1;
                if outcome.status == IntervalStatus::Failed {
                    stats.intervals_failed += 1;
                }
                stats.intervals.push(outcome);
            }
        }

        // A cancelled run still gets its manifest.
        self.report(
            progress,
            95,
            "Writing dataset manifest".into(),
            ExportStage::WritingManifest,
        );
        stats.cancelled = self.is_cancelled();

        let source_video = self
            .options
            .source_video
            .clone()
            .unwrap_or_else(|| source.describe());
        let manifest_path = self.options.output_dir.join(MANIFEST_FILE);
        let manifest = DatasetManifest::new(self.catalog, source_video, &stats);
        if let Err(e) = write_manifest(&manifest_path, &manifest) {
            record_error(&mut stats, format!("Failed to write manifest: {e}"));
        }

        if !stats.cancelled {
            self.report(progress, 100, "Export finished".into(), ExportStage::Finished);
        }

        info!(
            images = stats.exported_images,
            labels = stats.exported_labels,
            errors = stats.errors.len(),
            cancelled = stats.cancelled,
            "export finished"
        );
        Ok(stats)
    }

    fn resolve_fps(&self, source: &dyn FrameSource) -> Result<f64, FacelabelError> {
        let reported = source.frame_rate();
        if usable_fps(reported) {
            return Ok(reported);
        }
        match self.options.fallback_fps.filter(|f| usable_fps(*f)) {
            Some(fps) => {
                warn!(reported, fallback = fps, "source frame rate unusable, using fallback");
                Ok(fps)
            }
            None => Err(FacelabelError::FrameRate(reported)),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn export_interval(
        &mut self,
        source: &mut dyn FrameSource,
        index: usize,
        interval: &AnnotationInterval,
        fps: f64,
        (images_dir, labels_dir): (&Path, &Path),
        progress: &mut dyn FnMut(&ExportProgress) -> bool,
        stats: &mut ExportStatistics,
    ) -> IntervalOutcome {
        let mut outcome = IntervalOutcome {
            index,
            id: interval.id.clone(),
            labels: interval.display_labels(),
            frames_planned: 0,
            frames_written: 0,
            status: IntervalStatus::Failed,
        };

        let span = match FrameSpan::from_times(interval.start_time, interval.end_time, fps) {
            Ok(span) => span,
            Err(e) => {
                record_error(
                    stats,
                    format!("Annotation {} ({}): {}", index + 1, outcome.labels, e),
                );
                return outcome;
            }
        };
        outcome.frames_planned = span.total_frames;

        let base = base_name(
            interval,
            index,
            Utc::now().timestamp_millis(),
            self.options.max_base_name_len,
        );
        debug!(
            index,
            base = %base,
            start_frame = span.start_frame,
            end_frame = span.end_frame,
            "exporting interval"
        );

        let checkpoint_every = self.options.checkpoint_every.max(1);
        let mut interrupted = false;
        for (offset, frame_index, frame_progress) in span.frames() {
            if self.is_cancelled() {
                interrupted = true;
                break;
            }

            let frame_name = format!("{}_frame_{:04}", base, offset);
            match source.seek_and_decode(frame_index) {
                Ok(frame) => {
                    let vector = encode(&interval.labels, frame_progress, self.catalog);

                    let image_path = images_dir
                        .join(format!("{}.{}", frame_name, self.options.image_format.extension()));
                    match self.image_writer.write(&image_path, &frame, self.options.quality) {
                        Ok(()) => {
                            stats.exported_images += 1;
                            outcome.frames_written += 1;
                        }
                        Err(e) => record_error(
                            stats,
                            format!("Failed to write image {}: {}", image_path.display(), e),
                        ),
                    }

                    let label_path = labels_dir.join(format!("{}.txt", frame_name));
                    match self.label_writer.write(&label_path, &vector) {
                        Ok(()) => stats.exported_labels += 1,
                        Err(e) => record_error(
                            stats,
                            format!("Failed to write labels {}: {}", label_path.display(), e),
                        ),
                    }
                }
                Err(e) => record_error(stats, format!("Skipped {}: {}", frame_name, e)),
            }

            if offset % checkpoint_every == 0 {
                self.report(
                    progress,
                    5 + (90 * index / stats.total_annotations.max(1)) as u8,
                    format!("Annotation {}: frame {}/{}", index + 1, offset + 1, span.total_frames),
                    ExportStage::Checkpoint {
                        index,
                        frame_offset: offset,
                    },
                );
            }
        }

        for config in &interval.labels {
            *stats
                .label_distribution
                .entry(config.label.to_string())
                .or_default() += outcome.frames_written;
        }

        outcome.status = if interrupted {
            IntervalStatus::Cancelled
        } else if outcome.frames_written == span.total_frames {
            IntervalStatus::Completed
        } else if outcome.frames_written > 0 {
            IntervalStatus::Partial
        } else {
            record_error(
                stats,
                format!(
                    "Annotation {} ({}, {:.3}-{:.3}): no frames written",
                    index + 1,
                    outcome.labels,
                    interval.start_time,
                    interval.end_time
                ),
            );
            IntervalStatus::Failed
        };
        outcome
    }
}

fn usable_fps(fps: f64) -> bool {
    fps.is_finite() && fps > 0.0
}

fn record_error(stats: &mut ExportStatistics, message: String) {
    warn!("{}", message);
    stats.errors.push(message);
}

fn count_labels(interval: &AnnotationInterval, stats: &mut ExportStatistics) {
    let label_count = interval.labels.len();
    let multi = &mut stats.multi_label_stats;
    if label_count == 1 {
        multi.single_label += 1;
    } else {
        multi.multi_label += 1;
    }
    multi.max_labels_per_annotation = multi.max_labels_per_annotation.max(label_count);

    for config in &interval.labels {
        match config.progression {
            Progression::Linear => stats.progression_stats.linear_count += 1,
            Progression::Constant => stats.progression_stats.constant_count += 1,
        }
    }
}

/// Creates `images/` and `labels/` under `root` and checks they accept
/// files.
fn prepare_output(root: &Path) -> Result<(PathBuf, PathBuf), FacelabelError> {
    let images_dir = root.join("images");
    let labels_dir = root.join("labels");

    for dir in [&images_dir, &labels_dir] {
        fs::create_dir_all(dir).map_err(|source| FacelabelError::OutputDir {
            path: dir.clone(),
            source,
        })?;

        let probe = dir.join(".facelabel_write_probe");
        fs::write(&probe, b"probe")
            .and_then(|()| fs::remove_file(&probe))
            .map_err(|source| FacelabelError::OutputDir {
                path: dir.clone(),
                source,
            })?;
    }

    Ok((images_dir, labels_dir))
}

/// File base name for the frames of one interval:
/// `multi_<labels>_<index>_<disambiguator>`.
///
/// The label part is the first three label ids joined by `_`, restricted to
/// ASCII alphanumerics and `_`, and shortened so the whole name fits in
/// `max_len`. The limit is best-effort: the index and disambiguator are
/// never cut and the label part keeps at least one character, so a
/// `max_len` below `multi_` plus the suffix plus one yields a longer name.
pub fn base_name(
    interval: &AnnotationInterval,
    index: usize,
    disambiguator: i64,
    max_len: usize,
) -> String {
    const PREFIX: &str = "multi_";

    let mut label_part: String = interval
        .labels
        .iter()
        .take(3)
        .map(|c| c.label.as_str())
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    if label_part.is_empty() {
        label_part.push_str("facial");
    }

    let suffix = format!("_{:03}_{}", index, disambiguator);
    let room = max_len.saturating_sub(PREFIX.len() + suffix.len()).max(1);
    label_part.truncate(room);

    format!("{PREFIX}{label_part}{suffix}")
}

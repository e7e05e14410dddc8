#![allow(dead_code)]

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use facelabel::encode::LabelVector;
use facelabel::export::{DecodeError, Frame, FrameSource, ImageWriter, LabelWriter};
use facelabel::model::{AnnotationInterval, LabelConfig};

/// In-memory frame source producing solid frames, with optional failures.
pub struct MockFrameSource {
    pub fps: f64,
    pub frame_count: u64,
    pub failing: HashSet<u64>,
    /// Frames returned with a buffer too short for their geometry.
    pub malformed: HashSet<u64>,
    pub decoded: Vec<u64>,
}

impl MockFrameSource {
    pub fn new(fps: f64, frame_count: u64) -> Self {
        Self {
            fps,
            frame_count,
            failing: HashSet::new(),
            malformed: HashSet::new(),
            decoded: Vec::new(),
        }
    }

    pub fn failing_at(mut self, frames: impl IntoIterator<Item = u64>) -> Self {
        self.failing.extend(frames);
        self
    }

    pub fn malformed_at(mut self, frames: impl IntoIterator<Item = u64>) -> Self {
        self.malformed.extend(frames);
        self
    }
}

impl FrameSource for MockFrameSource {
    fn frame_rate(&self) -> f64 {
        self.fps
    }

    fn frame_count(&self) -> Option<u64> {
        Some(self.frame_count)
    }

    fn seek_and_decode(&mut self, frame_index: u64) -> Result<Frame, DecodeError> {
        self.decoded.push(frame_index);
        if frame_index >= self.frame_count {
            return Err(DecodeError::OutOfRange {
                index: frame_index,
                count: self.frame_count,
            });
        }
        if self.failing.contains(&frame_index) {
            return Err(DecodeError::Decode {
                index: frame_index,
                message: "corrupt packet".into(),
            });
        }
        if self.malformed.contains(&frame_index) {
            return Ok(Frame {
                width: 4,
                height: 3,
                data: vec![0; 5],
            });
        }
        let shade = (frame_index % 256) as u8;
        Ok(Frame::solid(4, 3, [shade, shade, shade]))
    }

    fn describe(&self) -> String {
        "mock://video".into()
    }
}

/// Image writer that records paths and fails on chosen calls (1-based).
#[derive(Clone, Default)]
pub struct RecordingImageWriter {
    pub written: Arc<Mutex<Vec<PathBuf>>>,
    pub fail_calls: HashSet<usize>,
    calls: usize,
}

impl RecordingImageWriter {
    pub fn failing_on(calls: impl IntoIterator<Item = usize>) -> Self {
        Self {
            fail_calls: calls.into_iter().collect(),
            ..Default::default()
        }
    }
}

impl ImageWriter for RecordingImageWriter {
    fn write(&mut self, path: &Path, _frame: &Frame, _quality: u8) -> io::Result<()> {
        self.calls += 1;
        if self.fail_calls.contains(&self.calls) {
            return Err(io::Error::new(io::ErrorKind::Other, "disk full"));
        }
        fs::write(path, b"img")?;
        self.written.lock().unwrap().push(path.to_path_buf());
        Ok(())
    }
}

/// Label writer that keeps every vector it was asked to write.
#[derive(Clone, Default)]
pub struct RecordingLabelWriter {
    pub vectors: Arc<Mutex<Vec<(PathBuf, LabelVector)>>>,
}

impl LabelWriter for RecordingLabelWriter {
    fn write(&mut self, path: &Path, vector: &LabelVector) -> io::Result<()> {
        fs::write(path, vector.to_text())?;
        self.vectors
            .lock()
            .unwrap()
            .push((path.to_path_buf(), vector.clone()));
        Ok(())
    }
}

pub fn interval(id: &str, start: f64, end: f64, labels: Vec<LabelConfig>) -> AnnotationInterval {
    AnnotationInterval::new(start, end, labels)
        .expect("valid interval")
        .with_id(id)
}

pub fn count_files(dir: &Path, extension: &str) -> usize {
    fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(Result::ok)
                .filter(|e| e.path().extension().is_some_and(|x| x == extension))
                .count()
        })
        .unwrap_or(0)
}

pub fn read_label_file(path: &Path) -> Vec<f64> {
    fs::read_to_string(path)
        .expect("read label file")
        .lines()
        .map(|l| l.parse().expect("numeric label line"))
        .collect()
}

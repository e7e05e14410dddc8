//! Frame sources: where the exporter gets decoded video frames from.
//!
//! The exporter only needs random access by frame index. A source is a
//! single stateful decoder, so [`FrameSource::seek_and_decode`] takes
//! `&mut self` and calls are strictly sequential.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

use crate::error::FacelabelError;

/// A decoded frame as tightly packed 8-bit RGB.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    /// `width * height * 3` bytes, row major.
    pub data: Vec<u8>,
}

impl Frame {
    /// Wraps RGB data, checking that its length matches the geometry.
    pub fn from_rgb(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        let frame = Self {
            width,
            height,
            data,
        };
        frame.has_rgb_len().then_some(frame)
    }

    /// Byte length an RGB buffer of this geometry must have.
    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * 3
    }

    /// True when `data` holds exactly one RGB triple per pixel.
    pub fn has_rgb_len(&self) -> bool {
        self.data.len() == self.expected_len()
    }

    /// A frame filled with one color.
    pub fn solid(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        let pixels = width as usize * height as usize;
        Self {
            width,
            height,
            data: rgb.repeat(pixels),
        }
    }

    /// True for zero-sized frames, which cannot be encoded.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.data.is_empty()
    }
}

/// A single frame could not be produced. Export skips the frame.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum DecodeError {
    #[error("frame {index} is past the end of the source ({count} frames)")]
    OutOfRange { index: u64, count: u64 },

    #[error("frame {index} could not be decoded: {message}")]
    Decode { index: u64, message: String },

    #[error("frame {0} is empty")]
    Empty(u64),
}

/// Random-access, single-reader source of decoded frames.
pub trait FrameSource {
    /// Frames per second. A non-positive or non-finite value means unknown.
    fn frame_rate(&self) -> f64;

    /// Number of frames, when known.
    fn frame_count(&self) -> Option<u64>;

    /// Seeks to `frame_index` and decodes it.
    fn seek_and_decode(&mut self, frame_index: u64) -> Result<Frame, DecodeError>;

    /// What the frames come from, recorded in the manifest.
    fn describe(&self) -> String {
        String::from("unknown source")
    }
}

const FRAME_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "bmp"];

/// Frames stored as one image file per frame in a directory.
///
/// Files are ordered by file name, so `frame_000001.png`-style names map
/// directly onto frame indices. The frame rate is supplied by the caller
/// since image files do not carry one.
#[derive(Clone, Debug)]
pub struct ImageSequenceSource {
    dir: PathBuf,
    files: Vec<PathBuf>,
    fps: f64,
}

impl ImageSequenceSource {
    /// Lists the frame files in `dir`.
    ///
    /// # Errors
    /// Fails if `dir` is not a readable directory.
    pub fn open(dir: &Path, fps: f64) -> Result<Self, FacelabelError> {
        if !dir.is_dir() {
            return Err(FacelabelError::FrameSourceOpen {
                path: dir.to_path_buf(),
                message: "not a directory".to_string(),
            });
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(dir).follow_links(true).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| FacelabelError::FrameSourceOpen {
                path: dir.to_path_buf(),
                message: e.to_string(),
            })?;
            if entry.file_type().is_file() && has_frame_extension(entry.path()) {
                files.push(entry.into_path());
            }
        }
        files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

        debug!(dir = %dir.display(), frames = files.len(), fps, "image sequence opened");
        Ok(Self {
            dir: dir.to_path_buf(),
            files,
            fps,
        })
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

fn has_frame_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| FRAME_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

impl FrameSource for ImageSequenceSource {
    fn frame_rate(&self) -> f64 {
        self.fps
    }

    fn frame_count(&self) -> Option<u64> {
        Some(self.files.len() as u64)
    }

    fn seek_and_decode(&mut self, frame_index: u64) -> Result<Frame, DecodeError> {
        let path = usize::try_from(frame_index)
            .ok()
            .and_then(|i| self.files.get(i))
            .ok_or(DecodeError::OutOfRange {
                index: frame_index,
                count: self.files.len() as u64,
            })?;

        let rgb = image::open(path)
            .map_err(|e| DecodeError::Decode {
                index: frame_index,
                message: e.to_string(),
            })?
            .to_rgb8();

        let frame = Frame {
            width: rgb.width(),
            height: rgb.height(),
            data: rgb.into_raw(),
        };
        if frame.is_empty() {
            return Err(DecodeError::Empty(frame_index));
        }
        Ok(frame)
    }

    fn describe(&self) -> String {
        self.dir.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn test_frame_geometry_checks() {
        assert!(Frame::from_rgb(2, 2, vec![0; 12]).is_some());
        assert!(Frame::from_rgb(2, 2, vec![0; 11]).is_none());
        assert!(Frame::solid(0, 4, [1, 2, 3]).is_empty());
        assert!(Frame::solid(4, 3, [1, 2, 3]).has_rgb_len());
        assert!(Frame::from_rgb(4, 3, vec![0; 48]).is_none());
        assert!(Frame::from_rgb(2, 2, vec![0; 12]).is_some());
        assert_eq!(Frame::solid(2, 1, [1, 2, 3]).data, vec![1, 2, 3, 1, 2, 3]);
    }

    #[test]
    fn test_image_sequence_orders_by_name() {
        let dir = tempfile::tempdir().unwrap();
        for (name, shade) in [("f_0002.png", 20u8), ("f_0000.png", 0), ("f_0001.png", 10)] {
            RgbImage::from_pixel(3, 2, Rgb([shade, shade, shade]))
                .save(dir.path().join(name))
                .unwrap();
        }
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let mut source = ImageSequenceSource::open(dir.path(), 25.0).unwrap();
        assert_eq!(source.frame_count(), Some(3));
        assert_eq!(source.frame_rate(), 25.0);

        let frame = source.seek_and_decode(1).unwrap();
        assert_eq!((frame.width, frame.height), (3, 2));
        assert_eq!(frame.data[0], 10);

        assert!(matches!(
            source.seek_and_decode(3),
            Err(DecodeError::OutOfRange { index: 3, count: 3 })
        ));
    }

    #[test]
    fn test_corrupt_frame_is_a_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("f_0000.png"), b"not a png").unwrap();

        let mut source = ImageSequenceSource::open(dir.path(), 30.0).unwrap();
        assert!(matches!(
            source.seek_and_decode(0),
            Err(DecodeError::Decode { index: 0, .. })
        ));
    }

    #[test]
    fn test_missing_directory_fails_to_open() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            ImageSequenceSource::open(&dir.path().join("nope"), 30.0),
            Err(FacelabelError::FrameSourceOpen { .. })
        ));
    }
}

//! Output writers for frame images and label vectors.
//!
//! Images are encoded in memory and the bytes written with [`fs::write`],
//! which handles any path the OS accepts (including non-ASCII directory
//! names) without going through an encoder's own file handling.

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;
use std::str::FromStr;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder};

use super::source::Frame;
use crate::encode::LabelVector;
use crate::error::FacelabelError;

/// Encoding used for exported frame images.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ImageFormat {
    #[default]
    Jpeg,
    Png,
}

impl ImageFormat {
    /// File extension, without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Png => "png",
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ImageFormat {
    type Err = FacelabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Ok(ImageFormat::Jpeg),
            "png" => Ok(ImageFormat::Png),
            other => Err(FacelabelError::UnsupportedFormat(format!(
                "image format '{}' (supported: jpg, png)",
                other
            ))),
        }
    }
}

/// Persists one frame image.
pub trait ImageWriter {
    /// Writes `frame` to `path`. `quality` is 1-100 and only affects lossy
    /// formats.
    fn write(&mut self, path: &Path, frame: &Frame, quality: u8) -> io::Result<()>;
}

/// Persists one label vector.
pub trait LabelWriter {
    fn write(&mut self, path: &Path, vector: &LabelVector) -> io::Result<()>;
}

/// Encodes frames with the `image` crate.
#[derive(Clone, Copy, Debug, Default)]
pub struct EncodedImageWriter {
    format: ImageFormat,
}

impl EncodedImageWriter {
    pub fn new(format: ImageFormat) -> Self {
        Self { format }
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    /// Encodes `frame` into a byte buffer.
    pub fn encode(&self, frame: &Frame, quality: u8) -> io::Result<Vec<u8>> {
        if frame.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("cannot encode a {}x{} frame", frame.width, frame.height),
            ));
        }
        if !frame.has_rgb_len() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "frame buffer holds {} bytes, {}x{} RGB needs {}",
                    frame.data.len(),
                    frame.width,
                    frame.height,
                    frame.expected_len()
                ),
            ));
        }

        let mut bytes = Vec::new();
        let result = match self.format {
            ImageFormat::Jpeg => JpegEncoder::new_with_quality(&mut bytes, quality.clamp(1, 100))
                .encode(&frame.data, frame.width, frame.height, ColorType::Rgb8),
            ImageFormat::Png => PngEncoder::new(&mut bytes).write_image(
                &frame.data,
                frame.width,
                frame.height,
                ColorType::Rgb8,
            ),
        };
        result.map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        Ok(bytes)
    }
}

impl ImageWriter for EncodedImageWriter {
    fn write(&mut self, path: &Path, frame: &Frame, quality: u8) -> io::Result<()> {
        let bytes = self.encode(frame, quality)?;
        fs::write(path, bytes)
    }
}

/// Writes one `%.6f` value per line, in catalog order.
#[derive(Clone, Copy, Debug, Default)]
pub struct TextLabelWriter;

impl LabelWriter for TextLabelWriter {
    fn write(&mut self, path: &Path, vector: &LabelVector) -> io::Result<()> {
        fs::write(path, vector.to_text())
    }
}

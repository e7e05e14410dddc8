use serde::{Deserialize, Serialize};

/// Frame rate assumed when a project does not record one.
pub const DEFAULT_FPS: f64 = 30.0;

/// Metadata about the video an annotation store belongs to.
///
/// Every field defaults on its own, so partially filled `video_info`
/// records from older project files still load.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoInfo {
    /// Path of the source video as recorded by the annotator.
    pub file_path: String,
    /// Duration in seconds, 0 when unknown.
    pub duration: f64,
    pub fps: f64,
    pub width: u32,
    pub height: u32,
}

impl Default for VideoInfo {
    fn default() -> Self {
        Self {
            file_path: String::new(),
            duration: 0.0,
            fps: DEFAULT_FPS,
            width: 0,
            height: 0,
        }
    }
}

impl VideoInfo {
    /// Creates video info for a file with known frame rate.
    pub fn new(file_path: impl Into<String>, fps: f64) -> Self {
        Self {
            file_path: file_path.into(),
            fps,
            ..Default::default()
        }
    }

    /// Sets duration and frame size.
    pub fn with_geometry(mut self, duration: f64, width: u32, height: u32) -> Self {
        self.duration = duration;
        self.width = width;
        self.height = height;
        self
    }
}

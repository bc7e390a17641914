//! Decoded video frames and video identifiers.

use std::path::Path;

/// Frames decoded from one video file.
#[derive(Debug, Clone, Default)]
pub struct DecodedVideo {
    /// Frames in presentation order.
    pub frames: Vec<image::RgbImage>,
    /// Frame rate reported by the container.
    pub fps: f32,
}

impl DecodedVideo {
    /// Creates a decoded video.
    #[must_use]
    pub const fn new(frames: Vec<image::RgbImage>, fps: f32) -> Self {
        Self { frames, fps }
    }

    /// Number of decoded frames.
    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}

/// Derives the video identifier from a path: the file name up to its first `.`.
///
/// `uploads/clip.final.mp4` becomes `clip`.
#[must_use]
pub fn video_id(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default();
    name.split('.').next().unwrap_or_default().to_string()
}

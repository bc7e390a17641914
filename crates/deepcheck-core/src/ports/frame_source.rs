//! Frame source port for decoding videos.

use std::path::Path;

use crate::domain::DecodedVideo;
use crate::error::Result;

/// Port for decoding a video file into frames.
pub trait FrameSource: Send + Sync {
    /// Decodes the video at `path`.
    ///
    /// Implementations may cap the number of decoded frames.
    ///
    /// # Errors
    ///
    /// Returns [`crate::DetectError::Input`] if the file cannot be read or decoded.
    fn decode(&self, path: &Path) -> Result<DecodedVideo>;
}

//! Landmark tracker port.

use crate::domain::{DecodedVideo, RawTrack};
use crate::error::Result;

/// Port for turning decoded frames into a per-frame landmark track.
pub trait LandmarkTracker: Send + Sync {
    /// Tracks facial landmarks through `video`.
    ///
    /// `label` identifies the video for logging and lookup. An empty track
    /// signals that no face could be tracked; that is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`crate::DetectError::Input`] only for genuine I/O or decoder faults.
    fn track(&self, video: &DecodedVideo, label: &str) -> Result<RawTrack>;
}

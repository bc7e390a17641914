//! Builders for synthetic landmark tracks.

use deepcheck_core::RawTrack;

/// Builder for synthetic [`RawTrack`]s.
///
/// Tracks default to the 136-value layout of 68 `(x, y)` landmarks.
#[derive(Debug, Clone)]
pub struct TrackBuilder {
    len: usize,
    dim: usize,
    start: f32,
    step: f32,
}

impl Default for TrackBuilder {
    fn default() -> Self {
        Self {
            len: 0,
            dim: 136,
            start: 0.0,
            step: 0.0,
        }
    }
}

impl TrackBuilder {
    /// Creates a builder for an empty 136-dimensional track.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of frames.
    #[must_use]
    pub const fn with_len(mut self, len: usize) -> Self {
        self.len = len;
        self
    }

    /// Sets the feature dimensionality.
    #[must_use]
    pub const fn with_dim(mut self, dim: usize) -> Self {
        self.dim = dim;
        self
    }

    /// Sets the value of every feature in the first frame.
    #[must_use]
    pub const fn with_start(mut self, start: f32) -> Self {
        self.start = start;
        self
    }

    /// Sets how much every feature moves per frame.
    #[must_use]
    pub const fn with_step(mut self, step: f32) -> Self {
        self.step = step;
        self
    }

    /// Builds the track. Frame `i`, feature `d` holds `start + step·i + d/dim`.
    ///
    /// # Panics
    ///
    /// Panics if the dimensionality is zero and the length is not.
    #[must_use]
    #[allow(clippy::cast_precision_loss, clippy::expect_used)]
    pub fn build(self) -> RawTrack {
        let rows: Vec<Vec<f32>> = (0..self.len)
            .map(|i| {
                (0..self.dim)
                    .map(|d| self.step.mul_add(i as f32, self.start) + d as f32 / self.dim as f32)
                    .collect()
            })
            .collect();
        RawTrack::from_rows(&rows).expect("synthetic rows share one dimensionality")
    }

    /// A track whose landmarks drift by `0.01` per frame.
    #[must_use]
    pub fn ramp(len: usize, dim: usize) -> RawTrack {
        Self::new().with_len(len).with_dim(dim).with_step(0.01).build()
    }

    /// A track whose landmarks never move.
    #[must_use]
    pub fn still(len: usize, dim: usize) -> RawTrack {
        Self::new().with_len(len).with_dim(dim).build()
    }

    /// A track with no frames, as produced when no face is found.
    #[must_use]
    pub const fn empty() -> RawTrack {
        RawTrack::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout() {
        let track = TrackBuilder::new().with_len(3).build();
        assert_eq!(track.len(), 3);
        assert_eq!(track.dim(), 136);
    }

    #[test]
    fn test_ramp_moves() {
        let track = TrackBuilder::ramp(2, 2);
        assert!((track.row(1)[0] - track.row(0)[0] - 0.01).abs() < 1e-6);
    }

    #[test]
    fn test_still_does_not_move() {
        let track = TrackBuilder::still(4, 3);
        assert_eq!(track.row(0), track.row(3));
    }

    #[test]
    fn test_empty() {
        assert!(TrackBuilder::empty().is_empty());
    }
}

//! Landmark track produced by a tracker for one video.

use crate::error::{DetectError, Result};

/// Ordered per-frame landmark feature vectors, stored row-major.
///
/// Every row has the same dimensionality `dim`. An empty track means the
/// tracker found no usable face.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTrack {
    dim: usize,
    data: Vec<f32>,
}

impl RawTrack {
    /// Creates an empty track.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            dim: 0,
            data: Vec::new(),
        }
    }

    /// Builds a track from per-frame rows.
    ///
    /// # Errors
    ///
    /// Returns [`DetectError::Input`] if the rows disagree on dimensionality
    /// or a non-empty track has zero-width rows.
    pub fn from_rows<R: AsRef<[f32]>>(rows: &[R]) -> Result<Self> {
        let Some(first) = rows.first() else {
            return Ok(Self::empty());
        };

        let dim = first.as_ref().len();
        if dim == 0 {
            return Err(DetectError::input("landmark rows must not be empty"));
        }

        let mut data = Vec::with_capacity(rows.len() * dim);
        for (i, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != dim {
                return Err(DetectError::input(format!(
                    "landmark row {i} has {} values, expected {dim}",
                    row.len()
                )));
            }
            data.extend_from_slice(row);
        }

        Ok(Self { dim, data })
    }

    /// Number of tracked frames.
    #[must_use]
    pub fn len(&self) -> usize {
        if self.dim == 0 {
            0
        } else {
            self.data.len() / self.dim
        }
    }

    /// Returns true if no frame was tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Feature dimensionality per frame (0 for an empty track).
    #[must_use]
    pub const fn dim(&self) -> usize {
        self.dim
    }

    /// Returns the landmark vector of frame `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= self.len()`.
    #[must_use]
    pub fn row(&self, i: usize) -> &[f32] {
        &self.data[i * self.dim..(i + 1) * self.dim]
    }

    /// Returns the contiguous rows `start..end`.
    #[must_use]
    pub fn rows(&self, start: usize, end: usize) -> &[f32] {
        &self.data[start * self.dim..end * self.dim]
    }

    /// Drops frames beyond `max_len`.
    pub fn truncate(&mut self, max_len: usize) {
        self.data.truncate(max_len * self.dim);
    }
}

impl Default for RawTrack {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rows() {
        let track = RawTrack::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]])
            .unwrap_or_else(|e| panic!("valid rows: {e}"));
        assert_eq!(track.len(), 3);
        assert_eq!(track.dim(), 2);
        assert_eq!(track.row(1), &[3.0, 4.0]);
        assert_eq!(track.rows(1, 3), &[3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_from_no_rows_is_empty() {
        let rows: Vec<Vec<f32>> = vec![];
        let track = RawTrack::from_rows(&rows).unwrap_or_else(|e| panic!("{e}"));
        assert!(track.is_empty());
        assert_eq!(track.len(), 0);
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let result = RawTrack::from_rows(&[vec![1.0, 2.0], vec![3.0]]);
        assert!(matches!(result, Err(DetectError::Input(_))));
    }

    #[test]
    fn test_truncate() {
        let mut track = RawTrack::from_rows(&[[1.0_f32], [2.0], [3.0]])
            .unwrap_or_else(|e| panic!("{e}"));
        track.truncate(2);
        assert_eq!(track.len(), 2);
        track.truncate(10);
        assert_eq!(track.len(), 2);
    }
}

//! Fixed-length landmark windows and the batches fed to the models.

use crate::error::{DetectError, Result};

/// A `rows × dim` block of landmark features, stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Window {
    rows: usize,
    dim: usize,
    data: Vec<f32>,
}

impl Window {
    /// Creates a window from row-major data.
    ///
    /// # Errors
    ///
    /// Returns [`DetectError::Input`] if `data.len() != rows * dim`.
    pub fn new(rows: usize, dim: usize, data: Vec<f32>) -> Result<Self> {
        if data.len() != rows * dim {
            return Err(DetectError::input(format!(
                "window data has {} values, expected {rows}x{dim}",
                data.len()
            )));
        }
        Ok(Self { rows, dim, data })
    }

    /// Number of time steps.
    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Feature dimensionality.
    #[must_use]
    pub const fn dim(&self) -> usize {
        self.dim
    }

    /// `(rows, dim)`.
    #[must_use]
    pub const fn shape(&self) -> (usize, usize) {
        (self.rows, self.dim)
    }

    /// Row `i` of the window.
    #[must_use]
    pub fn row(&self, i: usize) -> &[f32] {
        &self.data[i * self.dim..(i + 1) * self.dim]
    }

    /// Raw row-major values.
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }
}

/// One classification sample: a raw window, its frame-to-frame difference
/// window, and the video it was cut from.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Identifier of the source video.
    pub video: String,
    /// `block × D` landmark window.
    pub window: Window,
    /// `(block - 1) × D` displacement window.
    pub diff: Window,
}

/// A contiguous `N × rows × dim` batch of windows for one model call.
#[derive(Debug, Clone)]
pub struct WindowBatch {
    len: usize,
    rows: usize,
    dim: usize,
    data: Vec<f32>,
}

impl WindowBatch {
    /// Stacks windows of identical shape into one batch.
    ///
    /// # Errors
    ///
    /// Returns [`DetectError::Compute`] if window shapes differ.
    pub fn stack<'a>(windows: impl IntoIterator<Item = &'a Window>) -> Result<Self> {
        let mut iter = windows.into_iter().peekable();
        let (rows, dim) = iter.peek().map_or((0, 0), |w| w.shape());

        let mut data = Vec::new();
        let mut len = 0;
        for w in iter {
            if w.shape() != (rows, dim) {
                return Err(DetectError::compute(format!(
                    "cannot batch window of shape {:?} with {:?}",
                    w.shape(),
                    (rows, dim)
                )));
            }
            data.extend_from_slice(w.as_slice());
            len += 1;
        }

        Ok(Self {
            len,
            rows,
            dim,
            data,
        })
    }

    /// Number of windows in the batch.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the batch holds no windows.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// `(N, rows, dim)`.
    #[must_use]
    pub const fn shape(&self) -> (usize, usize, usize) {
        (self.len, self.rows, self.dim)
    }

    /// Raw values in `N × rows × dim` order.
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }
}

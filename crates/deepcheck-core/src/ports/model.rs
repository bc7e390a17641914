//! Model ports for the two window classifiers.

use crate::domain::WindowBatch;
use crate::error::Result;

/// A trained two-class sequence classifier.
///
/// Index `0` of each returned pair is the "real" probability and index `1`
/// the "fake" probability.
pub trait WindowModel: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Scores every window of `batch` in a single invocation.
    ///
    /// # Errors
    ///
    /// Returns [`crate::DetectError::Compute`] if inference fails.
    fn predict(&self, batch: &WindowBatch) -> Result<Vec<[f32; 2]>>;
}

/// The raw-landmark model (`G1`) and the difference model (`G2`).
pub struct ModelPair {
    /// Scores raw landmark windows.
    pub raw: Box<dyn WindowModel>,
    /// Scores frame-to-frame difference windows.
    pub diff: Box<dyn WindowModel>,
}

impl ModelPair {
    /// Pairs the two models.
    #[must_use]
    pub fn new(raw: Box<dyn WindowModel>, diff: Box<dyn WindowModel>) -> Self {
        Self { raw, diff }
    }
}

impl std::fmt::Debug for ModelPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelPair")
            .field("raw", &self.raw.name())
            .field("diff", &self.diff.name())
            .finish()
    }
}

/// Port for loading the model pair.
pub trait ModelProvider: Send + Sync {
    /// Loads both models.
    ///
    /// # Errors
    ///
    /// Returns [`crate::DetectError::ModelLoad`] if either model cannot be loaded.
    fn load(&self) -> Result<ModelPair>;
}

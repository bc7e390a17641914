//! Error taxonomy for the classification pipeline.
//!
//! "No signal" (an empty landmark track, or a track too short for one window)
//! is deliberately absent: it resolves to an `Unknown` verdict, not an error.

use thiserror::Error;

/// Errors surfaced by a classification call.
#[derive(Debug, Error)]
pub enum DetectError {
    /// The video could not be read, decoded or tracked, or a request
    /// parameter was invalid.
    #[error("input error: {0:#}")]
    Input(anyhow::Error),

    /// Model weights were missing or could not be turned into a model.
    #[error("model load error: {0:#}")]
    ModelLoad(anyhow::Error),

    /// Inference failed (shape mismatch, device failure).
    #[error("compute error: {0:#}")]
    Compute(anyhow::Error),
}

impl DetectError {
    /// Builds an [`DetectError::Input`] from a message.
    pub fn input(msg: impl std::fmt::Display) -> Self {
        Self::Input(anyhow::anyhow!("{msg}"))
    }

    /// Builds a [`DetectError::ModelLoad`] from a message.
    pub fn model_load(msg: impl std::fmt::Display) -> Self {
        Self::ModelLoad(anyhow::anyhow!("{msg}"))
    }

    /// Builds a [`DetectError::Compute`] from a message.
    pub fn compute(msg: impl std::fmt::Display) -> Self {
        Self::Compute(anyhow::anyhow!("{msg}"))
    }
}

impl From<candle_core::Error> for DetectError {
    fn from(e: candle_core::Error) -> Self {
        Self::Compute(e.into())
    }
}

/// Result alias used throughout the core crate.
pub type Result<T> = std::result::Result<T, DetectError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_kind() {
        let e = DetectError::input("no such file");
        assert_eq!(e.to_string(), "input error: no such file");

        let e = DetectError::model_load("g1 missing");
        assert!(e.to_string().starts_with("model load error"));
    }

    #[test]
    fn test_context_chain_is_rendered() {
        let inner = anyhow::anyhow!("permission denied").context("reading clip.mp4");
        let e = DetectError::Input(inner);
        assert_eq!(e.to_string(), "input error: reading clip.mp4: permission denied");
    }

    #[test]
    fn test_candle_error_is_compute() {
        let e: DetectError = candle_core::Error::Msg("shape mismatch".into()).into();
        assert!(matches!(e, DetectError::Compute(_)));
    }
}

//! The classification pipeline.
//!
//! Window Builder → Dual-Model Scorer → Fusion & Aggregation, orchestrated by
//! the [`Classifier`] façade.

mod classifier;
mod fusion;
mod scoring;
mod windowing;

pub use classifier::Classifier;
pub use fusion::{Aggregation, FusionPolicy};
pub use scoring::DualModelScorer;
pub use windowing::build_samples;

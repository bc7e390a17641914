//! Deepcheck Core - Domain logic for deepfake video detection
//!
//! This crate contains the landmark windowing, dual-model scoring and verdict
//! aggregation pipeline, the port traits it runs against, and the Candle
//! implementation of the LRNet landmark classifier.

pub mod domain;
pub mod error;
pub mod inference;
pub mod pipeline;
pub mod ports;

pub use domain::{video_id, DecodedVideo, Label, RawTrack, Sample, VideoVerdict, WindowScore};
pub use error::{DetectError, Result};
pub use pipeline::{build_samples, Aggregation, Classifier, DualModelScorer, FusionPolicy};
pub use ports::{
    FrameSource, LandmarkTracker, ModelPair, ModelProvider, ProgressEvent, ProgressSink,
    ResultOutput, WindowModel,
};

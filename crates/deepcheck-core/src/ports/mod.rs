//! Port definitions for hexagonal architecture.
//!
//! These traits define the boundaries between the classification pipeline and
//! its external collaborators: frame decoding, landmark tracking, the trained
//! models, progress observers and result writers.

mod frame_source;
mod landmark_tracker;
mod model;
mod progress;
mod result_output;

pub use frame_source::FrameSource;
pub use landmark_tracker::LandmarkTracker;
pub use model::{ModelPair, ModelProvider, WindowModel};
pub use progress::{NoopProgress, ProgressEvent, ProgressSink};
pub use result_output::ResultOutput;

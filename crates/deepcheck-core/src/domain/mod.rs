//! Core domain types for landmark-based video classification.

mod track;
mod verdict;
mod video;
mod window;

pub use track::RawTrack;
pub use verdict::{Label, VideoVerdict, WindowScore};
pub use video::{video_id, DecodedVideo};
pub use window::{Sample, Window, WindowBatch};

//! Deepcheck Adapters - External adapters for deepcheck.
//!
//! This crate provides adapters for:
//! - Frame decoding through the `ffmpeg`/`ffprobe` binaries
//! - Precomputed landmark track files
//! - Video discovery on the filesystem
//! - Model downloading and caching

pub mod ffmpeg;
pub mod fs;
pub mod landmarks;
pub mod models;

pub use ffmpeg::FfmpegFrameSource;
pub use fs::collect_videos;
pub use landmarks::LandmarkFileTracker;
pub use models::{model_path, models_dir, set_models_dir};

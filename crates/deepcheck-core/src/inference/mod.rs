//! ML inference using Candle.
//!
//! Provides device selection, safetensors loading and the LRNet landmark
//! sequence classifier used for both the raw-landmark and difference models.

mod device;
mod loader;
mod lrnet;

pub use device::get_device;
pub use loader::load_safetensors;
pub use lrnet::{LrNet, LrNetConfig, SafetensorsModels};

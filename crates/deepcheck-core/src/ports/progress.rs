//! Progress reporting port for observing a classification run.

use crate::domain::VideoVerdict;

/// Events emitted while classifying videos.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Decoding started for a video.
    Started {
        /// Video identifier.
        video: String,
        /// Index in the batch (0-based).
        index: usize,
        /// Total videos in the batch.
        total: usize,
    },
    /// Landmarks were tracked for a video.
    Tracked {
        /// Video identifier.
        video: String,
        /// Number of decoded frames.
        frames: usize,
        /// Length of the landmark track.
        track_len: usize,
        /// Number of windows cut from the track.
        windows: usize,
    },
    /// A video produced no usable windows and will be reported as unknown.
    NoSignal {
        /// Video identifier.
        video: String,
    },
    /// A verdict was produced.
    Scored {
        /// The verdict.
        verdict: VideoVerdict,
    },
    /// All videos have been classified.
    Finished {
        /// Total verdicts produced.
        classified: usize,
        /// Verdicts labelled unknown.
        unknown: usize,
    },
}

/// Port for receiving progress events.
pub trait ProgressSink: Send + Sync {
    /// Called when a progress event occurs.
    fn on_event(&self, event: ProgressEvent);
}

/// Sink that discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProgress;

impl ProgressSink for NoopProgress {
    fn on_event(&self, _event: ProgressEvent) {}
}

//! Classification façade: decode → track → window → score → fuse.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use tracing::{debug, info};

use super::fusion::FusionPolicy;
use super::scoring::DualModelScorer;
use super::windowing::build_samples;
use crate::domain::{video_id, Label, VideoVerdict};
use crate::error::{DetectError, Result};
use crate::ports::{FrameSource, LandmarkTracker, NoopProgress, ProgressEvent, ProgressSink};

/// Classifies videos as real or fake from their facial landmark tracks.
///
/// Holds no per-call state: one instance can serve concurrent requests, all
/// sharing the read-only model weights.
pub struct Classifier {
    frames: Box<dyn FrameSource>,
    tracker: Box<dyn LandmarkTracker>,
    scorer: DualModelScorer,
    policy: FusionPolicy,
    progress: Arc<dyn ProgressSink>,
}

impl Classifier {
    /// Creates a classifier from its collaborators.
    pub fn new(
        frames: impl FrameSource + 'static,
        tracker: impl LandmarkTracker + 'static,
        scorer: DualModelScorer,
    ) -> Self {
        Self {
            frames: Box::new(frames),
            tracker: Box::new(tracker),
            scorer,
            policy: FusionPolicy::default(),
            progress: Arc::new(NoopProgress),
        }
    }

    /// Replaces the fusion policy.
    #[must_use]
    pub fn with_policy(mut self, policy: FusionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Attaches a progress observer.
    #[must_use]
    pub fn with_progress(mut self, progress: Arc<dyn ProgressSink>) -> Self {
        self.progress = progress;
        self
    }

    /// Returns the scorer, e.g. to preload the models.
    #[must_use]
    pub const fn scorer(&self) -> &DualModelScorer {
        &self.scorer
    }

    /// Classifies a single video.
    ///
    /// A video without a trackable face, or too short for one window of
    /// `block` frames, is reported as [`Label::Unknown`] with score `0`
    /// and the models are not loaded for it.
    ///
    /// # Errors
    ///
    /// Returns [`DetectError::Input`] if `block` is zero or the video cannot be
    /// decoded or tracked, [`DetectError::ModelLoad`] if the models cannot be
    /// loaded, and [`DetectError::Compute`] if inference fails.
    pub fn classify(&self, path: impl AsRef<Path>, block: usize) -> Result<VideoVerdict> {
        let path = path.as_ref();
        self.classify_batch(&[path], block)?
            .pop()
            .ok_or_else(|| DetectError::compute("no verdict produced"))
    }

    /// Classifies every video in `dir`.
    ///
    /// Entries are processed in name order; hidden files and subdirectories
    /// are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`DetectError::Input`] if the directory cannot be listed, plus
    /// every error of [`Classifier::classify_batch`].
    pub fn classify_many(
        &self,
        dir: impl AsRef<Path>,
        block: usize,
    ) -> Result<Vec<VideoVerdict>> {
        let videos = list_videos(dir.as_ref()).map_err(DetectError::Input)?;
        self.classify_batch(&videos, block)
    }

    /// Classifies several videos, returning one verdict per path in order.
    ///
    /// Windows from all videos are scored together in one call per model;
    /// each video is still aggregated on its own windows only.
    ///
    /// # Errors
    ///
    /// Fails on the first video that cannot be decoded or tracked, and on
    /// any model loading or inference failure. No partial list is returned.
    pub fn classify_batch<P: AsRef<Path>>(
        &self,
        paths: &[P],
        block: usize,
    ) -> Result<Vec<VideoVerdict>> {
        if block == 0 {
            return Err(DetectError::input("block size must be positive"));
        }

        let total = paths.len();
        let mut videos: Vec<(String, usize)> = Vec::with_capacity(total);
        let mut samples = Vec::new();

        for (index, path) in paths.iter().enumerate() {
            let path = path.as_ref();
            let id = video_id(path);
            self.progress.on_event(ProgressEvent::Started {
                video: id.clone(),
                index,
                total,
            });

            let decoded = self.frames.decode(path)?;
            debug!(
                "{id}: decoded {} frames at {:.2} fps",
                decoded.frame_count(),
                decoded.fps
            );

            let track = self.tracker.track(&decoded, &id)?;
            let video_samples = build_samples(&id, &track, block)?;

            self.progress.on_event(ProgressEvent::Tracked {
                video: id.clone(),
                frames: decoded.frame_count(),
                track_len: track.len(),
                windows: video_samples.len(),
            });

            if video_samples.is_empty() {
                info!(
                    "{id}: no usable windows ({} tracked frames, block {block})",
                    track.len()
                );
                self.progress
                    .on_event(ProgressEvent::NoSignal { video: id.clone() });
            }

            videos.push((id, video_samples.len()));
            samples.extend(video_samples);
        }

        let scores = self.scorer.score(&samples)?;
        if scores.len() != samples.len() {
            return Err(DetectError::compute(format!(
                "{} scores for {} windows",
                scores.len(),
                samples.len()
            )));
        }

        // Scores follow sample order, so each video owns the next `windows` entries.
        let mut rest = scores.as_slice();
        let verdicts: Vec<VideoVerdict> = videos
            .into_iter()
            .map(|(id, windows)| {
                let (own, tail) = rest.split_at(windows);
                rest = tail;
                self.policy
                    .verdict(&id, own)
                    .unwrap_or_else(|| VideoVerdict::unknown(id))
            })
            .collect();

        for verdict in &verdicts {
            info!(
                "{} - label: {}; score: {}",
                verdict.video, verdict.label, verdict.score
            );
            self.progress.on_event(ProgressEvent::Scored {
                verdict: verdict.clone(),
            });
        }

        self.progress.on_event(ProgressEvent::Finished {
            classified: verdicts.len(),
            unknown: verdicts
                .iter()
                .filter(|v| v.label == Label::Unknown)
                .count(),
        });

        Ok(verdicts)
    }
}

/// Lists the regular, non-hidden files of `dir` in name order.
fn list_videos(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory {}", dir.display()))?;

    let mut videos = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("Failed to read entry in {}", dir.display()))?;
        let path = entry.path();
        let hidden = entry.file_name().to_string_lossy().starts_with('.');
        if !hidden && path.is_file() {
            videos.push(path);
        }
    }

    videos.sort();
    Ok(videos)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_list_videos_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.mp4", "a.mp4", ".hidden.mp4"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }
        std::fs::create_dir(dir.path().join("nested")).unwrap();

        let videos = list_videos(dir.path()).unwrap();
        let names: Vec<_> = videos
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["a.mp4", "b.mp4"]);
    }

    #[test]
    fn test_list_missing_directory_fails() {
        assert!(list_videos(Path::new("/nonexistent/videos")).is_err());
    }
}

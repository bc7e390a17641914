//! Mock implementations of core port traits.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use deepcheck_core::domain::{video_id, DecodedVideo, RawTrack, VideoVerdict, WindowBatch};
use deepcheck_core::ports::{
    FrameSource, LandmarkTracker, ModelPair, ModelProvider, ProgressEvent, ProgressSink,
    ResultOutput, WindowModel,
};
use deepcheck_core::{DetectError, Result};

fn bump(counter: &Mutex<usize>) {
    *counter.lock().unwrap_or_else(PoisonError::into_inner) += 1;
}

fn read(counter: &Mutex<usize>) -> usize {
    *counter.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Mock implementation of `FrameSource` for testing.
///
/// Yields a fixed number of blank 1×1 frames for any path and records which
/// videos were decoded.
pub struct MockFrameSource {
    frames: usize,
    fps: f32,
    failing: HashSet<String>,
    decoded: Arc<Mutex<Vec<String>>>,
}

impl MockFrameSource {
    /// Creates a source yielding `frames` frames at 30 fps.
    #[must_use]
    pub fn new(frames: usize) -> Self {
        Self {
            frames,
            fps: 30.0,
            failing: HashSet::new(),
            decoded: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Makes decoding fail for the given video identifier.
    #[must_use]
    pub fn failing_for(mut self, video: &str) -> Self {
        self.failing.insert(video.to_string());
        self
    }

    /// Returns the identifiers of all decoded videos, in call order.
    #[must_use]
    pub fn decoded(&self) -> Vec<String> {
        self.decoded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns a handle to the decode log that outlives the source.
    #[must_use]
    pub fn decode_log(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.decoded)
    }
}

impl FrameSource for MockFrameSource {
    fn decode(&self, path: &Path) -> Result<DecodedVideo> {
        let id = video_id(path);
        if self.failing.contains(&id) {
            return Err(DetectError::input(format!(
                "cannot decode {}",
                path.display()
            )));
        }

        self.decoded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(id);
        Ok(DecodedVideo::new(
            vec![image::RgbImage::new(1, 1); self.frames],
            self.fps,
        ))
    }
}

/// Mock implementation of `LandmarkTracker` for testing.
///
/// Returns a preset track per video label, or an empty track (no face) for
/// unknown labels.
#[derive(Default)]
pub struct MockTracker {
    tracks: HashMap<String, RawTrack>,
    failing: HashSet<String>,
    calls: Arc<Mutex<usize>>,
}

impl MockTracker {
    /// Creates a tracker that finds no face in any video.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the track returned for `label`.
    #[must_use]
    pub fn with_track(mut self, label: &str, track: RawTrack) -> Self {
        self.tracks.insert(label.to_string(), track);
        self
    }

    /// Makes tracking fail for `label`.
    #[must_use]
    pub fn failing_for(mut self, label: &str) -> Self {
        self.failing.insert(label.to_string());
        self
    }

    /// Returns the number of `track()` calls.
    #[must_use]
    pub fn call_count(&self) -> usize {
        read(&self.calls)
    }
}

impl LandmarkTracker for MockTracker {
    fn track(&self, _video: &DecodedVideo, label: &str) -> Result<RawTrack> {
        bump(&self.calls);
        if self.failing.contains(label) {
            return Err(DetectError::input(format!("tracker failed on {label}")));
        }
        Ok(self.tracks.get(label).cloned().unwrap_or_default())
    }
}

/// Model returning the same fake probability for every window.
pub struct FixedModel {
    name: String,
    fake: f32,
    calls: Arc<Mutex<usize>>,
}

impl FixedModel {
    /// Creates a model that always predicts `fake`.
    #[must_use]
    pub fn new(name: &str, fake: f32) -> Self {
        Self {
            name: name.to_string(),
            fake,
            calls: Arc::new(Mutex::new(0)),
        }
    }

    fn with_counter(mut self, calls: Arc<Mutex<usize>>) -> Self {
        self.calls = calls;
        self
    }
}

impl WindowModel for FixedModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn predict(&self, batch: &WindowBatch) -> Result<Vec<[f32; 2]>> {
        bump(&self.calls);
        Ok(vec![[1.0 - self.fake, self.fake]; batch.len()])
    }
}

/// Model returning a scripted fake probability per window position.
///
/// Window `i` of a batch gets `script[i]`; positions past the end of the
/// script reuse its last value.
pub struct ScriptedModel {
    name: String,
    script: Vec<f32>,
    calls: Arc<Mutex<usize>>,
}

impl ScriptedModel {
    /// Creates a model following `script`.
    #[must_use]
    pub fn new(name: &str, script: Vec<f32>) -> Self {
        Self {
            name: name.to_string(),
            script,
            calls: Arc::new(Mutex::new(0)),
        }
    }

    fn with_counter(mut self, calls: Arc<Mutex<usize>>) -> Self {
        self.calls = calls;
        self
    }
}

impl WindowModel for ScriptedModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn predict(&self, batch: &WindowBatch) -> Result<Vec<[f32; 2]>> {
        bump(&self.calls);
        let last = self.script.last().copied().unwrap_or(0.0);
        Ok((0..batch.len())
            .map(|i| {
                let fake = self.script.get(i).copied().unwrap_or(last);
                [1.0 - fake, fake]
            })
            .collect())
    }
}

type PairFactory = Box<dyn Fn(Arc<Mutex<usize>>) -> ModelPair + Send + Sync>;

/// Mock implementation of `ModelProvider` for testing.
///
/// Counts loads and model invocations.
pub struct MockModelProvider {
    factory: PairFactory,
    loads: Arc<Mutex<usize>>,
    predictions: Arc<Mutex<usize>>,
}

impl MockModelProvider {
    /// Provides two [`FixedModel`]s.
    #[must_use]
    pub fn constant(raw: f32, diff: f32) -> Self {
        Self::from_factory(Box::new(move |calls| {
            ModelPair::new(
                Box::new(FixedModel::new("g1", raw).with_counter(Arc::clone(&calls))),
                Box::new(FixedModel::new("g2", diff).with_counter(calls)),
            )
        }))
    }

    /// Provides two [`ScriptedModel`]s.
    #[must_use]
    pub fn scripted(raw: Vec<f32>, diff: Vec<f32>) -> Self {
        Self::from_factory(Box::new(move |calls| {
            ModelPair::new(
                Box::new(ScriptedModel::new("g1", raw.clone()).with_counter(Arc::clone(&calls))),
                Box::new(ScriptedModel::new("g2", diff.clone()).with_counter(calls)),
            )
        }))
    }

    fn from_factory(factory: PairFactory) -> Self {
        Self {
            factory,
            loads: Arc::new(Mutex::new(0)),
            predictions: Arc::new(Mutex::new(0)),
        }
    }

    /// Returns a handle to the load counter.
    #[must_use]
    pub fn load_counter(&self) -> Arc<Mutex<usize>> {
        Arc::clone(&self.loads)
    }

    /// Returns a handle to the counter of `predict()` calls across both models.
    #[must_use]
    pub fn prediction_counter(&self) -> Arc<Mutex<usize>> {
        Arc::clone(&self.predictions)
    }
}

impl ModelProvider for MockModelProvider {
    fn load(&self) -> Result<ModelPair> {
        bump(&self.loads);
        Ok((self.factory)(Arc::clone(&self.predictions)))
    }
}

/// Provider whose weights can never be loaded.
#[derive(Default)]
pub struct FailingProvider {
    attempts: Arc<Mutex<usize>>,
}

impl FailingProvider {
    /// Creates a failing provider.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a handle to the attempt counter.
    #[must_use]
    pub fn attempt_counter(&self) -> Arc<Mutex<usize>> {
        Arc::clone(&self.attempts)
    }
}

impl ModelProvider for FailingProvider {
    fn load(&self) -> Result<ModelPair> {
        bump(&self.attempts);
        Err(DetectError::model_load("g1.safetensors: no such file"))
    }
}

/// Mock implementation of `ResultOutput` for testing.
///
/// Captures verdicts for later assertions.
pub struct MockResultOutput {
    verdicts: Arc<Mutex<Vec<VideoVerdict>>>,
    flush_count: Arc<Mutex<usize>>,
}

impl MockResultOutput {
    /// Creates a new mock output.
    #[must_use]
    pub fn new() -> Self {
        Self {
            verdicts: Arc::new(Mutex::new(Vec::new())),
            flush_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Returns all captured verdicts.
    #[must_use]
    pub fn verdicts(&self) -> Vec<VideoVerdict> {
        self.verdicts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the number of times `flush()` was called.
    #[must_use]
    pub fn flush_count(&self) -> usize {
        read(&self.flush_count)
    }
}

impl Default for MockResultOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultOutput for MockResultOutput {
    fn write(&self, verdict: &VideoVerdict) -> anyhow::Result<()> {
        self.verdicts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(verdict.clone());
        Ok(())
    }

    fn flush(&self) -> anyhow::Result<()> {
        bump(&self.flush_count);
        Ok(())
    }
}

/// Mock implementation of `ProgressSink` for testing.
///
/// Captures events for later assertions.
pub struct MockProgressSink {
    events: Arc<Mutex<Vec<ProgressEvent>>>,
}

impl MockProgressSink {
    /// Creates a new mock progress sink.
    #[must_use]
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Returns all captured events.
    #[must_use]
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the number of `Started` events.
    #[must_use]
    pub fn started_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, ProgressEvent::Started { .. }))
            .count()
    }

    /// Returns the videos reported as having no signal.
    #[must_use]
    pub fn no_signal_videos(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ProgressEvent::NoSignal { video } => Some(video),
                _ => None,
            })
            .collect()
    }

    /// Returns the final counts from the `Finished` event, if any.
    #[must_use]
    pub fn finished_counts(&self) -> Option<(usize, usize)> {
        self.events().iter().find_map(|e| match e {
            ProgressEvent::Finished {
                classified,
                unknown,
            } => Some((*classified, *unknown)),
            _ => None,
        })
    }
}

impl Default for MockProgressSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for MockProgressSink {
    fn on_event(&self, event: ProgressEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

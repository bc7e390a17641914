//! Dual-model scoring of landmark windows.

use once_cell::sync::OnceCell;
use tracing::{debug, info};

use crate::domain::{Sample, WindowBatch, WindowScore};
use crate::error::{DetectError, Result};
use crate::ports::{ModelPair, ModelProvider, WindowModel};

/// Scores raw windows with `G1` and diff windows with `G2`.
///
/// The model pair is loaded on the first non-empty request and then reused
/// read-only, so concurrent calls share one set of weights. A failed load is
/// not cached.
pub struct DualModelScorer {
    provider: Box<dyn ModelProvider>,
    models: OnceCell<ModelPair>,
}

impl DualModelScorer {
    /// Creates a scorer that loads its models from `provider` on demand.
    #[must_use]
    pub fn new(provider: impl ModelProvider + 'static) -> Self {
        Self {
            provider: Box::new(provider),
            models: OnceCell::new(),
        }
    }

    /// Loads the models now instead of on the first request.
    ///
    /// # Errors
    ///
    /// Returns [`DetectError::ModelLoad`] if either model fails to load.
    pub fn preload(&self) -> Result<()> {
        self.models().map(|_| ())
    }

    /// Returns true once the model pair has been loaded.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.models.get().is_some()
    }

    fn models(&self) -> Result<&ModelPair> {
        self.models.get_or_try_init(|| {
            let pair = self.provider.load()?;
            info!("Loaded models: {pair:?}");
            Ok(pair)
        })
    }

    /// Scores every sample, one batched call per model.
    ///
    /// Returns one [`WindowScore`] per sample, in sample order. An empty
    /// request returns immediately without loading the models.
    ///
    /// # Errors
    ///
    /// Returns [`DetectError::ModelLoad`] if the models cannot be loaded and
    /// [`DetectError::Compute`] if inference fails or a model returns the
    /// wrong number of results.
    pub fn score(&self, samples: &[Sample]) -> Result<Vec<WindowScore>> {
        if samples.is_empty() {
            return Ok(Vec::new());
        }

        let models = self.models()?;
        let raw_batch = WindowBatch::stack(samples.iter().map(|s| &s.window))?;
        let diff_batch = WindowBatch::stack(samples.iter().map(|s| &s.diff))?;

        let p_raw = fake_probabilities(models.raw.as_ref(), &raw_batch)?;
        let p_diff = fake_probabilities(models.diff.as_ref(), &diff_batch)?;

        Ok(samples
            .iter()
            .zip(p_raw.into_iter().zip(p_diff))
            .map(|(sample, (p_raw, p_diff))| WindowScore {
                video: sample.video.clone(),
                p_raw,
                p_diff,
            })
            .collect())
    }
}

impl std::fmt::Debug for DualModelScorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DualModelScorer")
            .field("models", &self.models.get())
            .finish_non_exhaustive()
    }
}

/// Runs `model` over `batch` and keeps the fake-class probability.
fn fake_probabilities(model: &dyn WindowModel, batch: &WindowBatch) -> Result<Vec<f32>> {
    debug!("{}: predicting {:?}", model.name(), batch.shape());
    let output = model.predict(batch)?;

    if output.len() != batch.len() {
        return Err(DetectError::compute(format!(
            "{} returned {} predictions for {} windows",
            model.name(),
            output.len(),
            batch.len()
        )));
    }

    Ok(output.into_iter().map(|[_, fake]| fake).collect())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::domain::Window;

    struct ConstModel {
        fake: f32,
        calls: Arc<AtomicUsize>,
        drop_last: bool,
    }

    impl WindowModel for ConstModel {
        fn name(&self) -> &str {
            "const"
        }

        fn predict(&self, batch: &WindowBatch) -> Result<Vec<[f32; 2]>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let n = if self.drop_last {
                batch.len() - 1
            } else {
                batch.len()
            };
            Ok(vec![[1.0 - self.fake, self.fake]; n])
        }
    }

    struct Provider {
        raw: f32,
        diff: f32,
        drop_last: bool,
        loads: Arc<AtomicUsize>,
        calls: Arc<AtomicUsize>,
    }

    impl Provider {
        fn new(raw: f32, diff: f32) -> Self {
            Self {
                raw,
                diff,
                drop_last: false,
                loads: Arc::new(AtomicUsize::new(0)),
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    impl ModelProvider for Provider {
        fn load(&self) -> Result<ModelPair> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            let model = |fake| ConstModel {
                fake,
                calls: Arc::clone(&self.calls),
                drop_last: self.drop_last,
            };
            Ok(ModelPair::new(
                Box::new(model(self.raw)),
                Box::new(model(self.diff)),
            ))
        }
    }

    struct Broken;

    impl ModelProvider for Broken {
        fn load(&self) -> Result<ModelPair> {
            Err(DetectError::model_load("g1.safetensors not found"))
        }
    }

    fn sample(video: &str) -> Sample {
        Sample {
            video: video.into(),
            window: Window::new(4, 2, vec![0.0; 8]).unwrap(),
            diff: Window::new(3, 2, vec![0.0; 6]).unwrap(),
        }
    }

    #[test]
    fn test_scores_align_with_samples() {
        let scorer = DualModelScorer::new(Provider::new(0.9, 0.7));
        let scores = scorer
            .score(&[sample("a"), sample("a"), sample("b")])
            .unwrap();

        assert_eq!(scores.len(), 3);
        assert_eq!(scores[2].video, "b");
        assert!((scores[0].p_raw - 0.9).abs() < 1e-6);
        assert!((scores[0].p_diff - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_one_call_per_model() {
        let provider = Provider::new(0.9, 0.9);
        let calls = Arc::clone(&provider.calls);
        let scorer = DualModelScorer::new(provider);

        scorer.score(&vec![sample("a"); 10]).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_models_loaded_once_and_lazily() {
        let provider = Provider::new(0.1, 0.1);
        let loads = Arc::clone(&provider.loads);
        let scorer = DualModelScorer::new(provider);

        assert!(scorer.score(&[]).unwrap().is_empty());
        assert!(!scorer.is_loaded());
        assert_eq!(loads.load(Ordering::SeqCst), 0);

        scorer.score(&[sample("a")]).unwrap();
        scorer.score(&[sample("b")]).unwrap();
        assert!(scorer.is_loaded());
        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_load_failure_aborts() {
        let scorer = DualModelScorer::new(Broken);
        let result = scorer.score(&[sample("a")]);
        assert!(matches!(result, Err(DetectError::ModelLoad(_))));
        assert!(scorer.preload().is_err());
    }

    #[test]
    fn test_short_model_output_is_compute_error() {
        let mut provider = Provider::new(0.5, 0.5);
        provider.drop_last = true;
        let scorer = DualModelScorer::new(provider);

        let result = scorer.score(&[sample("a"), sample("a")]);
        assert!(matches!(result, Err(DetectError::Compute(_))));
    }
}

//! LRNet landmark sequence classifier.
//!
//! A bidirectional GRU over a window of landmark vectors followed by a small
//! dense head producing real/fake probabilities. Tensor names follow the
//! `PyTorch` state dict used in training, so exported `g1`/`g2`
//! weights convert to safetensors without renaming.

use std::path::{Path, PathBuf};

use anyhow::Context;
use candle_core::{Device, Module, Tensor};
use candle_nn::{Linear, VarBuilder};
use tracing::{debug, info};

use super::{get_device, load_safetensors};
use crate::domain::WindowBatch;
use crate::error::{DetectError, Result};
use crate::ports::{ModelPair, ModelProvider, WindowModel};

/// Hyperparameters of the LRNet architecture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LrNetConfig {
    /// Landmark feature dimensionality (68 points × 2 coordinates).
    pub feature_size: usize,
    /// GRU hidden units per direction.
    pub rnn_unit: usize,
    /// Hidden width of the dense head.
    pub res_hidden: usize,
}

impl Default for LrNetConfig {
    fn default() -> Self {
        Self {
            feature_size: 136,
            rnn_unit: 32,
            res_hidden: 64,
        }
    }
}

/// One direction of a single-layer GRU.
struct GruDirection {
    input: Linear,
    hidden: Linear,
}

impl GruDirection {
    fn new(
        in_dim: usize,
        hidden_dim: usize,
        suffix: &str,
        vb: &VarBuilder,
    ) -> candle_core::Result<Self> {
        let gates = 3 * hidden_dim;
        let w_ih = vb.get((gates, in_dim), &format!("weight_ih_l0{suffix}"))?;
        let w_hh = vb.get((gates, hidden_dim), &format!("weight_hh_l0{suffix}"))?;
        let b_ih = vb.get(gates, &format!("bias_ih_l0{suffix}"))?;
        let b_hh = vb.get(gates, &format!("bias_hh_l0{suffix}"))?;

        Ok(Self {
            input: Linear::new(w_ih, Some(b_ih)),
            hidden: Linear::new(w_hh, Some(b_hh)),
        })
    }

    /// Advances the hidden state `h` (`N × H`) by one input step `x` (`N × D`).
    ///
    /// Gate layout is `[reset, update, new]`, as in `PyTorch`.
    fn step(&self, x: &Tensor, h: &Tensor) -> candle_core::Result<Tensor> {
        let gi = self.input.forward(x)?.chunk(3, 1)?;
        let gh = self.hidden.forward(h)?.chunk(3, 1)?;

        let r = candle_nn::ops::sigmoid(&(&gi[0] + &gh[0])?)?;
        let z = candle_nn::ops::sigmoid(&(&gi[1] + &gh[1])?)?;
        let n = (&gi[2] + (r * &gh[2])?)?.tanh()?;

        // h' = (1 - z) * n + z * h
        let keep = (z.ones_like()? - &z)?;
        (keep * n)? + (z * h)?
    }
}

/// The LRNet two-class classifier.
pub struct LrNet {
    name: String,
    config: LrNetConfig,
    forward_gru: GruDirection,
    backward_gru: GruDirection,
    fc1: Linear,
    fc2: Linear,
    device: Device,
}

impl LrNet {
    /// Builds the network from weights.
    ///
    /// # Errors
    ///
    /// Returns an error if a tensor is missing or has the wrong shape.
    #[allow(clippy::needless_pass_by_value)]
    pub fn new(
        name: impl Into<String>,
        config: LrNetConfig,
        vb: VarBuilder,
    ) -> candle_core::Result<Self> {
        let device = vb.device().clone();
        let gru = vb.pp("gru");
        let forward_gru = GruDirection::new(config.feature_size, config.rnn_unit, "", &gru)?;
        let backward_gru =
            GruDirection::new(config.feature_size, config.rnn_unit, "_reverse", &gru)?;

        // dense = [Dropout, Linear, ReLU, Dropout, Linear, Softmax]
        let dense = vb.pp("dense");
        let fc1 = candle_nn::linear(2 * config.rnn_unit, config.res_hidden, dense.pp("1"))?;
        let fc2 = candle_nn::linear(config.res_hidden, 2, dense.pp("4"))?;

        Ok(Self {
            name: name.into(),
            config,
            forward_gru,
            backward_gru,
            fc1,
            fc2,
            device,
        })
    }

    /// Loads the network from a safetensors file onto `device`.
    ///
    /// # Errors
    ///
    /// Returns [`DetectError::ModelLoad`] if the file cannot be read or does
    /// not match the architecture.
    pub fn load(
        name: &str,
        path: impl AsRef<Path>,
        config: LrNetConfig,
        device: &Device,
    ) -> Result<Self> {
        let path = path.as_ref();
        let vb = load_safetensors(path, device)?;
        Self::new(name, config, vb)
            .with_context(|| format!("Failed to build {name} from {}", path.display()))
            .map_err(DetectError::ModelLoad)
    }

    /// Runs the network on an `N × T × D` tensor and returns `N × 2` probabilities.
    ///
    /// # Errors
    ///
    /// Returns an error if `xs` has no time steps or a tensor operation fails.
    pub fn forward_probs(&self, xs: &Tensor) -> candle_core::Result<Tensor> {
        let (batch, steps, _) = xs.dims3()?;
        if steps == 0 {
            candle_core::bail!("{}: input has no time steps", self.name);
        }
        let zeros = Tensor::zeros((batch, self.config.rnn_unit), xs.dtype(), xs.device())?;

        let mut h = zeros.clone();
        for t in 0..steps {
            let x_t = xs.narrow(1, t, 1)?.squeeze(1)?;
            h = self.forward_gru.step(&x_t, &h)?;
        }

        // The backward direction's output at the last position has only seen
        // the last frame.
        let x_last = xs.narrow(1, steps - 1, 1)?.squeeze(1)?;
        let h_back = self.backward_gru.step(&x_last, &zeros)?;

        let last = Tensor::cat(&[&h, &h_back], 1)?;
        let hidden = self.fc1.forward(&last)?.relu()?;
        let logits = self.fc2.forward(&hidden)?;
        candle_nn::ops::softmax_last_dim(&logits)
    }
}

impl WindowModel for LrNet {
    fn name(&self) -> &str {
        &self.name
    }

    fn predict(&self, batch: &WindowBatch) -> Result<Vec<[f32; 2]>> {
        let (n, steps, dim) = batch.shape();
        if n == 0 {
            return Ok(Vec::new());
        }
        if steps == 0 {
            return Err(DetectError::compute(format!(
                "{}: windows must have at least one time step",
                self.name
            )));
        }
        if dim != self.config.feature_size {
            return Err(DetectError::compute(format!(
                "{}: expected {} landmark features, got {dim}",
                self.name, self.config.feature_size
            )));
        }

        debug!("{}: scoring batch of shape ({n}, {steps}, {dim})", self.name);
        let xs = Tensor::from_slice(batch.as_slice(), (n, steps, dim), &self.device)?;
        let probs = self.forward_probs(&xs)?.to_vec2::<f32>()?;

        Ok(probs.into_iter().map(|p| [p[0], p[1]]).collect())
    }
}

/// Provides the `g1`/`g2` LRNet pair from two safetensors files.
#[derive(Debug, Clone)]
pub struct SafetensorsModels {
    /// Weights of the raw-landmark model.
    pub g1: PathBuf,
    /// Weights of the difference model.
    pub g2: PathBuf,
    /// Shared architecture.
    pub config: LrNetConfig,
}

impl SafetensorsModels {
    /// Creates a provider for the given weight files.
    #[must_use]
    pub fn new(g1: impl Into<PathBuf>, g2: impl Into<PathBuf>) -> Self {
        Self {
            g1: g1.into(),
            g2: g2.into(),
            config: LrNetConfig::default(),
        }
    }

    /// Overrides the architecture hyperparameters.
    #[must_use]
    pub fn with_config(mut self, config: LrNetConfig) -> Self {
        self.config = config;
        self
    }
}

impl ModelProvider for SafetensorsModels {
    fn load(&self) -> Result<ModelPair> {
        let device = get_device();

        info!(
            "Loading models g1={} g2={}",
            self.g1.display(),
            self.g2.display()
        );
        let g1 = LrNet::load("g1", &self.g1, self.config, &device)?;
        let g2 = LrNet::load("g2", &self.g2, self.config, &device)?;

        Ok(ModelPair::new(Box::new(g1), Box::new(g2)))
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::Window;
    use candle_core::DType;

    fn small_config() -> LrNetConfig {
        LrNetConfig {
            feature_size: 4,
            rnn_unit: 3,
            res_hidden: 5,
        }
    }

    fn batch(n: usize, rows: usize, dim: usize) -> WindowBatch {
        let windows: Vec<Window> = (0..n)
            .map(|i| Window::new(rows, dim, vec![i as f32 * 0.1; rows * dim]).unwrap())
            .collect();
        WindowBatch::stack(&windows).unwrap()
    }

    #[test]
    fn test_default_config() {
        let config = LrNetConfig::default();
        assert_eq!(config.feature_size, 136);
        assert_eq!(config.rnn_unit, 32);
        assert_eq!(config.res_hidden, 64);
    }

    #[test]
    fn test_zero_weights_give_uniform_probabilities() {
        let vb = VarBuilder::zeros(DType::F32, &Device::Cpu);
        let model = LrNet::new("g1", small_config(), vb).expect("builds");

        let probs = model.predict(&batch(3, 6, 4)).expect("predicts");
        assert_eq!(probs.len(), 3);
        for p in probs {
            assert!((p[0] - 0.5).abs() < 1e-6);
            assert!((p[1] - 0.5).abs() < 1e-6);
        }
    }

    #[test]
    fn test_rejects_wrong_feature_size() {
        let vb = VarBuilder::zeros(DType::F32, &Device::Cpu);
        let model = LrNet::new("g2", small_config(), vb).expect("builds");

        let result = model.predict(&batch(1, 6, 5));
        assert!(matches!(result, Err(DetectError::Compute(_))));
    }

    #[test]
    fn test_forward_rejects_zero_steps() {
        let vb = VarBuilder::zeros(DType::F32, &Device::Cpu);
        let model = LrNet::new("g1", small_config(), vb).expect("builds");

        let xs = Tensor::zeros((2, 0, 4), DType::F32, &Device::Cpu).expect("tensor");
        assert!(model.forward_probs(&xs).is_err());
    }

    #[test]
    fn test_empty_batch_skips_inference() {
        let vb = VarBuilder::zeros(DType::F32, &Device::Cpu);
        let model = LrNet::new("g1", small_config(), vb).expect("builds");

        let empty = WindowBatch::stack(std::iter::empty::<&Window>()).unwrap();
        assert!(model.predict(&empty).unwrap().is_empty());
    }

    #[test]
    fn test_missing_weights_fail_to_load() {
        let provider = SafetensorsModels::new(
            "/nonexistent/g1.safetensors",
            "/nonexistent/g2.safetensors",
        );
        let result = provider.load();
        assert!(matches!(result, Err(DetectError::ModelLoad(_))));
    }
}

//! Configuration file support for deepcheck.
//!
//! Supports TOML configuration from:
//! - XDG config: `~/.config/deepcheck/config.toml` (lowest priority)
//! - Project-local: `.deepcheck.toml` (searched up directory tree)
//! - CLI flags (highest priority, applied separately)

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use deepcheck_core::Aggregation;
use serde::Deserialize;
use tracing::{debug, info};

/// Top-level configuration structure.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// General options.
    pub general: GeneralConfig,
    /// Decoding, tracking and windowing settings.
    pub pipeline: PipelineConfig,
    /// Verdict fusion settings.
    pub fusion: FusionConfig,
    /// Model settings.
    pub models: ModelsConfig,
    /// Output formatting settings.
    pub output: OutputConfig,
}

/// General configuration options.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Recurse into subdirectories by default.
    pub recursive: Option<bool>,
}

/// Pipeline configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Frames per window.
    pub block_size: Option<usize>,
    /// Maximum frames decoded per video.
    pub max_frames: Option<usize>,
    /// Directory holding landmark track files.
    pub landmarks_dir: Option<PathBuf>,
    /// Extension of landmark track files.
    pub landmarks_extension: Option<String>,
}

/// Fusion configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct FusionConfig {
    /// Fused window probability at which a window votes fake.
    pub vote_threshold: Option<f32>,
    /// Video score at which a video is labelled fake.
    pub fake_threshold: Option<f32>,
    /// `window_votes` or `mean_probability`.
    pub aggregation: Option<Aggregation>,
}

/// Model configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct ModelsConfig {
    /// Custom models directory path.
    pub dir: Option<PathBuf>,
    /// Base URL that `models fetch` downloads from.
    pub base_url: Option<String>,
    /// Expected SHA-256 of `g1.safetensors`.
    pub g1_sha256: Option<String>,
    /// Expected SHA-256 of `g2.safetensors`.
    pub g2_sha256: Option<String>,
}

impl ModelsConfig {
    /// Configured checksums keyed by model name.
    #[must_use]
    pub fn checksums(&self) -> HashMap<String, String> {
        [("g1", &self.g1_sha256), ("g2", &self.g2_sha256)]
            .into_iter()
            .filter_map(|(name, sum)| sum.clone().map(|s| (name.to_string(), s)))
            .collect()
    }
}

/// Output formatting configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format: "json" or "jsonl".
    pub format: Option<String>,
    /// Pretty-print JSON output.
    pub pretty: Option<bool>,
    /// Show progress bar.
    pub progress: Option<bool>,
}

impl AppConfig {
    /// Load configuration from XDG and project-local files.
    ///
    /// Priority (lowest to highest):
    /// 1. XDG config: `~/.config/deepcheck/config.toml`
    /// 2. Project-local: `.deepcheck.toml` (searched up from cwd)
    ///
    /// Missing files are silently ignored. Invalid values are logged as warnings.
    pub fn load() -> Self {
        let mut config = Self::default();

        if let Some(xdg_path) = xdg_config_path() {
            if xdg_path.exists() {
                info!("Loading XDG config: {}", xdg_path.display());
                if let Some(xdg_config) = load_file(&xdg_path) {
                    config = xdg_config;
                }
            } else {
                debug!("XDG config not found: {}", xdg_path.display());
            }
        }

        if let Some(project_path) = find_project_config() {
            info!("Loading project config: {}", project_path.display());
            if let Some(project_config) = load_file(&project_path) {
                config.merge(project_config);
            }
        }

        for warning in config.sanitize() {
            eprintln!("warning: {warning}");
        }

        config
    }

    /// Clear every out-of-range value so the built-in default applies.
    ///
    /// Returns one message per cleared key.
    fn sanitize(&mut self) -> Vec<String> {
        let mut warnings = Vec::new();

        for (key, value) in [
            ("pipeline.block_size", &mut self.pipeline.block_size),
            ("pipeline.max_frames", &mut self.pipeline.max_frames),
        ] {
            if *value == Some(0) {
                warnings.push(format!("{key} must be at least 1, ignoring it"));
                *value = None;
            }
        }

        for (key, value) in [
            ("fusion.vote_threshold", &mut self.fusion.vote_threshold),
            ("fusion.fake_threshold", &mut self.fusion.fake_threshold),
        ] {
            if let Some(t) = value.filter(|t| !(0.0..=1.0).contains(t)) {
                warnings.push(format!("{key} must be 0.0-1.0, got {t}, ignoring it"));
                *value = None;
            }
        }

        for (key, value) in [
            ("models.g1_sha256", &mut self.models.g1_sha256),
            ("models.g2_sha256", &mut self.models.g2_sha256),
        ] {
            if let Some(sum) = value.take_if(|s| !is_sha256(s)) {
                warnings.push(format!("{key} must be 64 hex digits, got '{sum}', ignoring it"));
            }
        }

        if let Some(f) = self
            .output
            .format
            .take_if(|f| f.as_str() != "json" && f.as_str() != "jsonl")
        {
            warnings.push(format!(
                "output.format must be 'json' or 'jsonl', got '{f}', ignoring it"
            ));
        }

        warnings
    }

    /// Merge another config into this one.
    /// Values from `other` override values in `self` when present.
    fn merge(&mut self, other: Self) {
        // General
        self.general.recursive = other.general.recursive.or(self.general.recursive);

        // Pipeline
        self.pipeline.block_size = other.pipeline.block_size.or(self.pipeline.block_size);
        self.pipeline.max_frames = other.pipeline.max_frames.or(self.pipeline.max_frames);
        self.pipeline.landmarks_dir = other
            .pipeline
            .landmarks_dir
            .or_else(|| self.pipeline.landmarks_dir.take());
        self.pipeline.landmarks_extension = other
            .pipeline
            .landmarks_extension
            .or_else(|| self.pipeline.landmarks_extension.take());

        // Fusion
        self.fusion.vote_threshold = other.fusion.vote_threshold.or(self.fusion.vote_threshold);
        self.fusion.fake_threshold = other.fusion.fake_threshold.or(self.fusion.fake_threshold);
        self.fusion.aggregation = other.fusion.aggregation.or(self.fusion.aggregation);

        // Models
        self.models.dir = other.models.dir.or_else(|| self.models.dir.take());
        self.models.base_url = other.models.base_url.or_else(|| self.models.base_url.take());
        self.models.g1_sha256 = other.models.g1_sha256.or_else(|| self.models.g1_sha256.take());
        self.models.g2_sha256 = other.models.g2_sha256.or_else(|| self.models.g2_sha256.take());

        // Output
        self.output.format = other.output.format.or_else(|| self.output.format.take());
        self.output.pretty = other.output.pretty.or(self.output.pretty);
        self.output.progress = other.output.progress.or(self.output.progress);
    }
}

fn is_sha256(sum: &str) -> bool {
    sum.len() == 64 && sum.chars().all(|c| c.is_ascii_hexdigit())
}

/// Get the XDG config file path.
fn xdg_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("deepcheck").join("config.toml"))
}

/// Find project-local config by searching up from current directory.
fn find_project_config() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    find_config_in_parents(&cwd)
}

/// Search for `.deepcheck.toml` in the given directory and its parents.
fn find_config_in_parents(start: &Path) -> Option<PathBuf> {
    let mut current = Some(start);

    while let Some(dir) = current {
        let config_path = dir.join(".deepcheck.toml");
        if config_path.exists() {
            return Some(config_path);
        }
        current = dir.parent();
    }

    None
}

/// Load and parse a TOML config file.
fn load_file(path: &Path) -> Option<AppConfig> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!("Failed to read config file {}: {}", path.display(), e);
            return None;
        }
    };

    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!("Failed to parse config file {}: {}", path.display(), e);
            None
        }
    }
}

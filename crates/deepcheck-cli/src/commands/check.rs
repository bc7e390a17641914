//! Check command - classify videos as real or fake.

use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use deepcheck_adapters::{
    collect_videos, model_path, set_models_dir, FfmpegFrameSource, LandmarkFileTracker,
};
use deepcheck_core::inference::SafetensorsModels;
use deepcheck_core::{
    Aggregation, Classifier, DetectError, DualModelScorer, FusionPolicy, ProgressSink,
    ResultOutput, VideoVerdict,
};
use tracing::{debug, info, warn};

use super::ExitCode;
use crate::config::AppConfig;
use crate::output::{JsonOutput, ProgressBar};

/// Output format for results.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// JSON Lines (one JSON object per line)
    #[default]
    Jsonl,
    /// Single JSON array
    Json,
}

/// Hardcoded default values.
mod defaults {
    pub const BLOCK_SIZE: usize = 16;
    pub const MAX_FRAMES: usize = 300;
    pub const VOTE_THRESHOLD: f32 = 0.5;
    pub const FAKE_THRESHOLD: f32 = 0.5;
    pub const LANDMARKS_DIR: &str = ".";
}

/// Parse and validate a threshold value (0.0-1.0).
fn parse_threshold(s: &str) -> Result<f32, String> {
    let value: f32 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("{value} is not in 0.0..=1.0"))
    }
}

/// Parse a strictly positive count.
fn parse_positive(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(_) => Err(format!("'{s}' is not a positive integer")),
    }
}

/// Shared arguments for video classification.
#[derive(Args, Clone)]
#[allow(clippy::struct_excessive_bools)]
pub struct CheckArgs {
    /// Video files or directories to classify
    pub paths: Vec<PathBuf>,

    /// Recurse into subdirectories
    #[arg(short, long)]
    pub recursive: bool,

    /// Frames per classification window
    #[arg(long, value_parser = parse_positive)]
    pub block_size: Option<usize>,

    /// Decode at most this many frames per video [default: 300]
    ///
    /// Decoded frames are held in memory as RGB, roughly 6 MB each at 1080p.
    #[arg(long, value_parser = parse_positive)]
    pub max_frames: Option<usize>,

    /// Directory holding `<video>.txt` landmark tracks
    #[arg(long, value_name = "DIR")]
    pub landmarks_dir: Option<PathBuf>,

    /// Fused window probability at which a window votes fake (0.0-1.0)
    #[arg(long, value_parser = parse_threshold)]
    pub vote_threshold: Option<f32>,

    /// Video score at which a video is labelled fake (0.0-1.0)
    #[arg(long, value_parser = parse_threshold)]
    pub fake_threshold: Option<f32>,

    /// Show progress bar
    #[arg(long)]
    pub progress: bool,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Pretty-print JSON output (only affects --format json)
    #[arg(long)]
    pub pretty: bool,

    /// Custom models directory (overrides default and config)
    #[arg(long, value_name = "DIR")]
    pub models_dir: Option<PathBuf>,

    /// Merged config (populated by `with_config`, not from CLI).
    #[arg(skip)]
    config: Option<AppConfig>,
}

impl CheckArgs {
    /// Apply configuration file values, respecting CLI precedence.
    ///
    /// Layering priority (lowest to highest):
    /// 1. Hardcoded defaults (in accessor methods)
    /// 2. Config file values (XDG, then project-local)
    /// 3. CLI arguments (already set on self)
    pub fn with_config(mut args: Self, config: &AppConfig) -> Self {
        if !args.recursive {
            args.recursive = config.general.recursive.unwrap_or(false);
        }

        args.block_size = args.block_size.or(config.pipeline.block_size);
        args.max_frames = args.max_frames.or(config.pipeline.max_frames);
        if args.landmarks_dir.is_none() {
            args.landmarks_dir.clone_from(&config.pipeline.landmarks_dir);
        }

        args.vote_threshold = args.vote_threshold.or(config.fusion.vote_threshold);
        args.fake_threshold = args.fake_threshold.or(config.fusion.fake_threshold);

        if args.format.is_none() {
            args.format = config
                .output
                .format
                .as_ref()
                .and_then(|s| match s.as_str() {
                    "json" => Some(OutputFormat::Json),
                    "jsonl" => Some(OutputFormat::Jsonl),
                    _ => None,
                });
        }
        if !args.pretty {
            args.pretty = config.output.pretty.unwrap_or(false);
        }
        if !args.progress {
            args.progress = config.output.progress.unwrap_or(false);
        }

        if args.models_dir.is_none() {
            args.models_dir.clone_from(&config.models.dir);
        }

        args.config = Some(config.clone());
        args
    }

    /// Get block size with fallback to hardcoded default.
    fn block_size(&self) -> usize {
        self.block_size.unwrap_or(defaults::BLOCK_SIZE)
    }

    /// Get frame cap with fallback to hardcoded default.
    fn max_frames(&self) -> usize {
        self.max_frames.unwrap_or(defaults::MAX_FRAMES)
    }

    /// Get landmarks directory with fallback to the working directory.
    fn landmarks_dir(&self) -> PathBuf {
        self.landmarks_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(defaults::LANDMARKS_DIR))
    }

    /// Get landmark file extension from config.
    fn landmarks_extension(&self) -> Option<&str> {
        self.config
            .as_ref()
            .and_then(|c| c.pipeline.landmarks_extension.as_deref())
    }

    /// Build the fusion policy from thresholds and config.
    fn policy(&self) -> FusionPolicy {
        FusionPolicy {
            vote_threshold: self.vote_threshold.unwrap_or(defaults::VOTE_THRESHOLD),
            fake_threshold: self.fake_threshold.unwrap_or(defaults::FAKE_THRESHOLD),
            aggregation: self
                .config
                .as_ref()
                .and_then(|c| c.fusion.aggregation)
                .unwrap_or(Aggregation::WindowVotes),
        }
    }

    /// Get output format with fallback to JSONL.
    fn format(&self) -> OutputFormat {
        self.format.unwrap_or(OutputFormat::Jsonl)
    }
}

/// Result of running the check command.
#[allow(dead_code)] // Fields exposed for programmatic use
pub struct CheckResult {
    /// Number of videos classified.
    pub processed: usize,
    /// Number of videos skipped because they could not be read.
    pub skipped: usize,
    /// Number of videos labelled fake.
    pub fakes: usize,
    /// Exit code.
    pub exit_code: ExitCode,
}

/// Run the check command.
///
/// Expects `args` to have been processed through `with_config()` first
/// to apply configuration file settings.
pub fn run(args: &CheckArgs) -> Result<CheckResult> {
    info!("Running check command on {} paths", args.paths.len());

    if args.paths.is_empty() {
        anyhow::bail!("No paths specified");
    }

    let block = args.block_size();
    if block == 0 {
        anyhow::bail!("Block size must be at least 1");
    }
    debug!("Block size: {block}");

    if let Some(ref models_dir) = args.models_dir {
        debug!("Using custom models directory: {}", models_dir.display());
        set_models_dir(models_dir.clone());
    }

    let videos = collect_videos(&args.paths, args.recursive);
    let show_progress = !args.quiet && (args.progress || std::io::stderr().is_terminal());
    let progress = Arc::new(ProgressBar::new(
        videos.len() as u64,
        args.quiet,
        show_progress,
    ));

    let classifier =
        build_classifier(args)?.with_progress(Arc::clone(&progress) as Arc<dyn ProgressSink>);
    let output = JsonOutput::stdout();

    process_videos(&classifier, &videos, block, &output, &progress, args)
}

/// Wire the ffmpeg decoder, landmark files and safetensors models together.
fn build_classifier(args: &CheckArgs) -> Result<Classifier> {
    let (Some(g1), Some(g2)) = (model_path("g1"), model_path("g2")) else {
        anyhow::bail!("unknown model configuration");
    };

    let frames = FfmpegFrameSource::new().with_max_frames(Some(args.max_frames()));

    let mut tracker = LandmarkFileTracker::new(args.landmarks_dir());
    if let Some(ext) = args.landmarks_extension() {
        tracker = tracker.with_extension(ext);
    }

    let policy = args.policy();
    debug!("Fusion policy: {policy:?}");

    let scorer = DualModelScorer::new(SafetensorsModels::new(g1, g2));
    Ok(Classifier::new(frames, tracker, scorer).with_policy(policy))
}

/// Classify each video, skipping unreadable ones.
fn process_videos(
    classifier: &Classifier,
    videos: &[PathBuf],
    block: usize,
    output: &JsonOutput,
    progress: &ProgressBar,
    args: &CheckArgs,
) -> Result<CheckResult> {
    let mut processed = 0usize;
    let mut skipped = 0usize;
    let mut fakes = 0usize;
    let mut all_verdicts: Vec<VideoVerdict> = Vec::new();

    for path in videos {
        let verdict = match classifier.classify(path, block) {
            Ok(verdict) => verdict,
            Err(DetectError::Input(e)) => {
                warn!("Skipping {}: {e:#}", path.display());
                progress.skipped();
                skipped += 1;
                continue;
            }
            Err(e @ DetectError::ModelLoad(_)) => {
                return Err(e).context(
                    "Failed to load models. Run `deepcheck models fetch --base-url <URL>`",
                );
            }
            Err(e) => return Err(e.into()),
        };

        if verdict.is_fake() {
            fakes += 1;
        }

        match args.format() {
            OutputFormat::Jsonl => output.write(&verdict)?,
            OutputFormat::Json => all_verdicts.push(verdict),
        }
        processed += 1;
    }

    if matches!(args.format(), OutputFormat::Json) {
        output.write_array(&all_verdicts, args.pretty)?;
    }
    output.flush()?;

    progress.finish(processed, skipped);

    let exit_code = if fakes > 0 {
        ExitCode::FakeFound
    } else {
        ExitCode::Success
    };

    Ok(CheckResult {
        processed,
        skipped,
        fakes,
        exit_code,
    })
}

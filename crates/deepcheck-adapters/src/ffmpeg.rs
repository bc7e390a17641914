//! Frame decoding through the `ffmpeg` and `ffprobe` binaries.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use anyhow::{anyhow, bail, Context};
use deepcheck_core::{DecodedVideo, DetectError, FrameSource};
use image::RgbImage;
use serde::Deserialize;
use tracing::{debug, warn};

/// Decodes videos into RGB frames with an external `ffmpeg`.
///
/// Every decoded frame is kept in memory as packed RGB (about 6 MB per
/// 1080p frame), so callers should set a frame cap for long inputs.
#[derive(Debug, Clone)]
pub struct FfmpegFrameSource {
    ffmpeg: PathBuf,
    ffprobe: PathBuf,
    max_frames: Option<usize>,
}

impl Default for FfmpegFrameSource {
    fn default() -> Self {
        Self {
            ffmpeg: PathBuf::from("ffmpeg"),
            ffprobe: PathBuf::from("ffprobe"),
            max_frames: None,
        }
    }
}

impl FfmpegFrameSource {
    /// Creates a source using `ffmpeg` and `ffprobe` from `PATH`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses explicit binaries instead of the ones on `PATH`.
    #[must_use]
    pub fn with_binaries(mut self, ffmpeg: impl Into<PathBuf>, ffprobe: impl Into<PathBuf>) -> Self {
        self.ffmpeg = ffmpeg.into();
        self.ffprobe = ffprobe.into();
        self
    }

    /// Stops decoding after `max_frames` frames. `None` decodes the whole
    /// stream.
    #[must_use]
    pub const fn with_max_frames(mut self, max_frames: Option<usize>) -> Self {
        self.max_frames = max_frames;
        self
    }

    fn probe(&self, path: &Path) -> anyhow::Result<StreamInfo> {
        let output = Command::new(&self.ffprobe)
            .args(["-v", "error", "-select_streams", "v:0"])
            .args(["-show_entries", "stream=width,height,r_frame_rate"])
            .args(["-print_format", "json"])
            .arg(path)
            .stdin(Stdio::null())
            .output()
            .with_context(|| format!("Failed to run {}", self.ffprobe.display()))?;

        if !output.status.success() {
            bail!(
                "ffprobe failed on {}: {}",
                path.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        parse_probe(&output.stdout)
            .with_context(|| format!("No decodable video stream in {}", path.display()))
    }

    fn read_frames(&self, path: &Path, info: &StreamInfo) -> anyhow::Result<Vec<RgbImage>> {
        let mut cmd = Command::new(&self.ffmpeg);
        cmd.args(["-v", "error", "-nostdin", "-i"])
            .arg(path)
            .args(["-map", "0:v:0"]);
        if let Some(max) = self.max_frames {
            cmd.arg("-frames:v").arg(max.to_string());
        }
        cmd.args(["-f", "rawvideo", "-pix_fmt", "rgb24", "-"]);

        let output = cmd
            .stdin(Stdio::null())
            .output()
            .with_context(|| format!("Failed to run {}", self.ffmpeg.display()))?;

        if !output.status.success() {
            bail!(
                "ffmpeg failed on {}: {}",
                path.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        split_frames(&output.stdout, info.width, info.height)
    }
}

impl FrameSource for FfmpegFrameSource {
    fn decode(&self, path: &Path) -> deepcheck_core::Result<DecodedVideo> {
        let info = self.probe(path).map_err(DetectError::Input)?;
        debug!(
            "{}: {}x{} at {:.2} fps",
            path.display(),
            info.width,
            info.height,
            info.fps
        );

        let frames = self.read_frames(path, &info).map_err(DetectError::Input)?;
        Ok(DecodedVideo::new(frames, info.fps))
    }
}

/// Geometry and rate of the first video stream.
#[derive(Debug, Clone, PartialEq)]
struct StreamInfo {
    width: u32,
    height: u32,
    fps: f32,
}

#[derive(Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Deserialize)]
struct ProbeStream {
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
}

fn parse_probe(json: &[u8]) -> anyhow::Result<StreamInfo> {
    let probe: ProbeOutput = serde_json::from_slice(json).context("Invalid ffprobe output")?;
    let stream = probe
        .streams
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("no video stream"))?;

    let (Some(width), Some(height)) = (stream.width, stream.height) else {
        bail!("video stream has no dimensions");
    };
    if width == 0 || height == 0 {
        bail!("video stream is {width}x{height}");
    }

    Ok(StreamInfo {
        width,
        height,
        fps: stream.r_frame_rate.as_deref().map_or(0.0, parse_rate),
    })
}

/// Parses an ffprobe rate such as `30000/1001` or `25`.
fn parse_rate(rate: &str) -> f32 {
    match rate.split_once('/') {
        Some((num, den)) => {
            let num: f32 = num.trim().parse().unwrap_or(0.0);
            let den: f32 = den.trim().parse().unwrap_or(0.0);
            if den > 0.0 {
                num / den
            } else {
                0.0
            }
        }
        None => rate.trim().parse().unwrap_or(0.0),
    }
}

/// Splits packed `rgb24` output into frames, dropping a trailing partial frame.
fn split_frames(raw: &[u8], width: u32, height: u32) -> anyhow::Result<Vec<RgbImage>> {
    let frame_len = width as usize * height as usize * 3;
    let partial = raw.len() % frame_len;
    if partial != 0 {
        warn!("Dropping {partial} trailing bytes of a partial frame");
    }

    raw.chunks_exact(frame_len)
        .map(|chunk| {
            RgbImage::from_raw(width, height, chunk.to_vec())
                .ok_or_else(|| anyhow!("frame buffer does not match {width}x{height}"))
        })
        .collect()
}

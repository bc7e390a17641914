//! Landmark tracker backed by precomputed track files.
//!
//! Each video `<id>.<ext>` has a sibling text file `<dir>/<id>.<landmarks ext>`
//! holding one row of whitespace-separated floats per tracked frame. Blank
//! lines and lines starting with `#` are ignored. An empty file means no face
//! was found.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use deepcheck_core::{DecodedVideo, DetectError, LandmarkTracker, RawTrack};
use tracing::debug;

/// Default extension of track files.
pub const DEFAULT_EXTENSION: &str = "txt";

/// Reads landmark tracks from a directory of text files.
#[derive(Debug, Clone)]
pub struct LandmarkFileTracker {
    dir: PathBuf,
    extension: String,
}

impl LandmarkFileTracker {
    /// Creates a tracker reading `<dir>/<video id>.txt`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }

    /// Changes the track file extension.
    #[must_use]
    pub fn with_extension(mut self, extension: &str) -> Self {
        self.extension = extension.trim_start_matches('.').to_string();
        self
    }

    /// Returns the track file used for `video`.
    #[must_use]
    pub fn track_path(&self, video: &str) -> PathBuf {
        self.dir.join(format!("{video}.{}", self.extension))
    }
}

impl LandmarkTracker for LandmarkFileTracker {
    fn track(&self, video: &DecodedVideo, label: &str) -> deepcheck_core::Result<RawTrack> {
        let path = self.track_path(label);
        let mut track = read_track(&path).map_err(DetectError::Input)?;

        let frames = video.frame_count();
        if track.len() > frames {
            debug!(
                "{label}: truncating {} tracked rows to {frames} decoded frames",
                track.len()
            );
            track.truncate(frames);
        }
        Ok(track)
    }
}

/// Reads and parses one track file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is malformed.
pub fn read_track(path: &Path) -> anyhow::Result<RawTrack> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read landmarks {}", path.display()))?;
    parse_track(&text).with_context(|| format!("Malformed landmarks {}", path.display()))
}

/// Parses track text into a [`RawTrack`].
///
/// # Errors
///
/// Returns an error on unparsable values or rows of differing width.
pub fn parse_track(text: &str) -> anyhow::Result<RawTrack> {
    let mut rows: Vec<Vec<f32>> = Vec::new();

    for (lineno, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let row = line
            .split_whitespace()
            .map(str::parse::<f32>)
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("line {}: invalid number", lineno + 1))?;

        if let Some(v) = row.iter().find(|v| !v.is_finite()) {
            bail!("line {}: non-finite value {v}", lineno + 1);
        }
        rows.push(row);
    }

    Ok(RawTrack::from_rows(&rows)?)
}

//! Cuts a landmark track into fixed-length windows and derives the
//! frame-to-frame difference windows.

use tracing::debug;

use crate::domain::{RawTrack, Sample, Window};
use crate::error::{DetectError, Result};

/// Builds classification samples for one video.
///
/// Windows start at `0, block, 2·block, …` while the start stays below
/// `len - block`; trailing frames past the last window are dropped. A track of
/// at most `block` frames therefore yields no samples, and so does an empty
/// track.
///
/// Each diff window holds `track[s+i+1] - track[s+i]` for `i` in `0..block-1`.
///
/// # Errors
///
/// Returns [`DetectError::Input`] if `block` is zero.
pub fn build_samples(video: &str, track: &RawTrack, block: usize) -> Result<Vec<Sample>> {
    if block == 0 {
        return Err(DetectError::input("block size must be positive"));
    }
    if track.is_empty() {
        return Ok(Vec::new());
    }

    let dim = track.dim();
    let end = track.len().saturating_sub(block);

    let samples = (0..end)
        .step_by(block)
        .map(|start| {
            let window = Window::new(block, dim, track.rows(start, start + block).to_vec())?;
            let diff = Window::new(block - 1, dim, diff_rows(track, start, block))?;
            Ok(Sample {
                video: video.to_string(),
                window,
                diff,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    debug!(
        "{video}: {} frames -> {} windows of {block}",
        track.len(),
        samples.len()
    );
    Ok(samples)
}

fn diff_rows(track: &RawTrack, start: usize, block: usize) -> Vec<f32> {
    (start..start + block - 1)
        .flat_map(|i| {
            track
                .row(i + 1)
                .iter()
                .zip(track.row(i))
                .map(|(next, cur)| next - cur)
        })
        .collect()
}

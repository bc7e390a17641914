//! Progress bar adapter using indicatif.

use deepcheck_core::{Label, ProgressEvent, ProgressSink};
use indicatif::{ProgressBar as IndicatifBar, ProgressStyle};

/// Progress bar adapter for CLI output.
///
/// The classifier reports each video as its own run, so run-level totals are
/// kept here and the bar is finished by the command, not by `Finished` events.
pub struct ProgressBar {
    bar: Option<IndicatifBar>,
    quiet: bool,
}

impl ProgressBar {
    /// Creates a new progress bar.
    ///
    /// # Arguments
    ///
    /// * `total` - Number of videos to classify
    /// * `quiet` - If true, suppress all output
    /// * `show_bar` - If true, show progress bar; otherwise show per-video status
    #[must_use]
    pub fn new(total: u64, quiet: bool, show_bar: bool) -> Self {
        if quiet {
            return Self {
                bar: None,
                quiet: true,
            };
        }

        let bar = show_bar.then(|| {
            let bar = IndicatifBar::new(total);
            if let Ok(style) = ProgressStyle::default_bar().template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}",
            ) {
                bar.set_style(style.progress_chars("#>-"));
            }
            bar
        });

        Self { bar, quiet }
    }

    /// Counts a video that could not be read.
    pub fn skipped(&self) {
        if let Some(bar) = &self.bar {
            bar.inc(1);
        }
    }

    /// Finishes the bar with run totals.
    pub fn finish(&self, processed: usize, skipped: usize) {
        if let Some(bar) = &self.bar {
            bar.finish_with_message(format!("Done: {processed} classified, {skipped} skipped"));
        }
    }
}

impl ProgressSink for ProgressBar {
    fn on_event(&self, event: ProgressEvent) {
        if self.quiet {
            return;
        }

        match event {
            ProgressEvent::Started { video, .. } => {
                if let Some(bar) = &self.bar {
                    bar.set_message(video);
                }
            }
            ProgressEvent::NoSignal { video } => {
                if self.bar.is_none() {
                    eprintln!("{video}: no usable face track");
                }
            }
            ProgressEvent::Scored { verdict } => {
                if let Some(bar) = &self.bar {
                    bar.inc(1);
                } else if verdict.label == Label::Fake {
                    eprintln!("{}: Fake (score {:.2})", verdict.video, verdict.score);
                }
            }
            ProgressEvent::Tracked { .. } | ProgressEvent::Finished { .. } => {}
        }
    }
}

//! Fusion of per-window model scores into per-video verdicts.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{Label, VideoVerdict, WindowScore};

/// How fused window probabilities are combined into a video score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    /// Fraction of windows whose fused probability reaches the vote threshold.
    #[default]
    WindowVotes,
    /// Mean fused probability over the windows.
    MeanProbability,
}

/// Thresholds and aggregation mode for turning window scores into verdicts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FusionPolicy {
    /// A window votes fake iff `p_mix >= vote_threshold`.
    pub vote_threshold: f32,
    /// A video is fake iff its score `>= fake_threshold`.
    pub fake_threshold: f32,
    /// Aggregation mode.
    pub aggregation: Aggregation,
}

impl Default for FusionPolicy {
    fn default() -> Self {
        Self {
            vote_threshold: 0.5,
            fake_threshold: 0.5,
            aggregation: Aggregation::WindowVotes,
        }
    }
}

impl FusionPolicy {
    /// Returns the contribution of one window to its video's score.
    fn window_value(&self, score: &WindowScore) -> f32 {
        let p_mix = score.p_mix();
        match self.aggregation {
            Aggregation::WindowVotes => {
                if p_mix >= self.vote_threshold {
                    1.0
                } else {
                    0.0
                }
            }
            Aggregation::MeanProbability => p_mix,
        }
    }

    /// Returns the label for an aggregated score.
    #[must_use]
    pub fn label_for(&self, score: f32) -> Label {
        if score >= self.fake_threshold {
            Label::Fake
        } else {
            Label::Real
        }
    }

    /// Aggregates the windows of a single video into its verdict.
    ///
    /// Every score counts towards `video`, whatever its own `video` field
    /// says. Returns `None` when `scores` is empty.
    #[must_use]
    pub fn verdict(&self, video: &str, scores: &[WindowScore]) -> Option<VideoVerdict> {
        if scores.is_empty() {
            return None;
        }
        let sum = scores.iter().map(|s| self.window_value(s)).sum();
        Some(self.conclude(video, sum, scores.len()))
    }

    /// Aggregates window scores into one verdict per video identifier.
    ///
    /// Verdicts appear in the order each identifier is first seen. Videos
    /// without windows are absent from the output. Scores sharing an
    /// identifier are pooled; use [`FusionPolicy::verdict`] to keep
    /// same-named videos apart.
    #[must_use]
    pub fn fuse(&self, scores: &[WindowScore]) -> Vec<VideoVerdict> {
        let mut order: Vec<&str> = Vec::new();
        let mut totals: HashMap<&str, (f32, usize)> = HashMap::new();

        for score in scores {
            let entry = totals.entry(score.video.as_str()).or_insert_with(|| {
                order.push(score.video.as_str());
                (0.0, 0)
            });
            entry.0 += self.window_value(score);
            entry.1 += 1;
        }

        order
            .into_iter()
            .map(|video| {
                let (sum, count) = totals[video];
                self.conclude(video, sum, count)
            })
            .collect()
    }

    #[allow(clippy::cast_precision_loss)]
    fn conclude(&self, video: &str, sum: f32, count: usize) -> VideoVerdict {
        let score = (sum / count as f32).clamp(0.0, 1.0);
        debug!("{video}: {count} windows, score {score:.3}");
        VideoVerdict {
            video: video.to_string(),
            label: self.label_for(score),
            score,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn score(video: &str, p_raw: f32, p_diff: f32) -> WindowScore {
        WindowScore {
            video: video.into(),
            p_raw,
            p_diff,
        }
    }

    #[test]
    fn test_single_confident_window_is_fake() {
        let verdicts = FusionPolicy::default().fuse(&[score("a", 0.9, 0.9)]);
        assert_eq!(verdicts.len(), 1);
        assert_eq!(verdicts[0].label, Label::Fake);
        assert!((verdicts[0].score - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_tie_breaks_to_fake() {
        let verdicts =
            FusionPolicy::default().fuse(&[score("a", 0.8, 0.8), score("a", 0.1, 0.1)]);
        assert!((verdicts[0].score - 0.5).abs() < f32::EPSILON);
        assert_eq!(verdicts[0].label, Label::Fake);
    }

    #[test]
    fn test_vote_threshold_inclusive() {
        // p_mix = 0.5 exactly votes fake.
        let verdicts = FusionPolicy::default().fuse(&[score("a", 0.25, 0.75)]);
        assert_eq!(verdicts[0].label, Label::Fake);
    }

    #[test]
    fn test_votes_discard_magnitude() {
        // One barely-fake window and two confidently real ones.
        let scores = [
            score("a", 0.51, 0.51),
            score("a", 0.0, 0.0),
            score("a", 0.0, 0.0),
        ];
        let verdicts = FusionPolicy::default().fuse(&scores);
        assert!((verdicts[0].score - 1.0 / 3.0).abs() < 1e-6);
        assert_eq!(verdicts[0].label, Label::Real);
    }

    #[test]
    fn test_mean_probability_aggregation() {
        let policy = FusionPolicy {
            aggregation: Aggregation::MeanProbability,
            ..FusionPolicy::default()
        };
        let verdicts = policy.fuse(&[score("a", 0.6, 0.6), score("a", 0.2, 0.2)]);
        assert!((verdicts[0].score - 0.4).abs() < 1e-6);
        assert_eq!(verdicts[0].label, Label::Real);
    }

    #[test]
    fn test_videos_kept_separate_in_first_seen_order() {
        let scores = [
            score("b", 0.9, 0.9),
            score("a", 0.1, 0.1),
            score("b", 0.9, 0.9),
            score("a", 0.9, 0.9),
        ];
        let verdicts = FusionPolicy::default().fuse(&scores);

        assert_eq!(verdicts.len(), 2);
        assert_eq!(verdicts[0].video, "b");
        assert!((verdicts[0].score - 1.0).abs() < f32::EPSILON);
        assert_eq!(verdicts[1].video, "a");
        assert!((verdicts[1].score - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_order_independent_within_video() {
        let mut scores = vec![
            score("a", 0.9, 0.9),
            score("a", 0.1, 0.2),
            score("a", 0.7, 0.4),
            score("a", 0.3, 0.3),
        ];
        let forward = FusionPolicy::default().fuse(&scores);
        scores.reverse();
        let backward = FusionPolicy::default().fuse(&scores);
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_verdict_ignores_window_names() {
        let scores = [score("x", 0.9, 0.9), score("y", 0.1, 0.1)];
        let verdict = FusionPolicy::default().verdict("x", &scores).unwrap();
        assert_eq!(verdict.video, "x");
        assert!((verdict.score - 0.5).abs() < f32::EPSILON);
        assert!(FusionPolicy::default().verdict("x", &[]).is_none());
    }

    #[test]
    fn test_no_scores_no_verdicts() {
        assert!(FusionPolicy::default().fuse(&[]).is_empty());
    }
}

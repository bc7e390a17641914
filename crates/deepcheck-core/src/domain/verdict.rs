//! Per-window scores and per-video verdicts.

use serde::{Deserialize, Serialize};

/// Final classification label of a video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Label {
    /// Genuine footage.
    Real,
    /// Synthetic forgery.
    Fake,
    /// No usable landmark windows were produced.
    Unknown,
}

impl Label {
    /// Returns the label as it appears in JSON output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Real => "Real",
            Self::Fake => "Fake",
            Self::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification result for one video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoVerdict {
    /// Video identifier (file base name without extension).
    pub video: String,
    /// Final label.
    pub label: Label,
    /// Aggregated score in `[0, 1]`.
    pub score: f32,
}

impl VideoVerdict {
    /// The verdict for a video that produced no usable windows.
    #[must_use]
    pub fn unknown(video: impl Into<String>) -> Self {
        Self {
            video: video.into(),
            label: Label::Unknown,
            score: 0.0,
        }
    }

    /// Returns true if the video was classified as fake.
    #[must_use]
    pub fn is_fake(&self) -> bool {
        self.label == Label::Fake
    }
}

/// Fake-class probabilities from both models for one window.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowScore {
    /// Identifier of the source video.
    pub video: String,
    /// Probability from the raw-landmark model (`G1`).
    pub p_raw: f32,
    /// Probability from the difference model (`G2`).
    pub p_diff: f32,
}

impl WindowScore {
    /// Fused probability: the mean of both models.
    #[must_use]
    pub fn p_mix(&self) -> f32 {
        (self.p_raw + self.p_diff) / 2.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_json_shape() {
        let verdict = VideoVerdict {
            video: "clip".into(),
            label: Label::Fake,
            score: 1.0,
        };
        let json = serde_json::to_value(&verdict).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"video": "clip", "label": "Fake", "score": 1.0})
        );
    }

    #[test]
    fn test_unknown_verdict() {
        let verdict = VideoVerdict::unknown("short");
        assert_eq!(verdict.label, Label::Unknown);
        assert!(verdict.score.abs() < f32::EPSILON);
        assert!(!verdict.is_fake());

        let json = serde_json::to_string(&verdict).unwrap();
        assert_eq!(json, r#"{"video":"short","label":"Unknown","score":0.0}"#);
    }

    #[test]
    fn test_p_mix() {
        let score = WindowScore {
            video: "v".into(),
            p_raw: 0.25,
            p_diff: 0.75,
        };
        assert!((score.p_mix() - 0.5).abs() < f32::EPSILON);
    }
}

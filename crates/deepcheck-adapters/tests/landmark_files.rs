//! Loading precomputed landmark tracks through the tracker port.

#![allow(clippy::unwrap_used)]

use std::fmt::Write as _;

use deepcheck_adapters::LandmarkFileTracker;
use deepcheck_core::{DecodedVideo, DetectError, LandmarkTracker};

fn video(frames: usize) -> DecodedVideo {
    DecodedVideo::new(vec![image::RgbImage::new(1, 1); frames], 25.0)
}

fn track_text(rows: usize, dim: usize) -> String {
    let mut text = String::from("# synthetic track\n");
    for i in 0..rows {
        let row: Vec<String> = (0..dim).map(|d| format!("{}.5", i + d)).collect();
        writeln!(text, "{}", row.join(" ")).unwrap();
    }
    text
}

#[test]
fn reads_track_for_video_id() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("clip.txt"), track_text(40, 136)).unwrap();

    let tracker = LandmarkFileTracker::new(dir.path());
    let track = tracker.track(&video(40), "clip").unwrap();

    assert_eq!(track.len(), 40);
    assert_eq!(track.dim(), 136);
    assert!((track.row(2)[1] - 3.5).abs() < f32::EPSILON);
}

#[test]
fn track_truncated_to_decoded_frames() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("clip.txt"), track_text(40, 4)).unwrap();

    let track = LandmarkFileTracker::new(dir.path())
        .track(&video(16), "clip")
        .unwrap();
    assert_eq!(track.len(), 16);
}

#[test]
fn empty_file_means_no_face() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("clip.txt"), "").unwrap();

    let track = LandmarkFileTracker::new(dir.path())
        .track(&video(30), "clip")
        .unwrap();
    assert!(track.is_empty());
}

#[test]
fn custom_extension() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("clip.lm"), track_text(3, 2)).unwrap();

    let tracker = LandmarkFileTracker::new(dir.path()).with_extension("lm");
    assert_eq!(tracker.track(&video(3), "clip").unwrap().len(), 3);
}

#[test]
fn missing_file_is_input_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = LandmarkFileTracker::new(dir.path()).track(&video(3), "absent");
    assert!(matches!(result, Err(DetectError::Input(_))));
}

#[test]
fn ragged_file_is_input_error() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("clip.txt"), "1 2 3\n4 5\n").unwrap();

    let result = LandmarkFileTracker::new(dir.path()).track(&video(2), "clip");
    let err = result.unwrap_err();
    assert!(matches!(err, DetectError::Input(_)));
    assert!(err.to_string().contains("clip.txt"));
}

//! Filesystem discovery of video files.

use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Supported video extensions.
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "mkv", "avi", "webm", "m4v"];

/// Collects all supported video files from `paths`.
///
/// Files are taken as given when their extension is supported; directories
/// are scanned, and descended into when `recursive` is set. Results from each
/// directory are sorted by path. Unsupported files and missing paths are
/// skipped with a warning.
#[must_use]
pub fn collect_videos(paths: &[PathBuf], recursive: bool) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_file() {
            if is_supported_video(path) {
                files.push(path.clone());
            } else {
                warn!("Unsupported file type: {}", path.display());
            }
        } else if path.is_dir() {
            collect_from_dir(path, recursive, &mut files);
        } else {
            warn!("Path does not exist: {}", path.display());
        }
    }

    debug!("Found {} video files", files.len());
    files
}

fn collect_from_dir(dir: &Path, recursive: bool, files: &mut Vec<PathBuf>) {
    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(e) => {
            warn!("Failed to read directory {}: {e}", dir.display());
            return;
        }
    };

    let mut paths: Vec<PathBuf> = entries.flatten().map(|e| e.path()).collect();
    paths.sort();

    for path in paths {
        let hidden = path
            .file_name()
            .is_some_and(|n| n.to_string_lossy().starts_with('.'));
        if hidden {
            continue;
        }
        if path.is_file() && is_supported_video(&path) {
            files.push(path);
        } else if path.is_dir() && recursive {
            collect_from_dir(&path, recursive, files);
        }
    }
}

/// Checks if a path has a supported video extension.
#[must_use]
pub fn is_supported_video(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .is_some_and(|e| VIDEO_EXTENSIONS.contains(&e.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_supported_video() {
        assert!(is_supported_video(Path::new("clip.mp4")));
        assert!(is_supported_video(Path::new("clip.MOV")));
        assert!(is_supported_video(Path::new("a.b.webm")));
        assert!(!is_supported_video(Path::new("clip.txt")));
        assert!(!is_supported_video(Path::new("clip")));
    }
}

//! Model downloading and caching adapter.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use anyhow::{bail, Context, Result};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

/// Model metadata.
#[derive(Debug, Clone)]
pub struct ModelInfo {
    /// Model name/identifier.
    pub name: &'static str,
    /// What the model scores.
    pub description: &'static str,
    /// Filename in models directory.
    pub filename: &'static str,
}

/// Known models.
pub const MODELS: &[ModelInfo] = &[
    ModelInfo {
        name: "g1",
        description: "raw landmark windows",
        filename: "g1.safetensors",
    },
    ModelInfo {
        name: "g2",
        description: "landmark difference windows",
        filename: "g2.safetensors",
    },
];

static MODELS_DIR_OVERRIDE: RwLock<Option<PathBuf>> = RwLock::new(None);

/// Overrides the models directory for the rest of the process.
pub fn set_models_dir(dir: impl Into<PathBuf>) {
    let dir = dir.into();
    debug!("Using models directory {}", dir.display());
    *MODELS_DIR_OVERRIDE
        .write()
        .unwrap_or_else(PoisonError::into_inner) = Some(dir);
}

/// Returns the models directory path.
///
/// Uses the directory set with [`set_models_dir`], else
/// `XDG_DATA_HOME/deepcheck/models` or `~/.local/share/deepcheck/models`.
#[must_use]
pub fn models_dir() -> PathBuf {
    if let Some(dir) = MODELS_DIR_OVERRIDE
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
    {
        return dir;
    }

    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("deepcheck")
        .join("models")
}

/// Returns the path to a specific model file.
#[must_use]
pub fn model_path(name: &str) -> Option<PathBuf> {
    MODELS
        .iter()
        .find(|m| m.name == name)
        .map(|m| models_dir().join(m.filename))
}

/// Checks if all models are installed.
#[must_use]
pub fn all_models_installed() -> bool {
    let dir = models_dir();
    MODELS.iter().all(|m| dir.join(m.filename).exists())
}

/// Lists known models with their install status.
#[must_use]
pub fn list_models() -> Vec<(String, bool)> {
    let dir = models_dir();
    MODELS
        .iter()
        .map(|m| (m.name.to_string(), dir.join(m.filename).exists()))
        .collect()
}

/// Download progress for one model.
#[derive(Debug, Clone, Copy)]
pub struct Download<'a> {
    /// Model being fetched.
    pub model: &'a str,
    /// Bytes received so far.
    pub received: u64,
    /// Total size, when the server reports one.
    pub total: Option<u64>,
}

/// Downloads every missing model from `<base_url>/<filename>`.
///
/// `checksums` maps model names to expected SHA-256 hex digests; models
/// without an entry are not verified. Installed models are left untouched.
///
/// # Errors
///
/// Returns an error if:
/// - The models directory cannot be created
/// - A model download fails
/// - A model's checksum doesn't match
pub fn fetch_models(
    base_url: &str,
    checksums: &HashMap<String, String>,
    mut progress: impl FnMut(Download<'_>),
) -> Result<Vec<PathBuf>> {
    let dir = models_dir();
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create models directory {}", dir.display()))?;

    let mut fetched = Vec::new();
    for model in MODELS {
        let path = dir.join(model.filename);
        if path.exists() {
            debug!("Model {} already exists", model.name);
            continue;
        }

        let url = format!("{}/{}", base_url.trim_end_matches('/'), model.filename);
        let expected = checksums.get(model.name).map(String::as_str);
        download_model(model, &url, expected, &path, &mut progress)?;
        fetched.push(path);
    }

    Ok(fetched)
}

/// Streams one model to disk, verifying its checksum before installing it.
fn download_model(
    model: &ModelInfo,
    url: &str,
    expected: Option<&str>,
    path: &Path,
    progress: &mut impl FnMut(Download<'_>),
) -> Result<()> {
    info!("Downloading model {} from {url}", model.name);

    let mut response = reqwest::blocking::get(url)
        .with_context(|| format!("Failed to download {}", model.name))?;

    if !response.status().is_success() {
        bail!("Download failed with status: {}", response.status());
    }

    let total = response.content_length();
    let partial = path.with_extension("part");
    let mut out = BufWriter::new(
        File::create(&partial)
            .with_context(|| format!("Failed to create {}", partial.display()))?,
    );

    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; 64 * 1024];
    let mut received = 0u64;
    loop {
        let n = response
            .read(&mut buf)
            .with_context(|| format!("Failed to read response for {}", model.name))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
        out.write_all(&buf[..n])
            .with_context(|| format!("Failed to write {}", partial.display()))?;
        received += n as u64;
        progress(Download {
            model: model.name,
            received,
            total,
        });
    }
    out.flush()
        .with_context(|| format!("Failed to write {}", partial.display()))?;
    drop(out);

    let hash = format!("{:x}", hasher.finalize());
    if let Some(expected) = expected {
        if !hash.eq_ignore_ascii_case(expected) {
            let _ = fs::remove_file(&partial);
            bail!(
                "Checksum mismatch for {}: expected {expected}, got {hash}",
                model.name
            );
        }
    } else {
        debug!("No checksum configured for {}, got {hash}", model.name);
    }

    fs::rename(&partial, path)
        .with_context(|| format!("Failed to install {}", path.display()))?;
    info!("Downloaded {} ({received} bytes)", model.name);
    Ok(())
}

/// Computes the SHA-256 hex digest of a file.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn sha256_file(path: &Path) -> Result<String> {
    let mut file =
        File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let mut hasher = Sha256::new();
    std::io::copy(&mut file, &mut hasher)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_model_names() {
        let names: Vec<_> = MODELS.iter().map(|m| m.name).collect();
        assert_eq!(names, ["g1", "g2"]);
    }

    #[test]
    fn test_model_path_unknown() {
        assert!(model_path("unknown").is_none());
    }

    #[test]
    fn test_sha256_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("weights");
        fs::write(&path, b"abc").unwrap();
        assert_eq!(
            sha256_file(&path).unwrap(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}

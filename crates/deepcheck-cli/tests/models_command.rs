//! Tests for the `models` subcommand.

#![allow(clippy::unwrap_used)]
#![allow(deprecated)] // cargo_bin deprecation

use assert_cmd::Command;
use predicates::prelude::*;

fn deepcheck(home: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("deepcheck").unwrap();
    cmd.env("XDG_CONFIG_HOME", home.join("config"))
        .env("XDG_DATA_HOME", home.join("data"))
        .current_dir(home);
    cmd
}

#[test]
fn test_models_path_defaults_to_data_dir() {
    let home = tempfile::tempdir().unwrap();
    deepcheck(home.path())
        .args(["models", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("deepcheck/models"));
}

#[test]
fn test_models_path_honours_flag() {
    let home = tempfile::tempdir().unwrap();
    let dir = home.path().join("weights");

    deepcheck(home.path())
        .args(["models", "--models-dir"])
        .arg(&dir)
        .arg("path")
        .assert()
        .success()
        .stdout(predicate::str::contains(dir.to_string_lossy().as_ref()));
}

#[test]
fn test_models_list_reports_install_status() {
    let home = tempfile::tempdir().unwrap();
    let dir = home.path().join("weights");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("g1.safetensors"), b"").unwrap();

    deepcheck(home.path())
        .args(["models", "list", "--models-dir"])
        .arg(&dir)
        .assert()
        .success()
        .stdout(
            predicate::str::contains("g1.safetensors")
                .and(predicate::str::contains("g2.safetensors"))
                .and(predicate::str::contains("1/2 models installed"))
                .and(predicate::str::contains("deepcheck models fetch")),
        );
}

#[test]
fn test_models_list_verifies_configured_checksums() {
    const EMPTY_SHA256: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

    let home = tempfile::tempdir().unwrap();
    let dir = home.path().join("weights");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("g1.safetensors"), b"").unwrap();
    std::fs::write(dir.join("g2.safetensors"), b"").unwrap();
    std::fs::write(
        home.path().join(".deepcheck.toml"),
        format!("[models]\ng1_sha256 = '{}'\ng2_sha256 = '{EMPTY_SHA256}'\n", "0".repeat(64)),
    )
    .unwrap();

    deepcheck(home.path())
        .args(["models", "list", "--models-dir"])
        .arg(&dir)
        .assert()
        .success()
        .stdout(
            predicate::str::contains(format!("checksum mismatch: expected {}", "0".repeat(64)))
                .and(predicate::str::contains(format!("got {EMPTY_SHA256}")).count(1))
                .and(predicate::str::contains("2/2 models installed"))
                .and(predicate::str::contains("deepcheck models fetch").not()),
        );
}

#[test]
fn test_models_dir_from_project_config() {
    let home = tempfile::tempdir().unwrap();
    std::fs::write(
        home.path().join(".deepcheck.toml"),
        "[models]\ndir = 'from-config'\n",
    )
    .unwrap();

    deepcheck(home.path())
        .args(["models", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("from-config"));
}

#[test]
fn test_fetch_requires_base_url() {
    let home = tempfile::tempdir().unwrap();
    deepcheck(home.path())
        .args(["models", "fetch"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--base-url"));
}

#[test]
fn test_fetch_skips_installed_models() {
    let home = tempfile::tempdir().unwrap();
    let dir = home.path().join("weights");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("g1.safetensors"), b"").unwrap();
    std::fs::write(dir.join("g2.safetensors"), b"").unwrap();

    deepcheck(home.path())
        .args(["models", "fetch", "--base-url", "http://127.0.0.1:9/unused"])
        .arg("--models-dir")
        .arg(&dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("already installed"));
}

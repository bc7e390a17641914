//! Models directory layout and install status.

#![allow(clippy::unwrap_used)]

use deepcheck_adapters::models::{all_models_installed, list_models, sha256_file};
use deepcheck_adapters::{model_path, models_dir, set_models_dir};

#[test]
fn override_directory_controls_lookup() {
    let dir = tempfile::tempdir().unwrap();
    set_models_dir(dir.path());
    assert_eq!(models_dir(), dir.path());

    assert!(!all_models_installed());
    assert_eq!(
        list_models(),
        vec![("g1".to_string(), false), ("g2".to_string(), false)]
    );

    let g1 = model_path("g1").unwrap();
    assert_eq!(g1, dir.path().join("g1.safetensors"));
    std::fs::write(&g1, b"weights").unwrap();
    assert_eq!(list_models()[0], ("g1".to_string(), true));
    assert!(!all_models_installed());

    std::fs::write(model_path("g2").unwrap(), b"weights").unwrap();
    assert!(all_models_installed());
    assert_eq!(sha256_file(&g1).unwrap().len(), 64);
}

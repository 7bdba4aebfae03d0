//! Test utilities for openapi-codegen integration tests

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use anyhow::Context;
use tempfile::TempDir;

/// Creates a temporary directory for test outputs
pub fn create_temp_dir() -> anyhow::Result<(TempDir, PathBuf)> {
    let temp_dir = tempfile::tempdir()?;
    let temp_path = temp_dir.path().to_path_buf();
    Ok((temp_dir, temp_path))
}

/// Root of a checked-in fixture under `tests/fixtures`
pub fn fixture_dir(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

/// Writes `contents` to `root/relative`, creating parent directories
pub fn write_file(root: &Path, relative: &str, contents: &str) -> anyhow::Result<PathBuf> {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, contents).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

/// Writes a minimal OpenAPI document and returns its path
pub fn create_test_openapi_spec(dir: &Path) -> anyhow::Result<PathBuf> {
    let spec = serde_json::json!({
        "openapi": "3.0.0",
        "info": { "title": "Test API", "version": "0.1.0" },
        "paths": {}
    });
    write_file(dir, "openapi.json", &serde_json::to_string_pretty(&spec)?)
}

/// Every file below `dir`, keyed by its `/`-separated relative path
pub fn collect_files(dir: &Path) -> anyhow::Result<BTreeMap<String, Vec<u8>>> {
    fn walk(root: &Path, dir: &Path, files: &mut BTreeMap<String, Vec<u8>>) -> anyhow::Result<()> {
        for entry in fs::read_dir(dir).with_context(|| format!("Failed to read {}", dir.display()))? {
            let path = entry?.path();
            if path.is_dir() {
                walk(root, &path, files)?;
            } else {
                let relative = path
                    .strip_prefix(root)?
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect::<Vec<_>>()
                    .join("/");
                files.insert(relative, fs::read(&path)?);
            }
        }
        Ok(())
    }

    let mut files = BTreeMap::new();
    walk(dir, dir, &mut files)?;
    Ok(files)
}

/// Asserts that two directory trees hold the same files with the same bytes
pub fn assert_dirs_match(expected: &Path, actual: &Path) -> anyhow::Result<()> {
    let expected_files = collect_files(expected)?;
    let actual_files = collect_files(actual)?;

    let expected_names: Vec<_> = expected_files.keys().collect();
    let actual_names: Vec<_> = actual_files.keys().collect();
    if expected_names != actual_names {
        anyhow::bail!(
            "File sets differ:\n  expected: {:?}\n  actual:   {:?}",
            expected_names,
            actual_names
        );
    }

    for (name, expected_bytes) in &expected_files {
        let actual_bytes = &actual_files[name];
        if expected_bytes != actual_bytes {
            anyhow::bail!(
                "{} differs:\n--- expected\n{}\n--- actual\n{}",
                name,
                String::from_utf8_lossy(expected_bytes),
                String::from_utf8_lossy(actual_bytes)
            );
        }
    }
    Ok(())
}

/// Runs the built `openapi-codegen` binary
pub fn run_cli(args: &[&str]) -> anyhow::Result<Output> {
    Command::new(env!("CARGO_BIN_EXE_openapi-codegen"))
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .context("Failed to run openapi-codegen")
}

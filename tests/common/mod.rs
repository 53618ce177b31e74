//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::path::PathBuf;
use tempfile::TempDir;

/// Write an executable stub script standing in for the Chromium binary.
///
/// The script ignores the engine argument list, which is all these tests
/// need: the supervisor only observes spawn success and process liveness.
/// Returns the directory guard (keep it alive) and the script path.
#[cfg(unix)]
pub fn stub_engine(script_body: &str) -> (TempDir, PathBuf) {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().expect("create stub dir");
    let path = dir.path().join("stub-chromium");
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", script_body)).expect("write stub");
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
        .expect("chmod stub");
    (dir, path)
}

/// A stub engine that stays alive well past any test duration.
#[cfg(unix)]
pub fn long_lived_engine() -> (TempDir, PathBuf) {
    stub_engine("sleep 30")
}

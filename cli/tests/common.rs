//! # lumigrate CLI Integration Test Common Helpers
//!
//! File: cli/tests/common.rs
//!
//! ## Overview
//!
//! Shared helpers for the integration tests in `cli/tests/`. Each test file
//! includes this module with `mod common;`.
//!

// Different test files use different helpers.
#![allow(dead_code)]

pub use assert_cmd::Command;
use std::path::Path;

/// # Get lumigrate Command (`lumigrate_cmd`)
///
/// An `assert_cmd::Command` for the `lumigrate` binary of the current build.
///
/// ## Panics
/// Panics if the binary cannot be found via `Command::cargo_bin`.
pub fn lumigrate_cmd() -> Command {
    Command::cargo_bin("lumigrate").expect("Failed to find lumigrate binary for testing")
}

/// `lumigrate_cmd` running inside `dir`, with user configuration and the
/// Composer override isolated from the host environment.
pub fn isolated_cmd(dir: &Path) -> Command {
    let mut cmd = lumigrate_cmd();
    cmd.current_dir(dir)
        .env("HOME", dir)
        .env("XDG_CONFIG_HOME", dir.join(".config"))
        .env_remove("LUMIGRATE_COMPOSER")
        .env_remove("RUST_LOG");
    cmd
}

/// Writes `content` to `root/relative`, creating parent directories.
pub fn write_file(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create fixture directory");
    }
    std::fs::write(&path, content).expect("Failed to write fixture file");
}

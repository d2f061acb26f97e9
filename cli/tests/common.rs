//! # Sharing CLI Integration Test Common Helpers
//!
//! File: cli/tests/common.rs
//!
//! ## Overview
//!
//! Shared helpers for the integration tests in `cli/tests/`. Each test file is
//! compiled as its own crate and runs the built `sharing` binary.
//!

#![allow(dead_code)]

pub use assert_cmd::Command;
use std::path::{Path, PathBuf};

/// # Get Sharing Command (`sharing_cmd`)
///
/// An `assert_cmd::Command` for the compiled `sharing` binary.
///
/// ## Panics
/// Panics if the binary cannot be found via `Command::cargo_bin`.
pub fn sharing_cmd() -> Command {
    Command::cargo_bin("sharing").expect("Failed to find sharing binary for testing")
}

/// Writes `content` as a settings file inside `dir` and returns its path.
///
/// Passing it with `--config` keeps a developer's own settings file out of the
/// test run.
pub fn write_settings(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("config.toml");
    std::fs::write(&path, content).expect("Failed to write settings file");
    path
}

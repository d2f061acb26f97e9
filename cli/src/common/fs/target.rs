//! # Share Target Resolution
//!
//! File: cli/src/common/fs/target.rs
//!
//! ## Overview
//!
//! Turns the path given on the command line into the directory the HTTP server
//! serves from (the serving root) and, for single files, the one name the
//! server exposes.
//!
//! - A directory becomes the serving root as-is.
//! - A file is split into its parent directory (serving root) and its base name.
//!
//! Relative paths are joined onto the current working directory and `.`
//! segments and trailing separators are dropped. Symlinks are *not* resolved:
//! sharing `docs/report.pdf -> data/real-v7.pdf` serves `docs/` and announces
//! `/report.pdf`, exactly the name the user typed. The filesystem is only
//! consulted to check that the path exists and whether it is a directory.
//!
use crate::core::error::{Result, SharingError};
use anyhow::{anyhow, Context};
use std::{
    env,
    path::{Path, PathBuf},
};
use tracing::debug;

/// What the server exposes, derived once from the user-supplied path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    /// Canonical directory the server reads from (and uploads into).
    pub root_directory: PathBuf,
    /// Base name of the shared file, `None` for a directory share.
    pub single_file_name: Option<String>,
}

impl ResolvedTarget {
    /// Full path of the shared file for a single-file share.
    pub fn single_file_path(&self) -> Option<PathBuf> {
        self.single_file_name
            .as_ref()
            .map(|name| self.root_directory.join(name))
    }
}

/// # Resolve Share Target (`resolve_target`)
///
/// Validates `path` and splits it into a `ResolvedTarget`.
///
/// ## Errors
///
/// - `SharingError::MissingPath` if `path` is empty.
/// - `SharingError::PathNotFound` if nothing exists at `path`.
/// - A context error if the metadata cannot be read for another reason, or the
///   path has no usable parent/base name.
pub async fn resolve_target(path: &Path) -> Result<ResolvedTarget> {
    if path.as_os_str().is_empty() {
        return Err(anyhow!(SharingError::MissingPath));
    }

    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        env::current_dir()
            .context("Failed to get current working directory")?
            .join(path)
    };
    // `components()` drops `.` segments and trailing separators.
    let absolute_path: PathBuf = joined.components().collect();

    // Follows symlinks for the existence check only; the path itself is kept.
    let metadata = match tokio::fs::metadata(&absolute_path).await {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(anyhow!(SharingError::PathNotFound {
                path: path.to_path_buf()
            }));
        }
        Err(e) => {
            return Err(e).with_context(|| {
                format!("Failed to read metadata for '{}'", absolute_path.display())
            });
        }
    };

    let target = if metadata.is_dir() {
        ResolvedTarget {
            root_directory: absolute_path,
            single_file_name: None,
        }
    } else {
        let parent = absolute_path.parent().ok_or_else(|| {
            anyhow!(SharingError::Config(format!(
                "'{}' has no parent directory",
                absolute_path.display()
            )))
        })?;
        let file_name = absolute_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| {
                anyhow!(SharingError::Config(format!(
                    "'{}' has no file name",
                    absolute_path.display()
                )))
            })?;
        ResolvedTarget {
            root_directory: parent.to_path_buf(),
            single_file_name: Some(file_name),
        }
    };

    debug!("Resolved share target: {:?}", target);
    Ok(target)
}

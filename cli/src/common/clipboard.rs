//! # Clipboard Source (`common::clipboard`)
//!
//! File: cli/src/common/clipboard.rs
//!
//! ## Overview
//!
//! Backs `sharing --clipboard`. The clipboard text is classified first:
//! - text containing `file://` (what file managers put on the clipboard when a
//!   file is copied) names a path; if that path exists it is shared directly.
//! - anything else is written to `clipboard.txt` inside a fresh temporary
//!   directory and that file is shared.
//!
//! The temporary directory lives inside `ClipboardShare` and is removed when it
//! is dropped, i.e. after the server stops.
//!
use crate::core::error::{Result, SharingError};
use anyhow::{anyhow, Context};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info};

const FILE_URL_MARKER: &str = "file://";
const CLIPBOARD_FILE_NAME: &str = "clipboard.txt";

/// What the clipboard holds, as far as sharing is concerned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipboardContent {
    /// An existing file or directory referenced by a `file://` entry.
    Path(PathBuf),
    /// Plain text to share as a file.
    Text(String),
}

/// Classifies clipboard text. A `file://` reference only counts as a path
/// when something exists there.
pub fn classify(text: &str) -> ClipboardContent {
    if let Some(index) = text.find(FILE_URL_MARKER) {
        let candidate = text[index + FILE_URL_MARKER.len()..].trim();
        let path = Path::new(candidate);
        if !candidate.is_empty() && path.exists() {
            return ClipboardContent::Path(path.to_path_buf());
        }
        debug!("Clipboard file reference '{}' does not exist", candidate);
    }
    ClipboardContent::Text(text.to_string())
}

/// A clipboard share ready to be resolved like any other path.
#[derive(Debug)]
pub struct ClipboardShare {
    path: PathBuf,
    // Held so the temporary file outlives the server.
    _temp_dir: Option<TempDir>,
}

impl ClipboardShare {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Builds the share from already-read clipboard text.
    pub fn from_text(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Err(anyhow!(SharingError::EmptyClipboard));
        }
        match classify(text) {
            ClipboardContent::Path(path) => {
                info!("Clipboard references {}", path.display());
                Ok(Self {
                    path,
                    _temp_dir: None,
                })
            }
            ClipboardContent::Text(text) => {
                let temp_dir = tempfile::Builder::new()
                    .prefix("sharing-clipboard-")
                    .tempdir()
                    .context("Failed to create temporary directory for clipboard text")?;
                let path = temp_dir.path().join(CLIPBOARD_FILE_NAME);
                std::fs::write(&path, text.as_bytes()).with_context(|| {
                    format!("Failed to write clipboard text to {}", path.display())
                })?;
                info!(
                    "Wrote {} bytes of clipboard text to {}",
                    text.len(),
                    path.display()
                );
                Ok(Self {
                    path,
                    _temp_dir: Some(temp_dir),
                })
            }
        }
    }
}

/// # Read Clipboard (`read_clipboard`)
///
/// Reads the system clipboard text and turns it into a `ClipboardShare`.
pub fn read_clipboard() -> Result<ClipboardShare> {
    let mut clipboard = arboard::Clipboard::new().map_err(SharingError::from)?;
    let text = match clipboard.get_text() {
        Ok(text) => text,
        Err(arboard::Error::ContentNotAvailable) => {
            return Err(anyhow!(SharingError::EmptyClipboard));
        }
        Err(e) => return Err(anyhow!(SharingError::from(e))),
    };
    ClipboardShare::from_text(&text)
}

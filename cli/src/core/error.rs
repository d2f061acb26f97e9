//! # Sharing Error Types
//!
//! File: cli/src/core/error.rs
//!
//! ## Overview
//!
//! This module defines the error types used while `sharing` starts up. Two
//! layers work together:
//! - `SharingError`: a `thiserror` enum naming the failures a user can act on
//!   (bad path, no usable network address, no free port, TLS material, etc.)
//! - `Result<T>`: an alias for `anyhow::Result<T>` so callers can attach
//!   context with `.context()` / `.with_context()` while propagating.
//!
//! Per-request failures (upload problems, authentication) never surface here;
//! they are answered with an HTTP status by the server module.
//!
//! ## Examples
//!
//! ```rust
//! if !path.exists() {
//!     return Err(SharingError::PathNotFound { path: path.to_path_buf() }.into());
//! }
//!
//! let settings = fs::read_to_string(&file)
//!     .with_context(|| format!("Failed to read settings file: {}", file.display()))?;
//! ```
//!
use std::path::PathBuf;
use thiserror::Error;

/// Custom error type for the sharing application.
#[derive(Error, Debug)]
pub enum SharingError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Specify directory or file path.")]
    MissingPath,

    #[error("Directory or file not found: {}", path.display())]
    PathNotFound { path: PathBuf },

    #[error("Clipboard is empty or does not contain text.")]
    EmptyClipboard,

    #[error("Clipboard access failed: {source}")]
    Clipboard {
        #[from]
        source: arboard::Error,
    },

    #[error("Failed to enumerate network interfaces: {0}")]
    Interfaces(#[source] std::io::Error),

    #[error("No non-loopback IPv4 interface found. Pass --ip to choose the announce address.")]
    NoLanAddress,

    #[error("No free port in range {start}-{end}.")]
    NoFreePort { start: u16, end: u16 },

    #[error("TLS setup failed: {0}")]
    Tls(String),

    #[error("Page rendering failed: {source}")]
    Template {
        #[from]
        source: tera::Error,
    },

    #[error("QR code rendering failed: {source}")]
    Qr {
        #[from]
        source: qrcode::types::QrError,
    },
}

/// Type alias for Result using anyhow::Error for broad compatibility.
/// Anyhow allows for easy context addition and flexible error handling.
pub type Result<T> = anyhow::Result<T>;

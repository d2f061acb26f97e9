//! # Sharing Common Utilities (`common`)
//!
//! File: cli/src/common/mod.rs
//!
//! ## Overview
//!
//! Shared utilities used by the `share` command, kept apart from the command
//! logic (`commands::`) and core infrastructure (`core::`).
//!
//! - **`clipboard`**: turns clipboard contents into a path to share.
//! - **`fs`**: resolves the shared path into a serving root and optional file name.
//! - **`network`**: announce address detection and free-port scanning.
//! - **`ui`**: QR code rendering and console instructions.
//!

/// Clipboard reading and temporary clipboard files.
pub mod clipboard;
/// Filesystem helpers (share target resolution).
pub mod fs;
/// Network discovery (announce address, free ports).
pub mod network;
/// Terminal output (QR code, instructions).
pub mod ui;

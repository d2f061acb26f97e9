//! # Sharing Command Modules
//!
//! File: cli/src/commands/mod.rs
//!
//! ## Overview
//!
//! `sharing` has a single command, so the only module here is `share`. Its
//! argument struct is flattened into the top-level parser in `main.rs`.
//!

/// Shares a file, directory or the clipboard over HTTP, with optional uploads.
pub mod share;

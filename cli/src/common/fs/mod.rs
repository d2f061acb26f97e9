//! # Sharing Filesystem Utilities (`common::fs`)
//!
//! File: cli/src/common/fs/mod.rs
//!
//! ## Overview
//!
//! Filesystem helpers used before the server starts.
//!
//! - **`target`**: validates the shared path and splits it into the serving
//!   root and optional single file name (`resolve_target`).
//!
//! ```rust
//! use crate::common::fs::target;
//!
//! let target = target::resolve_target(Path::new("./docs/report.pdf")).await?;
//! assert_eq!(target.single_file_name.as_deref(), Some("report.pdf"));
//! ```
//!

/// Resolves the user-supplied path into a `ResolvedTarget`.
pub mod target;

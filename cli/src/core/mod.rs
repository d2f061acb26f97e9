//! # Sharing Core Infrastructure
//!
//! File: cli/src/core/mod.rs
//!
//! ## Overview
//!
//! Foundational pieces used by the `share` command:
//! - `config`: the optional TOML settings file and its defaults
//! - `error`: the `SharingError` enum and the `Result` alias
//! - `templating`: the built-in HTML pages, rendered with Tera
//!
//! ```rust
//! use crate::core::config; // For loading settings
//! use crate::core::error::{Result, SharingError}; // For error handling
//! ```
//!
pub mod config;
pub mod error;
pub mod templating;

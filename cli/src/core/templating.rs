//! # Sharing Page Templates
//!
//! File: cli/src/core/templating.rs
//!
//! ## Overview
//!
//! The HTML pages served to the phone are Tera templates compiled into the
//! binary from `cli/templates/`:
//! - `listing.html.tera`: directory index for directories without `index.html`
//! - `receive.html.tera`: upload form served on `GET /receive` in receive mode
//!
//! Rendering always runs with autoescaping on, so file and directory names
//! taken from disk (or chosen by an uploader) cannot inject markup.
//!
//! ## Examples
//!
//! ```rust
//! #[derive(Serialize)]
//! struct Page<'a> { document_title: &'a str }
//!
//! let html = templating::render_page(
//!     "receive.html.tera",
//!     templating::RECEIVE_TEMPLATE,
//!     &Page { document_title: "Sharing" },
//! )?;
//! ```
//!
use crate::core::error::{Result, SharingError};
use anyhow::anyhow;
use serde::Serialize;
use tera::{Context, Tera};
use tracing::debug;

/// Title shown in the browser tab of every page.
pub const DOCUMENT_TITLE: &str = "Sharing";

/// Directory listing page.
pub const LISTING_TEMPLATE: &str = include_str!("../../templates/listing.html.tera");

/// Upload form page.
pub const RECEIVE_TEMPLATE: &str = include_str!("../../templates/receive.html.tera");

/// # Render Page (`render_page`)
///
/// Renders one of the built-in templates with autoescaping enabled.
///
/// ## Arguments
///
/// * `name`: Template name, only used for error messages and logs.
/// * `template`: The template source (`LISTING_TEMPLATE` or `RECEIVE_TEMPLATE`).
/// * `values`: Any serializable value whose fields become template variables.
///
/// ## Returns
///
/// * `Result<String>`: The rendered HTML, or `SharingError::Template` if the
///   context cannot be built or rendering fails.
pub fn render_page(name: &str, template: &str, values: &impl Serialize) -> Result<String> {
    let context = Context::from_serialize(values).map_err(|source| {
        anyhow!(SharingError::Template { source })
            .context(format!("Failed to build template context for '{}'", name))
    })?;

    let rendered = Tera::one_off(template, &context, true).map_err(|source| {
        anyhow!(SharingError::Template { source })
            .context(format!("Tera rendering failed for template '{}'", name))
    })?;

    debug!("Rendered template '{}' ({} bytes)", name, rendered.len());
    Ok(rendered)
}

//! # Directory Listings
//!
//! File: cli/src/commands/share/listing.rs
//!
//! ## Overview
//!
//! `ServeDir` answers file requests and serves `index.html` for directories that
//! have one. Everything it cannot find falls through to `list_directory`, which:
//! - renders an HTML index for directories without an `index.html`
//! - answers 404 for anything else, including paths that try to leave the
//!   serving root
//!
//! The helpers for human-readable sizes and UTC timestamps are used in the
//! listing rows; `log_directory_contents` is used at startup in debug runs.
//!
use super::address::RECEIVE_PATH;
use super::server_logic::AppState;
use crate::core::error::Result;
use crate::core::templating;
use axum::{
    extract::State,
    http::{StatusCode, Uri},
    response::{Html, IntoResponse, Response},
};
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, error, warn};

/// Characters escaped inside listing hrefs. `:` is escaped so a name like
/// `javascript:x` cannot read as a URL scheme.
const HREF_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b':')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// One row of a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    pub name: String,
    pub is_dir: bool,
    pub size: u64,
    pub modified: Option<SystemTime>,
}

/// Fallback handler behind `ServeDir`.
pub async fn list_directory(State(state): State<AppState>, uri: Uri) -> Response {
    let Some(relative) = sanitize_request_path(uri.path()) else {
        warn!("Rejected request path outside the serving root: {}", uri.path());
        return not_found();
    };
    let directory = state.target.root_directory.join(&relative);

    match tokio::fs::metadata(&directory).await {
        Ok(metadata) if metadata.is_dir() => {}
        _ => {
            debug!("Not found: {}", uri.path());
            return not_found();
        }
    }

    match read_entries(&directory).await {
        Ok(entries) => {
            debug!("Listing {} entries for {}", entries.len(), uri.path());
            let display_path = if uri.path().ends_with('/') {
                percent_decode_str(uri.path()).decode_utf8_lossy().into_owned()
            } else {
                format!("{}/", percent_decode_str(uri.path()).decode_utf8_lossy())
            };
            match render_listing(&display_path, &entries, state.receive) {
                Ok(html) => Html(html).into_response(),
                Err(e) => {
                    error!("Could not render listing for '{}': {:?}", display_path, e);
                    (StatusCode::INTERNAL_SERVER_ERROR, "Could not render listing")
                        .into_response()
                }
            }
        }
        Err(e) => {
            warn!("Could not read directory '{}': {}", directory.display(), e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Could not read directory").into_response()
        }
    }
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "Not Found").into_response()
}

/// # Sanitize Request Path (`sanitize_request_path`)
///
/// Percent-decodes a request path and turns it into a path relative to the
/// serving root. Returns `None` for `..` segments, backslashes, NUL bytes or
/// invalid UTF-8.
pub fn sanitize_request_path(path: &str) -> Option<PathBuf> {
    let decoded = percent_decode_str(path).decode_utf8().ok()?;
    let mut relative = PathBuf::new();
    for segment in decoded.split('/') {
        match segment {
            "" | "." => continue,
            ".." => return None,
            s if s.contains('\\') || s.contains('\0') => return None,
            s => relative.push(s),
        }
    }
    Some(relative)
}

/// Reads `directory`, directories first, then by name.
pub async fn read_entries(directory: &Path) -> std::io::Result<Vec<ListingEntry>> {
    let mut entries = Vec::new();
    let mut read_dir = tokio::fs::read_dir(directory).await?;
    while let Some(entry) = read_dir.next_entry().await? {
        let name = entry.file_name().to_string_lossy().into_owned();
        match entry.metadata().await {
            Ok(metadata) => entries.push(ListingEntry {
                name,
                is_dir: metadata.is_dir(),
                size: metadata.len(),
                modified: metadata.modified().ok(),
            }),
            Err(e) => warn!("Could not read metadata for '{}': {}", name, e),
        }
    }
    entries.sort_by(|a, b| b.is_dir.cmp(&a.is_dir).then_with(|| a.name.cmp(&b.name)));
    Ok(entries)
}

/// Template values for one listing row.
#[derive(Debug, Serialize)]
struct ListingRow {
    name: String,
    /// Percent-encoded name; the template prefixes it with `./`.
    href: String,
    is_dir: bool,
    size: String,
    modified: String,
}

/// Template values for `listing.html.tera`.
#[derive(Debug, Serialize)]
struct ListingPage<'a> {
    document_title: &'a str,
    path: &'a str,
    has_parent: bool,
    receive_path: Option<&'a str>,
    entries: Vec<ListingRow>,
}

/// # Render Listing (`render_listing`)
///
/// Renders the HTML index page for one directory.
///
/// ## Arguments
///
/// * `display_path`: Decoded request path of the directory, ending with `/`.
/// * `entries`: Directory contents, already sorted (see `read_entries`).
/// * `receive`: Adds a link to the upload form when receive mode is on.
///
/// ## Returns
///
/// * `Result<String>`: The page, or a template error.
pub fn render_listing(
    display_path: &str,
    entries: &[ListingEntry],
    receive: bool,
) -> Result<String> {
    let rows = entries
        .iter()
        .map(|entry| ListingRow {
            name: entry.name.clone(),
            href: utf8_percent_encode(&entry.name, HREF_ENCODE_SET).to_string(),
            is_dir: entry.is_dir,
            size: if entry.is_dir {
                "-".to_string()
            } else {
                human_readable_size(entry.size)
            },
            modified: entry
                .modified
                .map(format_modification_time)
                .unwrap_or_else(|| "Unknown".to_string()),
        })
        .collect();

    let page = ListingPage {
        document_title: templating::DOCUMENT_TITLE,
        path: display_path,
        has_parent: display_path != "/",
        receive_path: receive.then_some(RECEIVE_PATH),
        entries: rows,
    };
    templating::render_page("listing.html.tera", templating::LISTING_TEMPLATE, &page)
}

/// # Log Directory Contents (`log_directory_contents`)
///
/// Logs the entries of the serving root at DEBUG level.
pub fn log_directory_contents(path: &Path) {
    debug!("Directory contents for {}:", path.display());

    match std::fs::read_dir(path) {
        Ok(entries) => {
            let mut entry_count = 0;
            for entry in entries.filter_map(std::result::Result::ok) {
                entry_count += 1;
                if let Ok(metadata) = entry.metadata() {
                    let file_type = if metadata.is_dir() { "DIR " } else { "FILE" };
                    debug!("  - {} : {}", file_type, entry.file_name().to_string_lossy());
                } else {
                    warn!("  - Could not read metadata for: {}", entry.path().display());
                }
            }
            if entry_count == 0 {
                debug!("  (Empty directory)");
            }
        }
        Err(e) => {
            warn!(
                "Could not read directory contents for '{}': {}",
                path.display(),
                e
            );
        }
    }
}

/// # Format File Size (`human_readable_size`)
///
/// Bytes without decimals, larger units (powers of 1024) with one decimal.
pub fn human_readable_size(size: u64) -> String {
    const UNITS: [&str; 6] = ["B", "KB", "MB", "GB", "TB", "PB"];

    if size == 0 {
        return "0 B".to_string();
    }

    let base = 1024_f64;
    let exponent = ((size as f64).ln() / base.ln()).floor() as usize;
    let exponent = exponent.min(UNITS.len() - 1);
    let scaled = size as f64 / base.powi(exponent as i32);

    if exponent == 0 {
        format!("{} {}", size, UNITS[0])
    } else {
        format!("{:.1} {}", scaled, UNITS[exponent])
    }
}

/// # Format Modification Time (`format_modification_time`)
///
/// "YYYY-MM-DD HH:MM:SS" in UTC, or "Unknown" for times before the epoch.
pub fn format_modification_time(time: SystemTime) -> String {
    let Ok(duration) = time.duration_since(std::time::UNIX_EPOCH) else {
        return "Unknown".to_string();
    };
    match chrono::DateTime::<chrono::Utc>::from_timestamp(
        duration.as_secs() as i64,
        duration.subsec_nanos(),
    ) {
        Some(datetime) => datetime.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => "Unknown".to_string(),
    }
}

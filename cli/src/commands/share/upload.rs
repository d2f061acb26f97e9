//! # Receive Mode
//!
//! File: cli/src/commands/share/upload.rs
//!
//! ## Overview
//!
//! With `--receive` two routes are added:
//! - `GET /receive`: a small HTML form for picking a file on the phone.
//! - `POST /upload`: accepts the multipart form and writes the file into the
//!   serving root.
//!
//! The file is expected in the `selected` field (`sampleFile` is accepted as
//! well). Only the final component of the submitted file name is used, so an
//! upload can never land outside the serving root. Two uploads with the same
//! name race and the last write wins.
//!
//! Outcomes:
//! - no file field: `400`, nothing is written
//! - unusable file name: `400`
//! - malformed multipart body: the status reported by the multipart parser
//! - write failure: `500`, the partial file is removed
//! - success: `303 See Other` to the configured post-upload URL
//!
use super::server_logic::AppState;
use crate::core::templating;
use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::{debug, error, info, warn};

/// Form field names that carry the uploaded file.
pub const FILE_FIELDS: [&str; 2] = ["selected", "sampleFile"];

/// Route the receive form posts to.
pub const UPLOAD_PATH: &str = "/upload";

/// Template values for `receive.html.tera`.
#[derive(Debug, Serialize)]
struct ReceivePage<'a> {
    document_title: &'a str,
    directory_name: String,
    upload_path: &'a str,
    field_name: &'a str,
}

/// Why an upload was refused.
#[derive(Error, Debug)]
pub enum UploadError {
    #[error("No files were received.")]
    MissingFile,

    #[error("Invalid file name: {0:?}")]
    InvalidFileName(String),

    #[error("Malformed upload: {0}")]
    Multipart(#[from] MultipartError),

    #[error("Failed to save {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl IntoResponse for UploadError {
    fn into_response(self) -> Response {
        let status = match &self {
            UploadError::MissingFile | UploadError::InvalidFileName(_) => StatusCode::BAD_REQUEST,
            UploadError::Multipart(e) => e.status(),
            UploadError::Write { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!("Upload failed: {}", self);
        } else {
            warn!("Upload rejected: {}", self);
        }
        (status, self.to_string()).into_response()
    }
}

/// # Receive Form (`receive_form`)
///
/// `GET /receive`: the upload form, naming the directory files will land in.
pub async fn receive_form(State(state): State<AppState>) -> Response {
    match render_receive_form(&state.target.root_directory) {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            error!("Could not render receive form: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Could not render upload form").into_response()
        }
    }
}

/// Renders the upload form for uploads into `root`.
pub fn render_receive_form(root: &Path) -> crate::core::error::Result<String> {
    // Show only the last component; the full path stays on the sharing machine.
    let directory_name = root
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| root.display().to_string());

    let page = ReceivePage {
        document_title: templating::DOCUMENT_TITLE,
        directory_name,
        upload_path: UPLOAD_PATH,
        field_name: FILE_FIELDS[0],
    };
    templating::render_page("receive.html.tera", templating::RECEIVE_TEMPLATE, &page)
}

/// # Upload File (`upload_file`)
///
/// `POST /upload`: saves the first file found in a `selected`/`sampleFile`
/// field of the multipart body into the serving root.
///
/// Non-file fields, files in other fields and empty file parts are skipped.
/// Only the final component of the submitted name is used (see
/// `sanitize_file_name`).
///
/// ## Arguments
///
/// * `state`: Shared `AppState`; provides the serving root and the
///   post-upload redirect target.
/// * `multipart`: The streamed `multipart/form-data` request body.
///
/// ## Returns
///
/// * `Ok(Redirect)`: `303 See Other` to `upload.redirect` once the file is on disk.
/// * `Err(UploadError)`: Rendered as `400`, the multipart status, or `500`
///   (see `UploadError::into_response`). A partially written file is removed.
pub async fn upload_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Redirect, UploadError> {
    while let Some(mut field) = multipart.next_field().await? {
        let is_file_field = field
            .name()
            .is_some_and(|name| FILE_FIELDS.contains(&name));
        let Some(raw_name) = field.file_name().map(str::to_string) else {
            debug!("Skipping non-file field {:?}", field.name());
            continue;
        };
        if !is_file_field {
            debug!("Skipping file in unexpected field {:?}", field.name());
            continue;
        }
        // Browsers submit an empty file part when nothing was picked.
        if raw_name.is_empty() {
            continue;
        }

        let file_name = sanitize_file_name(&raw_name)
            .ok_or_else(|| UploadError::InvalidFileName(raw_name.clone()))?;
        let upload_path = state.target.root_directory.join(&file_name);
        debug!("upload path: {}", upload_path.display());

        let written = match save_field(&mut field, &upload_path).await {
            Ok(written) => written,
            Err(e) => {
                if let Err(remove_err) = tokio::fs::remove_file(&upload_path).await {
                    debug!(
                        "Could not remove partial upload {}: {}",
                        upload_path.display(),
                        remove_err
                    );
                }
                return Err(e);
            }
        };

        info!("File received: {} ({} bytes)", upload_path.display(), written);
        println!("File received: {}", upload_path.display());
        return Ok(Redirect::to(&state.upload_redirect));
    }

    Err(UploadError::MissingFile)
}

async fn save_field(
    field: &mut axum::extract::multipart::Field<'_>,
    path: &Path,
) -> Result<u64, UploadError> {
    let write_error = |source| UploadError::Write {
        path: path.to_path_buf(),
        source,
    };

    // Truncates an existing file of the same name; last write wins.
    let mut file = tokio::fs::File::create(path).await.map_err(write_error)?;
    let mut written = 0u64;
    // Stream chunk by chunk so large uploads never sit in memory.
    while let Some(chunk) = field.chunk().await? {
        file.write_all(&chunk).await.map_err(write_error)?;
        written += chunk.len() as u64;
    }
    file.flush().await.map_err(write_error)?;
    Ok(written)
}

/// Keeps only the final path component of a submitted file name. Both `/`
/// and `\` count as separators since either may come from the browser.
pub fn sanitize_file_name(raw: &str) -> Option<String> {
    let name = raw.rsplit(['/', '\\']).next()?.trim();
    match name {
        "" | "." | ".." => None,
        name if name.contains('\0') => None,
        name => Some(name.to_string()),
    }
}

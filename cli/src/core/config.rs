//! # Sharing Settings File
//!
//! File: cli/src/core/config.rs
//!
//! ## Overview
//!
//! This module loads the optional settings file that supplies defaults for
//! values the command line does not set. Command-line flags always win; the
//! merge itself happens in `commands::share::options`.
//!
//! ## Architecture
//!
//! Location, in order of precedence:
//! 1. An explicit path given with `--config` (or the `SHARING_CONFIG` env var).
//!    A missing explicit file is an error.
//! 2. `config.toml` in the platform config directory for `sharing`
//!    (e.g. `~/.config/sharing/config.toml` on Linux). Absence is not an error.
//! 3. Built-in defaults.
//!
//! ## Examples
//!
//! ```toml
//! [ports]
//! start = 7478
//! end = 8000
//!
//! [auth]
//! username = "alice"
//! password = "secret"
//!
//! [tls]
//! cert = "~/certs/share.crt"
//! key = "~/certs/share.key"
//!
//! [qr]
//! small = true
//!
//! [upload]
//! redirect = "/receive"
//! max_bytes = 1073741824
//! ```
//!
use crate::core::error::{Result, SharingError};
use anyhow::{anyhow, Context};
use directories::ProjectDirs;
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};

/// First port tried when no `--port` is given.
pub const DEFAULT_PORT_START: u16 = 7478;
/// Last port tried when no `--port` is given.
pub const DEFAULT_PORT_END: u16 = 8000;
/// Where the browser is sent after a successful upload.
pub const DEFAULT_UPLOAD_REDIRECT: &str = "/receive";

const CONFIG_FILE_NAME: &str = "config.toml";

/// Represents the settings file, loaded from TOML.
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[serde(default)]
    pub ports: PortSettings,
    #[serde(default)]
    pub auth: AuthSettings,
    #[serde(default)]
    pub tls: TlsSettings,
    #[serde(default)]
    pub qr: QrSettings,
    #[serde(default)]
    pub upload: UploadSettings,
}

/// Range scanned for a free port.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PortSettings {
    #[serde(default = "default_port_start")]
    pub start: u16,
    #[serde(default = "default_port_end")]
    pub end: u16,
}

/// Basic Auth credentials. Auth is only enabled when both end up present.
#[derive(Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct AuthSettings {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Certificate and private key used when `--ssl` is given.
#[derive(Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct TlsSettings {
    /// PEM certificate chain (can use ~). Will be expanded.
    pub cert: Option<String>,
    /// PEM private key (can use ~). Will be expanded.
    pub key: Option<String>,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct QrSettings {
    /// Half-block rendering. Disabled for terminals that cannot draw it.
    #[serde(default = "default_true")]
    pub small: bool,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct UploadSettings {
    #[serde(default = "default_upload_redirect")]
    pub redirect: String,
    /// Request body limit for uploads; unlimited when absent.
    pub max_bytes: Option<usize>,
}

impl Default for PortSettings {
    fn default() -> Self {
        Self {
            start: DEFAULT_PORT_START,
            end: DEFAULT_PORT_END,
        }
    }
}

impl Default for QrSettings {
    fn default() -> Self {
        Self { small: true }
    }
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            redirect: default_upload_redirect(),
            max_bytes: None,
        }
    }
}

fn default_port_start() -> u16 {
    DEFAULT_PORT_START
}
fn default_port_end() -> u16 {
    DEFAULT_PORT_END
}
fn default_true() -> bool {
    true
}
fn default_upload_redirect() -> String {
    DEFAULT_UPLOAD_REDIRECT.to_string()
}

/// Loads, expands and validates the settings file.
///
/// `explicit` is the `--config` value. When it is `None` the platform config
/// directory is consulted and built-in defaults are used if nothing is there.
pub fn load_settings(explicit: Option<&Path>) -> Result<Settings> {
    let mut settings = match explicit {
        Some(path) => {
            if !path.is_file() {
                return Err(anyhow!(SharingError::Config(format!(
                    "Settings file '{}' does not exist.",
                    path.display()
                ))));
            }
            info!("Loading settings from: {}", path.display());
            load_settings_from_path(path)?
        }
        None => load_user_settings()?.unwrap_or_default(),
    };
    expand_settings_paths(&mut settings);
    validate_settings(&settings).context("Settings validation failed")?;
    debug!("Effective settings: {:?}", settings);
    Ok(settings)
}

fn default_settings_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "sharing").map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

fn load_user_settings() -> Result<Option<Settings>> {
    let Some(path) = default_settings_path() else {
        warn!("Could not determine user config directory.");
        return Ok(None);
    };
    if path.is_file() {
        info!("Loading user settings from: {}", path.display());
        load_settings_from_path(&path).map(Some)
    } else {
        debug!("No settings file at {}", path.display());
        Ok(None)
    }
}

fn load_settings_from_path(path: &Path) -> Result<Settings> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings file: {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse TOML from file: {}", path.display()))
}

fn expand_settings_paths(settings: &mut Settings) {
    for path in [&mut settings.tls.cert, &mut settings.tls.key]
        .into_iter()
        .flatten()
    {
        let expanded = shellexpand::tilde(path.as_str()).into_owned();
        *path = expanded;
        debug!("Expanded TLS path: {}", path);
    }
}

fn validate_settings(settings: &Settings) -> Result<()> {
    let ports = &settings.ports;
    if ports.start == 0 || ports.start > ports.end {
        return Err(anyhow!(SharingError::Config(format!(
            "Invalid port range {}-{}: start must be non-zero and not exceed end.",
            ports.start, ports.end
        ))));
    }
    if settings.upload.redirect.trim().is_empty() {
        return Err(anyhow!(SharingError::Config(
            "upload.redirect cannot be empty.".to_string()
        )));
    }
    if settings.upload.max_bytes == Some(0) {
        return Err(anyhow!(SharingError::Config(
            "upload.max_bytes must be greater than zero.".to_string()
        )));
    }
    Ok(())
}

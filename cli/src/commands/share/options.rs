//! # Share Command Options
//!
//! File: cli/src/commands/share/options.rs
//!
//! ## Overview
//!
//! Defines the command-line arguments (`ShareArgs`) and the immutable
//! `RunOptions` built from them once at startup. `RunOptions` merges:
//! 1. Command-line arguments (highest priority)
//! 2. The settings file (`core::config`)
//! 3. Built-in defaults (lowest priority)
//!
//! Validation that must stop the program before any socket is opened happens
//! here: TLS without certificate material, an explicit port of zero, etc.
//!
use crate::core::config::Settings;
use crate::core::error::{Result, SharingError};
use anyhow::anyhow;
use clap::Args;
use std::ops::RangeInclusive;
use std::path::PathBuf;
use tracing::warn;

/// # Share Arguments (`ShareArgs`)
///
/// Command-line arguments accepted by `sharing`.
#[derive(Args, Debug, Clone, Default)]
pub struct ShareArgs {
    /// File or directory to share. Not needed with --clipboard.
    pub path: Option<PathBuf>,

    /// Port to listen on. Without it the first free port from 7478 is used.
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Address announced in the share URL, instead of the detected LAN address.
    #[arg(long)]
    pub ip: Option<String>,

    /// Share the clipboard contents instead of a path.
    #[arg(short, long)]
    pub clipboard: bool,

    /// Accept file uploads into the shared directory.
    #[arg(short, long)]
    pub receive: bool,

    /// Basic Auth username (requires --password).
    #[arg(short = 'U', long)]
    pub username: Option<String>,

    /// Basic Auth password (requires --username).
    #[arg(short = 'P', long)]
    pub password: Option<String>,

    /// Serve over HTTPS. Needs --cert and --key (or [tls] in the settings file).
    #[arg(short = 'S', long)]
    pub ssl: bool,

    /// PEM certificate chain for --ssl.
    #[arg(short = 'C', long)]
    pub cert: Option<PathBuf>,

    /// PEM private key for --ssl.
    #[arg(short = 'K', long)]
    pub key: Option<PathBuf>,

    /// Draw a full-size QR code for terminals without half-block support.
    #[arg(short = 'w', long = "on-windows-native-terminal")]
    pub on_windows_native_terminal: bool,

    /// Verbose logging to standard output.
    #[arg(long)]
    pub debug: bool,

    /// Settings file to read instead of the default location.
    #[arg(long, env = "SHARING_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Basic Auth username/password pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Certificate and key files used for HTTPS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsFiles {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// # Run Options (`RunOptions`)
///
/// Effective configuration for one run. Built once, never mutated, and passed
/// by reference to every step that needs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    /// Path to share. `None` only when sharing the clipboard.
    pub path: Option<PathBuf>,
    pub port: Option<u16>,
    pub ip: Option<String>,
    pub clipboard: bool,
    pub receive: bool,
    /// Present only when both username and password were supplied.
    pub credentials: Option<Credentials>,
    /// Present only when HTTPS was requested.
    pub tls: Option<TlsFiles>,
    pub small_qr: bool,
    pub debug: bool,
    pub port_range: RangeInclusive<u16>,
    pub upload_redirect: String,
    pub max_upload_bytes: Option<usize>,
}

impl RunOptions {
    /// # Build Run Options (`from_args`)
    ///
    /// Merges `args` over `settings`.
    ///
    /// ## Errors
    ///
    /// - `SharingError::MissingPath` when neither a path nor `--clipboard` is given.
    /// - `SharingError::Config` for `--port 0`, or `--ssl` without both
    ///   certificate and key.
    pub fn from_args(args: ShareArgs, settings: &Settings) -> Result<Self> {
        if args.path.is_none() && !args.clipboard {
            return Err(anyhow!(SharingError::MissingPath));
        }
        if args.clipboard && args.path.is_some() {
            warn!("--clipboard given, ignoring path argument");
        }
        if args.port == Some(0) {
            return Err(anyhow!(SharingError::Config(
                "--port must be between 1 and 65535".to_string()
            )));
        }

        let username = args.username.or_else(|| settings.auth.username.clone());
        let password = args.password.or_else(|| settings.auth.password.clone());
        let credentials = match (username, password) {
            (Some(username), Some(password)) => Some(Credentials { username, password }),
            (None, None) => None,
            _ => {
                warn!("Basic Auth needs both a username and a password; authentication is disabled");
                None
            }
        };

        let tls = if args.ssl {
            let cert = args
                .cert
                .or_else(|| settings.tls.cert.as_ref().map(PathBuf::from));
            let key = args
                .key
                .or_else(|| settings.tls.key.as_ref().map(PathBuf::from));
            match (cert, key) {
                (Some(cert), Some(key)) => Some(TlsFiles { cert, key }),
                (None, _) => {
                    return Err(anyhow!(SharingError::Config(
                        "--ssl requires a certificate (--cert)".to_string()
                    )));
                }
                (_, None) => {
                    return Err(anyhow!(SharingError::Config(
                        "--ssl requires a private key (--key)".to_string()
                    )));
                }
            }
        } else {
            if args.cert.is_some() || args.key.is_some() {
                warn!("--cert/--key given without --ssl; serving plain HTTP");
            }
            None
        };

        Ok(Self {
            path: if args.clipboard { None } else { args.path },
            port: args.port,
            ip: args.ip,
            clipboard: args.clipboard,
            receive: args.receive,
            credentials,
            tls,
            small_qr: settings.qr.small && !args.on_windows_native_terminal,
            debug: args.debug,
            port_range: settings.ports.start..=settings.ports.end,
            upload_redirect: settings.upload.redirect.clone(),
            max_upload_bytes: settings.upload.max_bytes,
        })
    }

    /// `https` when TLS is configured, else `http`.
    pub fn scheme(&self) -> &'static str {
        if self.tls.is_some() {
            "https"
        } else {
            "http"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{AuthSettings, PortSettings, TlsSettings};

    fn args_for(path: &str) -> ShareArgs {
        ShareArgs {
            path: Some(PathBuf::from(path)),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults() -> Result<()> {
        let options = RunOptions::from_args(args_for("/tmp/docs"), &Settings::default())?;

        assert_eq!(options.path, Some(PathBuf::from("/tmp/docs")));
        assert_eq!(options.port, None);
        assert_eq!(options.port_range, 7478..=8000);
        assert_eq!(options.credentials, None);
        assert_eq!(options.tls, None);
        assert!(options.small_qr);
        assert_eq!(options.scheme(), "http");
        assert_eq!(options.upload_redirect, "/receive");
        Ok(())
    }

    #[test]
    fn test_missing_path() {
        let err = RunOptions::from_args(ShareArgs::default(), &Settings::default()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SharingError>(),
            Some(SharingError::MissingPath)
        ));
    }

    #[test]
    fn test_clipboard_needs_no_path() -> Result<()> {
        let args = ShareArgs {
            clipboard: true,
            ..Default::default()
        };
        let options = RunOptions::from_args(args, &Settings::default())?;
        assert!(options.clipboard);
        assert_eq!(options.path, None);
        Ok(())
    }

    #[test]
    fn test_credentials_require_both() -> Result<()> {
        let args = ShareArgs {
            username: Some("alice".into()),
            ..args_for(".")
        };
        assert_eq!(RunOptions::from_args(args, &Settings::default())?.credentials, None);

        let args = ShareArgs {
            username: Some("alice".into()),
            password: Some("secret".into()),
            ..args_for(".")
        };
        assert_eq!(
            RunOptions::from_args(args, &Settings::default())?.credentials,
            Some(Credentials {
                username: "alice".into(),
                password: "secret".into()
            })
        );
        Ok(())
    }

    #[test]
    fn test_cli_overrides_settings() -> Result<()> {
        let settings = Settings {
            auth: AuthSettings {
                username: Some("file-user".into()),
                password: Some("file-pass".into()),
            },
            ports: PortSettings {
                start: 9000,
                end: 9100,
            },
            ..Default::default()
        };
        let args = ShareArgs {
            username: Some("alice".into()),
            ..args_for(".")
        };

        let options = RunOptions::from_args(args, &settings)?;

        let credentials = options.credentials.unwrap();
        assert_eq!(credentials.username, "alice");
        assert_eq!(credentials.password, "file-pass");
        assert_eq!(options.port_range, 9000..=9100);
        Ok(())
    }

    #[test]
    fn test_ssl_requires_cert_and_key() {
        let args = ShareArgs {
            ssl: true,
            cert: Some("cert.pem".into()),
            ..args_for(".")
        };
        let err = RunOptions::from_args(args, &Settings::default()).unwrap_err();
        assert!(err.to_string().contains("private key"));

        let args = ShareArgs {
            ssl: true,
            ..args_for(".")
        };
        let err = RunOptions::from_args(args, &Settings::default()).unwrap_err();
        assert!(err.to_string().contains("certificate"));
    }

    #[test]
    fn test_ssl_from_settings() -> Result<()> {
        let settings = Settings {
            tls: TlsSettings {
                cert: Some("/etc/sharing/cert.pem".into()),
                key: Some("/etc/sharing/key.pem".into()),
            },
            ..Default::default()
        };
        let args = ShareArgs {
            ssl: true,
            ..args_for(".")
        };

        let options = RunOptions::from_args(args, &settings)?;

        assert_eq!(options.scheme(), "https");
        assert_eq!(
            options.tls,
            Some(TlsFiles {
                cert: "/etc/sharing/cert.pem".into(),
                key: "/etc/sharing/key.pem".into()
            })
        );
        Ok(())
    }

    #[test]
    fn test_windows_terminal_disables_small_qr() -> Result<()> {
        let args = ShareArgs {
            on_windows_native_terminal: true,
            ..args_for(".")
        };
        assert!(!RunOptions::from_args(args, &Settings::default())?.small_qr);
        Ok(())
    }

    #[test]
    fn test_port_zero_rejected() {
        let args = ShareArgs {
            port: Some(0),
            ..args_for(".")
        };
        assert!(RunOptions::from_args(args, &Settings::default()).is_err());
    }
}

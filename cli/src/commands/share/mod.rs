//! # Sharing Command
//!
//! File: cli/src/commands/share/mod.rs
//!
//! ## Overview
//!
//! Shares a file, a directory or the clipboard with a phone on the same
//! network. The URL is printed and drawn as a QR code; the phone scans it and
//! downloads (or, with `--receive`, uploads) over HTTP or HTTPS.
//!
//! ## Architecture
//!
//! - `options.rs`: command-line arguments and the merged `RunOptions`
//! - `address.rs`: the announced share URL
//! - `server_logic.rs`: router assembly and the server loop
//! - `listing.rs`: HTML directory listings
//! - `upload.rs`: receive form and upload handler
//! - `auth.rs`: Basic Auth middleware
//!
//! ## Examples
//!
//! ```bash
//! # Share a directory
//! sharing ~/Pictures
//!
//! # Share one file on a fixed port
//! sharing -p 9000 ./report.pdf
//!
//! # Let the phone upload into the current directory, with a password
//! sharing -r -U alice -P secret .
//!
//! # Share the clipboard over HTTPS
//! sharing -c -S -C cert.pem -K key.pem
//! ```
//!
//! Startup flow:
//! 1. Load settings and merge them with the arguments
//! 2. Read the clipboard or take the given path, then resolve the serving root
//! 3. Load TLS material, pick the announce address and a port
//! 4. Bind, print the QR code, serve until Ctrl+C
//!
use crate::common::clipboard::{self, ClipboardShare};
use crate::common::fs::target::{resolve_target, ResolvedTarget};
use crate::common::network::discovery;
use crate::common::ui::{self, ShareKind};
use crate::core::config;
use crate::core::error::{Result, SharingError};
use anyhow::anyhow;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use tracing::{debug, info};

pub use options::ShareArgs;

pub mod address;
pub mod auth;
pub mod listing;
pub mod options;
pub mod server_logic;
pub mod upload;

use address::ShareAddress;
use options::RunOptions;
use server_logic::AppState;

/// Address the server listens on.
const BIND_HOST: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);

/// # Handle Share (`handle_share`)
///
/// Runs one share from start to Ctrl+C.
///
/// ## Errors
///
/// Fails before anything is printed when the path is missing or does not
/// exist, the clipboard is empty, TLS material cannot be loaded, no LAN
/// address is found, or no port is free.
pub async fn handle_share(args: ShareArgs) -> Result<()> {
    debug!("Handling share with args: {:?}", args);

    let settings = config::load_settings(args.config.as_deref())?;
    let options = RunOptions::from_args(args, &settings)?;
    debug!("Effective run options: {:?}", options);

    // Held until the server stops so clipboard text stays on disk.
    let clipboard_share: Option<ClipboardShare> = if options.clipboard {
        Some(clipboard::read_clipboard()?)
    } else {
        None
    };
    let share_path = match (&clipboard_share, &options.path) {
        (Some(share), _) => share.path().to_path_buf(),
        (None, Some(path)) => path.clone(),
        (None, None) => return Err(anyhow!(SharingError::MissingPath)),
    };

    let target = resolve_target(&share_path).await?;
    if options.debug && target.single_file_name.is_none() {
        listing::log_directory_contents(&target.root_directory);
    }

    let tls = match &options.tls {
        Some(files) => Some(server_logic::load_tls_config(files).await?),
        None => None,
    };

    let host = discovery::resolve_announce_host(options.ip.as_deref())?;
    let port =
        discovery::negotiate_port(BIND_HOST, options.port, options.port_range.clone()).await?;

    let share_address = ShareAddress::for_share(&options, &target, host, port);
    let share_url = share_address.to_string();
    info!("Sharing at {}", share_url);

    let kind = share_kind(&options, &target);
    let app = server_logic::create_app(AppState::new(target, &options), &options);

    server_logic::serve(app, SocketAddr::new(BIND_HOST, port), tls, || {
        ui::print_report(&kind, &share_url, options.small_qr)
    })
    .await?;

    drop(clipboard_share);
    Ok(())
}

/// Picks the console headline for this run.
fn share_kind(options: &RunOptions, target: &ResolvedTarget) -> ShareKind {
    if options.receive {
        ShareKind::Receive(target.root_directory.display().to_string())
    } else if options.clipboard {
        ShareKind::Clipboard
    } else if let Some(name) = &target.single_file_name {
        ShareKind::File(name.clone())
    } else {
        ShareKind::Directory(target.root_directory.display().to_string())
    }
}

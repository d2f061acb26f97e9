//! # Sharing Network Utilities Module (`common::network`)
//!
//! File: cli/src/common/network/mod.rs
//!
//! ## Overview
//!
//! Network discovery needed before the server starts: which address to
//! announce in the share URL and which port to listen on.
//!
//! ```rust
//! use crate::common::network::discovery;
//!
//! let host = discovery::resolve_announce_host(options.ip.as_deref())?;
//! let port = discovery::negotiate_port(bind_ip, options.port, options.port_range.clone()).await?;
//! println!("http://{}:{}", host, port);
//! ```

/// Announce address detection and free-port scanning.
pub mod discovery;

//! # Network Discovery
//!
//! File: cli/src/common/network/discovery.rs
//!
//! ## Overview
//!
//! Decides which address and port the server announces:
//! - `resolve_announce_host`: the explicit `--ip` verbatim, else the first
//!   non-loopback IPv4 interface address.
//! - `negotiate_port`: the explicit `--port` verbatim, else the first port in
//!   the configured range that can be bound right now.
//!
//! Both are ordered fallbacks with an explicit failure at the end instead of
//! an empty host or port.
//!
use crate::core::error::{Result, SharingError};
use anyhow::anyhow;
use std::net::{IpAddr, SocketAddr};
use std::ops::RangeInclusive;
use tokio::net::TcpListener;
use tracing::{debug, info};

/// # Resolve Announce Host (`resolve_announce_host`)
///
/// Returns `explicit` unchanged when given; no reachability check is made.
/// Otherwise enumerates the local interfaces and picks the first IPv4 address
/// that is not loopback.
pub fn resolve_announce_host(explicit: Option<&str>) -> Result<String> {
    if let Some(ip) = explicit {
        debug!("Using explicit announce address: {}", ip);
        return Ok(ip.to_string());
    }

    let interfaces = if_addrs::get_if_addrs().map_err(SharingError::Interfaces)?;
    for interface in &interfaces {
        debug!(
            "Interface {}: {} (loopback: {})",
            interface.name,
            interface.ip(),
            interface.is_loopback()
        );
    }

    let address = first_lan_ipv4(
        interfaces
            .iter()
            .map(|interface| (interface.ip(), interface.is_loopback())),
    )
    .ok_or_else(|| anyhow!(SharingError::NoLanAddress))?;

    info!("Detected local network address: {}", address);
    Ok(address.to_string())
}

/// First address in `addresses` that is IPv4 and not loopback.
///
/// Each item is `(address, interface_is_loopback)`.
pub fn first_lan_ipv4(addresses: impl IntoIterator<Item = (IpAddr, bool)>) -> Option<IpAddr> {
    addresses
        .into_iter()
        .find(|(ip, loopback)| ip.is_ipv4() && !loopback && !ip.is_loopback())
        .map(|(ip, _)| ip)
}

/// # Negotiate Port (`negotiate_port`)
///
/// An explicit port is returned unconditionally; if it is taken, binding the
/// server fails later. Without one, `range` is scanned on `host`.
pub async fn negotiate_port(
    host: IpAddr,
    explicit: Option<u16>,
    range: RangeInclusive<u16>,
) -> Result<u16> {
    match explicit {
        Some(port) => {
            debug!("Using explicit port: {}", port);
            Ok(port)
        }
        None => find_free_port(host, range).await,
    }
}

/// # Find Free Port (`find_free_port`)
///
/// Tries each port of `range` in ascending order, opening a listener and
/// dropping it immediately. Another process can still take the port before
/// the server binds it; that case surfaces as a bind error at startup.
///
/// ## Arguments
///
/// * `host`: The address the server will bind (`0.0.0.0`).
/// * `range`: Candidate ports, from `[ports]` in the settings file.
///
/// ## Returns
///
/// * `Ok(u16)`: The lowest port in `range` that could be bound.
/// * `Err`: `SharingError::NoFreePort` when every port in the range is taken.
pub async fn find_free_port(host: IpAddr, range: RangeInclusive<u16>) -> Result<u16> {
    let (start, end) = (*range.start(), *range.end());

    for port in range {
        let addr = SocketAddr::new(host, port);
        match TcpListener::bind(addr).await {
            Ok(listener) => {
                // Release immediately; the server binds it again later.
                drop(listener);
                if port != start {
                    info!(
                        "Port {} was unavailable, using first free port {}.",
                        start, port
                    );
                }
                return Ok(port);
            }
            Err(e) => {
                debug!("Port {} on {} is unavailable: {}", port, host, e);
            }
        }
    }

    Err(anyhow!(SharingError::NoFreePort { start, end }))
}

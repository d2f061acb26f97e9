//! # Share URL
//!
//! File: cli/src/commands/share/address.rs
//!
//! ## Overview
//!
//! `ShareAddress` is the URL announced on the console and encoded in the QR
//! code: `scheme://host:port<path>?time=<epoch-ms>`.
//!
//! The `time` parameter is a cache-busting token so a phone that opened an
//! earlier share of the same file does not get a stale cached copy.
//!
use super::options::RunOptions;
use crate::common::fs::target::ResolvedTarget;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::fmt;

/// Path of the upload form served in receive mode.
pub const RECEIVE_PATH: &str = "/receive";

/// Characters escaped in a shared file name: everything except
/// `A-Z a-z 0-9 - _ . ! ~ * ' ( )`, matching `encodeURIComponent`.
const FILE_NAME_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// The announced share URL, immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareAddress {
    pub scheme: &'static str,
    pub host: String,
    pub port: u16,
    /// Empty for a directory share, otherwise starts with `/`.
    pub url_path: String,
    pub cache_bust_token: i64,
}

impl ShareAddress {
    /// Builds the address with the current time as cache-busting token.
    pub fn new(scheme: &'static str, host: String, port: u16, url_path: String) -> Self {
        Self::with_token(
            scheme,
            host,
            port,
            url_path,
            chrono::Utc::now().timestamp_millis(),
        )
    }

    pub fn with_token(
        scheme: &'static str,
        host: String,
        port: u16,
        url_path: String,
        cache_bust_token: i64,
    ) -> Self {
        Self {
            scheme,
            host,
            port,
            url_path,
            cache_bust_token,
        }
    }

    /// # Build Share Address (`for_share`)
    ///
    /// Picks the URL path for the run: `/receive` in receive mode, the encoded
    /// file name for a single-file share, nothing for a directory.
    pub fn for_share(options: &RunOptions, target: &ResolvedTarget, host: String, port: u16) -> Self {
        let url_path = if options.receive {
            RECEIVE_PATH.to_string()
        } else {
            target
                .single_file_name
                .as_deref()
                .map(encode_file_path)
                .unwrap_or_default()
        };
        Self::new(options.scheme(), host, port, url_path)
    }
}

impl fmt::Display for ShareAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}://{}:{}{}?time={}",
            self.scheme, self.host, self.port, self.url_path, self.cache_bust_token
        )
    }
}

/// `/` followed by the percent-encoded file name.
pub fn encode_file_path(file_name: &str) -> String {
    format!("/{}", utf8_percent_encode(file_name, FILE_NAME_ENCODE_SET))
}

//! # Basic Auth Middleware
//!
//! File: cli/src/commands/share/auth.rs
//!
//! ## Overview
//!
//! When credentials are configured every request, including static files,
//! listings and uploads, must carry a matching `Authorization: Basic` header.
//! Anything else is answered with `401` and a `WWW-Authenticate` challenge
//! before any other handler runs.
//!
use super::options::Credentials;
use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::sync::Arc;
use tracing::debug;

/// Realm sent in the authentication challenge.
pub const REALM: &str = "sharing";

/// Axum middleware enforcing Basic Auth.
pub async fn require_basic_auth(
    State(credentials): State<Arc<Credentials>>,
    request: Request,
    next: Next,
) -> Response {
    let presented = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(decode_basic);

    match presented {
        Some((username, password))
            if username == credentials.username && password == credentials.password =>
        {
            next.run(request).await
        }
        presented => {
            debug!(
                "Rejected {} {} ({})",
                request.method(),
                request.uri(),
                if presented.is_some() {
                    "wrong credentials"
                } else {
                    "no credentials"
                }
            );
            challenge()
        }
    }
}

fn challenge() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        [(
            header::WWW_AUTHENTICATE,
            format!("Basic realm=\"{}\"", REALM),
        )],
        "Authentication required",
    )
        .into_response()
}

/// Decodes an `Authorization` header value of the form `Basic <base64>` into
/// `(username, password)`. The scheme name is case-insensitive.
pub fn decode_basic(value: &str) -> Option<(String, String)> {
    let (scheme, encoded) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}

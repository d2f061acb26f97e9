//! # Sharing HTTP Server
//!
//! File: cli/src/commands/share/server_logic.rs
//!
//! ## Overview
//!
//! Builds the Axum router for a share and runs it over plain HTTP or HTTPS.
//!
//! ## Architecture
//!
//! Routes, in the order a request meets them:
//! 1. `TraceLayer` request logging
//! 2. Basic Auth (`auth::require_basic_auth`), when credentials are configured
//! 3. `GET /receive` and `POST /upload`, in receive mode
//! 4. Static content as the fallback:
//!    - directory share: `ServeDir` over the serving root, falling back to
//!      `listing::list_directory`
//!    - single-file share: only `/<name>` through `ServeFile`, everything else 404
//!
//! The listener binds `0.0.0.0:<port>`. HTTPS uses `axum-server` with a rustls
//! configuration loaded before the socket is bound, so unreadable certificate
//! material stops the program before anything is announced.
//!
use super::address::RECEIVE_PATH;
use super::auth;
use super::listing;
use super::options::{RunOptions, TlsFiles};
use super::upload;
use crate::common::fs::target::ResolvedTarget;
use crate::core::error::{Result, SharingError};
use anyhow::{anyhow, Context};
use axum::{
    body::Body,
    extract::{DefaultBodyLimit, Request, State},
    handler::Handler,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use axum_server::tls_rustls::RustlsConfig;
use percent_encoding::percent_decode_str;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::{ServiceBuilder, ServiceExt};
use tower_http::{
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{error, info, Level};

/// State shared by the handlers of one share.
#[derive(Debug, Clone)]
pub struct AppState {
    pub target: Arc<ResolvedTarget>,
    pub receive: bool,
    pub upload_redirect: Arc<str>,
}

impl AppState {
    pub fn new(target: ResolvedTarget, options: &RunOptions) -> Self {
        Self {
            target: Arc::new(target),
            receive: options.receive,
            upload_redirect: Arc::from(options.upload_redirect.as_str()),
        }
    }
}

/// # Create Axum Application (`create_app`)
///
/// Assembles the router for `state` according to `options`.
pub fn create_app(state: AppState, options: &RunOptions) -> Router {
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::default().include_headers(options.debug))
        .on_request(DefaultOnRequest::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    let mut router: Router<AppState> = Router::new();

    if options.receive {
        let body_limit = match options.max_upload_bytes {
            Some(limit) => DefaultBodyLimit::max(limit),
            None => DefaultBodyLimit::disable(),
        };
        router = router
            .route(RECEIVE_PATH, get(upload::receive_form))
            .route(upload::UPLOAD_PATH, post(upload::upload_file).layer(body_limit));
        info!("Receive mode enabled: uploads go to {}", state.target.root_directory.display());
    }

    router = if state.target.single_file_name.is_some() {
        router.fallback(serve_single_file)
    } else {
        let serve_dir = ServeDir::new(&state.target.root_directory)
            .fallback(listing::list_directory.with_state(state.clone()));
        router.fallback_service(serve_dir)
    };

    let mut router = router.with_state(state);

    if let Some(credentials) = &options.credentials {
        info!("Basic Auth enabled for user '{}'", credentials.username);
        router = router.layer(middleware::from_fn_with_state(
            Arc::new(credentials.clone()),
            auth::require_basic_auth,
        ));
    }

    router.layer(ServiceBuilder::new().layer(trace_layer))
}

/// Serves the one file of a single-file share; any other path is 404.
async fn serve_single_file(State(state): State<AppState>, request: Request) -> Response {
    let requested = percent_decode_str(request.uri().path().trim_start_matches('/'))
        .decode_utf8_lossy()
        .into_owned();

    match (&state.target.single_file_name, state.target.single_file_path()) {
        (Some(name), Some(path)) if requested == *name => {
            match ServeFile::new(path).oneshot(request).await {
                Ok(response) => response.map(Body::new),
                Err(never) => match never {},
            }
        }
        _ => (StatusCode::NOT_FOUND, "Not Found").into_response(),
    }
}

/// # Load TLS Configuration (`load_tls_config`)
///
/// Reads the PEM certificate chain and private key used for `--ssl`. Runs
/// before any port is negotiated or bound, so bad material never produces an
/// announced URL.
///
/// ## Arguments
///
/// * `files`: Certificate and key paths from `--cert`/`--key` or `[tls]`.
///
/// ## Returns
///
/// * `Result<RustlsConfig>`: The rustls server configuration, or
///   `SharingError::Tls` when either file is missing or cannot be parsed.
pub async fn load_tls_config(files: &TlsFiles) -> Result<RustlsConfig> {
    // A provider is only installed once per process; a second call is a no-op.
    let _ = rustls::crypto::ring::default_provider().install_default();

    for path in [&files.cert, &files.key] {
        if !path.is_file() {
            return Err(anyhow!(SharingError::Tls(format!(
                "'{}' does not exist or is not a file",
                path.display()
            ))));
        }
    }

    RustlsConfig::from_pem_file(&files.cert, &files.key)
        .await
        .map_err(|e| {
            anyhow!(SharingError::Tls(format!(
                "could not load certificate '{}' / key '{}': {}",
                files.cert.display(),
                files.key.display(),
                e
            )))
        })
}

/// # Serve (`serve`)
///
/// Runs `app` on `addr` until Ctrl+C or SIGTERM. `on_listening` runs once the
/// socket is bound, before the first request is accepted.
pub async fn serve(
    app: Router,
    addr: SocketAddr,
    tls: Option<RustlsConfig>,
    on_listening: impl FnOnce() -> Result<()>,
) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind TCP listener to address {}", addr))?;
    info!("Listening on {}", addr);
    on_listening()?;

    match tls {
        None => {
            axum::serve(listener, app.into_make_service())
                .with_graceful_shutdown(shutdown_signal())
                .await
                .context("HTTP server failed")?;
        }
        Some(config) => {
            let listener = listener
                .into_std()
                .context("Failed to hand listener to the TLS server")?;
            let handle = axum_server::Handle::new();
            let shutdown_handle = handle.clone();
            tokio::spawn(async move {
                shutdown_signal().await;
                shutdown_handle.graceful_shutdown(Some(Duration::from_secs(5)));
            });
            axum_server::from_tcp_rustls(listener, config)
                .handle(handle)
                .serve(app.into_make_service())
                .await
                .context("HTTPS server failed")?;
        }
    }

    println!("\nStopped sharing.");
    Ok(())
}

/// # Handle Shutdown Signal (`shutdown_signal`)
///
/// Resolves on Ctrl+C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down..."),
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
                info!("Received SIGTERM, shutting down...");
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::share::options::{Credentials, ShareArgs};
    use crate::core::config::Settings;
    use axum::http::{header, Request};
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    const BOUNDARY: &str = "sharing-test-boundary";

    fn options_for(path: &Path, receive: bool, credentials: Option<Credentials>) -> RunOptions {
        let args = ShareArgs {
            path: Some(path.to_path_buf()),
            receive,
            ..Default::default()
        };
        let mut options = RunOptions::from_args(args, &Settings::default()).unwrap();
        options.credentials = credentials;
        options
    }

    fn app_for(
        root: &Path,
        single_file_name: Option<&str>,
        receive: bool,
        credentials: Option<Credentials>,
    ) -> Router {
        let target = ResolvedTarget {
            root_directory: fs::canonicalize(root).unwrap(),
            single_file_name: single_file_name.map(str::to_string),
        };
        let options = options_for(root, receive, credentials);
        create_app(AppState::new(target, &options), &options)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn multipart_request(parts: &[(&str, Option<&str>, &str)]) -> Request<Body> {
        let mut body = String::new();
        for (name, file_name, content) in parts {
            body.push_str(&format!("--{}\r\n", BOUNDARY));
            match file_name {
                Some(file_name) => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                    name, file_name
                )),
                None => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
                    name
                )),
            }
            body.push_str(content);
            body.push_str("\r\n");
        }
        body.push_str(&format!("--{}--\r\n", BOUNDARY));

        Request::builder()
            .method("POST")
            .uri("/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn dir_names(path: &Path) -> Vec<PathBuf> {
        let mut names: Vec<PathBuf> = fs::read_dir(path)
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .collect();
        names.sort();
        names
    }

    fn alice() -> Credentials {
        Credentials {
            username: "alice".into(),
            password: "secret".into(),
        }
    }

    #[tokio::test]
    async fn test_serves_file_from_directory() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("hello.txt"), "hello world").unwrap();
        let app = app_for(temp_dir.path(), None, false, None);

        let response = app.oneshot(get("/hello.txt")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "hello world");
    }

    #[tokio::test]
    async fn test_lists_directory_without_index() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("hello.txt"), "hello world").unwrap();
        fs::create_dir(temp_dir.path().join("photos")).unwrap();
        let app = app_for(temp_dir.path(), None, false, None);

        let response = app.oneshot(get("/")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("Index of &#x2F;"));
        assert!(html.contains("hello.txt"));
        assert!(html.contains("<a href=\"./photos/\">photos/</a>"));
    }

    #[tokio::test]
    async fn test_serves_index_html_when_present() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("index.html"), "<h1>home</h1>").unwrap();
        let app = app_for(temp_dir.path(), None, false, None);

        let response = app.oneshot(get("/")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "<h1>home</h1>");
    }

    #[tokio::test]
    async fn test_missing_path_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let app = app_for(temp_dir.path(), None, false, None);

        let response = app.oneshot(get("/nope.txt")).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_single_file_share_exposes_only_that_file() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("my report.pdf"), "pdf bytes").unwrap();
        fs::write(temp_dir.path().join("secret.txt"), "hidden").unwrap();
        let app = app_for(temp_dir.path(), Some("my report.pdf"), false, None);

        let response = app.clone().oneshot(get("/my%20report.pdf")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "pdf bytes");

        let response = app.clone().oneshot(get("/secret.txt")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app.oneshot(get("/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_basic_auth_rejects_missing_and_wrong_credentials() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("hello.txt"), "hello world").unwrap();
        let app = app_for(temp_dir.path(), None, false, Some(alice()));

        let response = app.clone().oneshot(get("/hello.txt")).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers()[header::WWW_AUTHENTICATE],
            "Basic realm=\"sharing\""
        );

        let wrong = Request::builder()
            .uri("/hello.txt")
            .header(
                header::AUTHORIZATION,
                format!("Basic {}", STANDARD.encode("alice:wrong")),
            )
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(wrong).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_basic_auth_accepts_correct_credentials() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("hello.txt"), "hello world").unwrap();
        let app = app_for(temp_dir.path(), None, false, Some(alice()));

        let request = Request::builder()
            .uri("/hello.txt")
            .header(
                header::AUTHORIZATION,
                format!("Basic {}", STANDARD.encode("alice:secret")),
            )
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "hello world");
    }

    #[tokio::test]
    async fn test_basic_auth_guards_uploads() {
        let temp_dir = TempDir::new().unwrap();
        let app = app_for(temp_dir.path(), None, true, Some(alice()));

        let response = app
            .oneshot(multipart_request(&[("selected", Some("a.txt"), "data")]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(dir_names(temp_dir.path()).is_empty());
    }

    #[tokio::test]
    async fn test_receive_form_served() {
        let temp_dir = TempDir::new().unwrap();
        let app = app_for(temp_dir.path(), None, true, None);

        let response = app.oneshot(get("/receive")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("name=\"selected\""));
    }

    #[tokio::test]
    async fn test_upload_routes_absent_without_receive() {
        let temp_dir = TempDir::new().unwrap();
        let app = app_for(temp_dir.path(), None, false, None);

        let response = app
            .oneshot(multipart_request(&[("selected", Some("a.txt"), "data")]))
            .await
            .unwrap();

        assert_ne!(response.status(), StatusCode::SEE_OTHER);
        assert!(dir_names(temp_dir.path()).is_empty());
    }

    #[tokio::test]
    async fn test_upload_without_file_field_is_bad_request() {
        let temp_dir = TempDir::new().unwrap();
        let app = app_for(temp_dir.path(), None, true, None);

        let response = app
            .oneshot(multipart_request(&[("note", None, "no file here")]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_text(response).await, "No files were received.");
        assert!(dir_names(temp_dir.path()).is_empty());
    }

    #[tokio::test]
    async fn test_upload_empty_file_selection_is_bad_request() {
        let temp_dir = TempDir::new().unwrap();
        let app = app_for(temp_dir.path(), None, true, None);

        let response = app
            .oneshot(multipart_request(&[("selected", Some(""), "")]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(dir_names(temp_dir.path()).is_empty());
    }

    #[tokio::test]
    async fn test_upload_writes_into_root_and_redirects() {
        let temp_dir = TempDir::new().unwrap();
        let app = app_for(temp_dir.path(), None, true, None);

        let response = app
            .oneshot(multipart_request(&[
                ("note", None, "ignored"),
                ("selected", Some("../escape/photo.jpg"), "jpeg bytes"),
            ]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/receive");
        assert_eq!(
            fs::read_to_string(temp_dir.path().join("photo.jpg")).unwrap(),
            "jpeg bytes"
        );
        assert!(!temp_dir.path().join("escape").exists());
    }

    #[tokio::test]
    async fn test_upload_accepts_sample_file_field() {
        let temp_dir = TempDir::new().unwrap();
        let app = app_for(temp_dir.path(), None, true, None);

        let response = app
            .oneshot(multipart_request(&[("sampleFile", Some("notes.txt"), "n")]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert!(temp_dir.path().join("notes.txt").exists());
    }

    #[tokio::test]
    async fn test_load_tls_config_missing_files() {
        let temp_dir = TempDir::new().unwrap();
        let files = TlsFiles {
            cert: temp_dir.path().join("cert.pem"),
            key: temp_dir.path().join("key.pem"),
        };

        let err = load_tls_config(&files).await.unwrap_err();

        assert!(matches!(
            err.downcast_ref::<SharingError>(),
            Some(SharingError::Tls(_))
        ));
    }

    #[tokio::test]
    async fn test_load_tls_config_malformed_files() {
        let temp_dir = TempDir::new().unwrap();
        let files = TlsFiles {
            cert: temp_dir.path().join("cert.pem"),
            key: temp_dir.path().join("key.pem"),
        };
        fs::write(&files.cert, "not a certificate").unwrap();
        fs::write(&files.key, "not a key").unwrap();

        let err = load_tls_config(&files).await.unwrap_err();

        assert!(err.to_string().contains("TLS setup failed"));
    }

    #[tokio::test]
    async fn test_shutdown_signal_creation() {
        let shutdown_future = shutdown_signal();
        drop(shutdown_future);
    }
}

//! Static asset serving for the built dashboard.
//!
//! Anything the other routes don't claim maps onto a file under the asset
//! root. The dashboard is a single-page app, so extensionless paths that
//! don't resolve fall back to `index.html`; real missing assets still 404.

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::header::{self, HeaderValue};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error};

use super::AppState;

const INDEX_FILE: &str = "index.html";
const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Extension to content-type table. Unknown extensions fall through to
/// `application/octet-stream`.
const CONTENT_TYPES: &[(&str, &str)] = &[
    ("html", "text/html"),
    ("js", "application/javascript"),
    ("css", "text/css"),
    ("json", "application/json"),
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("gif", "image/gif"),
    ("svg", "image/svg+xml"),
    ("ico", "image/x-icon"),
    ("woff", "font/woff"),
    ("woff2", "font/woff2"),
    ("ttf", "font/ttf"),
    ("eot", "application/vnd.ms-fontobject"),
];

/// Outcome of mapping a request path onto the asset root.
#[derive(Debug, PartialEq)]
pub(crate) enum Resolution {
    /// Path contained `..`; rejected before touching the filesystem.
    Forbidden,
    File(PathBuf),
    /// Extensionless path with no matching file: single-page-app route.
    SpaFallback(PathBuf),
    NotFound,
}

/// Maps a URI path to a file under `root`.
///
/// The traversal guard runs on the raw request path, before any filesystem
/// resolution: a `..` anywhere is rejected even when the resolved path
/// would have stayed inside the root.
pub(crate) fn resolve(root: &Path, uri_path: &str) -> Resolution {
    if uri_path.contains("..") {
        return Resolution::Forbidden;
    }

    let rel = uri_path.trim_start_matches('/');
    if rel.is_empty() {
        return Resolution::File(root.join(INDEX_FILE));
    }

    let candidate = root.join(rel);
    if candidate.is_file() {
        return Resolution::File(candidate);
    }

    if Path::new(rel).extension().is_none() {
        return Resolution::SpaFallback(root.join(INDEX_FILE));
    }

    Resolution::NotFound
}

/// Fallback handler: any `GET` the explicit routes didn't match.
pub async fn serve_asset(State(state): State<Arc<AppState>>, req: Request) -> Response {
    if req.method() != Method::GET {
        return StatusCode::NOT_FOUND.into_response();
    }

    let uri_path = req.uri().path();
    match resolve(&state.config.static_dir, uri_path) {
        Resolution::Forbidden => {
            debug!(path = uri_path, "Rejected traversal attempt");
            StatusCode::FORBIDDEN.into_response()
        }
        Resolution::NotFound => StatusCode::NOT_FOUND.into_response(),
        Resolution::File(path) | Resolution::SpaFallback(path) => send_file(&path).await,
    }
}

async fn send_file(path: &Path) -> Response {
    match tokio::fs::read(path).await {
        Ok(bytes) => {
            let length = bytes.len();
            let mut response = Response::new(Body::from(bytes));
            let headers = response.headers_mut();
            headers.insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static(content_type(path)),
            );
            headers.insert(header::CONTENT_LENGTH, HeaderValue::from(length));
            response
        }
        Err(e) => {
            error!(path = %path.display(), error = %e, "Asset read failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

fn content_type(path: &Path) -> &'static str {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return DEFAULT_CONTENT_TYPE;
    };
    let ext = ext.to_ascii_lowercase();

    CONTENT_TYPES
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|(_, content_type)| *content_type)
        .unwrap_or(DEFAULT_CONTENT_TYPE)
}

//! Reverse proxy for `/api/n8n/*`.
//!
//! Rewrites the path prefix away, forwards the request to the fixed
//! upstream origin, and streams the response straight back. Bodies are
//! never buffered whole: arbitrary upload and download sizes pass through.

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::header::{self, HeaderMap};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, warn};

use super::AppState;

/// Path prefix stripped before forwarding.
const PROXY_PREFIX: &str = "/api/n8n";

/// Request headers never forwarded upstream. `host` and `connection` belong
/// to the edge hop; the length and framing headers are recomputed by the
/// client once the body is re-streamed.
const STRIPPED_REQUEST_HEADERS: &[header::HeaderName] = &[
    header::HOST,
    header::CONNECTION,
    header::CONTENT_LENGTH,
    header::TRANSFER_ENCODING,
];

/// Response headers invalidated by streaming-through; the transport layer
/// recomputes framing for the client-facing hop.
const STRIPPED_RESPONSE_HEADERS: &[header::HeaderName] = &[
    header::CONTENT_ENCODING,
    header::TRANSFER_ENCODING,
    header::CONNECTION,
    header::CONTENT_LENGTH,
];

/// `ANY /api/n8n/*rest`.
pub async fn forward(State(state): State<Arc<AppState>>, req: Request) -> Response {
    let rest = req
        .uri()
        .path()
        .strip_prefix(PROXY_PREFIX)
        .unwrap_or("/")
        .to_string();
    let query = req
        .uri()
        .query()
        .map(|q| format!("?{q}"))
        .unwrap_or_default();
    let target = format!(
        "{}{}{}",
        state.config.upstream_origin.trim_end_matches('/'),
        rest,
        query
    );

    let method = req.method().clone();
    let headers = forward_request_headers(req.headers());
    let body = reqwest::Body::wrap_stream(req.into_body().into_data_stream());

    debug!(method = %method, target = %target, "Proxying request upstream");

    let upstream = state
        .proxy_client
        .request(method, &target)
        .headers(headers)
        .body(body)
        .send()
        .await;

    match upstream {
        Ok(upstream) => {
            let status = upstream.status();
            let headers = forward_response_headers(upstream.headers());

            let mut response = Response::new(Body::from_stream(upstream.bytes_stream()));
            *response.status_mut() = status;
            *response.headers_mut() = headers;
            response
        }
        Err(e) => {
            warn!(target = %target, error = %e, "Upstream request failed");
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({
                    "error": "bad_gateway",
                    "message": format!("upstream request failed: {e}"),
                })),
            )
                .into_response()
        }
    }
}

/// Copies request headers minus the stripped set, then re-attaches `cookie`
/// explicitly: the upstream workflows rely on it for session auth, and the
/// proxy must never lose it.
pub(crate) fn forward_request_headers(original: &HeaderMap) -> HeaderMap {
    let mut out = HeaderMap::new();
    for (name, value) in original {
        if STRIPPED_REQUEST_HEADERS.contains(name) {
            continue;
        }
        out.append(name.clone(), value.clone());
    }

    if let Some(cookie) = original.get(header::COOKIE) {
        out.insert(header::COOKIE, cookie.clone());
    }

    out
}

pub(crate) fn forward_response_headers(original: &HeaderMap) -> HeaderMap {
    let mut out = HeaderMap::new();
    for (name, value) in original {
        if STRIPPED_RESPONSE_HEADERS.contains(name) {
            continue;
        }
        out.append(name.clone(), value.clone());
    }
    out
}

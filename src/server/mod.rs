//! Edge server: static dashboard assets, health probe, and the same-origin
//! reverse proxy that lets the browser reach the n8n workflows without
//! tripping cross-origin restrictions.

pub mod assets;
pub mod proxy;

use anyhow::{Context, Result, bail};
use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::header::{self, HeaderValue};
use axum::http::{Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{any, get};
use axum::Router;
use chrono::Utc;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tracing::info;

use crate::config::Config;

/// Shared across every request handler. Holds no mutable cross-request
/// state; the start instant exists only for health reporting.
pub struct AppState {
    pub config: Config,
    /// Client used by the proxy path. Built without a total-request timeout
    /// so long downloads stream through untouched.
    pub proxy_client: reqwest::Client,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(config: Config) -> Result<Arc<Self>> {
        let proxy_client = reqwest::Client::builder()
            .connect_timeout(std::time::Duration::from_secs(10))
            .build()?;

        Ok(Arc::new(Self {
            config,
            proxy_client,
            started_at: Instant::now(),
        }))
    }
}

/// Builds the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route("/api/n8n/*rest", any(proxy::forward))
        .fallback(assets::serve_asset)
        .layer(middleware::from_fn(preflight))
        .with_state(state)
}

/// Runs the edge server until a shutdown signal drains it.
///
/// A missing asset root or `index.html` is a fatal misconfiguration, not a
/// retryable condition; the process refuses to start.
pub async fn serve(config: Config) -> Result<()> {
    if !config.static_dir.is_dir() {
        bail!(
            "static asset root {} does not exist; build the dashboard first",
            config.static_dir.display()
        );
    }
    if !config.static_dir.join("index.html").is_file() {
        bail!(
            "no index.html under {}; build the dashboard first",
            config.static_dir.display()
        );
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!(
        %addr,
        static_dir = %config.static_dir.display(),
        upstream = %config.upstream_origin,
        "Edge server listening"
    );

    let state = AppState::new(config)?;
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("In-flight connections drained, exiting");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, draining connections");
}

/// `GET /health` / `GET /healthz`.
async fn health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now(),
        "uptime": state.started_at.elapsed().as_secs(),
        "pid": std::process::id(),
    }))
}

const ALLOWED_METHODS: &str = "GET,POST,PUT,DELETE,OPTIONS";
const ALLOWED_HEADERS: &str = "Content-Type, Authorization, Cookie, X-Requested-With";

/// Answers every `OPTIONS` request with a permissive preflight response
/// before routing: the dashboard calls the proxy with credentials, so the
/// request `Origin` is echoed rather than wildcarded.
async fn preflight(req: Request, next: Next) -> Response {
    if req.method() != Method::OPTIONS {
        return next.run(req).await;
    }

    let origin = req
        .headers()
        .get(header::ORIGIN)
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static("*"));

    let mut response = (StatusCode::OK, Body::empty()).into_response();
    let headers = response.headers_mut();
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin);
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
        HeaderValue::from_static("true"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOWED_METHODS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOWED_HEADERS),
    );
    headers.insert(
        header::ACCESS_CONTROL_MAX_AGE,
        HeaderValue::from_static("86400"),
    );
    response
}

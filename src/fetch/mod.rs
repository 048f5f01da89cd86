//! HTTP access to the upstream workflow endpoints.

mod basic;
mod client;
pub mod auth;

pub use basic::BasicClient;
pub use client::HttpClient;

use anyhow::{Result, anyhow, bail};
use serde_json::Value;

/// Longest upstream error body quoted back in an error message.
const ERROR_BODY_SNIPPET: usize = 200;

/// GETs `url` and parses the body as JSON.
///
/// Non-2xx responses and transport failures become errors that carry the
/// url, status, and a snippet of the body, so the orchestrator's per-source
/// log lines say what actually went wrong.
pub async fn fetch_json(client: &dyn HttpClient, url: &str) -> Result<Value> {
    let req = reqwest::Request::new(
        reqwest::Method::GET,
        url.parse().map_err(|e| anyhow!("Invalid source url {url}: {e}"))?,
    );

    let resp = client
        .execute(req)
        .await
        .map_err(|e| anyhow!("Request to {url} failed: {e}"))?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        bail!("{url} returned status {status}: {}", snippet(&body));
    }

    resp.json()
        .await
        .map_err(|e| anyhow!("Invalid JSON from {url}: {e}"))
}

fn snippet(body: &str) -> &str {
    match body.char_indices().nth(ERROR_BODY_SNIPPET) {
        Some((end, _)) => &body[..end],
        None => body,
    }
}

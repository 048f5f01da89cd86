//! Process configuration.
//!
//! Everything is read from the environment exactly once at startup and
//! carried as an immutable [`Config`]; business logic never reaches into
//! `std::env` on its own.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;

/// Fallback origin for the n8n reverse proxy when `N8N_UPSTREAM_URL` is unset.
pub const DEFAULT_UPSTREAM_ORIGIN: &str = "https://n8n.snowcrest-resort.com";

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_STATIC_DIR: &str = "dist";
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 90;
const DEFAULT_POLL_INTERVAL_SECS: u64 = 86_400;

/// One URL per upstream data family. Each is optional at load time; the
/// orchestrator requires them all only when fixture mode is off.
#[derive(Debug, Clone, Default)]
pub struct SourceUrls {
    pub ticket_sales: Option<String>,
    pub season_pass_sales: Option<String>,
    pub labor: Option<String>,
    pub satisfaction: Option<String>,
}

impl SourceUrls {
    /// Fails with a configuration error naming the first missing variable.
    pub fn require(&self) -> Result<ResolvedSourceUrls> {
        Ok(ResolvedSourceUrls {
            ticket_sales: required(&self.ticket_sales, "TICKET_SALES_URL")?,
            season_pass_sales: required(&self.season_pass_sales, "SEASON_PASS_SALES_URL")?,
            labor: required(&self.labor, "LABOR_URL")?,
            satisfaction: required(&self.satisfaction, "SATISFACTION_URL")?,
        })
    }
}

/// All four source URLs, known to be present.
#[derive(Debug, Clone)]
pub struct ResolvedSourceUrls {
    pub ticket_sales: String,
    pub season_pass_sales: String,
    pub labor: String,
    pub satisfaction: String,
}

fn required(value: &Option<String>, var: &str) -> Result<String> {
    value
        .clone()
        .with_context(|| format!("{var} must be set when fixture mode is off"))
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Edge server listening port.
    pub port: u16,
    /// Root of the built dashboard assets.
    pub static_dir: PathBuf,
    /// Origin the `/api/n8n/*` proxy forwards to.
    pub upstream_origin: String,
    pub sources: SourceUrls,
    /// Sent as `Authorization: Bearer <token>` on every orchestrator call.
    pub bearer_token: Option<String>,
    /// Per-request timeout for orchestrator fetches.
    pub fetch_timeout: Duration,
    /// When set, the orchestrator reads embedded fixture data instead of HTTP.
    pub use_fixtures: bool,
    /// Refresh cadence for the `poll` subcommand.
    pub poll_interval: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let port = match env_opt("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("PORT is not a valid port number: {raw:?}"))?,
            None => DEFAULT_PORT,
        };

        let fetch_timeout_secs = parse_secs("FETCH_TIMEOUT_SECS", DEFAULT_FETCH_TIMEOUT_SECS)?;
        let poll_interval_secs = parse_secs("POLL_INTERVAL_SECS", DEFAULT_POLL_INTERVAL_SECS)?;

        Ok(Config {
            port,
            static_dir: PathBuf::from(
                env_opt("STATIC_DIR").unwrap_or_else(|| DEFAULT_STATIC_DIR.to_string()),
            ),
            upstream_origin: env_opt("N8N_UPSTREAM_URL")
                .unwrap_or_else(|| DEFAULT_UPSTREAM_ORIGIN.to_string()),
            sources: SourceUrls {
                ticket_sales: env_opt("TICKET_SALES_URL"),
                season_pass_sales: env_opt("SEASON_PASS_SALES_URL"),
                labor: env_opt("LABOR_URL"),
                satisfaction: env_opt("SATISFACTION_URL"),
            },
            bearer_token: env_opt("API_BEARER_TOKEN"),
            fetch_timeout: Duration::from_secs(fetch_timeout_secs),
            use_fixtures: env_flag("USE_FIXTURES"),
            poll_interval: Duration::from_secs(poll_interval_secs),
        })
    }
}

/// Reads a variable, treating unset and blank as absent.
fn env_opt(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_flag(name: &str) -> bool {
    matches!(
        env_opt(name).as_deref(),
        Some("1") | Some("true") | Some("yes")
    )
}

fn parse_secs(name: &str, default: u64) -> Result<u64> {
    match env_opt(name) {
        Some(raw) => raw
            .parse::<u64>()
            .with_context(|| format!("{name} is not a valid number of seconds: {raw:?}")),
        None => Ok(default),
    }
}

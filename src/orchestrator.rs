//! Fetch orchestration.
//!
//! One cycle issues every upstream call concurrently, funnels each payload
//! through the normalizer, and assembles a [`DashboardSnapshot`]. Failures
//! are isolated per source: a timed-out ticket-sales workflow leaves the
//! other three cards populated. Only when every source fails does the cycle
//! itself error, so the caller can surface a retryable error state.

use anyhow::{Context, Result, bail};
use chrono::Utc;
use serde_json::Value;
use tracing::{error, info};

use crate::config::Config;
use crate::fetch::{HttpClient, fetch_json};
use crate::normalize::types::{DashboardSnapshot, SalesOverview};
use crate::normalize::{normalize_comparison, normalize_labor, normalize_satisfaction, str_field, unwrap_records};
use crate::season;

/// Comparison-key field within sales records.
const FISCAL_YEAR_KEY: &str = "fiscal_year";
const REVENUE_FIELD: &str = "revenue";
const QUANTITY_FIELD: &str = "quantity";

/// Runs one fetch cycle and builds a fresh snapshot.
///
/// In fixture mode the embedded sample payloads stand in for the network;
/// everything downstream of the fetch is identical.
pub async fn fetch_all(client: &dyn HttpClient, config: &Config) -> Result<DashboardSnapshot> {
    if config.use_fixtures {
        return snapshot_from_fixtures();
    }

    let urls = config.sources.require()?;

    let (ticket_raw, pass_raw, labor_raw, satisfaction_raw) = tokio::join!(
        source_json(client, &urls.ticket_sales, "ticket_sales"),
        source_json(client, &urls.season_pass_sales, "season_pass_sales"),
        source_json(client, &urls.labor, "labor"),
        source_json(client, &urls.satisfaction, "satisfaction"),
    );

    if ticket_raw.is_none()
        && pass_raw.is_none()
        && labor_raw.is_none()
        && satisfaction_raw.is_none()
    {
        bail!("every upstream source failed; nothing to display");
    }

    let today = Utc::now().date_naive();
    let current = season::current_label(today);
    let previous = season::previous_label(today);

    let snapshot = assemble(
        ticket_raw.as_ref().map(|raw| (raw, current.as_str(), previous.as_str())),
        pass_raw.as_ref().map(|raw| (raw, current.as_str(), previous.as_str())),
        labor_raw.as_ref(),
        satisfaction_raw.as_ref(),
    );

    info!(
        ticket_sales = snapshot.sales.ticket_sales.is_some(),
        season_pass_sales = snapshot.sales.season_pass_sales.is_some(),
        labor = snapshot.labor.is_some(),
        satisfaction = snapshot.satisfaction.is_some(),
        "Fetch cycle complete"
    );

    Ok(snapshot)
}

/// Fetches one source, converting failure into an absent payload. The error
/// is logged with request context here and nowhere else.
async fn source_json(client: &dyn HttpClient, url: &str, family: &str) -> Option<Value> {
    match fetch_json(client, url).await {
        Ok(value) => Some(value),
        Err(e) => {
            error!(family, url, error = %e, "Upstream source failed");
            None
        }
    }
}

fn assemble(
    ticket: Option<(&Value, &str, &str)>,
    pass: Option<(&Value, &str, &str)>,
    labor: Option<&Value>,
    satisfaction: Option<&Value>,
) -> DashboardSnapshot {
    DashboardSnapshot {
        sales: SalesOverview {
            ticket_sales: ticket.and_then(|(raw, current, previous)| {
                normalize_comparison(
                    raw,
                    FISCAL_YEAR_KEY,
                    current,
                    previous,
                    REVENUE_FIELD,
                    QUANTITY_FIELD,
                )
            }),
            season_pass_sales: pass.and_then(|(raw, current, previous)| {
                normalize_comparison(
                    raw,
                    FISCAL_YEAR_KEY,
                    current,
                    previous,
                    REVENUE_FIELD,
                    QUANTITY_FIELD,
                )
            }),
        },
        labor: labor.and_then(normalize_labor),
        satisfaction: satisfaction.and_then(normalize_satisfaction),
        generated_at: Utc::now(),
    }
}

mod fixtures {
    pub const TICKET_SALES: &str = include_str!("../fixtures/ticket_sales.json");
    pub const SEASON_PASS_SALES: &str = include_str!("../fixtures/season_pass_sales.json");
    pub const LABOR: &str = include_str!("../fixtures/labor.json");
    pub const SATISFACTION: &str = include_str!("../fixtures/satisfaction.json");
}

/// Offline/local mode: the embedded sample payloads replace the network.
/// Comparison labels come from the fixture data itself rather than the
/// clock, so the samples never go stale.
fn snapshot_from_fixtures() -> Result<DashboardSnapshot> {
    let ticket: Value =
        serde_json::from_str(fixtures::TICKET_SALES).context("ticket sales fixture")?;
    let pass: Value =
        serde_json::from_str(fixtures::SEASON_PASS_SALES).context("season pass fixture")?;
    let labor: Value = serde_json::from_str(fixtures::LABOR).context("labor fixture")?;
    let satisfaction: Value =
        serde_json::from_str(fixtures::SATISFACTION).context("satisfaction fixture")?;

    let (ticket_current, ticket_previous) =
        comparison_labels(&ticket).context("ticket sales fixture has no fiscal years")?;
    let (pass_current, pass_previous) =
        comparison_labels(&pass).context("season pass fixture has no fiscal years")?;

    info!("Serving embedded fixture data instead of upstream sources");

    Ok(assemble(
        Some((&ticket, ticket_current.as_str(), ticket_previous.as_str())),
        Some((&pass, pass_current.as_str(), pass_previous.as_str())),
        Some(&labor),
        Some(&satisfaction),
    ))
}

/// Two most recent fiscal-year labels present in a payload, newest first.
fn comparison_labels(raw: &Value) -> Option<(String, String)> {
    let mut labels: Vec<String> = unwrap_records(raw)
        .iter()
        .filter_map(|record| str_field(record, FISCAL_YEAR_KEY))
        .collect();
    labels.sort();
    labels.dedup();

    let current = labels.pop()?;
    let previous = labels.pop()?;
    Some((current, previous))
}

//! The fixed presentation schema the dashboard consumes.
//!
//! Field names serialize in camelCase to match what the chart widgets
//! expect. Every value here is built fresh each fetch cycle and never
//! mutated afterwards.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Revenue and unit volume for one season.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodFigures {
    /// Fiscal-year label, e.g. `FY26`.
    pub period: String,
    pub revenue: f64,
    pub quantity: f64,
}

/// Absolute and relative movement between two seasons.
///
/// `percent_change` is `0` whenever the previous-season value is zero or
/// negative; it never results from a division by zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Delta {
    pub percent_change: f64,
    pub absolute_change: f64,
}

/// Season-over-season comparison for one sales family.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonMetric {
    pub current_season: PeriodFigures,
    pub last_season: PeriodFigures,
    pub revenue_comparison: Delta,
    pub quantity_comparison: Delta,
}

/// Labor cost totals for one consolidated division.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DivisionEntry {
    pub division: String,
    pub total_labor: f64,
    pub total_hours: f64,
    pub revenue: f64,
    /// `round2(labor / revenue * 100)`, `0` when revenue is not positive.
    pub percent_of_revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LaborSummary {
    pub total_labor: f64,
    pub total_hours: f64,
    pub total_revenue: f64,
    pub percent_of_revenue: f64,
    pub by_division: Vec<DivisionEntry>,
}

/// Guest satisfaction scores for yesterday against the same day last year.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SatisfactionSnapshot {
    pub yesterday_score: f64,
    pub last_year_yesterday_score: f64,
    pub yesterday_compset: f64,
    pub last_year_yesterday_compset: f64,
    pub score_difference: f64,
    pub percent_change: f64,
    pub yesterday_date: Option<String>,
    pub last_year_yesterday_date: Option<String>,
}

/// The two sales comparisons; either may be absent when its upstream
/// source failed or returned nothing usable.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesOverview {
    pub ticket_sales: Option<ComparisonMetric>,
    pub season_pass_sales: Option<ComparisonMetric>,
}

/// One complete, internally consistent set of dashboard data.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub sales: SalesOverview,
    pub labor: Option<LaborSummary>,
    pub satisfaction: Option<SatisfactionSnapshot>,
    pub generated_at: DateTime<Utc>,
}

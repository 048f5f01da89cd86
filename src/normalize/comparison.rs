//! Season-over-season sales comparison.

use serde_json::Value;
use tracing::debug;

use crate::normalize::types::{ComparisonMetric, Delta, PeriodFigures};
use crate::normalize::{num_field, str_field, unwrap_records};

/// Builds a [`ComparisonMetric`] from a raw upstream payload.
///
/// Looks up the record whose `key` field equals `current_value` and the one
/// equal to `previous_value`, then computes absolute and percent change for
/// the revenue and quantity fields. Returns `None` when the payload is not a
/// non-empty collection or either period's record is missing; callers treat
/// that as "no data", not as an error.
pub fn normalize_comparison(
    raw: &Value,
    key: &str,
    current_value: &str,
    previous_value: &str,
    revenue_field: &str,
    quantity_field: &str,
) -> Option<ComparisonMetric> {
    let records = unwrap_records(raw);
    if records.is_empty() {
        debug!(key, "Comparison payload empty, skipping");
        return None;
    }

    let current = find_period(&records, key, current_value)?;
    let previous = find_period(&records, key, previous_value)?;

    let current = period_figures(current, current_value, revenue_field, quantity_field);
    let previous = period_figures(previous, previous_value, revenue_field, quantity_field);

    Some(ComparisonMetric {
        revenue_comparison: delta(current.revenue, previous.revenue),
        quantity_comparison: delta(current.quantity, previous.quantity),
        current_season: current,
        last_season: previous,
    })
}

fn find_period<'a>(records: &[&'a Value], key: &str, value: &str) -> Option<&'a Value> {
    let found = records
        .iter()
        .find(|record| {
            str_field(record, key)
                .map(|v| v.eq_ignore_ascii_case(value))
                .unwrap_or(false)
        })
        .copied();

    if found.is_none() {
        debug!(key, value, "No record for comparison period");
    }
    found
}

fn period_figures(
    record: &Value,
    period: &str,
    revenue_field: &str,
    quantity_field: &str,
) -> PeriodFigures {
    PeriodFigures {
        period: period.to_string(),
        revenue: num_field(record, revenue_field),
        quantity: num_field(record, quantity_field),
    }
}

/// Percent change is `0` when the previous value is not positive: dividing
/// by zero is undefined and a percentage against a negative base is
/// meaningless on a sales chart.
fn delta(current: f64, previous: f64) -> Delta {
    let percent_change = if previous <= 0.0 {
        0.0
    } else {
        (current - previous) / previous * 100.0
    };

    Delta {
        percent_change,
        absolute_change: current - previous,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn two_seasons() -> Value {
        json!({"data": [
            {"Fiscal_Year": "FY26", "Revenue": 1200.0, "Quantity": 300.0},
            {"Fiscal_Year": "FY25", "Revenue": 1000.0, "Quantity": 250.0}
        ]})
    }

    fn normalize(raw: &Value) -> Option<ComparisonMetric> {
        normalize_comparison(raw, "fiscal_year", "FY26", "FY25", "revenue", "quantity")
    }

    #[test]
    fn test_percent_and_absolute_change() {
        let metric = normalize(&two_seasons()).unwrap();

        assert_eq!(metric.current_season.period, "FY26");
        assert_eq!(metric.last_season.revenue, 1000.0);
        assert_eq!(metric.revenue_comparison.percent_change, 20.0);
        assert_eq!(metric.revenue_comparison.absolute_change, 200.0);
        assert_eq!(metric.quantity_comparison.percent_change, 20.0);
        assert_eq!(metric.quantity_comparison.absolute_change, 50.0);
    }

    #[test]
    fn test_percent_change_exact_against_previous() {
        let raw = json!([
            {"fiscal_year": "FY26", "revenue": 107.0, "quantity": 0.0},
            {"fiscal_year": "FY25", "revenue": 64.0, "quantity": 0.0}
        ]);
        let metric = normalize(&raw).unwrap();

        assert_eq!(
            metric.revenue_comparison.percent_change,
            (107.0 - 64.0) / 64.0 * 100.0
        );
    }

    #[test]
    fn test_zero_previous_value_yields_zero_percent() {
        let raw = json!([
            {"fiscal_year": "FY26", "revenue": 500.0, "quantity": 10.0},
            {"fiscal_year": "FY25", "revenue": 0.0, "quantity": -5.0}
        ]);
        let metric = normalize(&raw).unwrap();

        assert_eq!(metric.revenue_comparison.percent_change, 0.0);
        assert_eq!(metric.revenue_comparison.absolute_change, 500.0);
        assert_eq!(metric.quantity_comparison.percent_change, 0.0);
        assert_eq!(metric.quantity_comparison.absolute_change, 15.0);
    }

    #[test]
    fn test_empty_input_returns_none() {
        assert!(normalize(&json!([])).is_none());
        assert!(normalize(&json!({"data": []})).is_none());
        assert!(normalize(&json!("not a collection")).is_none());
    }

    #[test]
    fn test_missing_period_returns_none() {
        let missing_current = json!([{"fiscal_year": "FY25", "revenue": 1.0, "quantity": 1.0}]);
        assert!(normalize(&missing_current).is_none());

        let missing_previous = json!([{"fiscal_year": "FY26", "revenue": 1.0, "quantity": 1.0}]);
        assert!(normalize(&missing_previous).is_none());
    }

    #[test]
    fn test_missing_value_fields_default_to_zero() {
        let raw = json!([
            {"fiscal_year": "FY26"},
            {"fiscal_year": "FY25"}
        ]);
        let metric = normalize(&raw).unwrap();

        assert_eq!(metric.current_season.revenue, 0.0);
        assert_eq!(metric.revenue_comparison.percent_change, 0.0);
    }

    #[test]
    fn test_idempotent() {
        let raw = two_seasons();
        assert_eq!(normalize(&raw), normalize(&raw));
    }
}

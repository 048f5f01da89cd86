//! Labor cost consolidation.
//!
//! The labor workflow reports one record per payroll division, with names
//! that drift between exports ("F&B - Summit Lodge", "Food and Beverage",
//! "Lift Ops"). The dashboard shows exactly four divisions, so every record
//! is folded into a canonical bucket by case-insensitive substring matching
//! against a static alias table.

use serde_json::Value;
use tracing::debug;

use crate::normalize::types::{DivisionEntry, LaborSummary};
use crate::normalize::{num_field, num_field_any, round2, str_field_any, unwrap_records};

/// Canonical divisions and the substrings that map a raw name into them.
/// Order matters twice: buckets are checked first to last (first match
/// wins), and the output lists divisions in this order.
const DIVISION_ALIASES: &[(&str, &[&str])] = &[
    (
        "Guest Services",
        &[
            "guest service",
            "ticketing",
            "ticket office",
            "rental",
            "retail",
            "ski school",
            "snowsports",
        ],
    ),
    (
        "Hospitality",
        &["hospitality", "lodging", "hotel", "housekeeping", "spa"],
    ),
    (
        "Mountain Operations",
        &[
            "mountain op",
            "lift",
            "grooming",
            "patrol",
            "snowmaking",
            "terrain",
        ],
    ),
    (
        "Food & Beverage",
        &["food", "beverage", "f&b", "culinary", "restaurant", "catering"],
    ),
];

/// Consolidates raw labor records into the four canonical divisions.
///
/// Returns `None` when the payload holds no records. Divisions matching no
/// alias are dropped from every total.
pub fn normalize_labor(raw: &Value) -> Option<LaborSummary> {
    let records = unwrap_records(raw);
    if records.is_empty() {
        debug!("Labor payload empty, skipping");
        return None;
    }

    let mut buckets: Vec<DivisionEntry> = DIVISION_ALIASES
        .iter()
        .map(|(name, _)| DivisionEntry {
            division: name.to_string(),
            total_labor: 0.0,
            total_hours: 0.0,
            revenue: 0.0,
            percent_of_revenue: 0.0,
        })
        .collect();

    for record in &records {
        let Some(name) = str_field_any(record, &["division", "department", "name"]) else {
            debug!("Labor record without a division name, skipping");
            continue;
        };

        let Some(index) = bucket_index(&name) else {
            debug!(division = %name, "Labor division matches no canonical bucket, dropping");
            continue;
        };

        let bucket = &mut buckets[index];
        bucket.total_labor += num_field_any(record, &["total_labor", "labor_cost", "labor"]);
        bucket.total_hours += num_field_any(record, &["total_hours", "hours"]);
        bucket.revenue += num_field(record, "revenue");
    }

    let mut total_labor = 0.0;
    let mut total_hours = 0.0;
    let mut total_revenue = 0.0;

    for bucket in &mut buckets {
        bucket.percent_of_revenue = percent_of_revenue(bucket.total_labor, bucket.revenue);
        total_labor += bucket.total_labor;
        total_hours += bucket.total_hours;
        total_revenue += bucket.revenue;
    }

    Some(LaborSummary {
        total_labor,
        total_hours,
        total_revenue,
        percent_of_revenue: percent_of_revenue(total_labor, total_revenue),
        by_division: buckets,
    })
}

/// First bucket whose alias list contains a substring of `name`,
/// case-insensitively.
fn bucket_index(name: &str) -> Option<usize> {
    let lowered = name.to_lowercase();
    DIVISION_ALIASES
        .iter()
        .position(|(_, aliases)| aliases.iter().any(|alias| lowered.contains(alias)))
}

fn percent_of_revenue(labor: f64, revenue: f64) -> f64 {
    if revenue <= 0.0 {
        0.0
    } else {
        round2(labor / revenue * 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payroll() -> Value {
        json!([
            {"Division": "Guest Services - Ticketing", "Total_Labor": 200.0, "Total_Hours": 10.0, "Revenue": 1000.0},
            {"Division": "Lift Operations", "Total_Labor": 300.0, "Total_Hours": 15.0, "Revenue": 2000.0},
            {"Division": "Snowmaking", "Total_Labor": 100.0, "Total_Hours": 5.0, "Revenue": 0.0},
            {"Division": "F&B - Summit Lodge", "Total_Labor": 150.0, "Total_Hours": 8.0, "Revenue": 600.0}
        ])
    }

    fn entry<'a>(summary: &'a LaborSummary, division: &str) -> &'a DivisionEntry {
        summary
            .by_division
            .iter()
            .find(|e| e.division == division)
            .unwrap()
    }

    #[test]
    fn test_consolidates_into_canonical_buckets() {
        let summary = normalize_labor(&payroll()).unwrap();

        assert_eq!(summary.by_division.len(), 4);

        let mountain = entry(&summary, "Mountain Operations");
        assert_eq!(mountain.total_labor, 400.0);
        assert_eq!(mountain.total_hours, 20.0);
        assert_eq!(mountain.revenue, 2000.0);
        assert_eq!(mountain.percent_of_revenue, 20.0);

        assert_eq!(entry(&summary, "Guest Services").total_labor, 200.0);
        assert_eq!(entry(&summary, "Food & Beverage").total_labor, 150.0);
    }

    #[test]
    fn test_overall_totals_and_percent() {
        let summary = normalize_labor(&payroll()).unwrap();

        assert_eq!(summary.total_labor, 750.0);
        assert_eq!(summary.total_hours, 38.0);
        assert_eq!(summary.total_revenue, 3600.0);
        assert_eq!(summary.percent_of_revenue, round2(750.0 / 3600.0 * 100.0));
    }

    #[test]
    fn test_unmatched_divisions_are_dropped() {
        let raw = json!([
            {"Division": "Corporate Admin", "Total_Labor": 999.0, "Total_Hours": 40.0, "Revenue": 100.0},
            {"Division": "Hotel Housekeeping", "Total_Labor": 50.0, "Total_Hours": 4.0, "Revenue": 500.0}
        ]);
        let summary = normalize_labor(&raw).unwrap();

        assert_eq!(summary.total_labor, 50.0);
        assert_eq!(entry(&summary, "Hospitality").total_labor, 50.0);
    }

    #[test]
    fn test_zero_revenue_bucket_has_zero_percent() {
        let raw = json!([
            {"Division": "Ski School", "Total_Labor": 80.0, "Total_Hours": 6.0, "Revenue": 0.0}
        ]);
        let summary = normalize_labor(&raw).unwrap();

        assert_eq!(entry(&summary, "Guest Services").percent_of_revenue, 0.0);
        assert_eq!(summary.percent_of_revenue, 0.0);
    }

    #[test]
    fn test_first_bucket_wins_on_ambiguous_name() {
        // "Rental Shop - Hotel Annex" matches both Guest Services ("rental")
        // and Hospitality ("hotel"); Guest Services is checked first.
        let raw = json!([
            {"Division": "Rental Shop - Hotel Annex", "Total_Labor": 10.0, "Total_Hours": 1.0, "Revenue": 100.0}
        ]);
        let summary = normalize_labor(&raw).unwrap();

        assert_eq!(entry(&summary, "Guest Services").total_labor, 10.0);
        assert_eq!(entry(&summary, "Hospitality").total_labor, 0.0);
    }

    #[test]
    fn test_empty_input_returns_none() {
        assert!(normalize_labor(&json!([])).is_none());
        assert!(normalize_labor(&json!({"data": []})).is_none());
        assert!(normalize_labor(&json!(null)).is_none());
    }

    #[test]
    fn test_idempotent() {
        let raw = payroll();
        assert_eq!(normalize_labor(&raw), normalize_labor(&raw));
    }

    #[test]
    fn test_wrapped_payload() {
        let raw = json!({"data": [
            {"division": "lift maintenance", "total_labor": 5.0, "total_hours": 1.0, "revenue": 10.0}
        ]});
        let summary = normalize_labor(&raw).unwrap();

        assert_eq!(entry(&summary, "Mountain Operations").total_labor, 5.0);
    }
}

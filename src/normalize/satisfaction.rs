//! Guest satisfaction snapshot.

use serde_json::Value;
use tracing::debug;

use crate::normalize::types::SatisfactionSnapshot;
use crate::normalize::{field, num_field_any, unwrap_records};

/// Builds a [`SatisfactionSnapshot`] from a raw upstream payload.
///
/// The workflow sometimes returns a lone object and sometimes a one-element
/// collection; only the first element is used either way. Numeric fields
/// default to `0`, dates to `null`. Returns `None` on empty input.
pub fn normalize_satisfaction(raw: &Value) -> Option<SatisfactionSnapshot> {
    let records = unwrap_records(raw);
    let Some(record) = records.first() else {
        debug!("Satisfaction payload empty, skipping");
        return None;
    };

    Some(SatisfactionSnapshot {
        yesterday_score: num_field_any(record, &["yesterday_score", "score_yesterday", "score"]),
        last_year_yesterday_score: num_field_any(
            record,
            &[
                "last_year_yesterday_score",
                "yesterday_score_last_year",
                "ly_yesterday_score",
            ],
        ),
        yesterday_compset: num_field_any(
            record,
            &["yesterday_compset", "compset_yesterday", "compset"],
        ),
        last_year_yesterday_compset: num_field_any(
            record,
            &[
                "last_year_yesterday_compset",
                "compset_last_year",
                "ly_yesterday_compset",
            ],
        ),
        score_difference: num_field_any(record, &["score_difference", "difference"]),
        percent_change: num_field_any(record, &["percent_change", "pct_change"]),
        yesterday_date: date_field(record, &["yesterday_date", "date"]),
        last_year_yesterday_date: date_field(
            record,
            &["last_year_yesterday_date", "ly_date", "date_last_year"],
        ),
    })
}

fn date_field(record: &Value, names: &[&str]) -> Option<String> {
    names
        .iter()
        .find_map(|name| field(record, name))
        .and_then(Value::as_str)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

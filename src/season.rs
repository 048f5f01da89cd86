//! Fiscal-year labels for season-over-season comparisons.
//!
//! A winter season straddles two calendar years, so upstream records are
//! keyed by the fiscal year the season ends in: August onward belongs to the
//! next label. `FY26` covers August 2025 through July 2026.

use chrono::{Datelike, NaiveDate};

/// First month of a new fiscal year.
const FISCAL_YEAR_START_MONTH: u32 = 8;

/// Calendar year the fiscal year containing `date` ends in.
pub fn fiscal_year_ending(date: NaiveDate) -> i32 {
    if date.month() >= FISCAL_YEAR_START_MONTH {
        date.year() + 1
    } else {
        date.year()
    }
}

/// Formats a fiscal year as the two-digit label used by the upstream
/// workflows, e.g. `FY26`.
pub fn label(fiscal_year: i32) -> String {
    format!("FY{:02}", fiscal_year.rem_euclid(100))
}

/// Label of the fiscal year containing `date`.
pub fn current_label(date: NaiveDate) -> String {
    label(fiscal_year_ending(date))
}

/// Label of the fiscal year before the one containing `date`.
pub fn previous_label(date: NaiveDate) -> String {
    label(fiscal_year_ending(date) - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_midwinter_belongs_to_ending_year() {
        assert_eq!(current_label(date(2026, 1, 15)), "FY26");
        assert_eq!(previous_label(date(2026, 1, 15)), "FY25");
    }

    #[test]
    fn test_rollover_in_august() {
        assert_eq!(current_label(date(2025, 7, 31)), "FY25");
        assert_eq!(current_label(date(2025, 8, 1)), "FY26");
    }

    #[test]
    fn test_label_zero_pads() {
        assert_eq!(label(2105), "FY05");
    }
}

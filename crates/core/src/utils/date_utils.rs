//! Financial-year and day-count utilities.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use chrono_tz::Tz;

/// Default timezone for valuation dates.
/// This is the canonical timezone used to convert UTC instants to domain
/// dates. Fund NAVs are declared against Indian market close, so
/// Asia/Kolkata is the sensible default.
pub const DEFAULT_VALUATION_TZ: Tz = chrono_tz::Asia::Kolkata;

/// Converts a UTC instant to a valuation date in the given timezone.
pub fn valuation_date_from_utc(instant: DateTime<Utc>, tz: Tz) -> NaiveDate {
    instant.with_timezone(&tz).date_naive()
}

/// Convenience function that uses the default valuation timezone.
pub fn valuation_date_today() -> NaiveDate {
    valuation_date_from_utc(Utc::now(), DEFAULT_VALUATION_TZ)
}

/// Number of whole days the units were held, from purchase to sale.
pub fn holding_days(purchase_date: NaiveDate, sale_date: NaiveDate) -> i64 {
    (sale_date - purchase_date).num_days()
}

/// Financial-year label for a date, e.g. `FY 2023-24`.
/// The financial year runs April 1 through March 31.
pub fn financial_year_label(date: NaiveDate) -> String {
    let start_year = if date.month() >= 4 {
        date.year()
    } else {
        date.year() - 1
    };
    format!("FY {}-{:02}", start_year, (start_year + 1) % 100)
}

/// Inclusive calendar-day range from `start` through `end`.
pub fn get_days_between(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    if start > end {
        return Vec::new();
    }
    let mut days = Vec::new();
    let mut current = start;
    while current <= end {
        days.push(current);
        if let Some(next) = current.succ_opt() {
            current = next;
        } else {
            break;
        }
    }
    days
}

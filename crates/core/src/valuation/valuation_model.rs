//! Daily valuation domain models.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One fund's state on one calendar day.
///
/// Only emitted for days where the fund held a reportable number of units
/// and a NAV (exact or carried forward) was known; gaps are allowed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyValuationPoint {
    pub date: NaiveDate,
    pub units: Decimal,
    pub nav: Decimal,
    pub value: Decimal,
    pub cost: Decimal,
}

/// One day of the combined portfolio series.
///
/// Sums only the funds that have a data point on that date; a fund with no
/// point is excluded from the day's sum, not treated as zero. The set of
/// participants therefore varies along the series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioValuationPoint {
    pub date: NaiveDate,
    pub value: Decimal,
    pub cost: Decimal,
    /// Number of funds contributing to this day's sum.
    pub fund_count: usize,
}

//! Tax-lot ledger domain models.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::transactions::CashFlow;

/// One purchase lot, tracked until fully sold.
///
/// Owned exclusively by one folio's FIFO queue. `units` is the remaining
/// quantity and is only ever reduced by redemption consumption.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitBatch {
    pub units: Decimal,
    pub original_units: Decimal,
    pub cost_nav_per_unit: Decimal,
    pub purchase_date: NaiveDate,
}

/// One slice of a lot consumed by a redemption.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LotConsumption {
    pub folio: String,
    pub units: Decimal,
    pub cost_nav_per_unit: Decimal,
    pub sale_nav: Decimal,
    pub purchase_date: NaiveDate,
    pub sale_date: NaiveDate,
    pub holding_days: i64,
    /// `units * (sale_nav - cost_nav_per_unit)`.
    pub gain: Decimal,
}

/// Aggregated, derived state of one folio after a full ledger replay.
///
/// Recomputed wholesale on every run, never incrementally patched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolioSummary {
    pub folio_number: String,
    pub invested: Decimal,
    pub withdrawn: Decimal,
    pub realized_gain: Decimal,
    pub purchased_units: Decimal,
    pub redeemed_units: Decimal,
    pub remaining_units: Decimal,
    pub remaining_cost: Decimal,
    pub current_value: Decimal,
    pub unrealized_gain: Decimal,
    /// Unit-weighted age in days of the remaining lots, as of the replay date.
    pub average_holding_days: i64,
    /// Realized flows in transaction order: one Buy per purchase, one Sell
    /// per consumed lot slice. Never contains valuation pseudo-flows.
    pub cash_flows: Vec<CashFlow>,
}

/// Output of one single-pass folio replay: the summary aggregates plus the
/// detailed consumption-event log, produced together so the two views can
/// never drift.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerRun {
    pub summary: FolioSummary,
    pub consumptions: Vec<LotConsumption>,
}

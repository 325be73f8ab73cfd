//! Transaction and cash-flow domain models.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Direction of a fund transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    Purchase,
    Redemption,
}

/// One buy or sell against a folio, as parsed upstream.
///
/// Units carry a positive magnitude regardless of direction; the sign of
/// the cash effect is derived from `txn_type`. Transactions are immutable
/// once ingested and are the source of truth for all derived state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub txn_type: TransactionType,
    pub date: NaiveDate,
    pub units: Decimal,
    pub nav: Decimal,
    pub folio: String,
}

impl Transaction {
    pub fn new(
        txn_type: TransactionType,
        date: NaiveDate,
        units: Decimal,
        nav: Decimal,
        folio: impl Into<String>,
    ) -> Self {
        Self {
            txn_type,
            date,
            units: units.abs(),
            nav,
            folio: folio.into(),
        }
    }
}

/// One point of a fund's NAV time series. Sparse; not necessarily daily.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavPoint {
    pub date: NaiveDate,
    pub nav: Decimal,
}

/// Direction of a realized cash flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlowKind {
    Buy,
    Sell,
}

/// A dated cash movement used for return computation.
///
/// Amounts are signed: buys negative (money out of pocket), sells positive
/// (actual sale proceeds, not lot cost). Zero-amount flows are never built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashFlow {
    pub kind: FlowKind,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub nav: Decimal,
    pub units: Decimal,
}

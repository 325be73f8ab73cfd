//! Single-pass FIFO replay of a folio's transactions.
//!
//! One replay produces both the folio's summary aggregates and the detailed
//! lot-consumption log; there is no second bookkeeping path that could
//! drift from this one.

use chrono::NaiveDate;
use log::warn;
use num_traits::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::VecDeque;

use crate::constants::{LOT_EPSILON_ABS, LOT_EPSILON_REL};
use crate::funds::Folio;
use crate::ledger::{FolioSummary, LedgerRun, LotConsumption, UnitBatch};
use crate::transactions::{CashFlow, FlowKind, Transaction, TransactionType};
use crate::utils::holding_days;

/// A slice taken off the front of the queue by one redemption.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsumedSlice {
    pub units: Decimal,
    pub cost_nav_per_unit: Decimal,
    pub purchase_date: NaiveDate,
}

/// FIFO queue of purchase lots. Lots are shrunk in place or removed from
/// the front; they are never reordered and never partially un-consumed.
#[derive(Debug, Clone, Default)]
pub struct LotQueue {
    batches: VecDeque<UnitBatch>,
}

impl LotQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_lot(&mut self, units: Decimal, cost_nav_per_unit: Decimal, purchase_date: NaiveDate) {
        self.batches.push_back(UnitBatch {
            units,
            original_units: units,
            cost_nav_per_unit,
            purchase_date,
        });
    }

    /// Consumes up to `units_to_sell` units oldest-first.
    ///
    /// Returns the consumed slices and the unsatisfied remainder. The
    /// remainder is non-zero only when the queue runs dry, which indicates
    /// inconsistent input data; callers decide how loudly to report it.
    pub fn consume(&mut self, mut units_to_sell: Decimal) -> (Vec<ConsumedSlice>, Decimal) {
        let mut slices = Vec::new();
        while units_to_sell > Decimal::ZERO {
            let Some(front) = self.batches.front_mut() else {
                break;
            };
            let mut take = front.units.min(units_to_sell);
            front.units -= take;
            units_to_sell -= take;
            // A residue below tolerance is dust, not a position. It is
            // folded into the slice that emptied the lot, so consumed
            // plus remaining always equals what was purchased.
            if front.units > Decimal::ZERO
                && (front.units <= LOT_EPSILON_ABS
                    || front.units <= front.original_units * LOT_EPSILON_REL)
            {
                take += front.units;
                front.units = Decimal::ZERO;
            }
            slices.push(ConsumedSlice {
                units: take,
                cost_nav_per_unit: front.cost_nav_per_unit,
                purchase_date: front.purchase_date,
            });
            if front.units.is_zero() {
                self.batches.pop_front();
            }
        }
        (slices, units_to_sell)
    }

    pub fn remaining_units(&self) -> Decimal {
        self.batches.iter().map(|b| b.units).sum()
    }

    pub fn remaining_cost(&self) -> Decimal {
        self.batches
            .iter()
            .map(|b| b.units * b.cost_nav_per_unit)
            .sum()
    }

    pub fn batches(&self) -> impl Iterator<Item = &UnitBatch> {
        self.batches.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }
}

/// Replays one folio's transactions through a fresh FIFO queue.
///
/// * `latest_nav` prices the remaining units for current value; `None`
///   leaves current value and unrealized gain at zero.
/// * `as_of` anchors the average holding age of the remaining lots.
///
/// Transactions are re-sorted by date defensively; the input is expected
/// to be ascending already.
pub fn replay_folio(folio: &Folio, latest_nav: Option<Decimal>, as_of: NaiveDate) -> LedgerRun {
    let mut transactions: Vec<Transaction> = folio.transactions.clone();
    transactions.sort_by_key(|t| t.date);

    let mut queue = LotQueue::new();
    let mut summary = FolioSummary {
        folio_number: folio.folio_number.clone(),
        ..Default::default()
    };
    let mut consumptions = Vec::new();

    for txn in &transactions {
        match txn.txn_type {
            TransactionType::Purchase => {
                process_purchase(txn, &mut queue, &mut summary);
            }
            TransactionType::Redemption => {
                process_redemption(txn, &mut queue, &mut summary, &mut consumptions);
            }
        }
    }

    summary.remaining_units = queue.remaining_units();
    summary.remaining_cost = queue.remaining_cost();
    if let Some(nav) = latest_nav {
        summary.current_value = summary.remaining_units * nav;
    }
    summary.unrealized_gain = summary.current_value - summary.remaining_cost;
    summary.average_holding_days = average_holding_days(&queue, as_of);

    LedgerRun {
        summary,
        consumptions,
    }
}

fn process_purchase(txn: &Transaction, queue: &mut LotQueue, summary: &mut FolioSummary) {
    // Invalid amounts still count toward the unit total so that unit
    // conservation holds against the redemption side.
    summary.purchased_units += txn.units;
    if txn.units <= Decimal::ZERO || txn.nav <= Decimal::ZERO {
        warn!(
            "Folio {}: purchase on {} with units {} nav {} contributes zero cost",
            summary.folio_number, txn.date, txn.units, txn.nav
        );
        return;
    }
    queue.push_lot(txn.units, txn.nav, txn.date);
    let amount = txn.units * txn.nav;
    summary.invested += amount;
    if !amount.is_zero() {
        summary.cash_flows.push(CashFlow {
            kind: FlowKind::Buy,
            amount: -amount,
            date: txn.date,
            nav: txn.nav,
            units: txn.units,
        });
    }
}

fn process_redemption(
    txn: &Transaction,
    queue: &mut LotQueue,
    summary: &mut FolioSummary,
    consumptions: &mut Vec<LotConsumption>,
) {
    let units_to_sell = txn.units.abs();
    summary.redeemed_units += units_to_sell;

    let (slices, unsatisfied) = queue.consume(units_to_sell);
    if unsatisfied > Decimal::ZERO {
        // Data inconsistency: the statement redeems more units than the
        // purchase history holds. Clamp and keep going.
        warn!(
            "Folio {}: redemption on {} exceeds available lots by {} units; clamped",
            summary.folio_number, txn.date, unsatisfied
        );
    }
    if txn.nav <= Decimal::ZERO {
        // Units left the queue (conservation holds) but an unpriced sale
        // contributes no proceeds or gain.
        warn!(
            "Folio {}: redemption on {} has nav {}; proceeds treated as zero",
            summary.folio_number, txn.date, txn.nav
        );
        return;
    }

    for slice in slices {
        let proceeds = slice.units * txn.nav;
        let gain = slice.units * (txn.nav - slice.cost_nav_per_unit);
        summary.withdrawn += proceeds;
        summary.realized_gain += gain;
        consumptions.push(LotConsumption {
            folio: summary.folio_number.clone(),
            units: slice.units,
            cost_nav_per_unit: slice.cost_nav_per_unit,
            sale_nav: txn.nav,
            purchase_date: slice.purchase_date,
            sale_date: txn.date,
            holding_days: holding_days(slice.purchase_date, txn.date),
            gain,
        });
        if !proceeds.is_zero() {
            summary.cash_flows.push(CashFlow {
                kind: FlowKind::Sell,
                amount: proceeds,
                date: txn.date,
                nav: txn.nav,
                units: slice.units,
            });
        }
    }
}

/// Unit-weighted age in days of the remaining lots.
fn average_holding_days(queue: &LotQueue, as_of: NaiveDate) -> i64 {
    let total_units = queue.remaining_units();
    if total_units <= Decimal::ZERO {
        return 0;
    }
    let weighted: Decimal = queue
        .batches()
        .map(|b| b.units * Decimal::from(holding_days(b.purchase_date, as_of)))
        .sum();
    (weighted / total_units).round().to_i64().unwrap_or_default()
}

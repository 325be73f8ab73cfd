//! Day-by-day valuation reconstruction from transaction history and a
//! sparse NAV series.
//!
//! A pure function of its inputs: it replays transactions against a fresh
//! FIFO unit queue (the same consumption policy as the tax-lot ledger) and
//! retains no state between calls.

use chrono::NaiveDate;
use log::debug;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};

use crate::constants::{MIN_REPORTABLE_UNITS, UNITS_DECIMAL_PRECISION, VALUE_DECIMAL_PRECISION};
use crate::ledger::LotQueue;
use crate::transactions::{NavPoint, Transaction, TransactionType};
use crate::utils::get_days_between;
use crate::valuation::DailyValuationPoint;

/// Rebuilds one fund's daily value/cost series from its first transaction
/// through `today`.
///
/// * NAV lookup is exact-date first, then carry-forward of the last known
///   NAV; days with neither are skipped, never zero-filled.
/// * `latest_nav` optionally overrides the series value on `today`.
///
/// Output dates are strictly increasing.
pub fn reconstruct_daily_series(
    transactions: &[Transaction],
    nav_history: &[NavPoint],
    latest_nav: Option<Decimal>,
    today: NaiveDate,
) -> Vec<DailyValuationPoint> {
    let Some(start) = transactions.iter().map(|t| t.date).min() else {
        return Vec::new();
    };

    // Calendar-day replay needs transactions grouped by date; the NAV map
    // gives exact-date hits, the sorted series drives carry-forward.
    let mut by_day: BTreeMap<NaiveDate, Vec<&Transaction>> = BTreeMap::new();
    for txn in transactions {
        by_day.entry(txn.date).or_default().push(txn);
    }
    let nav_map: HashMap<NaiveDate, Decimal> =
        nav_history.iter().map(|p| (p.date, p.nav)).collect();

    let mut queue = LotQueue::new();
    // NAV points older than the first transaction still seed the
    // carry-forward; only days with no NAV known at all are skipped.
    let mut carried_nav: Option<Decimal> = nav_history
        .iter()
        .filter(|p| p.date < start)
        .max_by_key(|p| p.date)
        .map(|p| p.nav);
    let mut series = Vec::new();

    for day in get_days_between(start, today) {
        if let Some(day_txns) = by_day.get(&day) {
            for txn in day_txns {
                apply_transaction(txn, &mut queue);
            }
        }

        let nav = match nav_map.get(&day) {
            Some(nav) => {
                carried_nav = Some(*nav);
                Some(*nav)
            }
            None => carried_nav,
        };
        let nav = if day == today {
            latest_nav.or(nav)
        } else {
            nav
        };

        let units = queue.remaining_units();
        if units <= MIN_REPORTABLE_UNITS {
            continue;
        }
        let Some(nav) = nav else {
            debug!("No NAV known on or before {day}; day skipped");
            continue;
        };

        series.push(DailyValuationPoint {
            date: day,
            units: units.round_dp(UNITS_DECIMAL_PRECISION),
            nav,
            value: (units * nav).round_dp(VALUE_DECIMAL_PRECISION),
            cost: queue.remaining_cost().round_dp(VALUE_DECIMAL_PRECISION),
        });
    }

    series
}

/// Same push/shrink policy as the ledger replay; valuation only needs the
/// surviving units and cost, not the consumption events.
fn apply_transaction(txn: &Transaction, queue: &mut LotQueue) {
    match txn.txn_type {
        TransactionType::Purchase => {
            if txn.units > Decimal::ZERO && txn.nav > Decimal::ZERO {
                queue.push_lot(txn.units, txn.nav, txn.date);
            }
        }
        TransactionType::Redemption => {
            let (_slices, _unsatisfied) = queue.consume(txn.units.abs());
        }
    }
}

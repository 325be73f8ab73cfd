use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::funds::Folio;
use crate::ledger::ledger_calculator::replay_folio;
use crate::transactions::{FlowKind, Transaction, TransactionType};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn buy(d: NaiveDate, units: Decimal, nav: Decimal) -> Transaction {
    Transaction::new(TransactionType::Purchase, d, units, nav, "F1")
}

fn sell(d: NaiveDate, units: Decimal, nav: Decimal) -> Transaction {
    Transaction::new(TransactionType::Redemption, d, units, nav, "F1")
}

fn folio(transactions: Vec<Transaction>) -> Folio {
    Folio {
        folio_number: "F1".to_string(),
        transactions,
    }
}

#[test]
fn fifo_consumes_oldest_lot_first() {
    let f = folio(vec![
        buy(date(2023, 1, 1), dec!(100), dec!(10)),
        buy(date(2023, 6, 1), dec!(100), dec!(20)),
        sell(date(2023, 9, 1), dec!(100), dec!(30)),
    ]);
    let run = replay_folio(&f, Some(dec!(30)), date(2023, 9, 1));

    // Gain must come from the NAV-10 lot only, whatever the market NAV is.
    assert_eq!(run.consumptions.len(), 1);
    assert_eq!(run.consumptions[0].cost_nav_per_unit, dec!(10));
    assert_eq!(run.consumptions[0].gain, dec!(2000));
    assert_eq!(run.summary.remaining_units, dec!(100));
    assert_eq!(run.summary.remaining_cost, dec!(2000));
}

#[test]
fn redemption_spans_lots_in_order() {
    let f = folio(vec![
        buy(date(2023, 1, 1), dec!(100), dec!(10)),
        buy(date(2023, 6, 1), dec!(100), dec!(15)),
        sell(date(2024, 2, 1), dec!(150), dec!(20)),
    ]);
    let run = replay_folio(&f, Some(dec!(20)), date(2024, 2, 1));

    assert_eq!(run.consumptions.len(), 2);
    assert_eq!(run.consumptions[0].units, dec!(100));
    assert_eq!(run.consumptions[0].gain, dec!(1000));
    assert_eq!(run.consumptions[1].units, dec!(50));
    assert_eq!(run.consumptions[1].gain, dec!(250));

    assert_eq!(run.summary.remaining_units, dec!(50));
    assert_eq!(run.summary.remaining_cost, dec!(750));
    assert_eq!(run.summary.realized_gain, dec!(1250));
}

#[test]
fn gain_identity_holds_after_replay() {
    let f = folio(vec![
        buy(date(2022, 3, 10), dec!(250.5), dec!(42.1234)),
        buy(date(2022, 11, 2), dec!(100), dec!(55.5)),
        sell(date(2023, 5, 20), dec!(120.25), dec!(61.75)),
    ]);
    let nav = dec!(70.05);
    let run = replay_folio(&f, Some(nav), date(2024, 1, 1));
    let s = &run.summary;

    assert_eq!(s.unrealized_gain, s.current_value - s.remaining_cost);
    let slice_gain: Decimal = run.consumptions.iter().map(|c| c.gain).sum();
    assert_eq!(s.realized_gain, slice_gain);
    assert_eq!(s.current_value, s.remaining_units * nav);
}

#[test]
fn transactions_are_resorted_before_replay() {
    // Sell arrives before its buy in the input; date order must win.
    let f = folio(vec![
        sell(date(2023, 6, 1), dec!(50), dec!(12)),
        buy(date(2023, 1, 1), dec!(100), dec!(10)),
    ]);
    let run = replay_folio(&f, Some(dec!(12)), date(2023, 6, 1));

    assert_eq!(run.consumptions.len(), 1);
    assert_eq!(run.summary.realized_gain, dec!(100));
    assert_eq!(run.summary.remaining_units, dec!(50));
}

#[test]
fn over_redemption_clamps_silently() {
    let f = folio(vec![
        buy(date(2023, 1, 1), dec!(100), dec!(10)),
        sell(date(2023, 6, 1), dec!(150), dec!(12)),
    ]);
    let run = replay_folio(&f, None, date(2023, 6, 1));

    // Only the 100 held units are sold; the rest is dropped, not an error.
    let sold: Decimal = run.consumptions.iter().map(|c| c.units).sum();
    assert_eq!(sold, dec!(100));
    assert_eq!(run.summary.withdrawn, dec!(1200));
    assert!(run.summary.remaining_units.is_zero());
}

#[test]
fn invalid_purchase_counts_units_but_not_cost() {
    let f = folio(vec![
        buy(date(2023, 1, 1), dec!(100), Decimal::ZERO),
        buy(date(2023, 2, 1), dec!(50), dec!(10)),
    ]);
    let run = replay_folio(&f, Some(dec!(10)), date(2023, 3, 1));

    assert_eq!(run.summary.purchased_units, dec!(150));
    assert_eq!(run.summary.invested, dec!(500));
    assert_eq!(run.summary.remaining_units, dec!(50));
    assert_eq!(run.summary.cash_flows.len(), 1);
}

#[test]
fn unpriced_redemption_consumes_units_without_proceeds() {
    let f = folio(vec![
        buy(date(2023, 1, 1), dec!(100), dec!(10)),
        sell(date(2023, 6, 1), dec!(40), Decimal::ZERO),
    ]);
    let run = replay_folio(&f, Some(dec!(10)), date(2023, 6, 1));

    assert_eq!(run.summary.remaining_units, dec!(60));
    assert!(run.summary.withdrawn.is_zero());
    assert!(run.summary.realized_gain.is_zero());
    assert!(run.consumptions.is_empty());
}

#[test]
fn cash_flows_are_signed_and_nonzero() {
    let f = folio(vec![
        buy(date(2023, 1, 1), dec!(100), dec!(10)),
        sell(date(2023, 6, 1), dec!(30), dec!(12)),
    ]);
    let run = replay_folio(&f, Some(dec!(12)), date(2023, 6, 1));
    let flows = &run.summary.cash_flows;

    assert_eq!(flows.len(), 2);
    assert_eq!(flows[0].kind, FlowKind::Buy);
    assert_eq!(flows[0].amount, dec!(-1000));
    assert_eq!(flows[1].kind, FlowKind::Sell);
    assert_eq!(flows[1].amount, dec!(360));
    assert!(flows.iter().all(|f| !f.amount.is_zero()));
}

#[test]
fn swept_residue_is_attributed_to_the_final_slice() {
    // Redemptions that leave sub-tolerance dust in a lot must not make
    // units vanish: the dust rides out with the closing slice.
    let f = folio(vec![
        buy(date(2023, 1, 1), dec!(49.39), dec!(10)),
        sell(date(2023, 3, 1), dec!(28.57), dec!(11)),
        sell(date(2023, 6, 1), dec!(20.78), dec!(12)),
    ]);
    let run = replay_folio(&f, None, date(2023, 6, 1));

    let consumed: Decimal = run.consumptions.iter().map(|c| c.units).sum();
    assert_eq!(consumed + run.summary.remaining_units, dec!(49.39));
    assert!(run.summary.remaining_units.is_zero());
}

#[test]
fn tiny_lot_residue_is_swept() {
    let f = folio(vec![
        buy(date(2023, 1, 1), dec!(100), dec!(10)),
        sell(date(2023, 6, 1), dec!(99.99995), dec!(12)),
    ]);
    let run = replay_folio(&f, Some(dec!(12)), date(2023, 6, 1));

    // The 0.00005-unit residue is below tolerance and must not survive
    // as a phantom lot.
    assert!(run.summary.remaining_units < dec!(0.0001));
}

proptest! {
    /// purchased - redeemed == remaining, within 1e-3, for any sequence.
    #[test]
    fn unit_conservation(ops in proptest::collection::vec((any::<bool>(), 1u32..5000, 1u32..10000), 1..40)) {
        let start = date(2020, 1, 1);
        let transactions: Vec<Transaction> = ops
            .iter()
            .enumerate()
            .map(|(i, (is_buy, units_centi, nav_centi))| {
                let d = start + chrono::Duration::days(i as i64);
                let units = Decimal::from(*units_centi) / dec!(100);
                let nav = Decimal::from(*nav_centi) / dec!(100);
                if *is_buy {
                    buy(d, units, nav)
                } else {
                    sell(d, units, nav)
                }
            })
            .collect();
        let run = replay_folio(&folio(transactions), None, date(2021, 1, 1));
        let s = &run.summary;

        // Over-redeemed units are clamped away, so conservation is an
        // inequality-free identity against the *consumed* total.
        let consumed: Decimal = run.consumptions.iter().map(|c| c.units).sum();
        let diff = (s.purchased_units - consumed - s.remaining_units).abs();
        prop_assert!(diff <= dec!(0.001), "conservation broken by {}", diff);
    }
}

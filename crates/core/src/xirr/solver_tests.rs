use chrono::NaiveDate;

use crate::xirr::{compute_xirr, DatedFlow};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn flow(d: NaiveDate, amount: f64) -> DatedFlow {
    DatedFlow { date: d, amount }
}

#[test]
fn one_year_20_percent_round_trip() {
    let flows = vec![
        flow(date(2023, 1, 1), -1000.0),
        flow(date(2024, 1, 1), 1200.0), // 365 days later
    ];
    let result = compute_xirr(&flows).unwrap();
    assert!(result.converged);
    assert!((result.rate_pct - 20.0).abs() < 0.01, "got {}", result.rate_pct);
}

#[test]
fn negative_return_is_solved() {
    let flows = vec![
        flow(date(2023, 1, 1), -1000.0),
        flow(date(2024, 1, 1), 900.0),
    ];
    let result = compute_xirr(&flows).unwrap();
    assert!(result.converged);
    assert!((result.rate_pct - (-10.0)).abs() < 0.01, "got {}", result.rate_pct);
}

#[test]
fn multiple_flows_land_between_bounds() {
    let flows = vec![
        flow(date(2023, 1, 1), -1000.0),
        flow(date(2023, 6, 1), -500.0),
        flow(date(2024, 1, 1), 1700.0),
    ];
    let result = compute_xirr(&flows).unwrap();
    assert!(result.converged);
    assert!(result.rate_pct > 10.0 && result.rate_pct < 20.0, "got {}", result.rate_pct);
}

#[test]
fn sip_style_monthly_purchases() {
    let mut flows: Vec<DatedFlow> = (0..12)
        .map(|i| flow(date(2023, 1, 1) + chrono::Duration::days(30 * i), -5000.0))
        .collect();
    flows.push(flow(date(2024, 6, 1), 66000.0));
    let result = compute_xirr(&flows).unwrap();
    assert!(result.converged);
    // Roughly 10% invested for roughly a year on average.
    assert!(result.rate_pct > 5.0 && result.rate_pct < 15.0, "got {}", result.rate_pct);
}

#[test]
fn fewer_than_two_flows_is_not_computable() {
    assert!(compute_xirr(&[]).is_none());
    assert!(compute_xirr(&[flow(date(2023, 1, 1), -1000.0)]).is_none());
}

#[test]
fn single_signed_flows_are_not_computable() {
    let all_out = vec![
        flow(date(2023, 1, 1), -1000.0),
        flow(date(2024, 1, 1), -500.0),
    ];
    assert!(compute_xirr(&all_out).is_none());

    let all_in = vec![
        flow(date(2023, 1, 1), 1000.0),
        flow(date(2024, 1, 1), 500.0),
    ];
    assert!(compute_xirr(&all_in).is_none());
}

#[test]
fn deep_loss_converges_near_floor() {
    // Near-total loss: the rate should approach -99% without panicking.
    let flows = vec![
        flow(date(2023, 1, 1), -10000.0),
        flow(date(2024, 1, 1), 150.0),
    ];
    let result = compute_xirr(&flows).unwrap();
    assert!(result.rate_pct < -90.0, "got {}", result.rate_pct);
}

#[test]
fn same_day_flows_do_not_panic() {
    let flows = vec![
        flow(date(2023, 1, 1), -1000.0),
        flow(date(2023, 1, 1), 1100.0),
    ];
    // NPV is rate-independent here; whatever comes back must be finite.
    if let Some(result) = compute_xirr(&flows) {
        assert!(result.rate_pct.is_finite());
    }
}

#[test]
fn output_is_percentage_not_fraction() {
    let flows = vec![
        flow(date(2023, 1, 1), -1000.0),
        flow(date(2024, 1, 1), 1100.0),
    ];
    let result = compute_xirr(&flows).unwrap();
    // 10%, not 0.10.
    assert!((result.rate_pct - 10.0).abs() < 0.01, "got {}", result.rate_pct);
}

//! Money-weighted annualized return over irregular cash flows.
//!
//! Finds the rate `r` with `Σ amount_i / (1+r)^(days_i/365) = 0`, anchored
//! at the earliest flow. Newton-Raphson first, expanding-bracket bisection
//! as fallback. Rates iterate in `f64`; callers convert Decimal amounts at
//! the boundary.

use chrono::NaiveDate;
use log::debug;
use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::constants::DAYS_PER_YEAR;
use crate::transactions::CashFlow;

const NEWTON_GUESS: f64 = 0.10;
const MAX_ITERATIONS: usize = 100;
const NPV_TOLERANCE: f64 = 1e-6;
const DERIVATIVE_FLOOR: f64 = 1e-10;
const RATE_FLOOR: f64 = -0.99;
const RATE_CEILING: f64 = 10.0;
const BRACKET_START_HIGH: f64 = 5.0;
const MAX_BRACKET_PROBES: usize = 50;

/// A dated amount for the solver. Outflows negative, inflows positive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatedFlow {
    pub date: NaiveDate,
    pub amount: f64,
}

impl From<&CashFlow> for DatedFlow {
    fn from(flow: &CashFlow) -> Self {
        DatedFlow {
            date: flow.date,
            amount: flow.amount.to_f64().unwrap_or_default(),
        }
    }
}

/// Solver result, as a percentage.
///
/// `converged` distinguishes a verified root from the best-effort rate the
/// solver was left holding when neither phase met its tolerance. Callers
/// should treat non-converged values as approximate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Xirr {
    pub rate_pct: f64,
    pub converged: bool,
}

/// Computes XIRR over the given flows.
///
/// Returns `None` when fewer than two flows are present or when the flows
/// do not contain both a positive and a negative amount; either way there
/// is no rate to find and this is not an error.
pub fn compute_xirr(flows: &[DatedFlow]) -> Option<Xirr> {
    if flows.len() < 2 {
        return None;
    }
    let has_negative = flows.iter().any(|f| f.amount < 0.0);
    let has_positive = flows.iter().any(|f| f.amount > 0.0);
    if !has_negative || !has_positive {
        return None;
    }

    let anchor = flows.iter().map(|f| f.date).min()?;

    match newton_phase(flows, anchor) {
        PhaseResult::Converged(rate) => Some(Xirr {
            rate_pct: rate * 100.0,
            converged: true,
        }),
        PhaseResult::Stalled(last_rate) => {
            debug!("XIRR Newton phase stalled at rate {last_rate}; falling back to bisection");
            Some(bisection_phase(flows, anchor, last_rate))
        }
    }
}

enum PhaseResult {
    Converged(f64),
    /// The last rate computed before the phase gave up.
    Stalled(f64),
}

fn newton_phase(flows: &[DatedFlow], anchor: NaiveDate) -> PhaseResult {
    let mut rate = NEWTON_GUESS;
    for _ in 0..MAX_ITERATIONS {
        let (npv, derivative) = npv_and_derivative(flows, anchor, rate);
        if npv.abs() < NPV_TOLERANCE {
            return PhaseResult::Converged(rate);
        }
        // A flat slope makes the Newton step meaningless.
        if derivative.abs() < DERIVATIVE_FLOOR {
            return PhaseResult::Stalled(rate);
        }
        let next = (rate - npv / derivative).clamp(RATE_FLOOR, RATE_CEILING);
        if (next - rate).abs() < f64::EPSILON {
            // Clamping or cancellation froze the iteration.
            return PhaseResult::Stalled(rate);
        }
        rate = next;
    }
    PhaseResult::Stalled(rate)
}

/// Expands `[-0.99, 5]` outward until the endpoint NPVs straddle zero,
/// then bisects. When no bracket is found the caller's last Newton rate is
/// returned unverified.
fn bisection_phase(flows: &[DatedFlow], anchor: NaiveDate, fallback_rate: f64) -> Xirr {
    let mut low = RATE_FLOOR;
    let mut high = BRACKET_START_HIGH;
    let mut npv_low = npv(flows, anchor, low);
    let mut npv_high = npv(flows, anchor, high);

    let mut probes = 0;
    while npv_low * npv_high > 0.0 && probes < MAX_BRACKET_PROBES {
        if high < RATE_CEILING {
            high = (high * 1.5).min(RATE_CEILING);
            npv_high = npv(flows, anchor, high);
        } else {
            // Upper bound exhausted; nothing more to probe.
            break;
        }
        probes += 1;
    }

    if npv_low * npv_high > 0.0 {
        debug!("XIRR bisection found no sign change in [{low}, {high}]");
        return Xirr {
            rate_pct: fallback_rate * 100.0,
            converged: false,
        };
    }

    let mut mid = (low + high) / 2.0;
    for _ in 0..MAX_ITERATIONS {
        mid = (low + high) / 2.0;
        let npv_mid = npv(flows, anchor, mid);
        if npv_mid.abs() < NPV_TOLERANCE || (high - low).abs() < NPV_TOLERANCE {
            return Xirr {
                rate_pct: mid * 100.0,
                converged: true,
            };
        }
        if npv_low * npv_mid < 0.0 {
            high = mid;
        } else {
            low = mid;
            npv_low = npv_mid;
        }
    }

    Xirr {
        rate_pct: mid * 100.0,
        converged: false,
    }
}

fn npv_and_derivative(flows: &[DatedFlow], anchor: NaiveDate, rate: f64) -> (f64, f64) {
    let mut npv = 0.0;
    let mut derivative = 0.0;
    for flow in flows {
        let years = (flow.date - anchor).num_days() as f64 / DAYS_PER_YEAR;
        let discount = (1.0 + rate).powf(-years);
        npv += flow.amount * discount;
        // d/dr [a * (1+r)^(-t)] = -t * a * (1+r)^(-t-1)
        derivative -= years * flow.amount * (1.0 + rate).powf(-years - 1.0);
    }
    (npv, derivative)
}

fn npv(flows: &[DatedFlow], anchor: NaiveDate, rate: f64) -> f64 {
    flows
        .iter()
        .map(|flow| {
            let years = (flow.date - anchor).num_days() as f64 / DAYS_PER_YEAR;
            flow.amount * (1.0 + rate).powf(-years)
        })
        .sum()
}

//! Weighted cross-fund aggregation into portfolio-level views.
//!
//! Each fund contributes `fund_value / total_value` of its own percentage
//! breakdowns. Missing metadata never fails an aggregation; the service
//! falls back to category and name heuristics per fund.

use log::debug;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::{BTreeMap, HashMap};

use crate::constants::{
    BREAKDOWN_TOP_N, HOLDING_PERCENT_DECIMAL_PRECISION, PERCENT_DECIMAL_PRECISION,
};
use crate::funds::{FundCategory, MarketCapSplit, WeightedName};
use crate::valuation::{DailyValuationPoint, PortfolioValuationPoint};

use super::{
    AssetAllocation, FundAnalyticsInput, MarketCapAllocation, PortfolioAnalytics, WeightedReturns,
};

const HUNDRED: Decimal = dec!(100);

/// Label for the pseudo-holding filling the gap when a fund's look-through
/// holdings do not sum to 100%.
pub const CASH_EQUIVALENTS: &str = "Cash Equivalents";

/// Remainder label for truncated sector/AMC breakdowns.
pub const OTHERS: &str = "Others";

/// Combines per-fund metrics into portfolio-level breakdowns.
///
/// A plain combining pass over already-computed fund results; runs
/// single-threaded after all per-fund work has joined.
pub struct PortfolioAggregator;

impl PortfolioAggregator {
    pub fn aggregate(funds: &[FundAnalyticsInput]) -> PortfolioAnalytics {
        let total_value: Decimal = funds.iter().map(|f| f.current_value).sum();
        if total_value <= Decimal::ZERO {
            debug!("Portfolio has no current value; returning empty analytics");
            return PortfolioAnalytics::default();
        }

        let mut allocation = AssetAllocation::default();
        let mut market_cap = MarketCapAllocation::default();
        let mut sectors: HashMap<String, Decimal> = HashMap::new();
        let mut amcs: HashMap<String, Decimal> = HashMap::new();
        let mut holdings: HashMap<String, Decimal> = HashMap::new();
        let mut returns = ReturnsAccumulator::default();

        for fund in funds {
            let weight = fund.current_value / total_value;
            if weight <= Decimal::ZERO {
                continue;
            }

            accumulate_asset_allocation(&mut allocation, fund, weight);
            accumulate_market_cap(&mut market_cap, fund, weight);
            *amcs.entry(fund.amc.clone()).or_insert(Decimal::ZERO) += weight * HUNDRED;

            if let Some(meta) = &fund.metadata {
                for sector in &meta.sectors {
                    *sectors.entry(sector.name.clone()).or_insert(Decimal::ZERO) +=
                        sector.percentage * weight;
                }
                accumulate_holdings(&mut holdings, &meta.holdings, weight);
                returns.add(meta.returns.one_year, meta.returns.three_year, meta.returns.five_year, weight);
            }
        }

        PortfolioAnalytics {
            total_value,
            asset_allocation: round_allocation(allocation),
            market_cap: renormalize_market_cap(market_cap),
            sectors: top_n_with_others(sectors, BREAKDOWN_TOP_N, PERCENT_DECIMAL_PRECISION),
            amcs: top_n_with_others(amcs, BREAKDOWN_TOP_N, PERCENT_DECIMAL_PRECISION),
            holdings: sorted_breakdown(holdings, HOLDING_PERCENT_DECIMAL_PRECISION),
            weighted_returns: returns.finish(),
        }
    }

    /// Combines per-fund daily series into one portfolio series.
    ///
    /// The union of all dates is used; each day sums only the funds with a
    /// point on that day. The participant count varies along the series and
    /// is reported so callers do not conflate "absent" with "worthless".
    pub fn combine_daily_series(series: &[Vec<DailyValuationPoint>]) -> Vec<PortfolioValuationPoint> {
        let mut combined: BTreeMap<chrono::NaiveDate, PortfolioValuationPoint> = BTreeMap::new();
        for fund_series in series {
            for point in fund_series {
                let entry = combined
                    .entry(point.date)
                    .or_insert(PortfolioValuationPoint {
                        date: point.date,
                        value: Decimal::ZERO,
                        cost: Decimal::ZERO,
                        fund_count: 0,
                    });
                entry.value += point.value;
                entry.cost += point.cost;
                entry.fund_count += 1;
            }
        }
        combined.into_values().collect()
    }
}

/// Buckets one fund's sub-category percentages into the four broad asset
/// classes, scaled by the fund's portfolio weight.
fn accumulate_asset_allocation(
    allocation: &mut AssetAllocation,
    fund: &FundAnalyticsInput,
    weight: Decimal,
) {
    let commodity_hint = commodity_hint(fund);
    let sub_allocations = fund
        .metadata
        .as_ref()
        .map(|m| m.asset_allocation.as_slice())
        .unwrap_or_default();

    if sub_allocations.is_empty() {
        // No breakdown known: the whole fund goes into its category bucket.
        let pct = weight * HUNDRED;
        match fund.category {
            FundCategory::Equity => allocation.equity += pct,
            FundCategory::Debt | FundCategory::Hybrid => allocation.debt += pct,
        }
        return;
    }

    for entry in sub_allocations {
        let pct = entry.percentage * weight;
        match classify_asset_bucket(&entry.name, commodity_hint) {
            AssetBucket::Equity => allocation.equity += pct,
            AssetBucket::Debt => allocation.debt += pct,
            AssetBucket::Gold => allocation.gold += pct,
            AssetBucket::Silver => allocation.silver += pct,
        }
    }
}

#[derive(Clone, Copy)]
enum AssetBucket {
    Equity,
    Debt,
    Gold,
    Silver,
}

#[derive(Clone, Copy, PartialEq)]
enum CommodityHint {
    Gold,
    Silver,
    None,
}

/// Gold/silver disambiguation for commodity categories comes from the
/// scheme and sub-category names.
fn commodity_hint(fund: &FundAnalyticsInput) -> CommodityHint {
    let mut haystack = fund.scheme_name.to_lowercase();
    if let Some(sub) = fund.metadata.as_ref().and_then(|m| m.sub_category.as_ref()) {
        haystack.push(' ');
        haystack.push_str(&sub.to_lowercase());
    }
    if haystack.contains("silver") {
        CommodityHint::Silver
    } else if haystack.contains("gold") {
        CommodityHint::Gold
    } else {
        CommodityHint::None
    }
}

fn classify_asset_bucket(raw: &str, hint: CommodityHint) -> AssetBucket {
    let name = raw.to_lowercase();
    if name.contains("gold") {
        return AssetBucket::Gold;
    }
    if name.contains("silver") {
        return AssetBucket::Silver;
    }
    if name.contains("equity") {
        return AssetBucket::Equity;
    }
    if name.contains("commodit") {
        return match hint {
            CommodityHint::Gold => AssetBucket::Gold,
            CommodityHint::Silver => AssetBucket::Silver,
            // Unmatched commodity exposure is treated as debt.
            CommodityHint::None => AssetBucket::Debt,
        };
    }
    // Debt, income, gilt, liquid, cash and anything unrecognized.
    AssetBucket::Debt
}

/// Market-cap precedence: explicit split, then the secondary
/// `market_cap_per` source, then a scheme-name heuristic.
fn accumulate_market_cap(
    market_cap: &mut MarketCapAllocation,
    fund: &FundAnalyticsInput,
    weight: Decimal,
) {
    let split = fund
        .metadata
        .as_ref()
        .and_then(|m| m.market_cap.or(m.market_cap_per))
        .unwrap_or_else(|| heuristic_market_cap(&fund.scheme_name));
    market_cap.large += split.large * weight;
    market_cap.mid += split.mid * weight;
    market_cap.small += split.small * weight;
}

fn heuristic_market_cap(scheme_name: &str) -> MarketCapSplit {
    let name = scheme_name.to_lowercase().replace(' ', "");
    if name.contains("smallcap") {
        MarketCapSplit {
            small: HUNDRED,
            ..Default::default()
        }
    } else if name.contains("midcap") {
        MarketCapSplit {
            mid: HUNDRED,
            ..Default::default()
        }
    } else {
        MarketCapSplit {
            large: HUNDRED,
            ..Default::default()
        }
    }
}

fn renormalize_market_cap(raw: MarketCapAllocation) -> MarketCapAllocation {
    let total = raw.large + raw.mid + raw.small;
    if total <= Decimal::ZERO {
        return MarketCapAllocation::default();
    }
    MarketCapAllocation {
        large: (raw.large / total * HUNDRED).round_dp(PERCENT_DECIMAL_PRECISION),
        mid: (raw.mid / total * HUNDRED).round_dp(PERCENT_DECIMAL_PRECISION),
        small: (raw.small / total * HUNDRED).round_dp(PERCENT_DECIMAL_PRECISION),
    }
}

fn round_allocation(raw: AssetAllocation) -> AssetAllocation {
    AssetAllocation {
        equity: raw.equity.round_dp(PERCENT_DECIMAL_PRECISION),
        debt: raw.debt.round_dp(PERCENT_DECIMAL_PRECISION),
        gold: raw.gold.round_dp(PERCENT_DECIMAL_PRECISION),
        silver: raw.silver.round_dp(PERCENT_DECIMAL_PRECISION),
    }
}

/// Accumulates look-through holdings, injecting a synthetic cash bucket
/// when a fund's holdings do not cover its full corpus.
fn accumulate_holdings(
    holdings: &mut HashMap<String, Decimal>,
    fund_holdings: &[WeightedName],
    weight: Decimal,
) {
    if fund_holdings.is_empty() {
        return;
    }
    let mut covered = Decimal::ZERO;
    for holding in fund_holdings {
        covered += holding.percentage;
        *holdings.entry(holding.name.clone()).or_insert(Decimal::ZERO) +=
            holding.percentage * weight;
    }
    let shortfall = HUNDRED - covered;
    if shortfall > Decimal::ZERO {
        *holdings
            .entry(CASH_EQUIVALENTS.to_string())
            .or_insert(Decimal::ZERO) += shortfall * weight;
    }
}

#[derive(Default)]
struct ReturnsAccumulator {
    horizons: [(Decimal, Decimal); 3], // (weighted sum, weight) per horizon
}

impl ReturnsAccumulator {
    fn add(
        &mut self,
        one_year: Option<Decimal>,
        three_year: Option<Decimal>,
        five_year: Option<Decimal>,
        weight: Decimal,
    ) {
        for (slot, value) in self.horizons.iter_mut().zip([one_year, three_year, five_year]) {
            // A fund without a figure for a horizon sits that horizon out.
            if let Some(v) = value {
                slot.0 += v * weight;
                slot.1 += weight;
            }
        }
    }

    fn finish(self) -> WeightedReturns {
        let avg = |(sum, w): (Decimal, Decimal)| {
            if w > Decimal::ZERO {
                Some((sum / w).round_dp(PERCENT_DECIMAL_PRECISION))
            } else {
                None
            }
        };
        WeightedReturns {
            one_year: avg(self.horizons[0]),
            three_year: avg(self.horizons[1]),
            five_year: avg(self.horizons[2]),
        }
    }
}

fn sorted_breakdown(map: HashMap<String, Decimal>, precision: u32) -> Vec<WeightedName> {
    let mut entries: Vec<WeightedName> = map
        .into_iter()
        .map(|(name, percentage)| WeightedName {
            name,
            percentage: percentage.round_dp(precision),
        })
        .collect();
    entries.sort_by(|a, b| b.percentage.cmp(&a.percentage).then(a.name.cmp(&b.name)));
    entries
}

/// Keeps the `n` largest entries and folds the rest into "Others".
pub fn top_n_with_others(
    map: HashMap<String, Decimal>,
    n: usize,
    precision: u32,
) -> Vec<WeightedName> {
    let mut entries = sorted_breakdown(map, precision);
    if entries.len() <= n {
        return entries;
    }
    let rest: Decimal = entries[n..].iter().map(|e| e.percentage).sum();
    entries.truncate(n);
    entries.push(WeightedName {
        name: OTHERS.to_string(),
        percentage: rest.round_dp(precision),
    });
    entries
}

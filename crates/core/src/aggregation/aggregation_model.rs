//! Portfolio-level aggregation models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::funds::{FundCategory, FundMetadata, WeightedName};

/// Per-fund current-state metrics the aggregator weighs and combines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundAnalyticsInput {
    pub scheme_name: String,
    pub amc: String,
    pub category: FundCategory,
    pub current_value: Decimal,
    pub metadata: Option<FundMetadata>,
}

/// Portfolio split across broad asset buckets, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetAllocation {
    pub equity: Decimal,
    pub debt: Decimal,
    pub gold: Decimal,
    pub silver: Decimal,
}

impl AssetAllocation {
    pub fn total(&self) -> Decimal {
        self.equity + self.debt + self.gold + self.silver
    }
}

/// Portfolio large/mid/small split, renormalized to sum to 100.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketCapAllocation {
    pub large: Decimal,
    pub mid: Decimal,
    pub small: Decimal,
}

/// Value-weighted trailing returns across the portfolio, in percent.
/// A horizon is `None` when no fund carried a figure for it.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightedReturns {
    pub one_year: Option<Decimal>,
    pub three_year: Option<Decimal>,
    pub five_year: Option<Decimal>,
}

/// Cross-fund dashboard analytics.
///
/// Sector and AMC lists are truncated to the top entries plus "Others";
/// holdings are kept in full (truncation is a display concern) with 6-dp
/// percentages so small long-tail positions keep their ordering.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioAnalytics {
    pub total_value: Decimal,
    pub asset_allocation: AssetAllocation,
    pub market_cap: MarketCapAllocation,
    pub sectors: Vec<WeightedName>,
    pub amcs: Vec<WeightedName>,
    pub holdings: Vec<WeightedName>,
    pub weighted_returns: WeightedReturns,
}

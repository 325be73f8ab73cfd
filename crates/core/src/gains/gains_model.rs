//! Capital-gains domain models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::funds::FundCategory;

/// One STCG/LTCG bucket: gains and the proceeds they were realized on.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapitalGains {
    pub stcg: Decimal,
    pub ltcg: Decimal,
    pub stcg_redeemed: Decimal,
    pub ltcg_redeemed: Decimal,
}

impl CapitalGains {
    pub fn add_short_term(&mut self, gain: Decimal, proceeds: Decimal) {
        self.stcg += gain;
        self.stcg_redeemed += proceeds;
    }

    pub fn add_long_term(&mut self, gain: Decimal, proceeds: Decimal) {
        self.ltcg += gain;
        self.ltcg_redeemed += proceeds;
    }

    pub fn merge(&mut self, other: &CapitalGains) {
        self.stcg += other.stcg;
        self.ltcg += other.ltcg;
        self.stcg_redeemed += other.stcg_redeemed;
        self.ltcg_redeemed += other.ltcg_redeemed;
    }

    pub fn is_empty(&self) -> bool {
        self.stcg.is_zero()
            && self.ltcg.is_zero()
            && self.stcg_redeemed.is_zero()
            && self.ltcg_redeemed.is_zero()
    }
}

/// One fund's realized gains: all-time total plus per-financial-year
/// buckets, classified under the fund's tax category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundGains {
    pub category: FundCategory,
    pub total: CapitalGains,
    /// Keyed by financial-year label, e.g. "FY 2023-24". BTreeMap keeps
    /// years in label order for reporting.
    pub by_year: BTreeMap<String, CapitalGains>,
}

impl FundGains {
    pub fn new(category: FundCategory) -> Self {
        Self {
            category,
            total: CapitalGains::default(),
            by_year: BTreeMap::new(),
        }
    }
}

/// Realized gains rolled up across the whole portfolio: an all-time
/// total plus per-category and per-financial-year buckets.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioGains {
    pub total: CapitalGains,
    /// Keyed by tax category ("equity", "debt", "hybrid").
    pub by_category: BTreeMap<String, CapitalGains>,
    /// Keyed by financial-year label, e.g. "FY 2023-24".
    pub by_year: BTreeMap<String, CapitalGains>,
}

impl PortfolioGains {
    /// Folds one fund's gains in. Funds with no realized gains leave no
    /// empty buckets behind.
    pub fn merge_fund(&mut self, gains: &FundGains) {
        if gains.total.is_empty() {
            return;
        }
        self.total.merge(&gains.total);
        self.by_category
            .entry(gains.category.as_str().to_string())
            .or_default()
            .merge(&gains.total);
        for (year, bucket) in &gains.by_year {
            self.by_year.entry(year.clone()).or_default().merge(bucket);
        }
    }
}

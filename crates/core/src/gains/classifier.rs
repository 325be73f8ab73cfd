//! STCG/LTCG classification of lot-consumption events, and resolution of a
//! fund's tax category from whatever metadata the statement carries.

use std::collections::HashMap;

use crate::funds::{Fund, FundCategory, FundMetadata};
use crate::gains::{CapitalGains, FundGains};
use crate::ledger::LotConsumption;
use crate::utils::financial_year_label;

/// Buckets consumption events into STCG/LTCG by category threshold and
/// financial year of sale.
///
/// The classifier owns its category-normalization cache; repeated lookups
/// for the same raw category string are O(1) and no state leaks between
/// classifier instances.
#[derive(Debug, Default)]
pub struct GainsClassifier {
    // Keyed by (category, sub_category): the hybrid branch resolves
    // differently for debt-oriented sub-categories, so the category
    // string alone is not a sound cache key.
    category_cache: HashMap<(String, String), FundCategory>,
}

impl GainsClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub(crate) fn cache_len(&self) -> usize {
        self.category_cache.len()
    }

    /// Resolves the fund's tax category once per fund.
    ///
    /// Precedence: extended metadata category (normalized), then a
    /// substring match on the statement's fund-type string, then hybrid.
    pub fn resolve_category(&mut self, fund: &Fund) -> FundCategory {
        if let Some(meta) = &fund.metadata {
            if let Some(raw) = &meta.category {
                let category = raw.trim().to_lowercase();
                let sub_category = meta
                    .sub_category
                    .as_deref()
                    .unwrap_or_default()
                    .trim()
                    .to_lowercase();
                let key = (category, sub_category);
                if let Some(cached) = self.category_cache.get(&key) {
                    return *cached;
                }
                let resolved = categorize_metadata(&key.0, meta);
                self.category_cache.insert(key, resolved);
                return resolved;
            }
        }
        categorize_fund_type(fund.fund_type.as_deref())
    }

    /// Accumulates one folio replay's consumption events into `gains`.
    ///
    /// A sale held exactly at the threshold is long-term: the short-term
    /// test is `holding_days < threshold`.
    pub fn classify(&self, gains: &mut FundGains, consumptions: &[LotConsumption]) {
        let threshold = gains.category.stcg_threshold_days();
        for event in consumptions {
            let proceeds = event.units * event.sale_nav;
            let year = financial_year_label(event.sale_date);
            let bucket = gains.by_year.entry(year).or_insert_with(CapitalGains::default);
            if event.holding_days < threshold {
                gains.total.add_short_term(event.gain, proceeds);
                bucket.add_short_term(event.gain, proceeds);
            } else {
                gains.total.add_long_term(event.gain, proceeds);
                bucket.add_long_term(event.gain, proceeds);
            }
        }
    }
}

/// Maps a normalized metadata category string to a tax category.
fn categorize_metadata(category: &str, meta: &FundMetadata) -> FundCategory {
    match category {
        "equity" | "elss" => FundCategory::Equity,
        "debt" | "income" | "liquid" | "gilt" => FundCategory::Debt,
        "hybrid" | "balanced" | "commodities" => {
            // A debt-oriented sub-category overrides the hybrid bucket.
            let sub = meta
                .sub_category
                .as_deref()
                .unwrap_or_default()
                .to_lowercase();
            if sub.contains("debt") {
                FundCategory::Debt
            } else {
                FundCategory::Hybrid
            }
        }
        _ => FundCategory::Hybrid,
    }
}

/// Fallback when no extended metadata exists: substring match on the
/// statement's fund-type string.
fn categorize_fund_type(fund_type: Option<&str>) -> FundCategory {
    let Some(raw) = fund_type else {
        return FundCategory::Hybrid;
    };
    let lowered = raw.to_lowercase();
    if lowered.contains("equity") {
        FundCategory::Equity
    } else if lowered.contains("debt") || lowered.contains("income") {
        FundCategory::Debt
    } else {
        FundCategory::Hybrid
    }
}

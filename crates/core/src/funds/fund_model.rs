//! Fund aggregate root and extended metadata.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::transactions::{NavPoint, Transaction};

/// Tax category of a fund. Drives the STCG/LTCG holding-period threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FundCategory {
    Equity,
    Debt,
    Hybrid,
}

impl FundCategory {
    /// Holding-period threshold below which a gain is short-term.
    pub fn stcg_threshold_days(&self) -> i64 {
        match self {
            FundCategory::Equity => crate::constants::EQUITY_STCG_THRESHOLD_DAYS,
            _ => crate::constants::NON_EQUITY_STCG_THRESHOLD_DAYS,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FundCategory::Equity => "equity",
            FundCategory::Debt => "debt",
            FundCategory::Hybrid => "hybrid",
        }
    }
}

/// One account-level container of transactions, identified by folio number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folio {
    pub folio_number: String,
    pub transactions: Vec<Transaction>,
}

/// A weighted name, e.g. one sector or one look-through holding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightedName {
    pub name: String,
    pub percentage: Decimal,
}

/// Explicit large/mid/small market-cap split, in percent of corpus.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketCapSplit {
    pub large: Decimal,
    pub mid: Decimal,
    pub small: Decimal,
}

/// Per-horizon trailing returns, in percent. A missing horizon means the
/// statistics source had no figure, not zero.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrailingReturns {
    pub one_year: Option<Decimal>,
    pub three_year: Option<Decimal>,
    pub five_year: Option<Decimal>,
}

/// Extended per-ISIN metadata from the external statistics source.
///
/// Every field is optional; the aggregator falls back to category/name
/// heuristics when a field is absent and never treats absence as an error.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundMetadata {
    /// Raw category string, e.g. "Equity", "ELSS", "Gilt".
    pub category: Option<String>,
    /// Raw sub-category string, e.g. "Large Cap", "Conservative Hybrid".
    pub sub_category: Option<String>,
    /// Per-sub-category allocation of the corpus, in percent.
    pub asset_allocation: Vec<WeightedName>,
    /// Explicit large/mid/small percentages, preferred over heuristics.
    pub market_cap: Option<MarketCapSplit>,
    /// Secondary market-cap source some statistics feeds expose instead
    /// of the explicit fields.
    pub market_cap_per: Option<MarketCapSplit>,
    /// Sector weights in percent of corpus.
    pub sectors: Vec<WeightedName>,
    /// Look-through company-level holdings in percent of corpus.
    pub holdings: Vec<WeightedName>,
    pub returns: TrailingReturns,
}

/// Aggregate root for one scheme: folios, NAV series and metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fund {
    pub scheme_name: String,
    pub isin: Option<String>,
    pub amc: String,
    /// Raw fund-type string from the statement, e.g. "EQUITY", used as a
    /// category fallback when extended metadata is missing.
    pub fund_type: Option<String>,
    pub folios: Vec<Folio>,
    /// Sparse NAV history; may have gaps and is not necessarily daily.
    pub nav_history: Vec<NavPoint>,
    /// Authoritative latest NAV, overriding the history's last point.
    pub latest_nav: Option<Decimal>,
    pub metadata: Option<FundMetadata>,
}

impl Fund {
    /// Deserializes one fund as handed over by the upstream statement
    /// parser.
    pub fn from_json(json: &str) -> Result<Fund> {
        Ok(serde_json::from_str(json)?)
    }

    /// All transactions across folios, in no particular order.
    pub fn all_transactions(&self) -> Vec<Transaction> {
        self.folios
            .iter()
            .flat_map(|f| f.transactions.iter().cloned())
            .collect()
    }

    /// Most recent known NAV: the explicit override when present, else the
    /// latest point of the NAV history.
    pub fn current_nav(&self) -> Option<Decimal> {
        self.latest_nav.or_else(|| {
            self.nav_history
                .iter()
                .max_by_key(|p| p.date)
                .map(|p| p.nav)
        })
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fund_round_trips_through_json() {
        let json = r#"{
            "schemeName": "Alpha Flexi Cap",
            "isin": "INF000000001",
            "amc": "Alpha AMC",
            "fundType": "EQUITY",
            "folios": [{
                "folioNumber": "1001/23",
                "transactions": [{
                    "txnType": "PURCHASE",
                    "date": "2023-01-01",
                    "units": 100.0,
                    "nav": 10.0,
                    "folio": "1001/23"
                }]
            }],
            "navHistory": [{"date": "2023-01-01", "nav": 10.0}],
            "latestNav": 12.5,
            "metadata": null
        }"#;
        let fund = Fund::from_json(json).unwrap();
        assert_eq!(fund.scheme_name, "Alpha Flexi Cap");
        assert_eq!(fund.folios[0].transactions.len(), 1);
        assert_eq!(fund.current_nav(), Some(rust_decimal_macros::dec!(12.5)));
    }

    #[test]
    fn malformed_fund_json_is_an_error() {
        let err = Fund::from_json("{\"schemeName\": 42}").unwrap_err();
        assert!(err.to_string().contains("JSON"));
    }
}

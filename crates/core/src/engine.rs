//! Top-level analytics pipeline.
//!
//! Wires the ledger, classifier, solver, reconstructor and aggregator
//! together: per-folio FIFO replays roll up into fund reports, fund
//! reports roll up into the portfolio view. Each fund is independent;
//! the aggregation pass runs once after all per-fund results are in.

use chrono::NaiveDate;
use log::debug;
use num_traits::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::aggregation::{FundAnalyticsInput, PortfolioAggregator, PortfolioAnalytics};
use crate::constants::MIN_REPORTABLE_UNITS;
use crate::errors::Result;
use crate::funds::{Fund, FundCategory};
use crate::gains::{FundGains, GainsClassifier, PortfolioGains};
use crate::ledger::{replay_folio, FolioSummary, LotConsumption};
use crate::transactions::CashFlow;
use crate::utils::valuation_date_today;
use crate::valuation::{
    DailyValuationPoint, PortfolioValuationPoint, ValuationService, ValuationServiceTrait,
};
use crate::xirr::{compute_xirr, DatedFlow, Xirr};

/// Everything the engine derives for one fund.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundReport {
    pub scheme_name: String,
    pub amc: String,
    pub category: FundCategory,
    pub folio_summaries: Vec<FolioSummary>,
    /// Detailed lot-consumption log across folios, for reporting.
    pub consumptions: Vec<LotConsumption>,
    pub invested: Decimal,
    pub withdrawn: Decimal,
    pub realized_gain: Decimal,
    pub remaining_units: Decimal,
    pub remaining_cost: Decimal,
    pub current_value: Decimal,
    pub unrealized_gain: Decimal,
    pub gains: FundGains,
    pub xirr: Option<Xirr>,
    pub daily_series: Vec<DailyValuationPoint>,
}

impl FundReport {
    /// True while the fund still holds a reportable number of units.
    pub fn is_active(&self) -> bool {
        self.remaining_units > MIN_REPORTABLE_UNITS
    }
}

/// The combined portfolio view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioReport {
    pub funds: Vec<FundReport>,
    pub analytics: PortfolioAnalytics,
    pub gains: PortfolioGains,
    pub daily_series: Vec<PortfolioValuationPoint>,
    pub xirr: Option<Xirr>,
    /// XIRR over funds that still hold units.
    pub active_xirr: Option<Xirr>,
}

impl PortfolioReport {
    /// Serializes the report for dashboard or spreadsheet consumers.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Stateless between runs; owns the classifier's category cache for the
/// duration of one portfolio analysis.
pub struct AnalyticsEngine {
    valuation_service: ValuationService,
}

impl Default for AnalyticsEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalyticsEngine {
    pub fn new() -> Self {
        Self {
            valuation_service: ValuationService::new(),
        }
    }

    /// Runs the full pipeline as of the current date in the portfolio's
    /// home timezone.
    pub fn analyze_today(&self, funds: &[Fund]) -> PortfolioReport {
        self.analyze(funds, valuation_date_today())
    }

    /// Runs the full pipeline over all funds as of `today`.
    pub fn analyze(&self, funds: &[Fund], today: NaiveDate) -> PortfolioReport {
        let mut classifier = GainsClassifier::new();

        let daily = self.valuation_service.reconstruct_all(funds, today);
        let reports: Vec<FundReport> = funds
            .iter()
            .zip(daily)
            .map(|(fund, series)| self.analyze_fund(fund, series, &mut classifier, today))
            .collect();

        let inputs: Vec<FundAnalyticsInput> = reports
            .iter()
            .zip(funds)
            .map(|(report, fund)| FundAnalyticsInput {
                scheme_name: report.scheme_name.clone(),
                amc: report.amc.clone(),
                category: report.category,
                current_value: report.current_value,
                metadata: fund.metadata.clone(),
            })
            .collect();
        let analytics = PortfolioAggregator::aggregate(&inputs);

        let per_fund_series: Vec<Vec<DailyValuationPoint>> = reports
            .iter()
            .map(|r| r.daily_series.clone())
            .collect();
        let daily_series = PortfolioAggregator::combine_daily_series(&per_fund_series);

        let mut portfolio_gains = PortfolioGains::default();
        for report in &reports {
            portfolio_gains.merge_fund(&report.gains);
        }

        let xirr = scope_xirr(reports.iter(), today);
        let active_xirr = scope_xirr(reports.iter().filter(|r| r.is_active()), today);

        PortfolioReport {
            funds: reports,
            analytics,
            gains: portfolio_gains,
            daily_series,
            xirr,
            active_xirr,
        }
    }

    fn analyze_fund(
        &self,
        fund: &Fund,
        daily_series: Vec<DailyValuationPoint>,
        classifier: &mut GainsClassifier,
        today: NaiveDate,
    ) -> FundReport {
        let category = classifier.resolve_category(fund);
        let latest_nav = fund.current_nav();
        if latest_nav.is_none() {
            debug!(
                "Fund '{}' has no NAV; current value treated as zero",
                fund.scheme_name
            );
        }

        let mut gains = FundGains::new(category);
        let mut report = FundReport {
            scheme_name: fund.scheme_name.clone(),
            amc: fund.amc.clone(),
            category,
            folio_summaries: Vec::new(),
            consumptions: Vec::new(),
            invested: Decimal::ZERO,
            withdrawn: Decimal::ZERO,
            realized_gain: Decimal::ZERO,
            remaining_units: Decimal::ZERO,
            remaining_cost: Decimal::ZERO,
            current_value: Decimal::ZERO,
            unrealized_gain: Decimal::ZERO,
            gains: FundGains::new(category),
            xirr: None,
            daily_series,
        };

        for folio in &fund.folios {
            let run = replay_folio(folio, latest_nav, today);
            classifier.classify(&mut gains, &run.consumptions);

            report.invested += run.summary.invested;
            report.withdrawn += run.summary.withdrawn;
            report.realized_gain += run.summary.realized_gain;
            report.remaining_units += run.summary.remaining_units;
            report.remaining_cost += run.summary.remaining_cost;
            report.current_value += run.summary.current_value;
            report.unrealized_gain += run.summary.unrealized_gain;
            report.consumptions.extend(run.consumptions);
            report.folio_summaries.push(run.summary);
        }
        report.gains = gains;
        report.xirr = fund_xirr(&report, today);
        report
    }
}

/// Fund-scope XIRR: the folio cash flows plus one valuation pseudo-flow
/// for the units still held. The pseudo-flow exists only for solving and
/// is never written back into any summary.
fn fund_xirr(report: &FundReport, today: NaiveDate) -> Option<Xirr> {
    let flows = collect_flows(
        report.folio_summaries.iter().flat_map(|s| &s.cash_flows),
        report.current_value,
        today,
    );
    compute_xirr(&flows)
}

fn scope_xirr<'a>(
    reports: impl Iterator<Item = &'a FundReport>,
    today: NaiveDate,
) -> Option<Xirr> {
    let mut all_flows: Vec<&CashFlow> = Vec::new();
    let mut total_value = Decimal::ZERO;
    for report in reports {
        total_value += report.current_value;
        all_flows.extend(report.folio_summaries.iter().flat_map(|s| &s.cash_flows));
    }
    let flows = collect_flows(all_flows.into_iter(), total_value, today);
    compute_xirr(&flows)
}

fn collect_flows<'a>(
    cash_flows: impl Iterator<Item = &'a CashFlow>,
    current_value: Decimal,
    today: NaiveDate,
) -> Vec<DatedFlow> {
    let mut flows: Vec<DatedFlow> = cash_flows.map(DatedFlow::from).collect();
    if current_value > Decimal::ZERO {
        flows.push(DatedFlow {
            date: today,
            amount: current_value.to_f64().unwrap_or_default(),
        });
    }
    flows
}

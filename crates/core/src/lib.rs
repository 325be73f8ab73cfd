//! Folioscope Core - Portfolio analytics over fund transaction ledgers.
//!
//! A pure in-process computation library: per-folio FIFO tax-lot ledgers,
//! STCG/LTCG capital-gains bucketing, XIRR over irregular cash flows,
//! day-by-day valuation reconstruction and weighted cross-fund
//! aggregation. Statement parsing, persistence and presentation live in
//! the host application.

pub mod aggregation;
pub mod constants;
pub mod engine;
pub mod errors;
pub mod funds;
pub mod gains;
pub mod ledger;
pub mod transactions;
pub mod utils;
pub mod valuation;
pub mod xirr;

// Re-export the main pipeline types
pub use engine::{AnalyticsEngine, FundReport, PortfolioReport};

// Re-export error types
pub use errors::Error;
pub use errors::Result;

//! Orchestration of per-fund series reconstruction.
//!
//! Each fund's replay is self-contained, so funds run in parallel with no
//! shared state. For hosts that cannot block a thread for a large
//! portfolio, the async variant processes a chunk of funds per scheduling
//! quantum, yields between chunks, and honours a cancel flag.

use async_trait::async_trait;
use chrono::NaiveDate;
use log::debug;
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::funds::Fund;
use crate::valuation::{reconstruct_daily_series, DailyValuationPoint};

/// Funds processed per cooperative quantum in the async path.
pub const DEFAULT_VALUATION_CHUNK_SIZE: usize = 8;

#[async_trait]
pub trait ValuationServiceTrait: Send + Sync {
    /// Reconstructs every fund's daily series, in parallel.
    fn reconstruct_all(&self, funds: &[Fund], today: NaiveDate) -> Vec<Vec<DailyValuationPoint>>;

    /// Chunked, cancellable reconstruction. Returns the series computed so
    /// far (possibly truncated) when `cancel` flips to true between chunks.
    async fn reconstruct_all_chunked(
        &self,
        funds: &[Fund],
        today: NaiveDate,
        cancel: Arc<AtomicBool>,
    ) -> Vec<Vec<DailyValuationPoint>>;
}

/// Stateless reconstruction service.
#[derive(Debug, Clone)]
pub struct ValuationService {
    chunk_size: usize,
}

impl Default for ValuationService {
    fn default() -> Self {
        Self::new()
    }
}

impl ValuationService {
    pub fn new() -> Self {
        Self {
            chunk_size: DEFAULT_VALUATION_CHUNK_SIZE,
        }
    }

    pub fn with_chunk_size(chunk_size: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
        }
    }

    fn reconstruct_fund(fund: &Fund, today: NaiveDate) -> Vec<DailyValuationPoint> {
        reconstruct_daily_series(
            &fund.all_transactions(),
            &fund.nav_history,
            fund.latest_nav,
            today,
        )
    }
}

#[async_trait]
impl ValuationServiceTrait for ValuationService {
    fn reconstruct_all(&self, funds: &[Fund], today: NaiveDate) -> Vec<Vec<DailyValuationPoint>> {
        funds
            .par_iter()
            .map(|fund| Self::reconstruct_fund(fund, today))
            .collect()
    }

    async fn reconstruct_all_chunked(
        &self,
        funds: &[Fund],
        today: NaiveDate,
        cancel: Arc<AtomicBool>,
    ) -> Vec<Vec<DailyValuationPoint>> {
        let mut results = Vec::with_capacity(funds.len());
        for chunk in funds.chunks(self.chunk_size) {
            if cancel.load(Ordering::Relaxed) {
                debug!(
                    "Valuation reconstruction cancelled after {} of {} funds",
                    results.len(),
                    funds.len()
                );
                break;
            }
            for fund in chunk {
                results.push(Self::reconstruct_fund(fund, today));
            }
            // Hand the scheduler back between chunks so a host task is
            // never blocked for the whole portfolio.
            tokio::task::yield_now().await;
        }
        results
    }
}

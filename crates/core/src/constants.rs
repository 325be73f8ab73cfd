use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// STCG holding-period threshold for equity funds, in days.
/// A sale at exactly this holding period is long-term.
pub const EQUITY_STCG_THRESHOLD_DAYS: i64 = 365;

/// STCG holding-period threshold for debt and hybrid funds, in days.
pub const NON_EQUITY_STCG_THRESHOLD_DAYS: i64 = 730;

/// A tax lot is treated as fully consumed when its remaining units fall
/// below this absolute tolerance.
pub const LOT_EPSILON_ABS: Decimal = dec!(0.0001);

/// Relative variant of the consumption tolerance, against the lot's
/// original size.
pub const LOT_EPSILON_REL: Decimal = dec!(0.001);

/// Daily valuation points are only emitted while remaining units exceed
/// this threshold; the same cutoff defines an "active" holding.
pub const MIN_REPORTABLE_UNITS: Decimal = dec!(0.001);

/// Day-count denominator for annualizing cash-flow returns.
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Decimal places for monetary values in emitted series.
pub const VALUE_DECIMAL_PRECISION: u32 = 2;

/// Decimal places for unit quantities in emitted series.
pub const UNITS_DECIMAL_PRECISION: u32 = 4;

/// Decimal places for portfolio-level percentages.
pub const PERCENT_DECIMAL_PRECISION: u32 = 2;

/// Decimal places for individual look-through holding percentages.
/// Extra precision preserves ordering among small long-tail positions.
pub const HOLDING_PERCENT_DECIMAL_PRECISION: u32 = 6;

/// Sector and AMC breakdowns keep this many entries before folding the
/// remainder into "Others".
pub const BREAKDOWN_TOP_N: usize = 10;

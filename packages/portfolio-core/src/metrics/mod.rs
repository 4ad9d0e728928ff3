//! Metric functions over return series.
//!
//! Pure functions with no portfolio state. [`crate::Portfolio`] composes them;
//! they are also usable directly on any periodic return series.

mod performance;
mod risk;
pub mod stats;

pub use performance::{
    annualized_return, beta, calmar_ratio, downside_deviation, information_ratio, sharpe_ratio,
    sortino_ratio, treynor_ratio,
};
pub use risk::{
    conditional_value_at_risk, diversification_ratio, drawdown_series, max_drawdown,
    portfolio_variance, value_at_risk, volatility, Drawdowns,
};
pub(crate) use risk::{annualized_volatility, weighted_diversification};

/// Trading days used to annualize daily statistics.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Confidence level used for VaR/CVaR when none is given.
pub const DEFAULT_CONFIDENCE_LEVEL: f64 = 0.95;

//! Portfolio Core - Risk/performance analytics and optimizer objectives.
//!
//! This crate provides the evaluation side of portfolio optimization:
//!
//! - **Metrics**: volatility, VaR, CVaR, drawdown, diversification ratio,
//!   Sharpe, Sortino, Calmar, Information Ratio, Treynor
//! - **Portfolio**: normalized weights over historical returns, with
//!   performance and risk reports
//! - **Objectives**: scalar functions of a weight vector for an external
//!   minimizer, plus a Pareto (return, risk) pair
//!
//! It never searches for weights itself.
//!
//! # Example
//!
//! ```rust
//! use portfolio_core::{get_objective_function, ObjectiveData, Portfolio, ReturnMatrix};
//!
//! let returns = ReturnMatrix::from_columns([
//!     ("AAA", vec![0.01, -0.01, 0.02]),
//!     ("BBB", vec![0.00, 0.01, -0.01]),
//! ])?;
//!
//! // Evaluate a candidate the way an optimizer would
//! let assets = returns.assets().to_vec();
//! let data = ObjectiveData::new(&assets, &returns)?;
//! let objective = get_objective_function("sharpe")?;
//! let score = objective(&[0.6, 0.4], &data)?;
//!
//! // Report on the chosen weights
//! let portfolio = Portfolio::new(&[0.6, 0.4], &assets, &returns, None)?;
//! assert_eq!(score, -portfolio.sharpe_ratio(0.0));
//! println!("{portfolio}");
//! # Ok::<(), portfolio_core::Error>(())
//! ```

pub mod metrics;
pub mod objectives;
pub mod portfolio;
pub mod types;

// Re-export commonly used types
pub use types::{
    CovarianceMatrix, MetricValue, MetricsConfig, PerformanceMetrics, ReturnMatrix, RiskMetrics,
};

// Re-export main functionality
pub use metrics::{
    calmar_ratio, conditional_value_at_risk, diversification_ratio, drawdown_series,
    information_ratio, max_drawdown, sharpe_ratio, sortino_ratio, treynor_ratio, value_at_risk,
    volatility, DEFAULT_CONFIDENCE_LEVEL, TRADING_DAYS_PER_YEAR,
};
pub use objectives::{
    cvar_objective, get_objective_function, objective_names, pareto_objective, return_objective,
    sharpe_objective, sortino_objective, treynor_objective, var_objective, volatility_objective,
    Objective, ObjectiveData, ObjectiveFn,
};
pub use portfolio::Portfolio;

/// Error types for portfolio-core operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unknown objective '{name}'; valid objectives: {valid}")]
    UnknownObjective { name: String, valid: String },

    #[error("Length mismatch for {what}: expected {expected} periods, got {actual}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),
}

/// Result type for portfolio-core operations.
pub type Result<T> = std::result::Result<T, Error>;

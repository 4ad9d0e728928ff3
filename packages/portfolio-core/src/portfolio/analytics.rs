//! Derived return series and metric reports for a [`Portfolio`].

use tracing::warn;

use super::Portfolio;
use crate::metrics::{self, stats, Drawdowns, DEFAULT_CONFIDENCE_LEVEL, TRADING_DAYS_PER_YEAR};
use crate::types::{MetricValue, PerformanceMetrics, ReturnMatrix, RiskMetrics};

/// Lazily computed weighted portfolio return, one item per period.
#[derive(Debug, Clone)]
pub struct PeriodReturns<'p> {
    returns: &'p ReturnMatrix,
    columns: &'p [usize],
    weights: &'p [f64],
    period: usize,
}

impl Iterator for PeriodReturns<'_> {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        if self.period >= self.returns.periods() {
            return None;
        }
        let t = self.period;
        self.period += 1;

        Some(
            self.columns
                .iter()
                .zip(self.weights)
                .map(|(&c, w)| w * self.returns.column_at(c)[t])
                .sum(),
        )
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.returns.periods().saturating_sub(self.period);
        (remaining, Some(remaining))
    }
}

impl Portfolio<'_> {
    /// Weighted portfolio return for each period, computed lazily.
    pub fn period_returns(&self) -> PeriodReturns<'_> {
        PeriodReturns {
            returns: self.returns,
            columns: &self.columns,
            weights: &self.weights,
            period: 0,
        }
    }

    /// Weighted sum of asset returns per period, aligned with the return
    /// matrix periods.
    pub fn portfolio_returns(&self) -> Vec<f64> {
        self.period_returns().collect()
    }

    /// Running product of `(1 + r)` minus one.
    pub fn cumulative_returns(&self) -> Vec<f64> {
        self.period_returns()
            .scan(1.0, |wealth, r| {
                *wealth *= 1.0 + r;
                Some(*wealth - 1.0)
            })
            .collect()
    }

    /// Drawdown of the portfolio's cumulative return curve, one value per period.
    pub fn drawdown_series(&self) -> Drawdowns<PeriodReturns<'_>> {
        metrics::drawdown_series(self.period_returns())
    }

    /// Most negative drawdown.
    pub fn max_drawdown(&self) -> f64 {
        metrics::max_drawdown(self.period_returns())
    }

    /// Annualized expected return: `Σ wᵢ × mean(rᵢ) × 252`.
    pub fn annualized_return(&self) -> f64 {
        self.columns
            .iter()
            .zip(&self.weights)
            .map(|(&c, w)| w * stats::mean(self.returns.column_at(c)))
            .sum::<f64>()
            * TRADING_DAYS_PER_YEAR
    }

    /// Annualized volatility from the covariance matrix.
    pub fn volatility(&self) -> f64 {
        // Construction restricts the covariance to exactly these weights.
        metrics::annualized_volatility(&self.weights, self.covariance.matrix())
    }

    /// Sharpe ratio; 0.0 when volatility is zero.
    pub fn sharpe_ratio(&self, risk_free_rate: f64) -> f64 {
        metrics::sharpe_ratio(self.annualized_return(), self.volatility(), risk_free_rate)
    }

    /// Historical VaR of the portfolio's periodic returns.
    pub fn value_at_risk(&self, confidence_level: f64) -> f64 {
        metrics::value_at_risk(&self.portfolio_returns(), confidence_level)
    }

    /// Historical CVaR of the portfolio's periodic returns.
    pub fn conditional_value_at_risk(&self, confidence_level: f64) -> f64 {
        metrics::conditional_value_at_risk(&self.portfolio_returns(), confidence_level)
    }

    pub fn diversification_ratio(&self) -> f64 {
        metrics::weighted_diversification(&self.weights, self.covariance.matrix())
    }

    /// Sortino ratio of the portfolio's periodic returns.
    pub fn sortino_ratio(&self, risk_free_rate: f64, target_return: f64) -> f64 {
        metrics::sortino_ratio(&self.portfolio_returns(), risk_free_rate, target_return)
    }

    /// Beta against the attached market series; `None` without one.
    pub fn beta(&self) -> Option<MetricValue> {
        let market = self.market_returns?;
        Some(metrics::beta(&self.portfolio_returns(), market).into())
    }

    /// Treynor ratio against the attached market series, using the
    /// portfolio's own risk-free rate; `None` without a market series.
    pub fn treynor_ratio(&self) -> Option<MetricValue> {
        let market = self.market_returns?;
        Some(
            metrics::treynor_ratio(&self.portfolio_returns(), market, self.risk_free_rate).into(),
        )
    }

    /// Calculate performance metrics.
    ///
    /// Information Ratio and Treynor ratio are only present when a benchmark
    /// is supplied. A benchmark that cannot be used (wrong length, too short,
    /// non-finite values) marks those entries unavailable and logs a warning
    /// instead of failing.
    ///
    /// # Arguments
    ///
    /// * `benchmark_returns` - Periodic benchmark returns aligned with the portfolio
    /// * `risk_free_rate` - Annual risk-free rate
    pub fn performance_metrics(
        &self,
        benchmark_returns: Option<&[f64]>,
        risk_free_rate: f64,
    ) -> PerformanceMetrics {
        let returns = self.portfolio_returns();

        let (information_ratio, treynor_ratio) = match benchmark_returns {
            Some(benchmark) => {
                let information_ratio =
                    checked("information_ratio", metrics::information_ratio(&returns, benchmark));
                let treynor_ratio = checked(
                    "treynor_ratio",
                    metrics::treynor_ratio(&returns, benchmark, risk_free_rate),
                );
                (Some(information_ratio), Some(treynor_ratio))
            }
            None => (None, None),
        };

        PerformanceMetrics {
            annualized_return: self.annualized_return(),
            sharpe_ratio: self.sharpe_ratio(risk_free_rate),
            sortino_ratio: metrics::sortino_ratio(&returns, risk_free_rate, 0.0),
            calmar_ratio: metrics::calmar_ratio(&returns, risk_free_rate),
            information_ratio,
            treynor_ratio,
        }
    }

    /// Calculate risk metrics at the default 95% confidence level.
    pub fn risk_metrics(&self) -> RiskMetrics {
        self.risk_metrics_at(DEFAULT_CONFIDENCE_LEVEL)
    }

    /// Calculate risk metrics with VaR/CVaR at `confidence_level`.
    pub fn risk_metrics_at(&self, confidence_level: f64) -> RiskMetrics {
        let returns = self.portfolio_returns();

        RiskMetrics {
            volatility: self.volatility(),
            confidence_level,
            var: metrics::value_at_risk(&returns, confidence_level),
            cvar: metrics::conditional_value_at_risk(&returns, confidence_level),
            max_drawdown: metrics::max_drawdown(returns.iter().copied()),
            diversification_ratio: self.diversification_ratio(),
            skewness: stats::skewness(&returns),
            kurtosis: stats::excess_kurtosis(&returns),
        }
    }
}

fn checked(metric: &'static str, result: crate::Result<f64>) -> MetricValue {
    let value = MetricValue::from(result);
    if let MetricValue::Unavailable { reason } = &value {
        warn!(metric, %reason, "Benchmark metric unavailable");
    }
    value
}

//! Risk-adjusted performance ratios.
//!
//! Ratios with a degenerate denominator (zero volatility, zero downside
//! deviation, zero drawdown, zero beta) evaluate to 0.0 instead of failing.
//! Only benchmark-relative ratios can fail, and only when the benchmark series
//! cannot be aligned with the portfolio returns.

use super::risk::max_drawdown;
use super::stats::{is_degenerate, mean, sample_covariance, sample_std, sample_variance};
use super::TRADING_DAYS_PER_YEAR;
use crate::{Error, Result};

/// Annualize the arithmetic mean of periodic returns (`mean × 252`).
pub fn annualized_return(returns: &[f64]) -> f64 {
    mean(returns) * TRADING_DAYS_PER_YEAR
}

/// Calculate Sharpe ratio from annualized figures.
///
/// # Arguments
///
/// * `annualized_return` - Annualized portfolio return
/// * `volatility` - Annualized portfolio volatility
/// * `risk_free_rate` - Annual risk-free rate
///
/// # Returns
///
/// `(return - risk_free_rate) / volatility`, or 0.0 when volatility is zero.
pub fn sharpe_ratio(annualized_return: f64, volatility: f64, risk_free_rate: f64) -> f64 {
    if is_degenerate(volatility) {
        return 0.0;
    }
    (annualized_return - risk_free_rate) / volatility
}

/// Annualized standard deviation of the returns that fall below `target_return`.
///
/// Zero when fewer than two periods fall below the target.
pub fn downside_deviation(returns: &[f64], target_return: f64) -> f64 {
    let downside: Vec<f64> = returns
        .iter()
        .copied()
        .filter(|&r| r < target_return)
        .collect();

    sample_std(&downside) * TRADING_DAYS_PER_YEAR.sqrt()
}

/// Calculate Sortino ratio from periodic portfolio returns.
///
/// # Arguments
///
/// * `returns` - Periodic portfolio returns
/// * `risk_free_rate` - Annual risk-free rate
/// * `target_return` - Periodic threshold below which a return counts as downside
///
/// # Returns
///
/// Annualized excess return over downside deviation; 0.0 when no periods fall
/// below the target.
pub fn sortino_ratio(returns: &[f64], risk_free_rate: f64, target_return: f64) -> f64 {
    let downside = downside_deviation(returns, target_return);
    if is_degenerate(downside) {
        return 0.0;
    }
    (annualized_return(returns) - risk_free_rate) / downside
}

/// Calculate Calmar ratio: annualized excess return over `|max drawdown|`.
///
/// 0.0 when the series never draws down.
pub fn calmar_ratio(returns: &[f64], risk_free_rate: f64) -> f64 {
    let drawdown = max_drawdown(returns.iter().copied()).abs();
    if is_degenerate(drawdown) {
        return 0.0;
    }
    (annualized_return(returns) - risk_free_rate) / drawdown
}

/// Calculate Information Ratio: mean active return over its standard deviation.
///
/// Active return is the per-period difference between portfolio and benchmark.
/// Fails when the two series are not the same length; returns 0.0 when the
/// active return never varies.
pub fn information_ratio(returns: &[f64], benchmark_returns: &[f64]) -> Result<f64> {
    check_aligned("benchmark returns", returns, benchmark_returns)?;

    let active: Vec<f64> = returns
        .iter()
        .zip(benchmark_returns)
        .map(|(r, b)| r - b)
        .collect();

    let tracking_error = sample_std(&active);
    if is_degenerate(tracking_error) {
        return Ok(0.0);
    }
    Ok(mean(&active) / tracking_error)
}

/// Calculate portfolio beta: `cov(portfolio, market) / var(market)`.
///
/// 0.0 when the market series has zero variance.
pub fn beta(returns: &[f64], market_returns: &[f64]) -> Result<f64> {
    check_aligned("market returns", returns, market_returns)?;

    let market_variance = sample_variance(market_returns);
    if is_degenerate(market_variance) {
        return Ok(0.0);
    }
    Ok(sample_covariance(returns, market_returns) / market_variance)
}

/// Calculate Treynor ratio: annualized excess return per unit of beta.
///
/// 0.0 when beta is zero.
pub fn treynor_ratio(returns: &[f64], market_returns: &[f64], risk_free_rate: f64) -> Result<f64> {
    let beta = beta(returns, market_returns)?;
    if is_degenerate(beta) {
        return Ok(0.0);
    }
    Ok((annualized_return(returns) - risk_free_rate) / beta)
}

fn check_aligned(what: &'static str, returns: &[f64], other: &[f64]) -> Result<()> {
    if returns.len() != other.len() {
        return Err(Error::LengthMismatch {
            what,
            expected: returns.len(),
            actual: other.len(),
        });
    }
    if returns.len() < 2 {
        return Err(Error::InsufficientData(format!(
            "Need at least 2 periods of {what}, got {}",
            returns.len()
        )));
    }
    if other.iter().any(|r| !r.is_finite()) {
        return Err(Error::Validation(format!("{what} contain non-finite values")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_annualized_return() {
        let returns = vec![0.001; 10];
        assert_relative_eq!(annualized_return(&returns), 0.252, epsilon = 1e-12);
        assert_eq!(annualized_return(&[]), 0.0);
    }

    #[test]
    fn test_sharpe_ratio() {
        assert_relative_eq!(sharpe_ratio(0.12, 0.2, 0.02), 0.5, epsilon = 1e-12);
        assert!(sharpe_ratio(-0.05, 0.2, 0.02) < 0.0);
        assert_eq!(sharpe_ratio(0.12, 0.0, 0.02), 0.0);
    }

    #[test]
    fn test_sortino_ratio_no_downside_is_zero() {
        let all_positive: Vec<f64> = (0..100).map(|_| 0.001).collect();
        assert_eq!(sortino_ratio(&all_positive, 0.04, 0.0), 0.0);
    }

    #[test]
    fn test_sortino_ratio_uses_target() {
        let returns = vec![0.02, -0.01, 0.015, -0.02, 0.01, 0.005];

        let at_zero = sortino_ratio(&returns, 0.0, 0.0);
        assert!(at_zero > 0.0);

        // A 1% target also counts the 0.5% period as downside
        let below_zero = downside_deviation(&returns, 0.0);
        let below_one_percent = downside_deviation(&returns, 0.01);
        assert!(below_zero > 0.0);
        assert!(below_one_percent > 0.0);
        assert_ne!(below_zero, below_one_percent);
        assert_ne!(sortino_ratio(&returns, 0.0, 0.01), at_zero);
    }

    #[test]
    fn test_calmar_ratio() {
        let returns = vec![0.10, 0.05, -0.15, -0.10, 0.05];
        let expected = annualized_return(&returns) / 0.235;
        assert_relative_eq!(calmar_ratio(&returns, 0.0), expected, epsilon = 1e-9);

        assert_eq!(calmar_ratio(&[0.01, 0.02], 0.0), 0.0);
    }

    #[test]
    fn test_information_ratio() {
        let returns = vec![0.02, 0.01, 0.03, 0.00];
        let benchmark = vec![0.01, 0.01, 0.01, 0.01];

        // active = [0.01, 0.0, 0.02, -0.01]
        let active = [0.01, 0.0, 0.02, -0.01];
        let expected = mean(&active) / sample_std(&active);
        assert_relative_eq!(
            information_ratio(&returns, &benchmark).unwrap(),
            expected,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_information_ratio_length_mismatch() {
        let result = information_ratio(&[0.01, 0.02, 0.03], &[0.01, 0.02]);
        assert!(matches!(
            result,
            Err(Error::LengthMismatch {
                expected: 3,
                actual: 2,
                ..
            })
        ));
    }

    #[test]
    fn test_beta_of_market_is_one() {
        let market = vec![0.01, -0.02, 0.015, 0.003, -0.007];
        assert_relative_eq!(beta(&market, &market).unwrap(), 1.0, epsilon = 1e-12);

        let levered: Vec<f64> = market.iter().map(|r| 2.0 * r).collect();
        assert_relative_eq!(beta(&levered, &market).unwrap(), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_treynor_zero_market_variance() {
        let returns = vec![0.01, -0.02, 0.015];
        let flat_market = vec![0.001, 0.001, 0.001];
        assert_eq!(treynor_ratio(&returns, &flat_market, 0.0).unwrap(), 0.0);
    }

    #[test]
    fn test_treynor_ratio() {
        let market = vec![0.01, -0.02, 0.015, 0.003, -0.007];
        let levered: Vec<f64> = market.iter().map(|r| 2.0 * r).collect();

        let expected = (annualized_return(&levered) - 0.01) / 2.0;
        assert_relative_eq!(
            treynor_ratio(&levered, &market, 0.01).unwrap(),
            expected,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_benchmark_non_finite_rejected() {
        let result = beta(&[0.01, 0.02], &[0.01, f64::NAN]);
        assert!(matches!(result, Err(Error::Validation(_))));
    }
}

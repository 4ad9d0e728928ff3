//! Portfolio risk metrics.
//!
//! Provides annualized volatility, historical VaR and CVaR, drawdown analysis
//! and the diversification ratio.

use nalgebra::{DMatrix, DVector};

use super::stats::{is_degenerate, mean, quantile};
use super::TRADING_DAYS_PER_YEAR;
use crate::{Error, Result};

/// Periodic portfolio variance wᵀΣw, floored at zero.
///
/// Fails when the covariance matrix is not square or its size differs from
/// the number of weights.
pub fn portfolio_variance(weights: &[f64], cov_matrix: &DMatrix<f64>) -> Result<f64> {
    check_dimensions(weights, cov_matrix)?;
    Ok(quadratic_form(weights, cov_matrix))
}

/// Calculate annualized portfolio volatility.
///
/// `sqrt(wᵀΣw × 252)` where Σ is the covariance of periodic returns. Tiny
/// negative variances from rounding are floored so the result is never
/// negative.
///
/// # Arguments
///
/// * `weights` - Asset weights, in the same order as the covariance rows
/// * `cov_matrix` - Covariance of periodic (daily) returns
///
/// # Errors
///
/// [`Error::LengthMismatch`] when the weights and matrix disagree in size.
pub fn volatility(weights: &[f64], cov_matrix: &DMatrix<f64>) -> Result<f64> {
    check_dimensions(weights, cov_matrix)?;
    Ok(annualized_volatility(weights, cov_matrix))
}

/// [`volatility`] for callers that already hold a matching weight vector.
pub(crate) fn annualized_volatility(weights: &[f64], cov_matrix: &DMatrix<f64>) -> f64 {
    (quadratic_form(weights, cov_matrix) * TRADING_DAYS_PER_YEAR).sqrt()
}

fn quadratic_form(weights: &[f64], cov_matrix: &DMatrix<f64>) -> f64 {
    let w = DVector::from_column_slice(weights);
    let variance = (w.transpose() * cov_matrix * &w)[(0, 0)];
    variance.max(0.0)
}

fn check_dimensions(weights: &[f64], cov_matrix: &DMatrix<f64>) -> Result<()> {
    if !cov_matrix.is_square() {
        return Err(Error::Validation(format!(
            "Covariance matrix must be square, got {}x{}",
            cov_matrix.nrows(),
            cov_matrix.ncols()
        )));
    }
    if weights.len() != cov_matrix.nrows() {
        return Err(Error::LengthMismatch {
            what: "weights",
            expected: cov_matrix.nrows(),
            actual: weights.len(),
        });
    }
    Ok(())
}

/// Calculate historical Value at Risk.
///
/// The negated empirical `1 - confidence_level` quantile of the returns, so a
/// loss shows up as a positive number.
///
/// # Arguments
///
/// * `returns` - Periodic portfolio returns
/// * `confidence_level` - Confidence level (e.g., 0.95 for 95%)
pub fn value_at_risk(returns: &[f64], confidence_level: f64) -> f64 {
    if returns.is_empty() {
        return 0.0;
    }
    -quantile(returns, 1.0 - confidence_level)
}

/// Calculate historical Conditional VaR (Expected Shortfall).
///
/// The negated mean of all returns at or below the VaR quantile. Never less
/// than [`value_at_risk`] for the same inputs.
pub fn conditional_value_at_risk(returns: &[f64], confidence_level: f64) -> f64 {
    if returns.is_empty() {
        return 0.0;
    }

    let threshold = quantile(returns, 1.0 - confidence_level);
    let tail: Vec<f64> = returns.iter().copied().filter(|&r| r <= threshold).collect();

    // The minimum return is always at or below an interpolated quantile.
    -mean(&tail)
}

/// Lazy drawdown series over a stream of periodic returns.
///
/// Yields one value per period: current cumulative wealth divided by its
/// running peak, minus one. Every value is `<= 0`.
#[derive(Debug, Clone)]
pub struct Drawdowns<I> {
    returns: I,
    wealth: f64,
    peak: Option<f64>,
}

impl<I> Iterator for Drawdowns<I>
where
    I: Iterator<Item = f64>,
{
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        let r = self.returns.next()?;
        self.wealth *= 1.0 + r;

        let peak = match self.peak {
            Some(peak) if peak >= self.wealth => peak,
            _ => self.wealth,
        };
        self.peak = Some(peak);

        if peak <= 0.0 {
            // Wealth wiped out from the first period on.
            return Some(-1.0);
        }
        Some((self.wealth / peak - 1.0).min(0.0))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.returns.size_hint()
    }
}

/// Build a lazy drawdown series from periodic returns.
///
/// ```
/// use portfolio_core::metrics::drawdown_series;
///
/// let dd: Vec<f64> = drawdown_series([0.10, -0.10]).collect();
/// assert_eq!(dd[0], 0.0);
/// assert!((dd[1] + 0.10).abs() < 1e-12);
/// ```
pub fn drawdown_series<I>(returns: I) -> Drawdowns<I::IntoIter>
where
    I: IntoIterator<Item = f64>,
{
    Drawdowns {
        returns: returns.into_iter(),
        wealth: 1.0,
        peak: None,
    }
}

/// Calculate maximum drawdown: the most negative value of the drawdown series.
///
/// Returns a value `<= 0` (e.g., -0.15 for a 15% decline); 0.0 for empty input.
pub fn max_drawdown<I>(returns: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    drawdown_series(returns).fold(0.0, f64::min)
}

/// Calculate the diversification ratio `Σ wᵢσᵢ / σₚ`.
///
/// At least 1 for long-only weights and a valid covariance matrix, exactly 1
/// for perfectly correlated assets. Returns 0.0 when portfolio volatility is
/// degenerate.
///
/// # Errors
///
/// [`Error::LengthMismatch`] when the weights and matrix disagree in size.
pub fn diversification_ratio(weights: &[f64], cov_matrix: &DMatrix<f64>) -> Result<f64> {
    check_dimensions(weights, cov_matrix)?;
    Ok(weighted_diversification(weights, cov_matrix))
}

/// [`diversification_ratio`] for callers that already hold a matching weight vector.
pub(crate) fn weighted_diversification(weights: &[f64], cov_matrix: &DMatrix<f64>) -> f64 {
    let portfolio_vol = quadratic_form(weights, cov_matrix).sqrt();
    if is_degenerate(portfolio_vol) {
        return 0.0;
    }

    let weighted_vol: f64 = weights
        .iter()
        .enumerate()
        .map(|(i, w)| w * cov_matrix[(i, i)].max(0.0).sqrt())
        .sum();

    weighted_vol / portfolio_vol
}

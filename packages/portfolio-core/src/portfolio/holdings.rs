//! Portfolio weights, validation, and accessors.

use std::fmt;

use crate::metrics::stats::is_degenerate;
use crate::types::{CovarianceMatrix, ReturnMatrix};
use crate::{Error, Result};

/// A weighted set of assets over historical return data.
///
/// Weights are normalized to sum to 1 at construction. The return matrix is
/// borrowed, so constructing a portfolio per optimizer candidate only copies
/// the weights and the (small) covariance sub-matrix.
#[derive(Debug, Clone)]
pub struct Portfolio<'a> {
    pub(super) weights: Vec<f64>,
    pub(super) assets: Vec<String>,
    pub(super) returns: &'a ReturnMatrix,
    /// Column index in `returns` of each asset, in portfolio order
    pub(super) columns: Vec<usize>,
    pub(super) covariance: CovarianceMatrix,
    pub(super) risk_free_rate: f64,
    pub(super) market_returns: Option<&'a [f64]>,
}

impl<'a> Portfolio<'a> {
    /// Create a portfolio from weights, asset identifiers and return data.
    ///
    /// # Arguments
    ///
    /// * `weights` - One weight per asset; normalized by their sum
    /// * `assets` - Asset identifiers, each a column of `returns`
    /// * `returns` - Historical periodic returns
    /// * `cov_matrix` - Covariance of periodic returns; derived from `returns`
    ///   (restricted to `assets`) when `None`
    ///
    /// # Errors
    ///
    /// `Error::Validation` if the weight and asset counts differ, an asset is
    /// missing from `returns` or `cov_matrix`, or the weights are non-finite
    /// or sum to zero.
    pub fn new<S: AsRef<str>>(
        weights: &[f64],
        assets: &[S],
        returns: &'a ReturnMatrix,
        cov_matrix: Option<&CovarianceMatrix>,
    ) -> Result<Self> {
        if weights.len() != assets.len() {
            return Err(Error::Validation(format!(
                "Number of weights ({}) must equal number of assets ({})",
                weights.len(),
                assets.len()
            )));
        }

        if assets.is_empty() {
            return Err(Error::Validation(
                "Portfolio needs at least one asset".to_string(),
            ));
        }

        let assets: Vec<String> = assets.iter().map(|a| a.as_ref().to_string()).collect();

        let columns = assets
            .iter()
            .map(|asset| {
                returns.index_of(asset).ok_or_else(|| {
                    Error::Validation(format!("Asset {asset} missing from return data"))
                })
            })
            .collect::<Result<Vec<usize>>>()?;

        let covariance = match cov_matrix {
            Some(cov) => cov.restrict(&assets)?,
            None => CovarianceMatrix::new(assets.clone(), returns.covariance_of(&columns))?,
        };

        if weights.iter().any(|w| !w.is_finite()) {
            return Err(Error::Validation("Weights must be finite".to_string()));
        }

        let total: f64 = weights.iter().sum();
        if is_degenerate(total) {
            return Err(Error::Validation(format!(
                "Weights must not sum to zero (sum = {total})"
            )));
        }

        Ok(Self {
            weights: weights.iter().map(|w| w / total).collect(),
            assets,
            returns,
            columns,
            covariance,
            risk_free_rate: 0.0,
            market_returns: None,
        })
    }

    /// Set the annual risk-free rate used by [`fmt::Display`] and the
    /// market-relative accessors.
    pub fn with_risk_free_rate(mut self, risk_free_rate: f64) -> Self {
        self.risk_free_rate = risk_free_rate;
        self
    }

    /// Attach a market return series, aligned with the return matrix periods.
    pub fn with_market_returns(mut self, market_returns: &'a [f64]) -> Self {
        self.market_returns = Some(market_returns);
        self
    }

    /// Normalized weights, in asset order.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Asset identifiers.
    pub fn assets(&self) -> &[String] {
        &self.assets
    }

    /// Covariance matrix restricted to the portfolio's assets.
    pub fn covariance(&self) -> &CovarianceMatrix {
        &self.covariance
    }

    pub fn risk_free_rate(&self) -> f64 {
        self.risk_free_rate
    }

    pub fn market_returns(&self) -> Option<&'a [f64]> {
        self.market_returns
    }

    /// `(asset, weight)` pairs in portfolio order.
    pub fn weights_by_asset(&self) -> Vec<(String, f64)> {
        self.assets
            .iter()
            .cloned()
            .zip(self.weights.iter().copied())
            .collect()
    }
}

impl fmt::Display for Portfolio<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Portfolio(assets={}, return={:.2}%, risk={:.2}%, sharpe={:.2})",
            self.assets.len(),
            self.annualized_return() * 100.0,
            self.volatility() * 100.0,
            self.sharpe_ratio(self.risk_free_rate)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::DMatrix;

    fn three_assets() -> ReturnMatrix {
        ReturnMatrix::from_columns([
            ("AAA", vec![0.01, -0.01, 0.02, 0.005]),
            ("BBB", vec![0.00, 0.01, -0.01, 0.002]),
            ("CCC", vec![0.02, 0.00, 0.01, -0.004]),
        ])
        .unwrap()
    }

    #[test]
    fn test_weights_normalized() {
        let returns = three_assets();
        let portfolio =
            Portfolio::new(&[1.0, 1.0, 2.0], &["AAA", "BBB", "CCC"], &returns, None).unwrap();

        assert_eq!(portfolio.weights(), [0.25, 0.25, 0.5]);
        assert!((portfolio.weights().iter().sum::<f64>() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_weights_by_asset() {
        let returns = three_assets();
        let portfolio = Portfolio::new(&[3.0, 1.0], &["CCC", "AAA"], &returns, None).unwrap();

        let weights = portfolio.weights_by_asset();
        assert_eq!(weights[0], ("CCC".to_string(), 0.75));
        assert_eq!(weights[1], ("AAA".to_string(), 0.25));
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let returns = three_assets();
        let result = Portfolio::new(&[0.5, 0.5], &["AAA", "BBB", "CCC"], &returns, None);
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn test_missing_asset_rejected() {
        let returns = three_assets();
        let result = Portfolio::new(&[0.5, 0.5], &["AAA", "ZZZ"], &returns, None);
        assert!(matches!(result, Err(Error::Validation(msg)) if msg.contains("ZZZ")));
    }

    #[test]
    fn test_missing_covariance_asset_rejected() {
        let returns = three_assets();
        let cov = CovarianceMatrix::new(
            vec!["AAA".into(), "BBB".into()],
            DMatrix::from_row_slice(2, 2, &[0.0004, 0.0, 0.0, 0.0001]),
        )
        .unwrap();

        let result = Portfolio::new(&[0.5, 0.5], &["AAA", "CCC"], &returns, Some(&cov));
        assert!(matches!(result, Err(Error::Validation(msg)) if msg.contains("CCC")));
    }

    #[test]
    fn test_supplied_covariance_is_restricted() {
        let returns = three_assets();
        let cov = CovarianceMatrix::new(
            vec!["AAA".into(), "BBB".into(), "CCC".into()],
            DMatrix::from_row_slice(
                3,
                3,
                &[0.0004, 0.0001, 0.0, 0.0001, 0.0009, 0.0, 0.0, 0.0, 0.0016],
            ),
        )
        .unwrap();

        let portfolio = Portfolio::new(&[0.5, 0.5], &["CCC", "AAA"], &returns, Some(&cov)).unwrap();
        assert_eq!(portfolio.covariance().assets(), ["CCC", "AAA"]);
        assert_eq!(portfolio.covariance().get("CCC", "CCC"), Some(0.0016));
    }

    #[test]
    fn test_zero_sum_weights_rejected() {
        let returns = three_assets();
        let result = Portfolio::new(&[1.0, -1.0], &["AAA", "BBB"], &returns, None);
        assert!(matches!(result, Err(Error::Validation(_))));

        let result = Portfolio::new(&[f64::NAN, 1.0], &["AAA", "BBB"], &returns, None);
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn test_display() {
        let returns = three_assets();
        let portfolio = Portfolio::new(&[0.5, 0.5], &["AAA", "BBB"], &returns, None).unwrap();

        let text = portfolio.to_string();
        assert!(text.starts_with("Portfolio(assets=2, return="));
        assert!(text.contains("sharpe="));
    }
}

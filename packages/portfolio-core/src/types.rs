//! Core data types for portfolio analytics.

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::metrics::stats::{mean, sample_covariance};
use crate::metrics::DEFAULT_CONFIDENCE_LEVEL;
use crate::{Error, Result};

/// Historical periodic returns for a set of assets, aligned by period index.
///
/// Every column has the same number of periods.
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnMatrix {
    assets: Vec<String>,
    columns: Vec<Vec<f64>>,
}

impl ReturnMatrix {
    /// Create a return matrix from asset identifiers and their return columns.
    ///
    /// Fails if the counts differ, a column has a different length than the
    /// others, an asset appears twice, a return is NaN or infinite, or there
    /// are no assets at all.
    pub fn new(assets: Vec<String>, columns: Vec<Vec<f64>>) -> Result<Self> {
        if assets.is_empty() {
            return Err(Error::Validation(
                "Return matrix needs at least one asset".to_string(),
            ));
        }

        if assets.len() != columns.len() {
            return Err(Error::Validation(format!(
                "Got {} asset identifiers for {} return columns",
                assets.len(),
                columns.len()
            )));
        }

        let periods = columns[0].len();
        if let Some((asset, column)) = assets
            .iter()
            .zip(&columns)
            .find(|(_, column)| column.len() != periods)
        {
            return Err(Error::Validation(format!(
                "Return series for {} has {} periods, expected {}",
                asset,
                column.len(),
                periods
            )));
        }

        for (i, asset) in assets.iter().enumerate() {
            if assets[..i].contains(asset) {
                return Err(Error::Validation(format!("Duplicate asset: {asset}")));
            }
        }

        for (asset, column) in assets.iter().zip(&columns) {
            if let Some(period) = column.iter().position(|r| !r.is_finite()) {
                return Err(Error::Validation(format!(
                    "Return series for {} has non-finite value {} at period {}",
                    asset, column[period], period
                )));
            }
        }

        Ok(Self { assets, columns })
    }

    /// Create a return matrix from `(asset, returns)` pairs.
    pub fn from_columns<I, S>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, Vec<f64>)>,
        S: Into<String>,
    {
        let mut assets = Vec::new();
        let mut series = Vec::new();
        for (asset, returns) in columns {
            assets.push(asset.into());
            series.push(returns);
        }
        Self::new(assets, series)
    }

    /// Asset identifiers in column order.
    pub fn assets(&self) -> &[String] {
        &self.assets
    }

    /// Number of periods in every column.
    pub fn periods(&self) -> usize {
        self.columns[0].len()
    }

    /// Position of an asset's column.
    pub fn index_of(&self, asset: &str) -> Option<usize> {
        self.assets.iter().position(|a| a == asset)
    }

    /// Return series for an asset.
    pub fn column(&self, asset: &str) -> Option<&[f64]> {
        self.index_of(asset).map(|i| self.columns[i].as_slice())
    }

    /// Return series by column position.
    pub(crate) fn column_at(&self, index: usize) -> &[f64] {
        &self.columns[index]
    }

    /// Mean periodic return of each asset, in column order.
    pub fn mean_returns(&self) -> Vec<f64> {
        self.columns.iter().map(|c| mean(c)).collect()
    }

    /// Sample covariance matrix of all columns.
    pub fn covariance(&self) -> CovarianceMatrix {
        let indices: Vec<usize> = (0..self.assets.len()).collect();
        CovarianceMatrix {
            assets: self.assets.clone(),
            matrix: self.covariance_of(&indices),
        }
    }

    /// Sample covariance of the given columns, in the given order.
    pub(crate) fn covariance_of(&self, indices: &[usize]) -> DMatrix<f64> {
        let n = indices.len();
        let mut matrix = DMatrix::zeros(n, n);
        for i in 0..n {
            for j in i..n {
                let cov = sample_covariance(
                    self.column_at(indices[i]),
                    self.column_at(indices[j]),
                );
                matrix[(i, j)] = cov;
                matrix[(j, i)] = cov;
            }
        }
        matrix
    }
}

/// Symmetric covariance matrix of periodic returns, labelled by asset.
#[derive(Debug, Clone, PartialEq)]
pub struct CovarianceMatrix {
    assets: Vec<String>,
    matrix: DMatrix<f64>,
}

impl CovarianceMatrix {
    /// Create a covariance matrix. The matrix must be square, finite, match
    /// the label count, and be symmetric.
    pub fn new(assets: Vec<String>, matrix: DMatrix<f64>) -> Result<Self> {
        if !matrix.is_square() || matrix.nrows() != assets.len() {
            return Err(Error::Validation(format!(
                "Covariance matrix is {}x{} but {} assets were given",
                matrix.nrows(),
                matrix.ncols(),
                assets.len()
            )));
        }

        if matrix.iter().any(|v| !v.is_finite()) {
            return Err(Error::Validation(
                "Covariance matrix contains non-finite values".to_string(),
            ));
        }

        let n = assets.len();
        for i in 0..n {
            for j in (i + 1)..n {
                let (a, b) = (matrix[(i, j)], matrix[(j, i)]);
                if (a - b).abs() > 1e-9 * a.abs().max(b.abs()).max(1.0) {
                    return Err(Error::Validation(format!(
                        "Covariance matrix is not symmetric at ({}, {})",
                        assets[i], assets[j]
                    )));
                }
            }
        }

        Ok(Self { assets, matrix })
    }

    /// Asset identifiers in row/column order.
    pub fn assets(&self) -> &[String] {
        &self.assets
    }

    /// Underlying matrix.
    pub fn matrix(&self) -> &DMatrix<f64> {
        &self.matrix
    }

    /// Covariance between two assets.
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.assets.iter().position(|x| x == a)?;
        let j = self.assets.iter().position(|x| x == b)?;
        Some(self.matrix[(i, j)])
    }

    /// Sub-matrix for the given assets, in the given order.
    pub fn restrict(&self, assets: &[String]) -> Result<Self> {
        let indices = assets
            .iter()
            .map(|asset| {
                self.assets.iter().position(|a| a == asset).ok_or_else(|| {
                    Error::Validation(format!("Asset {asset} missing from covariance matrix"))
                })
            })
            .collect::<Result<Vec<usize>>>()?;

        let matrix = DMatrix::from_fn(indices.len(), indices.len(), |i, j| {
            self.matrix[(indices[i], indices[j])]
        });

        Ok(Self {
            assets: assets.to_vec(),
            matrix,
        })
    }
}

/// Settings shared by metric and objective evaluation.
///
/// Every field has a default, so partial configuration deserializes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Confidence level for VaR/CVaR (e.g., 0.95 for 95%)
    pub confidence_level: f64,
    /// Annual risk-free rate (e.g., 0.04 for 4%)
    pub risk_free_rate: f64,
    /// Periodic return below which a period counts as downside (Sortino)
    pub target_return: f64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            confidence_level: DEFAULT_CONFIDENCE_LEVEL,
            risk_free_rate: 0.0,
            target_return: 0.0,
        }
    }
}

impl MetricsConfig {
    /// Check that the confidence level lies strictly between 0 and 1 and the
    /// rates are finite.
    pub fn validate(&self) -> Result<()> {
        if !(self.confidence_level > 0.0 && self.confidence_level < 1.0) {
            return Err(Error::Validation(format!(
                "Confidence level must be between 0 and 1, got {}",
                self.confidence_level
            )));
        }
        if !self.risk_free_rate.is_finite() || !self.target_return.is_finite() {
            return Err(Error::Validation(
                "Risk-free rate and target return must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

/// A metric that may not be computable for the given inputs.
///
/// Distinguishes a genuine zero from a failed computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricValue {
    Computed(f64),
    Unavailable { reason: String },
}

impl MetricValue {
    /// The computed value, if any.
    pub fn value(&self) -> Option<f64> {
        match self {
            MetricValue::Computed(v) => Some(*v),
            MetricValue::Unavailable { .. } => None,
        }
    }

    /// The computed value, or 0.0 when unavailable.
    pub fn value_or_zero(&self) -> f64 {
        self.value().unwrap_or(0.0)
    }

    pub fn is_available(&self) -> bool {
        matches!(self, MetricValue::Computed(_))
    }
}

impl From<Result<f64>> for MetricValue {
    fn from(result: Result<f64>) -> Self {
        match result {
            Ok(value) => MetricValue::Computed(value),
            Err(e) => MetricValue::Unavailable {
                reason: e.to_string(),
            },
        }
    }
}

/// Performance metrics for a portfolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    /// Annualized expected return
    pub annualized_return: f64,
    /// Excess return per unit of total risk
    pub sharpe_ratio: f64,
    /// Excess return per unit of downside risk
    pub sortino_ratio: f64,
    /// Excess return per unit of maximum drawdown
    pub calmar_ratio: f64,
    /// Active return per unit of tracking error (only with a benchmark)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub information_ratio: Option<MetricValue>,
    /// Excess return per unit of beta (only with a benchmark)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub treynor_ratio: Option<MetricValue>,
}

/// Risk metrics for a portfolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskMetrics {
    /// Annualized volatility
    pub volatility: f64,
    /// Confidence level used for VaR and CVaR (e.g., 0.95 for 95%)
    pub confidence_level: f64,
    /// Historical Value at Risk (positive = loss)
    pub var: f64,
    /// Historical Conditional VaR / Expected Shortfall (positive = loss)
    pub cvar: f64,
    /// Maximum drawdown (<= 0)
    pub max_drawdown: f64,
    /// Weighted asset volatility over portfolio volatility
    pub diversification_ratio: f64,
    /// Skewness of periodic portfolio returns
    pub skewness: f64,
    /// Excess kurtosis of periodic portfolio returns
    pub kurtosis: f64,
}

//! Objective functions for an external weight optimizer.
//!
//! Every objective takes a candidate weight vector first and the fixed market
//! data second, and returns a scalar to be minimized. Ratios that should be
//! maximized are negated. Objectives only read their inputs, so they can be
//! called concurrently from any number of threads over shared
//! [`ObjectiveData`].

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::metrics;
use crate::portfolio::Portfolio;
use crate::types::{CovarianceMatrix, MetricsConfig, ReturnMatrix};
use crate::{Error, Result};

/// Signature shared by all scalar objectives.
pub type ObjectiveFn = fn(&[f64], &ObjectiveData<'_>) -> Result<f64>;

/// Fixed market data an optimizer passes along with every candidate.
#[derive(Debug, Clone)]
pub struct ObjectiveData<'a> {
    assets: &'a [String],
    returns: &'a ReturnMatrix,
    covariance: Cow<'a, CovarianceMatrix>,
    market_returns: Option<&'a [f64]>,
    config: MetricsConfig,
}

impl<'a> ObjectiveData<'a> {
    /// Bundle the asset universe and its return history.
    ///
    /// The covariance matrix is derived once here so repeated evaluations
    /// only pay for restricting it.
    pub fn new(assets: &'a [String], returns: &'a ReturnMatrix) -> Result<Self> {
        let columns = assets
            .iter()
            .map(|asset| {
                returns.index_of(asset).ok_or_else(|| {
                    Error::Validation(format!("Asset {asset} missing from return data"))
                })
            })
            .collect::<Result<Vec<usize>>>()?;

        let covariance = CovarianceMatrix::new(assets.to_vec(), returns.covariance_of(&columns))?;

        Ok(Self {
            assets,
            returns,
            covariance: Cow::Owned(covariance),
            market_returns: None,
            config: MetricsConfig::default(),
        })
    }

    /// Use a supplied covariance matrix instead of the derived one.
    pub fn with_covariance(mut self, cov_matrix: &'a CovarianceMatrix) -> Self {
        self.covariance = Cow::Borrowed(cov_matrix);
        self
    }

    /// Attach market returns (required by the Treynor objective).
    pub fn with_market_returns(mut self, market_returns: &'a [f64]) -> Self {
        self.market_returns = Some(market_returns);
        self
    }

    pub fn with_config(mut self, config: MetricsConfig) -> Self {
        self.config = config;
        self
    }

    pub fn assets(&self) -> &'a [String] {
        self.assets
    }

    pub fn config(&self) -> &MetricsConfig {
        &self.config
    }

    /// Build the portfolio for one candidate weight vector.
    pub fn portfolio(&self, weights: &[f64]) -> Result<Portfolio<'a>> {
        self.config.validate()?;

        let mut portfolio =
            Portfolio::new(weights, self.assets, self.returns, Some(self.covariance.as_ref()))?
                .with_risk_free_rate(self.config.risk_free_rate);
        if let Some(market) = self.market_returns {
            portfolio = portfolio.with_market_returns(market);
        }
        Ok(portfolio)
    }
}

/// Negated Sharpe ratio.
pub fn sharpe_objective(weights: &[f64], data: &ObjectiveData<'_>) -> Result<f64> {
    let portfolio = data.portfolio(weights)?;
    Ok(-portfolio.sharpe_ratio(data.config.risk_free_rate))
}

/// Negated Sortino ratio, using the configured target return.
pub fn sortino_objective(weights: &[f64], data: &ObjectiveData<'_>) -> Result<f64> {
    let portfolio = data.portfolio(weights)?;
    Ok(-portfolio.sortino_ratio(data.config.risk_free_rate, data.config.target_return))
}

/// Negated Treynor ratio. Requires market returns.
pub fn treynor_objective(weights: &[f64], data: &ObjectiveData<'_>) -> Result<f64> {
    let market = data.market_returns.ok_or_else(|| {
        Error::Validation("Treynor objective requires market returns".to_string())
    })?;
    let portfolio = data.portfolio(weights)?;
    let treynor = metrics::treynor_ratio(
        &portfolio.portfolio_returns(),
        market,
        data.config.risk_free_rate,
    )?;
    Ok(-treynor)
}

/// Annualized volatility.
pub fn volatility_objective(weights: &[f64], data: &ObjectiveData<'_>) -> Result<f64> {
    Ok(data.portfolio(weights)?.volatility())
}

/// Historical VaR at the configured confidence level.
pub fn var_objective(weights: &[f64], data: &ObjectiveData<'_>) -> Result<f64> {
    Ok(data
        .portfolio(weights)?
        .value_at_risk(data.config.confidence_level))
}

/// Historical CVaR at the configured confidence level.
pub fn cvar_objective(weights: &[f64], data: &ObjectiveData<'_>) -> Result<f64> {
    Ok(data
        .portfolio(weights)?
        .conditional_value_at_risk(data.config.confidence_level))
}

/// Negated annualized return.
pub fn return_objective(weights: &[f64], data: &ObjectiveData<'_>) -> Result<f64> {
    Ok(-data.portfolio(weights)?.annualized_return())
}

/// `(-annualized return, volatility)` for multi-objective (Pareto front) search.
pub fn pareto_objective(weights: &[f64], data: &ObjectiveData<'_>) -> Result<(f64, f64)> {
    let portfolio = data.portfolio(weights)?;
    Ok((-portfolio.annualized_return(), portfolio.volatility()))
}

/// Named scalar objectives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Objective {
    Sharpe,
    Sortino,
    Treynor,
    Volatility,
    Var,
    Cvar,
    Return,
}

impl Objective {
    /// Every objective, in lookup order.
    pub const ALL: [Objective; 7] = [
        Objective::Sharpe,
        Objective::Sortino,
        Objective::Treynor,
        Objective::Volatility,
        Objective::Var,
        Objective::Cvar,
        Objective::Return,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Objective::Sharpe => "sharpe",
            Objective::Sortino => "sortino",
            Objective::Treynor => "treynor",
            Objective::Volatility => "volatility",
            Objective::Var => "var",
            Objective::Cvar => "cvar",
            Objective::Return => "return",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Objective::Sharpe => "Maximize excess return per unit of total risk",
            Objective::Sortino => "Maximize excess return per unit of downside risk",
            Objective::Treynor => "Maximize excess return per unit of market beta",
            Objective::Volatility => "Minimize annualized volatility",
            Objective::Var => "Minimize historical Value at Risk",
            Objective::Cvar => "Minimize historical Conditional VaR",
            Objective::Return => "Maximize annualized return",
        }
    }

    pub fn function(self) -> ObjectiveFn {
        match self {
            Objective::Sharpe => sharpe_objective,
            Objective::Sortino => sortino_objective,
            Objective::Treynor => treynor_objective,
            Objective::Volatility => volatility_objective,
            Objective::Var => var_objective,
            Objective::Cvar => cvar_objective,
            Objective::Return => return_objective,
        }
    }

    pub fn evaluate(self, weights: &[f64], data: &ObjectiveData<'_>) -> Result<f64> {
        (self.function())(weights, data)
    }
}

impl fmt::Display for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Objective {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim().to_lowercase();
        Objective::ALL
            .into_iter()
            .find(|o| o.name() == name)
            .ok_or_else(|| Error::UnknownObjective {
                name: s.to_string(),
                valid: objective_names().join(", "),
            })
    }
}

/// Get all objective names.
pub fn objective_names() -> Vec<&'static str> {
    Objective::ALL.iter().map(|o| o.name()).collect()
}

/// Look up an objective function by name (case-insensitive).
///
/// # Errors
///
/// `Error::UnknownObjective`, listing the valid names, when `name` is not
/// recognized.
pub fn get_objective_function(name: &str) -> Result<ObjectiveFn> {
    Ok(name.parse::<Objective>()?.function())
}

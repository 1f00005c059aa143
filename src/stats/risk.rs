//! # Risk
//!
//! $$
//! \operatorname{VaR}_c=Q_{1-c}(r),\qquad \operatorname{CVaR}_c=\mathbb E[r\mid r\le \operatorname{VaR}_c]
//! $$
//!
//! Historical risk metrics computed on the same return series that feeds the
//! Markov model.

use ndarray::ArrayView1;

use crate::error::ensure_param;
use crate::error::MarkovError;
use crate::error::Result;
use crate::returns::log_returns;
use crate::stats::quantile;

/// Trading days used for annualisation.
pub const TRADING_DAYS: f64 = 252.0;
/// Default rolling window for [`RiskReport`] volatility.
pub const VOLATILITY_WINDOW: usize = 30;
/// Default VaR/CVaR confidence level.
pub const CONFIDENCE: f64 = 0.95;

fn sample_std(xs: &[f64]) -> f64 {
  ArrayView1::from(xs).std(1.0)
}

/// Annualised rolling volatility (sample standard deviation × √252).
///
/// Element `i` covers `returns[i..i + window]`; a series shorter than the
/// window yields an empty vector.
pub fn rolling_volatility(returns: &[f64], window: usize) -> Result<Vec<f64>> {
  ensure_param!(window >= 2, "volatility window must be >= 2, got {window}");
  Ok(
    returns
      .windows(window)
      .map(|w| sample_std(w) * TRADING_DAYS.sqrt())
      .collect(),
  )
}

/// Historical Value at Risk: the `(1 - confidence)` quantile of `returns`.
pub fn value_at_risk(returns: &[f64], confidence: f64) -> Result<f64> {
  ensure_param!(
    confidence > 0.0 && confidence < 1.0,
    "confidence must be in (0, 1), got {confidence}"
  );
  if returns.is_empty() {
    return Err(MarkovError::insufficient("value at risk of an empty series"));
  }
  Ok(quantile(returns, 1.0 - confidence))
}

/// Expected return conditional on breaching the Value at Risk.
pub fn conditional_value_at_risk(returns: &[f64], confidence: f64) -> Result<f64> {
  let var = value_at_risk(returns, confidence)?;
  let tail = returns.iter().filter(|r| **r <= var).collect::<Vec<_>>();
  Ok(tail.iter().copied().sum::<f64>() / tail.len() as f64)
}

/// Annualised Sharpe ratio with zero risk-free rate.
pub fn sharpe_ratio(returns: &[f64]) -> Result<f64> {
  if returns.len() < 2 {
    return Err(MarkovError::insufficient(
      "sharpe ratio needs at least 2 returns",
    ));
  }
  let mean = returns.iter().sum::<f64>() / returns.len() as f64;
  Ok((mean * TRADING_DAYS) / (sample_std(returns) * TRADING_DAYS.sqrt()))
}

/// Largest peak-to-trough decline, as a non-positive fraction.
pub fn max_drawdown(prices: &[f64]) -> Result<f64> {
  if prices.is_empty() {
    return Err(MarkovError::insufficient("drawdown of an empty series"));
  }

  let mut peak = f64::NEG_INFINITY;
  let mut worst = 0.0f64;
  for p in prices {
    peak = peak.max(*p);
    worst = worst.min(p / peak - 1.0);
  }

  Ok(worst)
}

/// Snapshot of historical risk for one price series.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RiskReport {
  /// Latest 30-observation annualised volatility, if the series is long enough.
  pub volatility: Option<f64>,
  pub var_95: f64,
  pub cvar_95: f64,
  pub sharpe_ratio: f64,
  pub max_drawdown: f64,
}

impl RiskReport {
  pub fn from_prices(prices: &[f64]) -> Result<Self> {
    let returns = log_returns(prices)?;

    Ok(Self {
      volatility: rolling_volatility(&returns, VOLATILITY_WINDOW)?
        .last()
        .copied(),
      var_95: value_at_risk(&returns, CONFIDENCE)?,
      cvar_95: conditional_value_at_risk(&returns, CONFIDENCE)?,
      sharpe_ratio: sharpe_ratio(&returns)?,
      max_drawdown: max_drawdown(prices)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;

  use super::*;

  #[test]
  fn var_and_cvar_of_uniform_grid() {
    let returns = (0..=100).map(|i| (i as f64 - 50.0) / 1000.0).collect::<Vec<_>>();
    let var = value_at_risk(&returns, 0.95).unwrap();
    assert_abs_diff_eq!(var, -0.045, epsilon = 1e-12);
    let cvar = conditional_value_at_risk(&returns, 0.95).unwrap();
    // mean of -0.050..=-0.045
    assert_abs_diff_eq!(cvar, -0.0475, epsilon = 1e-12);
  }

  #[test]
  fn max_drawdown_tracks_running_peak() {
    let dd = max_drawdown(&[100.0, 120.0, 90.0, 130.0, 117.0]).unwrap();
    assert_abs_diff_eq!(dd, -0.25, epsilon = 1e-12);
    assert_eq!(max_drawdown(&[1.0, 2.0, 3.0]).unwrap(), 0.0);
  }

  #[test]
  fn rolling_volatility_window_count() {
    let returns = [0.01, -0.01, 0.02, 0.0, -0.02];
    let vol = rolling_volatility(&returns, 3).unwrap();
    assert_eq!(vol.len(), 3);
    // sample variance of [0.01, -0.01, 0.02] is 0.0007 / 3
    assert_abs_diff_eq!(
      vol[0],
      (0.0007f64 / 3.0).sqrt() * TRADING_DAYS.sqrt(),
      epsilon = 1e-12
    );
    assert!(rolling_volatility(&returns, 10).unwrap().is_empty());
    assert!(rolling_volatility(&returns, 1).is_err());
  }

  #[test]
  fn sharpe_sign_follows_mean() {
    assert!(sharpe_ratio(&[0.01, 0.02, 0.015, 0.005]).unwrap() > 0.0);
    assert!(sharpe_ratio(&[-0.01, -0.02, 0.0]).unwrap() < 0.0);
    assert!(sharpe_ratio(&[0.01]).is_err());
  }

  #[test]
  fn report_without_enough_history_has_no_volatility() {
    let report = RiskReport::from_prices(&[100.0, 102.0, 99.0, 101.0, 103.0]).unwrap();
    assert!(report.volatility.is_none());
    assert!(report.cvar_95 <= report.var_95);
    assert!(report.max_drawdown <= 0.0);
  }

  #[test]
  fn invalid_confidence_is_rejected() {
    assert!(matches!(
      value_at_risk(&[0.1, 0.2], 1.0),
      Err(MarkovError::InvalidParameter(_))
    ));
  }
}

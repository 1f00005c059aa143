//! # Returns
//!
//! $$
//! r_i^{\log}=\ln\frac{p_{i+1}}{p_i},\qquad r_i^{\text{simple}}=\frac{p_{i+1}}{p_i}-1
//! $$
//!
//! Log returns are additive and rebuild a path through an exponentiated
//! cumulative sum; simple returns compound multiplicatively. A simulation must
//! estimate and reconstruct with the same [`ReturnKind`].

use std::fmt::Display;
use std::str::FromStr;

use ndarray::Array1;

use crate::error::ensure_param;
use crate::error::MarkovError;
use crate::error::Result;

/// Smallest simple return applied to a price; anything at or below −100% is
/// clamped here so compounded prices stay strictly positive.
pub const MIN_SIMPLE_RETURN: f64 = -0.999_999;

/// Return convention.
#[derive(Default, Clone, Copy, PartialEq, Eq, Debug)]
pub enum ReturnKind {
  #[default]
  Log,
  Simple,
}

impl ReturnKind {
  /// Return between two consecutive prices.
  pub fn between(self, from: f64, to: f64) -> f64 {
    match self {
      ReturnKind::Log => (to / from).ln(),
      ReturnKind::Simple => to / from - 1.0,
    }
  }

  /// Apply one return of this kind to `price`.
  pub fn apply(self, price: f64, r: f64) -> f64 {
    match self {
      ReturnKind::Log => price * r.exp(),
      ReturnKind::Simple => price * (1.0 + r.max(MIN_SIMPLE_RETURN)),
    }
  }

  /// Express a return of this kind as a log return.
  pub fn to_log(self, r: f64) -> f64 {
    match self {
      ReturnKind::Log => r,
      ReturnKind::Simple => r.max(MIN_SIMPLE_RETURN).ln_1p(),
    }
  }
}

impl Display for ReturnKind {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      ReturnKind::Log => write!(f, "log"),
      ReturnKind::Simple => write!(f, "simple"),
    }
  }
}

impl FromStr for ReturnKind {
  type Err = MarkovError;

  fn from_str(s: &str) -> Result<Self> {
    match s.to_lowercase().as_str() {
      "log" | "ln" => Ok(Self::Log),
      "simple" | "pct" | "percent" => Ok(Self::Simple),
      other => Err(MarkovError::invalid(format!(
        "unknown return convention '{other}', expected 'log' or 'simple'"
      ))),
    }
  }
}

/// Convert a price series to a return series of the given kind.
///
/// Fails with [`MarkovError::InsufficientData`] for fewer than two prices and
/// with [`MarkovError::InvalidParameter`] if any price is non-positive or not
/// finite.
pub fn returns(prices: &[f64], kind: ReturnKind) -> Result<Vec<f64>> {
  if prices.len() < 2 {
    return Err(MarkovError::insufficient(format!(
      "need at least 2 prices, got {}",
      prices.len()
    )));
  }
  if let Some((i, p)) = prices
    .iter()
    .enumerate()
    .find(|(_, p)| !(p.is_finite() && **p > 0.0))
  {
    return Err(MarkovError::invalid(format!(
      "price[{i}] = {p} is not a positive finite number"
    )));
  }

  Ok(
    prices
      .windows(2)
      .map(|w| kind.between(w[0], w[1]))
      .collect(),
  )
}

/// Convert close prices to log returns.
pub fn log_returns(prices: &[f64]) -> Result<Vec<f64>> {
  returns(prices, ReturnKind::Log)
}

/// Convert close prices to simple (percentage) returns.
pub fn simple_returns(prices: &[f64]) -> Result<Vec<f64>> {
  returns(prices, ReturnKind::Simple)
}

/// Rebuild a price path of length `returns.len() + 1` from `initial_price`.
///
/// Log returns are accumulated and exponentiated; simple returns compound.
pub fn reconstruct(initial_price: f64, returns: &[f64], kind: ReturnKind) -> Result<Array1<f64>> {
  ensure_param!(
    initial_price.is_finite() && initial_price > 0.0,
    "initial price must be positive and finite, got {initial_price}"
  );

  let mut path = Array1::<f64>::zeros(returns.len() + 1);
  path[0] = initial_price;

  match kind {
    ReturnKind::Log => {
      let mut cum = 0.0;
      for (i, r) in returns.iter().enumerate() {
        cum += r;
        path[i + 1] = (initial_price * cum.exp()).max(f64::MIN_POSITIVE);
      }
    }
    ReturnKind::Simple => {
      for (i, r) in returns.iter().enumerate() {
        path[i + 1] = kind.apply(path[i], *r);
      }
    }
  }

  Ok(path)
}

//! # Errors
//!
//! $$
//! \mathcal{E} = \{\text{InsufficientData}, \text{InvalidParameter}, \text{DegenerateMatrix}\}
//! $$
//!
use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, MarkovError>;

/// Failure kinds of the Markov pipeline.
///
/// Every error is raised synchronously from deterministic inputs, so retrying
/// with the same arguments always fails the same way.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarkovError {
  /// Too few prices or returns to build the requested quantity.
  #[error("insufficient data: {0}")]
  InsufficientData(String),

  /// A parameter is outside its valid domain.
  #[error("invalid parameter: {0}")]
  InvalidParameter(String),

  /// A transition row cannot be normalised into a probability distribution.
  #[error("degenerate transition matrix: {0}")]
  DegenerateMatrix(String),
}

impl MarkovError {
  pub(crate) fn insufficient(msg: impl Into<String>) -> Self {
    Self::InsufficientData(msg.into())
  }

  pub(crate) fn invalid(msg: impl Into<String>) -> Self {
    Self::InvalidParameter(msg.into())
  }

  pub(crate) fn degenerate(msg: impl Into<String>) -> Self {
    Self::DegenerateMatrix(msg.into())
  }
}

/// Early-return with [`MarkovError::InvalidParameter`] when `cond` is false.
macro_rules! ensure_param {
  ($cond:expr, $($arg:tt)+) => {
    if !$cond {
      return Err($crate::error::MarkovError::InvalidParameter(format!($($arg)+)));
    }
  };
}

pub(crate) use ensure_param;

#[cfg(test)]
mod tests {
  use super::*;

  fn check_positive(x: f64) -> Result<f64> {
    ensure_param!(x > 0.0, "x must be > 0, got {x}");
    Ok(x)
  }

  #[test]
  fn ensure_param_reports_invalid_parameter() {
    assert_eq!(check_positive(1.0), Ok(1.0));
    assert_eq!(
      check_positive(-2.0),
      Err(MarkovError::InvalidParameter("x must be > 0, got -2".into()))
    );
  }

  #[test]
  fn display_includes_kind() {
    let err = MarkovError::insufficient("need at least 2 prices");
    assert_eq!(err.to_string(), "insufficient data: need at least 2 prices");
    let err = MarkovError::degenerate("row 1 sums to zero");
    assert_eq!(err.to_string(), "degenerate transition matrix: row 1 sums to zero");
  }
}

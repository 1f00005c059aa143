//! # Sample Moments
//!
//! $$
//! \mu=\tfrac1n\sum x_i,\quad \sigma^2=\tfrac1n\sum (x_i-\mu)^2,\quad \gamma_1=\frac{m_3}{\sigma^3},\quad \gamma_2=\frac{m_4}{\sigma^4}-3
//! $$
//!
//! Population moments with excess kurtosis; constant samples report zero skew
//! and kurtosis.

use ndarray::ArrayView1;
use ndarray_stats::SummaryStatisticsExt;

use crate::error::MarkovError;
use crate::error::Result;

/// Below this (relative) standard deviation a sample is treated as constant.
const DEGENERATE_STD: f64 = 1e-14;

/// First four moments of a sample.
///
/// `std` is the population standard deviation, `skewness` the biased
/// `m3 / m2^1.5` estimator and `excess_kurtosis` is `m4 / m2^2 - 3`. A sample
/// with (numerically) zero variance reports zero for both higher moments.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SampleMoments {
  pub mean: f64,
  pub std: f64,
  pub skewness: f64,
  pub excess_kurtosis: f64,
}

impl SampleMoments {
  pub fn from_slice(xs: &[f64]) -> Result<Self> {
    let view = ArrayView1::from(xs);
    let mean = view
      .mean()
      .ok_or_else(|| MarkovError::insufficient("moments of an empty sample"))?;
    let std = view.std(0.0);

    if std <= DEGENERATE_STD * (1.0 + mean.abs()) || !std.is_finite() {
      return Ok(Self {
        mean,
        std,
        skewness: 0.0,
        excess_kurtosis: 0.0,
      });
    }

    let skewness = view
      .skewness()
      .map_err(|_| MarkovError::insufficient("skewness of an empty sample"))?;
    let kurtosis = view
      .kurtosis()
      .map_err(|_| MarkovError::insufficient("kurtosis of an empty sample"))?;

    Ok(Self {
      mean,
      std,
      skewness,
      excess_kurtosis: kurtosis - 3.0,
    })
  }
}

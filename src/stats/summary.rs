//! # Terminal Summary
//!
//! $$
//! \bar S_T=\tfrac1M\sum_k S_T^{(k)},\qquad \hat{\mathbb P}(S_T<S_0)=\tfrac1M\#\{k:S_T^{(k)}<S_0\}
//! $$
//!
//! Mean, 5/50/95 percentiles and loss probability of simulated terminal prices.

use ndarray::ArrayView1;

use crate::error::MarkovError;
use crate::error::Result;
use crate::stats::quantile_sorted;
use crate::stats::sorted;

/// Distribution of terminal prices across a batch of simulated paths.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TerminalSummary {
  pub n_paths: usize,
  pub mean: f64,
  pub p05: f64,
  pub p50: f64,
  pub p95: f64,
  /// Fraction of paths ending strictly below their starting price.
  pub prob_loss: f64,
}

impl TerminalSummary {
  pub fn from_paths<'a>(paths: impl IntoIterator<Item = ArrayView1<'a, f64>>) -> Result<Self> {
    let mut terminal = Vec::new();
    let mut losses = 0usize;

    for path in paths {
      let (Some(first), Some(last)) = (path.first(), path.last()) else {
        continue;
      };
      if last < first {
        losses += 1;
      }
      terminal.push(*last);
    }

    if terminal.is_empty() {
      return Err(MarkovError::insufficient("no non-empty paths to summarise"));
    }

    let n = terminal.len();
    let mean = terminal.iter().sum::<f64>() / n as f64;
    let terminal = sorted(&terminal);

    Ok(Self {
      n_paths: n,
      mean,
      p05: quantile_sorted(&terminal, 0.05),
      p50: quantile_sorted(&terminal, 0.5),
      p95: quantile_sorted(&terminal, 0.95),
      prob_loss: losses as f64 / n as f64,
    })
  }
}

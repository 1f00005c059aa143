//! # Stats
//!
//! $$
//! Q(q)=x_{(\lfloor h\rfloor)}+(h-\lfloor h\rfloor)\,(x_{(\lfloor h\rfloor+1)}-x_{(\lfloor h\rfloor)}),\quad h=(n-1)q
//! $$
//!
//! Sample statistics for historical and simulated return series.

pub mod moments;
pub mod risk;
pub mod summary;

pub use moments::SampleMoments;
pub use risk::RiskReport;
pub use summary::TerminalSummary;

/// Sorted copy of `xs` (total order, NaN last).
pub fn sorted(xs: &[f64]) -> Vec<f64> {
  let mut v = xs.to_vec();
  v.sort_by(|a, b| a.total_cmp(b));
  v
}

/// Quantile of an ascending slice with linear interpolation between order
/// statistics. `q` is clamped to `[0, 1]`; an empty slice yields NaN.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
  if sorted.is_empty() {
    return f64::NAN;
  }

  let h = (sorted.len() - 1) as f64 * q.clamp(0.0, 1.0);
  let lo = h.floor() as usize;
  let hi = h.ceil() as usize;
  sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo])
}

/// Quantile at the rational level `num / den`, with the order-statistic
/// position computed in integers so whole positions land exactly on a sample.
/// `num` is clamped to `den`; an empty slice or `den == 0` yields NaN.
pub fn quantile_sorted_at(sorted: &[f64], num: usize, den: usize) -> f64 {
  if sorted.is_empty() || den == 0 {
    return f64::NAN;
  }

  let scaled = (sorted.len() - 1) * num.min(den);
  let lo = scaled / den;
  let rem = scaled % den;
  if rem == 0 {
    return sorted[lo];
  }
  let frac = rem as f64 / den as f64;
  sorted[lo] + frac * (sorted[lo + 1] - sorted[lo])
}

/// Quantile of an unsorted sample.
pub fn quantile(xs: &[f64], q: f64) -> f64 {
  quantile_sorted(&sorted(xs), q)
}

/// Number of distinct values in a sample.
pub fn distinct_count(xs: &[f64]) -> usize {
  let mut v = sorted(xs);
  v.dedup();
  v.len()
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;

  use super::*;

  #[test]
  fn quantile_interpolates_linearly() {
    let xs = [3.0, 1.0, 4.0, 2.0];
    assert_abs_diff_eq!(quantile(&xs, 0.0), 1.0);
    assert_abs_diff_eq!(quantile(&xs, 1.0), 4.0);
    assert_abs_diff_eq!(quantile(&xs, 0.5), 2.5);
    assert_abs_diff_eq!(quantile(&xs, 1.0 / 3.0), 2.0, epsilon = 1e-12);
  }

  #[test]
  fn rational_quantile_hits_order_statistics_exactly() {
    let xs = (0..91).map(|i| i as f64 * 0.001).collect::<Vec<_>>();
    // 0.7 * 90 rounds below 63 in floating point.
    assert_eq!(quantile_sorted_at(&xs, 7, 10), xs[63]);
    for i in 0..=10 {
      let q = quantile_sorted_at(&xs, i, 10);
      assert_abs_diff_eq!(q, quantile_sorted(&xs, i as f64 / 10.0), epsilon = 1e-12);
    }
    assert_abs_diff_eq!(quantile_sorted_at(&[1.0, 2.0, 3.0, 4.0], 1, 3), 2.0);
    assert!(quantile_sorted_at(&[], 1, 2).is_nan());
  }

  #[test]
  fn quantile_of_empty_is_nan() {
    assert!(quantile(&[], 0.5).is_nan());
  }

  #[test]
  fn distinct_count_ignores_ties() {
    assert_eq!(distinct_count(&[0.1, 0.1, 0.2, -0.3, 0.2]), 3);
  }
}

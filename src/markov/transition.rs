//! # Transition Estimator
//!
//! $$
//! \hat P_{ij}=\frac{N_{ij}}{\sum_k N_{ik}},\qquad N_{ij}=\#\{t: s_t=i,\ s_{t+1}=j\}
//! $$
//!
//! First-order, time-homogeneous, discrete-state estimator: transition
//! probabilities depend only on the current state and are assumed constant
//! over the historical window.

use ndarray::Array1;
use ndarray::Array2;
use ndarray::ArrayView1;
use ndarray::Axis;
use tracing::debug;
use tracing::warn;

use crate::error::ensure_param;
use crate::error::MarkovError;
use crate::error::Result;

/// Tolerance for row sums of a stochastic matrix.
pub const ROW_SUM_TOL: f64 = 1e-9;

/// Row-stochastic `n × n` matrix.
#[derive(Clone, Debug, PartialEq)]
pub struct TransitionMatrix {
  probs: Array2<f64>,
  counts: Array2<f64>,
}

/// Count consecutive `(from, to)` pairs.
pub fn count_transitions(states: &[usize], n_states: usize) -> Result<Array2<f64>> {
  ensure_param!(n_states >= 2, "n_states must be >= 2, got {n_states}");
  if let Some(s) = states.iter().find(|s| **s >= n_states) {
    return Err(MarkovError::invalid(format!(
      "state {s} out of range for {n_states} states"
    )));
  }

  let mut counts = Array2::<f64>::zeros((n_states, n_states));
  for w in states.windows(2) {
    counts[[w[0], w[1]]] += 1.0;
  }
  Ok(counts)
}

/// Replace every zero-sum row with the uniform distribution `1 / n`.
///
/// Rows with no outgoing observations (the last state of the window, or a
/// state never visited) would otherwise not be distributions. Returns the
/// indices of the rows that were smoothed.
pub fn apply_uniform_fallback(counts: &mut Array2<f64>) -> Vec<usize> {
  let n = counts.ncols();
  let mut smoothed = Vec::new();

  for (i, mut row) in counts.axis_iter_mut(Axis(0)).enumerate() {
    if row.sum() <= 0.0 {
      row.fill(1.0 / n as f64);
      smoothed.push(i);
    }
  }

  smoothed
}

fn normalize_rows(weights: &Array2<f64>) -> Result<Array2<f64>> {
  let mut probs = weights.clone();
  for (i, mut row) in probs.axis_iter_mut(Axis(0)).enumerate() {
    let total = row.sum();
    if total <= 0.0 || !total.is_finite() {
      return Err(MarkovError::degenerate(format!(
        "row {i} sums to {total} and cannot be normalised"
      )));
    }
    row /= total;
  }
  Ok(probs)
}

impl TransitionMatrix {
  /// Estimate from a state sequence with uniform smoothing of empty rows.
  pub fn estimate(states: &[usize], n_states: usize) -> Result<Self> {
    let counts = count_transitions(states, n_states)?;
    let mut weights = counts.clone();
    let smoothed = apply_uniform_fallback(&mut weights);
    if !smoothed.is_empty() {
      warn!(
        ?smoothed,
        n_states, "states without outgoing transitions use a uniform row"
      );
    }

    let probs = normalize_rows(&weights)?;
    debug!(n_states, n_transitions = states.len().saturating_sub(1), "estimated transition matrix");
    Ok(Self { probs, counts })
  }

  /// Normalise raw counts without smoothing.
  ///
  /// Fails with [`MarkovError::DegenerateMatrix`] if any row has no
  /// observations.
  pub fn from_counts_strict(counts: Array2<f64>) -> Result<Self> {
    ensure_param!(
      counts.is_square() && counts.nrows() >= 2,
      "count matrix must be square with at least 2 states, got {:?}",
      counts.dim()
    );
    ensure_param!(
      counts.iter().all(|c| *c >= 0.0 && c.is_finite()),
      "counts must be non-negative and finite"
    );
    let probs = normalize_rows(&counts)?;
    Ok(Self { probs, counts })
  }

  /// Validate a caller-supplied probability matrix.
  pub fn from_array(probs: Array2<f64>) -> Result<Self> {
    ensure_param!(
      probs.is_square() && probs.nrows() >= 2,
      "transition matrix must be square with at least 2 states, got {:?}",
      probs.dim()
    );
    ensure_param!(
      probs.iter().all(|p| *p >= 0.0 && p.is_finite()),
      "transition probabilities must be non-negative and finite"
    );
    for (i, row) in probs.axis_iter(Axis(0)).enumerate() {
      let total = row.sum();
      if (total - 1.0).abs() > ROW_SUM_TOL {
        return Err(MarkovError::degenerate(format!(
          "row {i} sums to {total}, expected 1"
        )));
      }
    }

    let counts = Array2::zeros(probs.dim());
    Ok(Self { probs, counts })
  }

  pub fn n_states(&self) -> usize {
    self.probs.nrows()
  }

  pub fn probs(&self) -> &Array2<f64> {
    &self.probs
  }

  /// Raw transition counts behind the estimate (zeros for a supplied matrix).
  pub fn counts(&self) -> &Array2<f64> {
    &self.counts
  }

  pub fn row(&self, state: usize) -> ArrayView1<'_, f64> {
    self.probs.row(state)
  }

  /// Dense row-major copy.
  pub fn to_vec(&self) -> Vec<Vec<f64>> {
    self.probs.outer_iter().map(|row| row.to_vec()).collect()
  }

  /// Long-run state distribution by power iteration from the uniform vector.
  ///
  /// For a periodic chain the iteration may not settle; the last iterate is
  /// returned after `max_iter` steps.
  pub fn stationary_distribution(&self, tol: f64, max_iter: usize) -> Array1<f64> {
    let n = self.n_states();
    let mut pi = Array1::from_elem(n, 1.0 / n as f64);

    for _ in 0..max_iter {
      let next = pi.dot(&self.probs);
      let delta = (&next - &pi).mapv(f64::abs).sum();
      pi = next;
      if delta < tol {
        break;
      }
    }

    pi
  }
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;
  use ndarray::array;
  use tracing_test::traced_test;

  use super::*;

  fn assert_stochastic(m: &TransitionMatrix) {
    for row in m.probs().outer_iter() {
      assert_abs_diff_eq!(row.sum(), 1.0, epsilon = ROW_SUM_TOL);
      assert!(row.iter().all(|p| *p >= 0.0));
    }
  }

  #[test]
  fn counts_consecutive_pairs() {
    let m = TransitionMatrix::estimate(&[0, 1, 2, 1, 0, 1], 3).unwrap();
    assert_eq!(m.n_states(), 3);
    assert_eq!(
      m.counts(),
      &array![[0.0, 2.0, 0.0], [1.0, 0.0, 1.0], [0.0, 1.0, 0.0]]
    );
    assert_abs_diff_eq!(m.row(1)[0], 0.5);
    assert_abs_diff_eq!(m.row(2)[1], 1.0);
    assert_stochastic(&m);
  }

  #[test]
  #[traced_test]
  fn unvisited_states_get_uniform_rows() {
    let m = TransitionMatrix::estimate(&[0, 0, 1, 0], 4).unwrap();
    assert_stochastic(&m);
    for s in [2, 3] {
      for p in m.row(s) {
        assert_abs_diff_eq!(*p, 0.25);
      }
    }
    assert!(logs_contain("uniform row"));
  }

  #[test]
  fn terminal_state_without_successor_is_smoothed() {
    // state 2 only appears last
    let m = TransitionMatrix::estimate(&[0, 1, 0, 1, 2], 3).unwrap();
    assert_stochastic(&m);
    assert_abs_diff_eq!(m.row(2)[0], 1.0 / 3.0);
  }

  #[test]
  fn fallback_reports_smoothed_rows() {
    let mut counts = array![[1.0, 1.0, 0.0], [0.0, 0.0, 0.0], [0.0, 0.0, 0.0]];
    assert_eq!(apply_uniform_fallback(&mut counts), vec![1, 2]);
    assert_abs_diff_eq!(counts[[1, 2]], 1.0 / 3.0);
    assert_abs_diff_eq!(counts[[0, 2]], 0.0);
  }

  #[test]
  fn strict_normalisation_rejects_empty_rows() {
    let counts = array![[1.0, 3.0], [0.0, 0.0]];
    assert!(matches!(
      TransitionMatrix::from_counts_strict(counts),
      Err(MarkovError::DegenerateMatrix(_))
    ));
    let ok = TransitionMatrix::from_counts_strict(array![[1.0, 3.0], [2.0, 2.0]]).unwrap();
    assert_abs_diff_eq!(ok.row(0)[1], 0.75);
  }

  #[test]
  fn out_of_range_state_is_invalid() {
    assert!(matches!(
      TransitionMatrix::estimate(&[0, 3], 3),
      Err(MarkovError::InvalidParameter(_))
    ));
  }

  #[test]
  fn from_array_validates_rows() {
    assert!(TransitionMatrix::from_array(array![[0.5, 0.5], [0.1, 0.9]]).is_ok());
    assert!(matches!(
      TransitionMatrix::from_array(array![[0.5, 0.4], [0.1, 0.9]]),
      Err(MarkovError::DegenerateMatrix(_))
    ));
    assert!(matches!(
      TransitionMatrix::from_array(array![[0.5, 0.5, 0.0], [0.1, 0.9, 0.0]]),
      Err(MarkovError::InvalidParameter(_))
    ));
  }

  #[test]
  fn stationary_distribution_of_two_state_chain() {
    // pi = (b, a) / (a + b) for P = [[1-a, a], [b, 1-b]]
    let m = TransitionMatrix::from_array(array![[0.9, 0.1], [0.3, 0.7]]).unwrap();
    let pi = m.stationary_distribution(1e-14, 10_000);
    assert_abs_diff_eq!(pi[0], 0.75, epsilon = 1e-9);
    assert_abs_diff_eq!(pi[1], 0.25, epsilon = 1e-9);
  }

  #[test]
  fn to_vec_is_row_major() {
    let m = TransitionMatrix::from_array(array![[0.2, 0.8], [0.6, 0.4]]).unwrap();
    assert_eq!(m.to_vec(), vec![vec![0.2, 0.8], vec![0.6, 0.4]]);
  }
}

//! # Weighted sampling
//!
//! $$
//! \mathbb P(X_{t+1}=j\mid X_t=i)=P_{ij}
//! $$
//!
//! The only place randomness enters the state dynamics: one categorical draw
//! per step from the current state's transition row.

use ndarray::Axis;
use rand::distributions::Distribution;
use rand::distributions::WeightedIndex;
use rand::Rng;

use crate::error::MarkovError;
use crate::error::Result;
use crate::markov::transition::TransitionMatrix;

/// Pre-built categorical distributions, one per transition row.
#[derive(Clone, Debug)]
pub struct StateSampler {
  rows: Vec<WeightedIndex<f64>>,
}

impl StateSampler {
  pub fn new(matrix: &TransitionMatrix) -> Result<Self> {
    let rows = matrix
      .probs()
      .axis_iter(Axis(0))
      .enumerate()
      .map(|(i, row)| {
        WeightedIndex::<f64>::new(row.iter())
          .map_err(|e| MarkovError::degenerate(format!("row {i} is not a distribution: {e}")))
      })
      .collect::<Result<Vec<_>>>()?;

    Ok(Self { rows })
  }

  pub fn n_states(&self) -> usize {
    self.rows.len()
  }

  /// Draw the state following `from`.
  pub fn next_state<R: Rng + ?Sized>(&self, from: usize, rng: &mut R) -> usize {
    self.rows[from].sample(rng)
  }
}

#[cfg(test)]
mod tests {
  use ndarray::array;
  use rand::rngs::StdRng;
  use rand::SeedableRng;

  use super::*;

  #[test]
  fn deterministic_rows_are_followed() {
    let m = TransitionMatrix::from_array(array![
      [0.0, 1.0, 0.0],
      [0.0, 0.0, 1.0],
      [1.0, 0.0, 0.0]
    ])
    .unwrap();
    let sampler = StateSampler::new(&m).unwrap();
    let mut rng = StdRng::seed_from_u64(1);
    let mut s = 0;
    for expected in [1, 2, 0, 1, 2, 0] {
      s = sampler.next_state(s, &mut rng);
      assert_eq!(s, expected);
    }
  }

  #[test]
  fn empirical_frequencies_match_row() {
    let m = TransitionMatrix::from_array(array![[0.2, 0.8], [0.5, 0.5]]).unwrap();
    let sampler = StateSampler::new(&m).unwrap();
    let mut rng = StdRng::seed_from_u64(42);
    let n = 20_000;
    let ones = (0..n).filter(|_| sampler.next_state(0, &mut rng) == 1).count();
    let freq = ones as f64 / n as f64;
    assert!((freq - 0.8).abs() < 0.02, "freq = {freq}");
  }

  #[test]
  fn same_seed_same_draws() {
    let m = TransitionMatrix::estimate(&[0, 1, 1, 2, 0, 2, 1], 3).unwrap();
    let sampler = StateSampler::new(&m).unwrap();
    let draw = |seed| {
      let mut rng = StdRng::seed_from_u64(seed);
      (0..50).map(|_| sampler.next_state(1, &mut rng)).collect::<Vec<_>>()
    };
    assert_eq!(draw(9), draw(9));
  }
}

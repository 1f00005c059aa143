//! # Model comparison
//!
//! $$
//! n^\star\ \text{chosen by the caller from}\ \{(\mu,\sigma,\gamma_1,\gamma_2)_n\}\ \text{vs.}\ (\mu,\sigma,\gamma_1,\gamma_2)_{\text{hist}}
//! $$
//!
//! Runs discretize → estimate → one representative simulation for each
//! candidate state count and reports the moments of the simulated log returns.
//! The representative path uses [`ReturnSampling::BinMean`], so each state
//! contributes its historical mean return. No candidate is selected here.

use rayon::prelude::*;
use tracing::debug;

use crate::error::ensure_param;
use crate::error::Result;
use crate::markov::discretize::discretize;
use crate::markov::discretize::BinningMethod;
use crate::markov::simulator::MarkovChainMC;
use crate::markov::simulator::ReturnSampling;
use crate::markov::transition::TransitionMatrix;
use crate::returns::ReturnKind;
use crate::stats::SampleMoments;
use crate::traits::path_rng;
use crate::traits::ProcessExt;

/// Starting price of the representative path; moments of log returns do not
/// depend on it.
pub const COMPARISON_PRICE: f64 = 100.0;

/// Statistics for one candidate state count.
#[derive(Clone, Debug, PartialEq)]
pub struct ModelComparison {
  pub n_states: usize,
  pub moments: SampleMoments,
  pub transition_matrix: TransitionMatrix,
  pub sampling: ReturnSampling,
}

/// Side-by-side comparison of candidates against the historical series.
#[derive(Clone, Debug, PartialEq)]
pub struct ModelComparisonReport {
  /// Moments of the historical returns expressed as log returns.
  pub historical: SampleMoments,
  pub models: Vec<ModelComparison>,
}

impl ModelComparisonReport {
  pub fn get(&self, n_states: usize) -> Option<&ModelComparison> {
    self.models.iter().find(|m| m.n_states == n_states)
  }
}

fn compare_one(
  returns: &[f64],
  return_kind: ReturnKind,
  n_states: usize,
  method: BinningMethod,
  n_steps: usize,
  seed: Option<u64>,
  index: usize,
) -> Result<ModelComparison> {
  let d = discretize(returns, n_states, method)?;
  let matrix = TransitionMatrix::estimate(&d.states, n_states)?;
  let initial_state = d.last_state().unwrap_or(0);

  let model = MarkovChainMC::new(
    COMPARISON_PRICE,
    initial_state,
    matrix.clone(),
    d.edges.clone(),
    n_steps,
    return_kind,
  )?
  .with_bin_means(d.state_means.clone())?;

  let path = match seed {
    Some(seed) => model.sample_with(&mut path_rng(seed, index)),
    None => model.sample(),
  };
  let moments = SampleMoments::from_slice(&path.log_returns())?;
  debug!(n_states, ?moments, "compared candidate");

  Ok(ModelComparison {
    n_states,
    moments,
    transition_matrix: matrix,
    sampling: model.return_sampling(),
  })
}

/// Compare candidate state counts on one return series.
///
/// `returns` must use `return_kind`; the representative paths are rebuilt with
/// the same convention.
pub fn compare_models(
  returns: &[f64],
  return_kind: ReturnKind,
  candidates: &[usize],
  method: BinningMethod,
  n_steps: usize,
  seed: Option<u64>,
) -> Result<ModelComparisonReport> {
  ensure_param!(!candidates.is_empty(), "no candidate n_states supplied");

  let log_returns = returns
    .iter()
    .map(|r| return_kind.to_log(*r))
    .collect::<Vec<_>>();
  let historical = SampleMoments::from_slice(&log_returns)?;

  let models = candidates
    .par_iter()
    .enumerate()
    .map(|(i, n_states)| compare_one(returns, return_kind, *n_states, method, n_steps, seed, i))
    .collect::<Result<Vec<_>>>()?;

  Ok(ModelComparisonReport { historical, models })
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;

  use super::*;
  use crate::error::MarkovError;
  use crate::markov::transition::ROW_SUM_TOL;

  fn sample_returns() -> Vec<f64> {
    (0..200)
      .map(|i| ((i * 73) % 200) as f64 / 10_000.0 - 0.01)
      .collect()
  }

  #[test]
  fn one_entry_per_candidate() {
    let report = compare_models(
      &sample_returns(),
      ReturnKind::Log,
      &[2, 3, 4, 5],
      BinningMethod::EqualFrequency,
      30,
      Some(17),
    )
    .unwrap();

    assert_eq!(
      report.models.iter().map(|m| m.n_states).collect::<Vec<_>>(),
      vec![2, 3, 4, 5]
    );
    for model in &report.models {
      let n = model.n_states;
      assert_eq!(model.transition_matrix.probs().dim(), (n, n));
      for row in model.transition_matrix.probs().outer_iter() {
        assert_abs_diff_eq!(row.sum(), 1.0, epsilon = ROW_SUM_TOL);
      }
      assert!(model.moments.std.is_finite());
      assert_eq!(model.sampling, ReturnSampling::BinMean);
    }
    assert!(report.get(3).is_some());
    assert!(report.get(9).is_none());
  }

  #[test]
  fn seeded_comparison_is_reproducible() {
    let run = || {
      compare_models(
        &sample_returns(),
        ReturnKind::Log,
        &[2, 4],
        BinningMethod::EqualWidth,
        20,
        Some(5),
      )
      .unwrap()
    };
    assert_eq!(run(), run());
  }

  #[test]
  fn simulated_moments_come_from_state_means() {
    let returns = sample_returns();
    let report = compare_models(
      &returns,
      ReturnKind::Log,
      &[2],
      BinningMethod::EqualFrequency,
      50,
      Some(1),
    )
    .unwrap();
    let d = discretize(&returns, 2, BinningMethod::EqualFrequency).unwrap();
    let lo = d.state_means[0].min(d.state_means[1]);
    let hi = d.state_means[0].max(d.state_means[1]);
    let mean = report.models[0].moments.mean;
    assert!(mean >= lo - 1e-12 && mean <= hi + 1e-12);
  }

  #[test]
  fn historical_moments_are_reported() {
    let returns = sample_returns();
    let report = compare_models(
      &returns,
      ReturnKind::Log,
      &[3],
      BinningMethod::EqualFrequency,
      10,
      None,
    )
    .unwrap();
    let expected = SampleMoments::from_slice(&returns).unwrap();
    assert_abs_diff_eq!(report.historical.mean, expected.mean, epsilon = 1e-15);
    assert_abs_diff_eq!(report.historical.std, expected.std, epsilon = 1e-15);
  }

  #[test]
  fn invalid_candidates_fail() {
    let returns = sample_returns();
    assert!(matches!(
      compare_models(&returns, ReturnKind::Log, &[], BinningMethod::EqualWidth, 10, None),
      Err(MarkovError::InvalidParameter(_))
    ));
    assert!(matches!(
      compare_models(&returns, ReturnKind::Log, &[3, 1], BinningMethod::EqualWidth, 10, None),
      Err(MarkovError::InvalidParameter(_))
    ));
  }
}

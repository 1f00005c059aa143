//! # Markov chain Monte Carlo simulator
//!
//! $$
//! X_{t+1}\sim P_{X_t,\cdot},\qquad r_{t+1}\sim\mathcal U[e_{X_{t+1}},e_{X_{t+1}+1}],\qquad
//! S_t=S_0\exp\Big(\sum_{k\le t}r_k\Big)
//! $$
//!
//! Paths are independent: each one owns its generator, so a batch can be split
//! over threads and merged by concatenation.

use std::fmt::Display;
use std::str::FromStr;

use impl_new_derive::ImplNew;
use ndarray::Array1;
use rand::Rng;
use rand_distr::Distribution;
use rand_distr::Uniform;
use tracing::info;

use crate::error::ensure_param;
use crate::error::MarkovError;
use crate::error::Result;
use crate::markov::discretize::BinEdges;
use crate::markov::sampling::StateSampler;
use crate::markov::transition::TransitionMatrix;
use crate::returns::ReturnKind;
use crate::traits::ProcessExt;

/// How a return is produced once the next state is drawn.
///
/// The two strategies reconstruct different price processes and are not
/// interchangeable: `UniformInBin` keeps within-bin dispersion, `BinMean`
/// collapses every state to a single point estimate.
#[derive(Default, Clone, Copy, PartialEq, Eq, Debug)]
pub enum ReturnSampling {
  /// Uniform draw between the state's finite bin bounds.
  #[default]
  UniformInBin,
  /// Historical mean return observed in the state.
  BinMean,
}

impl Display for ReturnSampling {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      ReturnSampling::UniformInBin => write!(f, "uniform"),
      ReturnSampling::BinMean => write!(f, "mean"),
    }
  }
}

impl FromStr for ReturnSampling {
  type Err = MarkovError;

  fn from_str(s: &str) -> Result<Self> {
    match s.to_lowercase().as_str() {
      "uniform" | "uniform_in_bin" => Ok(Self::UniformInBin),
      "mean" | "bin_mean" => Ok(Self::BinMean),
      other => Err(MarkovError::invalid(format!(
        "unknown return sampling '{other}', expected 'uniform' or 'mean'"
      ))),
    }
  }
}

/// One simulated trajectory.
#[derive(ImplNew, Clone, Debug, PartialEq)]
pub struct MarkovPath {
  /// Visited states; `states[0]` is the initial state.
  pub states: Vec<usize>,
  /// Prices; `prices[0]` is the initial price.
  pub prices: Array1<f64>,
}

impl MarkovPath {
  pub fn len(&self) -> usize {
    self.prices.len()
  }

  pub fn is_empty(&self) -> bool {
    self.prices.is_empty()
  }

  /// Step log returns of the price path.
  pub fn log_returns(&self) -> Vec<f64> {
    self
      .prices
      .iter()
      .zip(self.prices.iter().skip(1))
      .map(|(prev, next)| (next / prev).ln())
      .collect()
  }
}

#[derive(Clone, Debug)]
enum ReturnSource {
  Uniform(Vec<Uniform<f64>>),
  Mean(Vec<f64>),
}

/// Discrete-state Markov chain price simulator.
#[derive(Clone, Debug)]
pub struct MarkovChainMC {
  initial_price: f64,
  initial_state: usize,
  n_steps: usize,
  return_kind: ReturnKind,
  matrix: TransitionMatrix,
  edges: BinEdges,
  sampler: StateSampler,
  source: ReturnSource,
}

impl MarkovChainMC {
  /// Simulator drawing returns uniformly inside each state's bin.
  ///
  /// `return_kind` must be the convention the bins were estimated with.
  pub fn new(
    initial_price: f64,
    initial_state: usize,
    matrix: TransitionMatrix,
    edges: BinEdges,
    n_steps: usize,
    return_kind: ReturnKind,
  ) -> Result<Self> {
    ensure_param!(n_steps >= 1, "n_steps must be >= 1, got {n_steps}");
    ensure_param!(
      initial_price.is_finite() && initial_price > 0.0,
      "initial price must be positive and finite, got {initial_price}"
    );
    ensure_param!(
      matrix.n_states() == edges.n_states(),
      "transition matrix has {} states but bin edges define {}",
      matrix.n_states(),
      edges.n_states()
    );
    ensure_param!(
      initial_state < matrix.n_states(),
      "initial state {initial_state} out of range for {} states",
      matrix.n_states()
    );

    let sampler = StateSampler::new(&matrix)?;
    let bins = (0..edges.n_states())
      .map(|s| {
        let (lo, hi) = edges.bounds(s);
        Uniform::new_inclusive(lo, hi)
      })
      .collect();

    Ok(Self {
      initial_price,
      initial_state,
      n_steps,
      return_kind,
      matrix,
      edges,
      sampler,
      source: ReturnSource::Uniform(bins),
    })
  }

  /// Switch to the bin-mean strategy with one historical mean per state.
  pub fn with_bin_means(mut self, means: Vec<f64>) -> Result<Self> {
    ensure_param!(
      means.len() == self.matrix.n_states(),
      "expected {} state means, got {}",
      self.matrix.n_states(),
      means.len()
    );
    ensure_param!(
      means.iter().all(|m| m.is_finite()),
      "state means must be finite"
    );
    self.source = ReturnSource::Mean(means);
    Ok(self)
  }

  pub fn return_sampling(&self) -> ReturnSampling {
    match self.source {
      ReturnSource::Uniform(_) => ReturnSampling::UniformInBin,
      ReturnSource::Mean(_) => ReturnSampling::BinMean,
    }
  }

  pub fn matrix(&self) -> &TransitionMatrix {
    &self.matrix
  }

  pub fn edges(&self) -> &BinEdges {
    &self.edges
  }

  pub fn n_steps(&self) -> usize {
    self.n_steps
  }

  pub fn initial_price(&self) -> f64 {
    self.initial_price
  }

  pub fn initial_state(&self) -> usize {
    self.initial_state
  }

  pub fn return_kind(&self) -> ReturnKind {
    self.return_kind
  }

  fn draw_return<R: Rng + ?Sized>(&self, state: usize, rng: &mut R) -> f64 {
    match &self.source {
      ReturnSource::Uniform(bins) => bins[state].sample(rng),
      ReturnSource::Mean(means) => means[state],
    }
  }

  /// Run `n_simulations` independent paths.
  ///
  /// With a seed every path gets its own generator derived from `(seed, i)`
  /// and the batch is reproducible; without one thread-local generators are
  /// used.
  pub fn simulate(&self, n_simulations: usize, seed: Option<u64>) -> Result<Vec<MarkovPath>> {
    ensure_param!(
      n_simulations >= 1,
      "n_simulations must be >= 1, got {n_simulations}"
    );

    let paths = match seed {
      Some(seed) => self.sample_par_seeded(n_simulations, seed),
      None => self.sample_par(n_simulations),
    };

    info!(
      n_simulations,
      n_steps = self.n_steps,
      n_states = self.matrix.n_states(),
      sampling = %self.return_sampling(),
      returns = %self.return_kind,
      "simulated markov paths"
    );
    Ok(paths)
  }
}

impl ProcessExt for MarkovChainMC {
  type Output = MarkovPath;

  fn sample_with<R: Rng + ?Sized>(&self, rng: &mut R) -> MarkovPath {
    let mut states = Vec::with_capacity(self.n_steps + 1);
    let mut prices = Array1::<f64>::zeros(self.n_steps + 1);
    states.push(self.initial_state);
    prices[0] = self.initial_price;

    let mut state = self.initial_state;
    let mut cum = 0.0;

    for t in 1..=self.n_steps {
      state = self.sampler.next_state(state, rng);
      let r = self.draw_return(state, rng);

      prices[t] = match self.return_kind {
        ReturnKind::Log => {
          cum += r;
          self.initial_price * cum.exp()
        }
        ReturnKind::Simple => self.return_kind.apply(prices[t - 1], r),
      }
      .clamp(f64::MIN_POSITIVE, f64::MAX);
      states.push(state);
    }

    MarkovPath::new(states, prices)
  }
}

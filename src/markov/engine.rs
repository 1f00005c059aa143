//! # Markov Engine
//!
//! $$
//! p \xrightarrow{\ r\ } r \xrightarrow{\ s\ } (e, s) \xrightarrow{\ \hat P\ } \hat P \xrightarrow{\ \text{MC}\ } \{S^{(k)}\}_{k=1}^{M}
//! $$
//!
//! High-level entry point running the whole pipeline with one return
//! convention end to end.

use std::time::Instant;

use tracing::info;
use tracing::warn;

use crate::error::ensure_param;
use crate::error::MarkovError;
use crate::error::Result;
use crate::markov::compare::compare_models;
use crate::markov::compare::ModelComparisonReport;
use crate::markov::discretize::discretize;
use crate::markov::discretize::BinningMethod;
use crate::markov::discretize::Discretization;
use crate::markov::simulator::MarkovChainMC;
use crate::markov::simulator::MarkovPath;
use crate::markov::simulator::ReturnSampling;
use crate::markov::transition::TransitionMatrix;
use crate::markov::N_SIMULATIONS;
use crate::markov::N_STATES;
use crate::markov::N_STEPS;
use crate::returns::returns;
use crate::returns::ReturnKind;
use crate::stats::TerminalSummary;
use crate::traits::ProcessExt;

/// Runtime configuration for [`MarkovEngine`].
#[derive(Clone, Debug, PartialEq)]
pub struct MarkovConfig {
  /// Number of independent paths.
  pub n_simulations: usize,
  /// Steps per path; every path has `n_steps + 1` prices.
  pub n_steps: usize,
  /// Number of discrete return states.
  pub n_states: usize,
  pub method: BinningMethod,
  /// Convention used both to estimate bins and to rebuild prices.
  pub return_kind: ReturnKind,
  pub return_sampling: ReturnSampling,
  /// Base seed; `None` draws from thread-local generators.
  pub seed: Option<u64>,
}

impl Default for MarkovConfig {
  fn default() -> Self {
    Self {
      n_simulations: N_SIMULATIONS,
      n_steps: N_STEPS,
      n_states: N_STATES,
      method: BinningMethod::EqualFrequency,
      return_kind: ReturnKind::Log,
      return_sampling: ReturnSampling::UniformInBin,
      seed: None,
    }
  }
}

impl MarkovConfig {
  pub fn validate(&self) -> Result<()> {
    ensure_param!(
      self.n_simulations >= 1,
      "n_simulations must be >= 1, got {}",
      self.n_simulations
    );
    ensure_param!(
      self.n_steps >= 1,
      "n_steps must be >= 1, got {}",
      self.n_steps
    );
    ensure_param!(
      self.n_states >= 2,
      "n_states must be >= 2, got {}",
      self.n_states
    );
    Ok(())
  }
}

/// Output of one engine run.
#[derive(Clone, Debug)]
pub struct MarkovSimulation {
  pub returns: Vec<f64>,
  pub discretization: Discretization,
  pub transition_matrix: TransitionMatrix,
  pub paths: Vec<MarkovPath>,
}

impl MarkovSimulation {
  pub fn terminal_summary(&self) -> Result<TerminalSummary> {
    TerminalSummary::from_paths(self.paths.iter().map(|p| p.prices.view()))
  }
}

/// Single entry point for the Markov chain Monte Carlo pipeline.
#[derive(Clone, Debug, Default)]
pub struct MarkovEngine {
  config: MarkovConfig,
}

impl MarkovEngine {
  pub fn new(config: MarkovConfig) -> Result<Self> {
    config.validate()?;
    Ok(Self { config })
  }

  pub fn config(&self) -> &MarkovConfig {
    &self.config
  }

  /// Run from a price series, starting at the last price and the last
  /// observed state.
  pub fn run(&self, prices: &[f64]) -> Result<MarkovSimulation> {
    let returns = returns(prices, self.config.return_kind)?;
    let initial_price = *prices
      .last()
      .ok_or_else(|| MarkovError::insufficient("empty price series"))?;
    self.run_returns(returns, initial_price)
  }

  /// Run from a return series already expressed in the configured convention.
  pub fn run_returns(&self, returns: Vec<f64>, initial_price: f64) -> Result<MarkovSimulation> {
    let (discretization, transition_matrix, model) = self.build(&returns, initial_price)?;
    let paths = model.simulate(self.config.n_simulations, self.config.seed)?;

    info!(
      n_obs = returns.len(),
      n_paths = paths.len(),
      method = %self.config.method,
      "markov simulation finished"
    );

    Ok(MarkovSimulation {
      returns,
      discretization,
      transition_matrix,
      paths,
    })
  }

  /// Like [`MarkovEngine::run`], but stops launching paths once `deadline`
  /// passes and returns whatever completed.
  pub fn run_until(&self, prices: &[f64], deadline: Instant) -> Result<MarkovSimulation> {
    let returns = returns(prices, self.config.return_kind)?;
    let initial_price = *prices
      .last()
      .ok_or_else(|| MarkovError::insufficient("empty price series"))?;
    let (discretization, transition_matrix, model) = self.build(&returns, initial_price)?;

    let seed = self.config.seed.unwrap_or_else(rand::random);
    let paths = model.sample_par_until(self.config.n_simulations, seed, deadline);
    if paths.len() < self.config.n_simulations {
      warn!(
        completed = paths.len(),
        requested = self.config.n_simulations,
        "deadline reached before all paths were simulated"
      );
    }

    Ok(MarkovSimulation {
      returns,
      discretization,
      transition_matrix,
      paths,
    })
  }

  /// Compare candidate state counts on a price series.
  pub fn compare(&self, prices: &[f64], candidates: &[usize]) -> Result<ModelComparisonReport> {
    let returns = returns(prices, self.config.return_kind)?;
    compare_models(
      &returns,
      self.config.return_kind,
      candidates,
      self.config.method,
      self.config.n_steps,
      self.config.seed,
    )
  }

  fn build(
    &self,
    returns: &[f64],
    initial_price: f64,
  ) -> Result<(Discretization, TransitionMatrix, MarkovChainMC)> {
    let d = discretize(returns, self.config.n_states, self.config.method)?;
    let matrix = TransitionMatrix::estimate(&d.states, self.config.n_states)?;
    let initial_state = d
      .last_state()
      .ok_or_else(|| MarkovError::insufficient("no observed state to start from"))?;

    let model = MarkovChainMC::new(
      initial_price,
      initial_state,
      matrix.clone(),
      d.edges.clone(),
      self.config.n_steps,
      self.config.return_kind,
    )?;
    let model = match self.config.return_sampling {
      ReturnSampling::UniformInBin => model,
      ReturnSampling::BinMean => model.with_bin_means(d.state_means.clone())?,
    };

    Ok((d, matrix, model))
  }
}

//! # Discretizer
//!
//! $$
//! s(r)=j\iff e_j<r\le e_{j+1},\qquad e_0=-\infty,\ e_n=+\infty
//! $$
//!
//! Maps a continuous return series onto `n_states` ordered bins. A return equal
//! to an interior edge belongs to the bin on its left; the outer bins are open
//! so out-of-sample values always map to a state.

use std::fmt::Display;
use std::str::FromStr;

use ndarray::ArrayView1;
use ndarray_stats::QuantileExt;
use tracing::debug;

use crate::error::ensure_param;
use crate::error::MarkovError;
use crate::error::Result;
use crate::stats::distinct_count;
use crate::stats::quantile_sorted_at;
use crate::stats::sorted;

/// Relative half-width used when every return is identical.
const CONSTANT_RANGE_WIDEN: f64 = 0.001;

/// Binning method.
#[derive(Default, Clone, Copy, PartialEq, Eq, Debug)]
pub enum BinningMethod {
  /// `n_states + 1` evenly spaced edges between the sample min and max.
  EqualWidth,
  /// Sample quantiles at `i / n_states`; roughly equal occupancy per state.
  #[default]
  EqualFrequency,
}

impl Display for BinningMethod {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      BinningMethod::EqualWidth => write!(f, "equal_width"),
      BinningMethod::EqualFrequency => write!(f, "equal_freq"),
    }
  }
}

impl FromStr for BinningMethod {
  type Err = MarkovError;

  fn from_str(s: &str) -> Result<Self> {
    match s.to_lowercase().as_str() {
      "equal_width" | "equal-width" | "width" => Ok(Self::EqualWidth),
      "equal_freq" | "equal-freq" | "equal_frequency" | "quantile" => Ok(Self::EqualFrequency),
      other => Err(MarkovError::invalid(format!(
        "invalid discretization method '{other}', use 'equal_freq' or 'equal_width'"
      ))),
    }
  }
}

/// Ordered bin boundaries.
///
/// `support` holds `n_states + 1` finite, non-decreasing points. For mapping
/// the first and last are replaced by −∞/+∞ (see [`BinEdges::edges`]); for
/// return sampling they bound the outer bins.
#[derive(Clone, Debug, PartialEq)]
pub struct BinEdges {
  support: Vec<f64>,
}

impl BinEdges {
  /// Build from finite, non-decreasing support points.
  pub fn from_support(support: Vec<f64>) -> Result<Self> {
    ensure_param!(
      support.len() >= 3,
      "need at least 3 edges for 2 states, got {}",
      support.len()
    );
    ensure_param!(
      support.iter().all(|e| e.is_finite()),
      "bin edges must be finite"
    );
    ensure_param!(
      support.windows(2).all(|w| w[0] <= w[1]),
      "bin edges must be non-decreasing"
    );
    ensure_param!(
      support.windows(2).all(|w| (w[1] - w[0]).is_finite()),
      "bin widths must be finite"
    );
    Ok(Self { support })
  }

  pub fn n_states(&self) -> usize {
    self.support.len() - 1
  }

  /// Cut points between neighbouring states.
  pub fn interior(&self) -> &[f64] {
    &self.support[1..self.support.len() - 1]
  }

  /// Finite support points, including the observed outer bounds.
  pub fn support(&self) -> &[f64] {
    &self.support
  }

  /// Mapping edges with open outer bins: `[-inf, e_1, .., e_{n-1}, +inf]`.
  pub fn edges(&self) -> Vec<f64> {
    let mut edges = Vec::with_capacity(self.support.len());
    edges.push(f64::NEG_INFINITY);
    edges.extend_from_slice(self.interior());
    edges.push(f64::INFINITY);
    edges
  }

  /// State of a single return.
  pub fn state_of(&self, r: f64) -> usize {
    self.interior().partition_point(|e| *e < r)
  }

  /// Finite sampling range of `state`.
  pub fn bounds(&self, state: usize) -> (f64, f64) {
    (self.support[state], self.support[state + 1])
  }

  pub fn midpoint(&self, state: usize) -> f64 {
    let (lo, hi) = self.bounds(state);
    0.5 * (lo + hi)
  }
}

/// Result of discretizing one return series.
#[derive(Clone, Debug, PartialEq)]
pub struct Discretization {
  pub method: Option<BinningMethod>,
  pub edges: BinEdges,
  pub states: Vec<usize>,
  /// Historical observations per state.
  pub occupancy: Vec<usize>,
  /// Historical mean return per state; bin midpoint for empty states.
  pub state_means: Vec<f64>,
}

impl Discretization {
  fn new(method: Option<BinningMethod>, edges: BinEdges, returns: &[f64]) -> Self {
    let n_states = edges.n_states();
    let states = returns.iter().map(|r| edges.state_of(*r)).collect::<Vec<_>>();

    let mut occupancy = vec![0usize; n_states];
    let mut sums = vec![0.0f64; n_states];
    for (s, r) in states.iter().zip(returns) {
      occupancy[*s] += 1;
      sums[*s] += r;
    }

    let state_means = (0..n_states)
      .map(|s| match occupancy[s] {
        0 => edges.midpoint(s),
        c => sums[s] / c as f64,
      })
      .collect();

    Self {
      method,
      edges,
      states,
      occupancy,
      state_means,
    }
  }

  pub fn n_states(&self) -> usize {
    self.edges.n_states()
  }

  /// Most recent observed state, the conventional simulation start.
  pub fn last_state(&self) -> Option<usize> {
    self.states.last().copied()
  }
}

fn check_input(returns: &[f64], n_states: usize) -> Result<()> {
  ensure_param!(n_states >= 2, "n_states must be >= 2, got {n_states}");
  if returns.len() < 2 {
    return Err(MarkovError::insufficient(format!(
      "need at least 2 returns to discretize, got {}",
      returns.len()
    )));
  }
  ensure_param!(
    returns.iter().all(|r| r.is_finite()),
    "returns must be finite"
  );
  Ok(())
}

/// Evenly spaced support over `[min, max]`.
///
/// A constant series is widened by `0.1%` of its value (or `0.001` at zero) on
/// each side so the bins keep a positive width.
pub fn equal_width_edges(returns: &[f64], n_states: usize) -> Result<BinEdges> {
  check_input(returns, n_states)?;

  let view = ArrayView1::from(returns);
  let mut lo = *view
    .min()
    .map_err(|e| MarkovError::invalid(format!("min of returns: {e}")))?;
  let mut hi = *view
    .max()
    .map_err(|e| MarkovError::invalid(format!("max of returns: {e}")))?;

  if hi - lo <= 0.0 {
    let pad = if lo == 0.0 {
      CONSTANT_RANGE_WIDEN
    } else {
      CONSTANT_RANGE_WIDEN * lo.abs()
    };
    lo -= pad;
    hi += pad;
  }

  let step = (hi - lo) / n_states as f64;
  let mut support = (0..=n_states)
    .map(|i| lo + step * i as f64)
    .collect::<Vec<_>>();
  support[n_states] = hi;

  BinEdges::from_support(support)
}

/// Sample quantiles at `i / n_states`.
///
/// Fails if `n_states` exceeds the number of distinct returns, or if ties make
/// two edges coincide.
pub fn equal_frequency_edges(returns: &[f64], n_states: usize) -> Result<BinEdges> {
  check_input(returns, n_states)?;

  let distinct = distinct_count(returns);
  ensure_param!(
    n_states <= distinct,
    "n_states = {n_states} exceeds the {distinct} distinct returns available for quantile binning"
  );

  let sorted = sorted(returns);
  let support = (0..=n_states)
    .map(|i| quantile_sorted_at(&sorted, i, n_states))
    .collect::<Vec<_>>();

  ensure_param!(
    support.windows(2).all(|w| w[0] < w[1]),
    "tied returns produce duplicate quantile edges for n_states = {n_states}"
  );

  BinEdges::from_support(support)
}

/// Discretize with one of the built-in methods.
pub fn discretize(
  returns: &[f64],
  n_states: usize,
  method: BinningMethod,
) -> Result<Discretization> {
  let edges = match method {
    BinningMethod::EqualWidth => equal_width_edges(returns, n_states)?,
    BinningMethod::EqualFrequency => equal_frequency_edges(returns, n_states)?,
  };

  let d = Discretization::new(Some(method), edges, returns);
  debug!(
    %method,
    n_states,
    n_obs = returns.len(),
    occupancy = ?d.occupancy,
    "discretized returns"
  );
  Ok(d)
}

/// Discretize with user-supplied interior thresholds; yields
/// `thresholds.len() + 1` states.
pub fn discretize_with_thresholds(returns: &[f64], thresholds: &[f64]) -> Result<Discretization> {
  check_input(returns, thresholds.len() + 1)?;
  ensure_param!(
    thresholds.iter().all(|t| t.is_finite()),
    "thresholds must be finite"
  );
  ensure_param!(
    thresholds.windows(2).all(|w| w[0] < w[1]),
    "thresholds must be strictly increasing"
  );

  let sorted = sorted(returns);
  let first = thresholds[0];
  let last = thresholds[thresholds.len() - 1];

  let mut support = Vec::with_capacity(thresholds.len() + 2);
  support.push(sorted[0].min(first));
  support.extend_from_slice(thresholds);
  support.push(sorted[sorted.len() - 1].max(last));

  let edges = BinEdges::from_support(support)?;
  Ok(Discretization::new(None, edges, returns))
}

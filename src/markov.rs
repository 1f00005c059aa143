//! # Markov Chain Monte Carlo
//!
//! $$
//! \hat P_{ij}=\frac{N_{ij}}{\sum_k N_{ik}},\qquad S_{t+1}=S_t\,e^{r_{t+1}},\ r_{t+1}\mid X_{t+1}=j\sim\mathcal U[e_j,e_{j+1}]
//! $$
//!
//! | Module           | Description                                                                |
//! |------------------|----------------------------------------------------------------------------|
//! | [`discretize`]   | Equal-width, equal-frequency and threshold binning of returns into states. |
//! | [`transition`]   | Empirical first-order transition matrix with uniform-row smoothing.        |
//! | [`sampling`]     | Categorical draw of the next state from a transition row.                  |
//! | [`simulator`]    | Independent price paths driven by the chain.                               |
//! | [`compare`]      | Moments of simulated returns for several state counts.                     |
//! | [`engine`]       | One-call pipeline from prices to paths.                                    |
//!
//! ## Parallelism
//!
//! Batches use `rayon`; with a seed each path owns a generator derived from
//! `(seed, path index)` so results do not depend on scheduling.

pub mod compare;
pub mod discretize;
pub mod engine;
pub mod sampling;
pub mod simulator;
pub mod transition;

pub use compare::compare_models;
pub use compare::ModelComparison;
pub use compare::ModelComparisonReport;
pub use discretize::discretize;
pub use discretize::discretize_with_thresholds;
pub use discretize::BinEdges;
pub use discretize::BinningMethod;
pub use discretize::Discretization;
pub use engine::MarkovConfig;
pub use engine::MarkovEngine;
pub use engine::MarkovSimulation;
pub use sampling::StateSampler;
pub use simulator::MarkovChainMC;
pub use simulator::MarkovPath;
pub use simulator::ReturnSampling;
pub use transition::TransitionMatrix;

/// Default number of simulated paths
pub const N_SIMULATIONS: usize = 1000;
/// Default number of steps per path
pub const N_STEPS: usize = 30;
/// Default number of states
pub const N_STATES: usize = 3;

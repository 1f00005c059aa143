//! # markov-mc
//!
//! $$
//! p_{0..T}\ \to\ r_{1..T}\ \to\ s_{1..T}\ \to\ \hat P\ \to\ \{S^{(k)}_{0..H}\}_{k=1}^{M}
//! $$
//!
//! Discrete-state Markov chain Monte Carlo for asset prices: returns are
//! binned into states, an empirical transition matrix is estimated and
//! independent future price paths are simulated from it.
//!
//! ```ignore
//! use markov_mc::markov::MarkovConfig;
//! use markov_mc::markov::MarkovEngine;
//!
//! let engine = MarkovEngine::new(MarkovConfig { seed: Some(7), ..Default::default() })?;
//! let sim = engine.run(&[100.0, 102.0, 99.0, 101.0, 103.0])?;
//! println!("{:?}", sim.transition_matrix.probs());
//! ```

pub mod error;
pub mod markov;
pub mod returns;
pub mod stats;
pub mod traits;

pub use error::MarkovError;
pub use error::Result;

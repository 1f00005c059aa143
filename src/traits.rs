//! # Traits
//!
//! $$
//! \text{Trait contracts: }\mathcal{A}:(\text{model}, \omega)\to\text{paths}
//! $$
//!
use std::time::Instant;

use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use rayon::prelude::*;

/// Mixes a base seed with a path index so every path owns an independent stream.
const PATH_SEED_MIX: u64 = 0x9E37_79B9_7F4A_7C15;

/// Deterministic generator for the `index`-th path of a seeded batch.
pub fn path_rng(seed: u64, index: usize) -> StdRng {
  StdRng::seed_from_u64(seed ^ (index as u64 + 1).wrapping_mul(PATH_SEED_MIX))
}

/// A stochastic model that produces independent samples from an explicit
/// randomness source.
///
/// Implementors only provide [`ProcessExt::sample_with`]; the batch helpers
/// derive from it. Samples never share state, so batches run on the rayon pool
/// and are collected by concatenation.
pub trait ProcessExt: Send + Sync {
  type Output: Send;

  /// Draw one sample using the supplied generator.
  fn sample_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Self::Output;

  /// Draw one sample from the thread-local generator.
  fn sample(&self) -> Self::Output {
    self.sample_with(&mut rand::thread_rng())
  }

  /// Draw `m` samples in parallel from thread-local generators.
  fn sample_par(&self, m: usize) -> Vec<Self::Output> {
    (0..m).into_par_iter().map(|_| self.sample()).collect()
  }

  /// Draw `m` samples in parallel, path `i` seeded from `(seed, i)`.
  ///
  /// The result does not depend on how rayon schedules the work.
  fn sample_par_seeded(&self, m: usize, seed: u64) -> Vec<Self::Output> {
    (0..m)
      .into_par_iter()
      .map(|i| self.sample_with(&mut path_rng(seed, i)))
      .collect()
  }

  /// Like [`ProcessExt::sample_par_seeded`] but stops launching new samples
  /// once `deadline` has passed. Returns the samples that completed, in index
  /// order.
  fn sample_par_until(&self, m: usize, seed: u64, deadline: Instant) -> Vec<Self::Output> {
    (0..m)
      .into_par_iter()
      .filter_map(|i| {
        if Instant::now() >= deadline {
          return None;
        }
        Some(self.sample_with(&mut path_rng(seed, i)))
      })
      .collect()
  }
}

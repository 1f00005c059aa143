use std::hint::black_box;
use std::time::Duration;

use criterion::criterion_group;
use criterion::criterion_main;
use criterion::BenchmarkId;
use criterion::Criterion;
use markov_mc::markov::discretize;
use markov_mc::markov::BinningMethod;
use markov_mc::markov::MarkovChainMC;
use markov_mc::markov::TransitionMatrix;
use markov_mc::returns::ReturnKind;
use markov_mc::traits::ProcessExt;

fn history(n: usize) -> Vec<f64> {
  (0..n)
    .map(|i| ((i * 7919) % n) as f64 / n as f64 * 0.04 - 0.02)
    .collect()
}

fn bench_simulation(c: &mut Criterion) {
  let mut group = c.benchmark_group("MarkovSimulation");
  group.measurement_time(Duration::from_secs(3));
  group.warm_up_time(Duration::from_millis(500));

  let returns = history(252);

  for &n_states in &[3usize, 10] {
    let d = discretize(&returns, n_states, BinningMethod::EqualFrequency).unwrap();
    let matrix = TransitionMatrix::estimate(&d.states, n_states).unwrap();
    let model = MarkovChainMC::new(
      100.0,
      d.last_state().unwrap(),
      matrix,
      d.edges.clone(),
      252,
      ReturnKind::Log,
    )
    .unwrap();

    group.bench_with_input(
      BenchmarkId::new("sample_par_seeded/1000", n_states),
      &n_states,
      |b, _| b.iter(|| black_box(model.sample_par_seeded(1000, 42))),
    );

    group.bench_with_input(BenchmarkId::new("estimate", n_states), &n_states, |b, &n| {
      b.iter(|| black_box(TransitionMatrix::estimate(&d.states, n).unwrap()))
    });
  }

  group.finish();
}

criterion_group!(benches, bench_simulation);
criterion_main!(benches);

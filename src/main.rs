use std::fs::File;
use std::io::BufRead;
use std::io::BufReader;
use std::path::Path;
use std::path::PathBuf;

use anyhow::Context;
use anyhow::Result;
use clap::Parser;
use markov_mc::markov::BinningMethod;
use markov_mc::markov::MarkovConfig;
use markov_mc::markov::MarkovEngine;
use markov_mc::markov::ReturnSampling;
use markov_mc::returns::ReturnKind;
use markov_mc::stats::RiskReport;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "markov-mc")]
#[command(about = "Markov chain Monte Carlo price simulation from a price file")]
#[command(version)]
struct Cli {
  /// File with one price per line, oldest first
  prices: PathBuf,

  /// Number of simulated paths
  #[arg(long, default_value_t = 1000, value_parser = clap::value_parser!(u64).range(1..=10_000))]
  n_simulations: u64,

  /// Steps per path
  #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u64).range(1..=252))]
  n_steps: u64,

  /// Number of return states
  #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u64).range(2..=10))]
  n_states: u64,

  /// Discretization method: equal_freq or equal_width
  #[arg(long, default_value = "equal_freq")]
  method: String,

  /// Return convention: log or simple
  #[arg(long, default_value = "log")]
  returns: String,

  /// Return sampling inside a state: uniform or mean
  #[arg(long, default_value = "uniform")]
  sampling: String,

  /// Random seed for reproducibility
  #[arg(long)]
  seed: Option<u64>,

  /// Comma-separated state counts to compare, e.g. 2,3,4,5
  #[arg(long, value_delimiter = ',')]
  compare: Vec<usize>,

  /// Print historical risk metrics
  #[arg(long)]
  risk: bool,

  /// Log run events, not only warnings
  #[arg(short, long)]
  verbose: bool,
}

fn default_log_level(verbose: bool) -> &'static str {
  if verbose {
    "info"
  } else {
    "warn"
  }
}

fn init_logging(verbose: bool) {
  let filter = EnvFilter::try_from_default_env()
    .unwrap_or_else(|_| EnvFilter::new(default_log_level(verbose)));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .init();
}

fn main() -> Result<()> {
  let cli = Cli::parse();
  init_logging(cli.verbose);
  let prices = read_vector_from_file(&cli.prices)?;

  let config = MarkovConfig {
    n_simulations: cli.n_simulations as usize,
    n_steps: cli.n_steps as usize,
    n_states: cli.n_states as usize,
    method: cli.method.parse::<BinningMethod>()?,
    return_kind: cli.returns.parse::<ReturnKind>()?,
    return_sampling: cli.sampling.parse::<ReturnSampling>()?,
    seed: cli.seed,
  };
  let engine = MarkovEngine::new(config)?;
  let sim = engine
    .run(&prices)
    .with_context(|| format!("simulating from {}", cli.prices.display()))?;

  println!("Transition matrix ({} states):", sim.transition_matrix.n_states());
  for (i, row) in sim.transition_matrix.to_vec().iter().enumerate() {
    let cells = row
      .iter()
      .map(|p| format!("{p:.4}"))
      .collect::<Vec<_>>()
      .join("  ");
    println!("  state {i}: {cells}");
  }

  let summary = sim.terminal_summary()?;
  println!(
    "\nTerminal price after {} steps ({} paths):",
    engine.config().n_steps,
    summary.n_paths
  );
  println!("  mean: {:.4}", summary.mean);
  println!("  p05:  {:.4}", summary.p05);
  println!("  p50:  {:.4}", summary.p50);
  println!("  p95:  {:.4}", summary.p95);
  println!("  P(loss): {:.4}", summary.prob_loss);

  if !cli.compare.is_empty() {
    let report = engine.compare(&prices, &cli.compare)?;
    println!("\nModel comparison (log returns):");
    println!(
      "  {:>9} {:>10} {:>10} {:>10} {:>10}",
      "n_states", "mean", "std", "skew", "kurtosis"
    );
    let h = report.historical;
    println!(
      "  {:>9} {:>10.6} {:>10.6} {:>10.4} {:>10.4}",
      "history", h.mean, h.std, h.skewness, h.excess_kurtosis
    );
    for m in &report.models {
      println!(
        "  {:>9} {:>10.6} {:>10.6} {:>10.4} {:>10.4}",
        m.n_states, m.moments.mean, m.moments.std, m.moments.skewness, m.moments.excess_kurtosis
      );
    }
  }

  if cli.risk {
    let risk = RiskReport::from_prices(&prices)?;
    println!("\nRisk:");
    match risk.volatility {
      Some(vol) => println!("  volatility: {vol:.4}"),
      None => println!("  volatility: n/a"),
    }
    println!("  VaR 95%:      {:.6}", risk.var_95);
    println!("  CVaR 95%:     {:.6}", risk.cvar_95);
    println!("  Sharpe ratio: {:.4}", risk.sharpe_ratio);
    println!("  Max drawdown: {:.4}", risk.max_drawdown);
  }

  Ok(())
}

fn read_vector_from_file(path: &Path) -> Result<Vec<f64>> {
  let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
  let reader = BufReader::new(file);
  let mut data = Vec::new();

  for (i, line) in reader.lines().enumerate() {
    let line = line?;
    let line = line.trim();
    if line.is_empty() {
      continue;
    }
    let value: f64 = line
      .parse()
      .with_context(|| format!("{}:{}: '{line}' is not a number", path.display(), i + 1))?;
    if value.is_finite() {
      data.push(value);
    }
  }

  Ok(data)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn n_states_is_capped_at_ten() {
    assert!(Cli::try_parse_from(["markov-mc", "prices.txt", "--n-states", "10"]).is_ok());
    assert!(Cli::try_parse_from(["markov-mc", "prices.txt", "--n-states", "11"]).is_err());
    assert!(Cli::try_parse_from(["markov-mc", "prices.txt", "--n-states", "1"]).is_err());
  }

  #[test]
  fn verbose_raises_log_level() {
    let cli = Cli::try_parse_from(["markov-mc", "prices.txt", "-v"]).unwrap();
    assert!(cli.verbose);
    assert_eq!(default_log_level(cli.verbose), "info");
    assert_eq!(default_log_level(false), "warn");
  }

  #[test]
  fn compare_takes_a_comma_list() {
    let cli = Cli::try_parse_from(["markov-mc", "prices.txt", "--compare", "2,3,5"]).unwrap();
    assert_eq!(cli.compare, vec![2, 3, 5]);
  }
}

//! Warmup/measure protocol for async workloads.
//!
//! A workload is awaited `warmup_rounds` times untimed, then `rounds` times
//! `iterations` timed calls. Each round collapses to the mean of its
//! iterations; the summary statistics are taken over those round means.

use std::fmt::Write as _;
use std::future::Future;
use std::pin::Pin;
use std::time::Instant;

use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::stats;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Profile {
    Quick,
    Full,
}

impl Profile {
    pub fn as_str(&self) -> &'static str {
        match self {
            Profile::Quick => "quick",
            Profile::Full => "full",
        }
    }
}

#[derive(Clone, Debug)]
pub struct BenchConfig {
    pub profile: Profile,
    pub seed: u64,
}

impl BenchConfig {
    pub fn rng(&self) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(self.seed)
    }

    /// Scales a scenario's declared protocol to the selected profile.
    pub fn scale(&self, declared: RunnerConfig) -> RunnerConfig {
        match self.profile {
            Profile::Full => declared,
            Profile::Quick => RunnerConfig {
                rounds: (declared.rounds / 10).max(1),
                iterations: declared.iterations,
                warmup_rounds: (declared.warmup_rounds / 10).max(1),
            },
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunnerConfig {
    pub rounds: u64,
    pub iterations: u64,
    pub warmup_rounds: u64,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            rounds: 5,
            iterations: 1,
            warmup_rounds: 1,
        }
    }
}

impl RunnerConfig {
    pub fn new(rounds: u64, warmup_rounds: u64) -> Self {
        Self {
            rounds,
            warmup_rounds,
            ..Self::default()
        }
    }

    pub fn with_iterations(mut self, iterations: u64) -> Self {
        self.iterations = iterations;
        self
    }

    fn validate(&self) -> Result<(), RunnerError> {
        if self.rounds == 0 {
            return Err(RunnerError::InvalidConfig {
                parameter: "rounds",
                reason: "at least one measured round is required".to_string(),
            });
        }
        if self.iterations == 0 {
            return Err(RunnerError::InvalidConfig {
                parameter: "iterations",
                reason: "at least one iteration per round is required".to_string(),
            });
        }
        Ok(())
    }
}

/// Configuration errors, raised before the workload is invoked.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunnerError {
    #[error("workload must be async (return a future)")]
    NotAsync,

    #[error("invalid runner configuration '{parameter}': {reason}")]
    InvalidConfig {
        parameter: &'static str,
        reason: String,
    },
}

pub type WorkloadFuture<'a, E> = Pin<Box<dyn Future<Output = Result<(), E>> + 'a>>;

/// A benchmarked callable.
///
/// Only `Async` workloads can be measured; `Blocking` exists so callers that
/// hand over a plain function get a configuration error instead of a
/// silently mismeasured run.
pub enum Workload<'a, E> {
    Async(Box<dyn FnMut() -> WorkloadFuture<'a, E> + 'a>),
    Blocking(Box<dyn FnMut() -> Result<(), E> + 'a>),
}

impl<'a, E: 'a> Workload<'a, E> {
    /// Wraps an async closure. The value the future resolves to is discarded.
    pub fn from_async<F, Fut, T>(mut f: F) -> Self
    where
        F: FnMut() -> Fut + 'a,
        Fut: Future<Output = Result<T, E>> + 'a,
        T: 'a,
    {
        Workload::Async(Box::new(move || -> WorkloadFuture<'a, E> {
            let fut = f();
            Box::pin(async move { fut.await.map(|_| ()) })
        }))
    }

    pub fn from_blocking<F>(f: F) -> Self
    where
        F: FnMut() -> Result<(), E> + 'a,
    {
        Workload::Blocking(Box::new(f))
    }
}

/// Summary of one benchmarked scenario. All times are in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkResult {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    pub stddev: f64,
    pub rounds: u64,
    pub iterations: u64,
    pub raw_times: Vec<f64>,
}

impl BenchmarkResult {
    pub fn from_round_times(rounds: u64, iterations: u64, raw_times: Vec<f64>) -> Self {
        Self {
            min: stats::min(&raw_times),
            max: stats::max(&raw_times),
            mean: stats::mean(&raw_times),
            median: stats::median(&raw_times),
            stddev: stats::sample_stddev(&raw_times),
            rounds,
            iterations,
            raw_times,
        }
    }

    /// Operations per second implied by the mean round time.
    pub fn ops_per_sec(&self) -> f64 {
        if self.mean > 0.0 {
            1.0 / self.mean
        } else {
            0.0
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct AsyncRunner {
    config: RunnerConfig,
}

impl AsyncRunner {
    pub fn new(config: RunnerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Runs the workload to completion.
    ///
    /// The first error the workload returns is propagated as-is and no
    /// result is produced. Calls never overlap and no timeout is applied.
    pub async fn run<E>(&self, workload: Workload<'_, E>) -> Result<BenchmarkResult, E>
    where
        E: From<RunnerError>,
    {
        let mut call = match workload {
            Workload::Async(f) => f,
            Workload::Blocking(_) => return Err(RunnerError::NotAsync.into()),
        };
        self.config.validate()?;

        let RunnerConfig {
            rounds,
            iterations,
            warmup_rounds,
        } = self.config;

        for _ in 0..warmup_rounds {
            call().await?;
        }

        let mut times = Vec::with_capacity(rounds as usize);
        let mut round_times = Vec::with_capacity(iterations as usize);
        for _ in 0..rounds {
            round_times.clear();
            for _ in 0..iterations {
                let start = Instant::now();
                call().await?;
                round_times.push(start.elapsed().as_secs_f64());
            }
            times.push(stats::mean(&round_times));
        }

        Ok(BenchmarkResult::from_round_times(rounds, iterations, times))
    }
}

/// Metric/value table for one finished benchmark.
pub fn summary_table(name: &str, result: &BenchmarkResult) -> String {
    let rows = [
        ("Min", stats::format_time(result.min)),
        ("Max", stats::format_time(result.max)),
        ("Mean", stats::format_time(result.mean)),
        ("Median", stats::format_time(result.median)),
        ("Std Dev", stats::format_time(result.stddev)),
        ("Rounds", result.rounds.to_string()),
        ("Iterations", result.iterations.to_string()),
    ];

    let mut out = String::new();
    let _ = writeln!(out, "Benchmark results: {name}");
    let _ = writeln!(out, "{:-<12}+{:-<16}", "", "");
    for (metric, value) in rows {
        let _ = writeln!(out, "{metric:<12}| {value}");
    }
    out
}

/// Writes the summary to stderr; stdout is reserved for JSON output.
pub fn print_result(name: &str, result: &BenchmarkResult) {
    eprintln!("\n{}", summary_table(name, result));
}

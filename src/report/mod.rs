//! Result aggregation across benchmark suites of other ecosystems.
//!
//! Each result file is parsed by the parser registered for its
//! [`SourceFormat`], normalized to operations per second and merged into a
//! [`ResultMap`]. Loading is best effort: a missing file means the driver
//! did not run, a malformed one is skipped with a warning.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use clap::ValueEnum;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

pub mod classify;
pub mod names;
pub mod sources;
pub mod table;

pub use classify::{DriverFilter, DriverMode, ModeFilter};
pub use names::{Benchmark, Variant};
pub use sources::{Sample, SourceFormat, SourceLabel};
pub use table::{build_report, ComparisonTable, Report};

/// A result file and how to read it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceSpec {
    pub path: PathBuf,
    pub format: SourceFormat,
    pub label: SourceLabel,
}

impl SourceSpec {
    pub fn new(
        path: impl Into<PathBuf>,
        format: SourceFormat,
        language: &str,
        connector: &str,
    ) -> Self {
        Self {
            path: path.into(),
            format,
            label: SourceLabel::new(language, connector),
        }
    }
}

/// `FORMAT:LANGUAGE:CONNECTOR:PATH`, e.g. `go-test:go:go-sql-driver:out/go.txt`.
impl FromStr for SourceSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.splitn(4, ':').collect();
        let &[format, language, connector, path] = parts.as_slice() else {
            return Err(format!("expected FORMAT:LANGUAGE:CONNECTOR:PATH, got `{s}`"));
        };
        if language.is_empty() || path.is_empty() {
            return Err(format!("language and path must not be empty in `{s}`"));
        }
        let format = SourceFormat::from_str(format, true)?;
        Ok(SourceSpec::new(path, format, language, connector))
    }
}

impl fmt::Display for SourceSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} {})",
            self.path.display(),
            self.label.language,
            self.label.connector
        )
    }
}

/// The fixed result file names the per-language suites write.
pub fn default_sources(dir: &Path) -> Vec<SourceSpec> {
    use SourceFormat::*;
    let spec = |file: &str, format: SourceFormat, language: &str, connector: &str| {
        SourceSpec::new(dir.join(file), format, language, connector)
    };
    vec![
        spec("bench_results_java.json", Jmh, "java", ""),
        spec("bench_results_c_mysql.json", GoogleBenchmark, "c", "mysql"),
        spec("bench_results_c_mariadb.json", GoogleBenchmark, "c", "mariadb"),
        spec("bench_results_cpp_mysql.json", GoogleBenchmark, "c++", "mysql"),
        spec("bench_results_cpp_mariadb.json", GoogleBenchmark, "c++", "mariadb"),
        spec("bench_results_nodejs.json", BenchmarkJs, "node", ""),
        spec("bench_results_python_mariadb_results.json", Pyperf, "python", "mariadb"),
        spec("bench_results_python_mysql_results.json", Pyperf, "python", "mysql"),
        spec("bench_results_go.txt", GoTest, "go", "go-sql-driver"),
        spec("bench_results_dotnet.json", BenchmarkDotnet, "dotnet", ""),
        spec("bench_results_criterion_mysql.json", Criterion, "rust", "mysql"),
        spec("bench_results_rust_sqlx.json", PytestBenchmark, "rust", "sqlx"),
    ]
}

/// [`default_sources`] plus every `benchmark_<driver>.json` in `dir`
/// (pytest-benchmark output of the Python suite, one file per driver).
pub fn discover(dir: &Path) -> Vec<SourceSpec> {
    let mut specs = default_sources(dir);
    let mut extra: Vec<SourceSpec> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| {
            let name = entry.file_name().to_str()?;
            let driver = name.strip_prefix("benchmark_")?.strip_suffix(".json")?;
            (!driver.is_empty()).then(|| {
                SourceSpec::new(entry.path(), SourceFormat::PytestBenchmark, "python", driver)
            })
        })
        .collect();
    extra.sort_by(|a, b| a.path.cmp(&b.path));
    specs.extend(extra);
    specs
}

#[derive(Clone, Debug, PartialEq)]
pub enum SourceOutcome {
    /// The file does not exist; the driver did not run.
    Missing,
    /// Unreadable or unparseable; contributes no rows.
    Malformed(String),
    Loaded {
        samples: usize,
        unrecognized: Vec<String>,
    },
}

/// `(benchmark, variant) -> driver -> ops/sec`, with drivers kept in the
/// order they were first seen.
#[derive(Clone, Debug, Default)]
pub struct ResultMap {
    rows: BTreeMap<(Benchmark, Variant), BTreeMap<String, f64>>,
    drivers: Vec<String>,
}

impl ResultMap {
    /// A later sample for the same cell replaces the earlier one.
    pub fn insert(&mut self, sample: Sample) {
        if !self.drivers.contains(&sample.driver) {
            self.drivers.push(sample.driver.clone());
        }
        self.rows
            .entry((sample.benchmark, sample.variant))
            .or_default()
            .insert(sample.driver, sample.ops_per_sec);
    }

    pub fn get(&self, benchmark: Benchmark, variant: Variant, driver: &str) -> Option<f64> {
        self.rows.get(&(benchmark, variant))?.get(driver).copied()
    }

    pub fn drivers(&self) -> &[String] {
        &self.drivers
    }

    pub fn rows(&self) -> impl Iterator<Item = (&(Benchmark, Variant), &BTreeMap<String, f64>)> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl Extend<Sample> for ResultMap {
    fn extend<I: IntoIterator<Item = Sample>>(&mut self, iter: I) {
        for sample in iter {
            self.insert(sample);
        }
    }
}

impl FromIterator<Sample> for ResultMap {
    fn from_iter<I: IntoIterator<Item = Sample>>(iter: I) -> Self {
        let mut map = ResultMap::default();
        map.extend(iter);
        map
    }
}

#[derive(Debug, Default)]
pub struct Aggregator {
    results: ResultMap,
    outcomes: Vec<(SourceSpec, SourceOutcome)>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads and merges one source. Never fails: problems are logged and
    /// reflected in the returned outcome.
    pub fn load(&mut self, spec: &SourceSpec) -> SourceOutcome {
        let outcome = self.read(spec);
        self.outcomes.push((spec.clone(), outcome.clone()));
        outcome
    }

    pub fn load_all<'a>(&mut self, specs: impl IntoIterator<Item = &'a SourceSpec>) {
        for spec in specs {
            self.load(spec);
        }
    }

    fn read(&mut self, spec: &SourceSpec) -> SourceOutcome {
        let raw = match fs::read(&spec.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(source = %spec, "no result file");
                return SourceOutcome::Missing;
            }
            Err(e) => {
                warn!(source = %spec, error = %e, "cannot read result file, skipping");
                return SourceOutcome::Malformed(e.to_string());
            }
        };

        let parsed = match spec.format.parse(&raw, &spec.label) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(source = %spec, error = %e, "malformed result file, skipping");
                return SourceOutcome::Malformed(e.to_string());
            }
        };

        for name in &parsed.unrecognized {
            warn!(source = %spec, entry = %name, "unrecognized benchmark entry");
        }
        let samples = parsed.samples.len();
        info!(source = %spec, samples, "loaded");
        self.results.extend(parsed.samples);
        SourceOutcome::Loaded {
            samples,
            unrecognized: parsed.unrecognized,
        }
    }

    pub fn results(&self) -> &ResultMap {
        &self.results
    }

    pub fn outcomes(&self) -> &[(SourceSpec, SourceOutcome)] {
        &self.outcomes
    }

    pub fn into_results(self) -> ResultMap {
        self.results
    }
}

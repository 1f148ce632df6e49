//! Per-ecosystem result parsers.
//!
//! Every parser is a pure function from the raw file bytes to samples in
//! operations per second. Conversions from latency units happen here and
//! nowhere else, so the aggregation code only ever sees rates.

use clap::ValueEnum;
use thiserror::Error;

use super::names::{Benchmark, Variant};

pub mod benchmark_js;
pub mod criterion;
pub mod dotnet;
pub mod go_test;
pub mod google_benchmark;
pub mod jmh;
pub mod pyperf;
pub mod pytest;

pub type ParseFn = fn(&[u8], &SourceLabel) -> Result<Parsed, SourceError>;

/// Result file layouts understood by the reporter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum SourceFormat {
    /// Java JMH JSON (`-rf json`), throughput score.
    Jmh,
    /// Google Benchmark JSON with a "nb operations per second" counter (C / C++).
    GoogleBenchmark,
    /// benchmark.js results keyed by benchmark title (Node).
    BenchmarkJs,
    /// pyperf suite JSON with raw per-run timings (Python).
    Pyperf,
    /// pytest-benchmark compatible JSON, also written by `connector-bench run`.
    PytestBenchmark,
    /// `go test -bench` text output.
    GoTest,
    /// BenchmarkDotNet brief JSON exporter.
    BenchmarkDotnet,
    /// cargo-criterion `--message-format=json` lines.
    Criterion,
}

impl SourceFormat {
    pub fn parser(&self) -> ParseFn {
        match self {
            SourceFormat::Jmh => jmh::parse,
            SourceFormat::GoogleBenchmark => google_benchmark::parse,
            SourceFormat::BenchmarkJs => benchmark_js::parse,
            SourceFormat::Pyperf => pyperf::parse,
            SourceFormat::PytestBenchmark => pytest::parse,
            SourceFormat::GoTest => go_test::parse,
            SourceFormat::BenchmarkDotnet => dotnet::parse,
            SourceFormat::Criterion => criterion::parse,
        }
    }

    pub fn parse(&self, raw: &[u8], label: &SourceLabel) -> Result<Parsed, SourceError> {
        (self.parser())(raw, label)
    }
}

/// Names the ecosystem a file came from. Driver ids are `"<language> <connector>"`.
///
/// `connector` is used when the file itself does not name the client library.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceLabel {
    pub language: String,
    pub connector: String,
}

impl SourceLabel {
    pub fn new(language: impl Into<String>, connector: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            connector: connector.into(),
        }
    }

    pub fn driver(&self, connector: &str) -> String {
        format!("{} {}", self.language, connector)
    }

    pub fn default_driver(&self) -> String {
        self.driver(&self.connector)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Sample {
    pub benchmark: Benchmark,
    pub variant: Variant,
    pub driver: String,
    pub ops_per_sec: f64,
}

#[derive(Debug, Default)]
pub struct Parsed {
    pub samples: Vec<Sample>,
    /// Raw entry names no mapping exists for.
    pub unrecognized: Vec<String>,
}

impl Parsed {
    pub(crate) fn push(&mut self, raw_name: &str, mapping: Mapping, driver: String, ops: Option<f64>) {
        match (mapping, ops) {
            (Mapping::Skip, _) => {}
            (Mapping::Unknown, _) => self.unrecognized.push(raw_name.to_string()),
            (Mapping::Keep(..), None) => self
                .unrecognized
                .push(format!("{raw_name} (no usable measurement)")),
            (Mapping::Keep(benchmark, variant), Some(ops_per_sec)) => self.samples.push(Sample {
                benchmark,
                variant,
                driver,
                ops_per_sec,
            }),
        }
    }
}

/// Where a raw entry lands in the comparison.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Mapping {
    Keep(Benchmark, Variant),
    /// Known entry deliberately left out of the comparison.
    Skip,
    Unknown,
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("unexpected layout: {0}")]
    Schema(String),
}

pub(crate) fn ops_from_seconds(secs: f64) -> Option<f64> {
    (secs.is_finite() && secs > 0.0).then(|| 1.0 / secs)
}

pub(crate) fn ops_from_nanos(nanos: f64) -> Option<f64> {
    (nanos.is_finite() && nanos > 0.0).then(|| 1_000_000_000.0 / nanos)
}

pub(crate) fn positive(rate: f64) -> Option<f64> {
    (rate.is_finite() && rate > 0.0).then_some(rate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_conversions() {
        assert_eq!(ops_from_seconds(0.002), Some(500.0));
        assert_eq!(ops_from_nanos(20_000.0), Some(50_000.0));
        assert_eq!(ops_from_nanos(3.0), Some(1_000_000_000.0 / 3.0));
        assert_eq!(ops_from_nanos(0.0), None);
        assert_eq!(ops_from_seconds(0.0), None);
        assert_eq!(ops_from_seconds(f64::NAN), None);
        assert_eq!(positive(-1.0), None);
    }

    #[test]
    fn test_push_reports_unknown_and_unusable() {
        let mut p = Parsed::default();
        p.push("mystery", Mapping::Unknown, "x y".into(), Some(1.0));
        p.push("skipped", Mapping::Skip, "x y".into(), Some(1.0));
        p.push(
            "select",
            Mapping::Keep(Benchmark::Select1, Variant::Text),
            "x y".into(),
            None,
        );
        assert!(p.samples.is_empty());
        assert_eq!(p.unrecognized, ["mystery", "select (no usable measurement)"]);
    }

    #[test]
    fn test_format_names_parse_from_cli() {
        assert_eq!(
            SourceFormat::from_str("google-benchmark", true).unwrap(),
            SourceFormat::GoogleBenchmark
        );
        assert_eq!(
            SourceFormat::from_str("pytest-benchmark", true).unwrap(),
            SourceFormat::PytestBenchmark
        );
    }
}

//! pyperf suite JSON. Each benchmark carries raw per-loop timings in seconds,
//! reduced here to `1 / mean(values)`.

use serde::Deserialize;

use super::{ops_from_seconds, Mapping, Parsed, SourceError, SourceLabel};
use crate::report::names::{Benchmark::*, Variant::*};
use crate::stats;

/// Run 0 is pyperf's calibration run.
const MEASURED_RUN: usize = 1;

#[derive(Deserialize)]
struct Suite {
    benchmarks: Vec<Bench>,
}

#[derive(Deserialize)]
struct Bench {
    metadata: Metadata,
    #[serde(default)]
    runs: Vec<Run>,
}

#[derive(Deserialize)]
struct Metadata {
    name: String,
}

#[derive(Deserialize)]
struct Run {
    #[serde(default)]
    values: Vec<f64>,
}

pub fn parse(raw: &[u8], label: &SourceLabel) -> Result<Parsed, SourceError> {
    let suite: Suite = serde_json::from_slice(raw)?;
    let mut out = Parsed::default();

    for b in &suite.benchmarks {
        let ops = b
            .runs
            .get(MEASURED_RUN)
            .filter(|r| !r.values.is_empty())
            .and_then(|r| ops_from_seconds(stats::mean(&r.values)));
        out.push(
            &b.metadata.name,
            map_name(&b.metadata.name, &label.connector),
            label.default_driver(),
            ops,
        );
    }
    Ok(out)
}

fn map_name(name: &str, connector: &str) -> Mapping {
    let m = match name {
        "DO 1" => (Do1, Text),
        "BULK Insert" => (InsertBatch, if connector == "mysql" { Binary } else { Bulk }),
        "select 1" => (Select1, Text),
        "select_100_cols" => (Select100Cols, Text),
        "select_100_cols_execute" => (Select100Cols, BinaryExecuteOnly),
        "select_1000_rows" => (Select1000Rows, Text),
        "select 1000 rows - BINARY" => (Select1000Rows, BinaryExecuteOnly),
        "DO 1000 params" => (Do1000Params, BinaryExecuteOnly),
        _ => return Mapping::Unknown,
    };
    Mapping::Keep(m.0, m.1)
}

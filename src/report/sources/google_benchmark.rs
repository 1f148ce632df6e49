//! Google Benchmark JSON from the C and C++ connector suites.
//!
//! Only the `_mean` aggregate of the single-thread run is used; per-repetition
//! rows and other aggregates are ignored.

use serde::Deserialize;

use super::{positive, Mapping, Parsed, SourceError, SourceLabel};
use crate::report::names::{Benchmark::*, Variant::*};

const OPS_COUNTER: &str = "nb operations per second";

#[derive(Deserialize)]
struct Report {
    benchmarks: Vec<Entry>,
}

#[derive(Deserialize)]
struct Entry {
    name: String,
    #[serde(rename = "nb operations per second")]
    ops: Option<f64>,
}

pub fn parse(raw: &[u8], label: &SourceLabel) -> Result<Parsed, SourceError> {
    let report: Report = serde_json::from_slice(raw)?;
    let mut out = Parsed::default();

    for e in report.benchmarks.iter().filter(|e| e.name.contains("1_mean")) {
        if e.ops.is_none() {
            tracing::debug!(name = %e.name, counter = OPS_COUNTER, "aggregate without ops counter");
        }
        out.push(
            &e.name,
            map_name(&e.name, label),
            label.default_driver(),
            e.ops.and_then(positive),
        );
    }
    Ok(out)
}

fn map_name(name: &str, label: &SourceLabel) -> Mapping {
    let m = if name.contains("DO 1/") {
        (Do1, Text)
    } else if name.contains("insert batch using bulk/") {
        (InsertBatch, Bulk)
    } else if name.contains("insert batch client rewrite/") {
        (InsertBatch, Rewrite)
    } else if name.contains("insert batch looping execute/") {
        (InsertBatch, Binary)
    } else if name.contains("SELECT 1/") {
        (Select1, Text)
    } else if name.contains("SELECT 100 int cols/") {
        (Select100Cols, Text)
    } else if name.contains("SELECT 100 int cols - BINARY execute only/") {
        (Select100Cols, BinaryExecuteOnly)
    } else if name.contains("SELECT 100 int cols - BINARY pipeline prepare+execute+close/") {
        (Select100Cols, BinaryPipeline)
    } else if name.contains("SELECT 100 int cols - BINARY prepare+execute+close/") {
        (Select100Cols, Binary)
    } else if name.contains("SELECT 1000 rows (int + char(32))/") {
        (Select1000Rows, Text)
    } else if name.contains("SELECT 1000 rows (int + char(32)) - BINARY/") {
        (Select1000Rows, BinaryExecuteOnly)
    } else if name.contains("DO 1000 params - BINARY execute only/") {
        (Do1000Params, BinaryExecuteOnly)
    } else if name.contains("DO 1000 params/") {
        // the C client has no text-protocol parameter binding
        if label.language == "c" {
            return Mapping::Skip;
        }
        (Do1000Params, if label.connector == "mysql" { Binary } else { Text })
    } else {
        return Mapping::Unknown;
    };
    Mapping::Keep(m.0, m.1)
}

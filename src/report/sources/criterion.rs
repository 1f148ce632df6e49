//! cargo-criterion `--message-format=json` output: one JSON message per line,
//! of which only `benchmark-complete` messages carry results.

use serde::Deserialize;

use super::{ops_from_seconds, Mapping, Parsed, SourceError, SourceLabel};
use crate::report::names::{Benchmark::*, Variant::*};

#[derive(Deserialize)]
struct Message {
    reason: String,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    mean: Option<Estimate>,
}

#[derive(Deserialize)]
struct Estimate {
    estimate: f64,
    unit: String,
}

pub fn parse(raw: &[u8], label: &SourceLabel) -> Result<Parsed, SourceError> {
    let text = std::str::from_utf8(raw)?;
    let mut out = Parsed::default();

    for line in text.lines().filter(|l| !l.trim().is_empty()) {
        let msg: Message = serde_json::from_str(line)?;
        if msg.reason != "benchmark-complete" {
            continue;
        }
        let Some(id) = msg.id.as_deref() else {
            return Err(SourceError::Schema("benchmark-complete without id".to_string()));
        };
        let ops = msg
            .mean
            .as_ref()
            .and_then(|m| seconds(m.estimate, &m.unit))
            .and_then(ops_from_seconds);
        out.push(id, map_id(id), label.default_driver(), ops);
    }
    Ok(out)
}

fn seconds(value: f64, unit: &str) -> Option<f64> {
    let scale = match unit {
        "ns" => 1e-9,
        "us" | "µs" => 1e-6,
        "ms" => 1e-3,
        "s" => 1.0,
        _ => return None,
    };
    Some(value * scale)
}

fn map_id(id: &str) -> Mapping {
    let m = match id {
        "do 1" => (Do1, Text),
        // exec_drop always prepares
        "do 1000 param" => (Do1000Params, Binary),
        "select 1" => (Select1, Text),
        "select 1000 rows" => (Select1000Rows, Text),
        "select 100 int cols" => (Select100Cols, Text),
        _ => return Mapping::Unknown,
    };
    Mapping::Keep(m.0, m.1)
}

//! BenchmarkDotNet brief JSON exporter. `Statistics.Mean` is in nanoseconds.

use serde::Deserialize;

use super::{ops_from_nanos, Mapping, Parsed, SourceError, SourceLabel};
use crate::report::names::{Benchmark::*, Variant::*};

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Report {
    benchmarks: Vec<Entry>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Entry {
    method: String,
    #[serde(default)]
    parameters: String,
    // null when the benchmark failed
    statistics: Option<Statistics>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Statistics {
    mean: f64,
}

pub fn parse(raw: &[u8], label: &SourceLabel) -> Result<Parsed, SourceError> {
    let report: Report = serde_json::from_slice(raw)?;
    let mut out = Parsed::default();

    for e in &report.benchmarks {
        let library = parameter(&e.parameters, "Library").unwrap_or(&label.connector);
        out.push(
            &e.method,
            map_method(&e.method, library),
            label.driver(library),
            e.statistics.as_ref().and_then(|s| ops_from_nanos(s.mean)),
        );
    }
    Ok(out)
}

/// Looks up `key` in BenchmarkDotNet's `A=1&B=x` parameter string.
fn parameter<'a>(params: &'a str, key: &str) -> Option<&'a str> {
    params
        .split('&')
        .filter_map(|kv| kv.split_once('='))
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v)
}

fn map_method(method: &str, library: &str) -> Mapping {
    let m = match method {
        "ExecuteDo1" => (Do1, Text),
        "Select1" => (Select1, Text),
        "Select100ColText" => (Select100Cols, Text),
        "Select100ColBinary" => (Select100Cols, Binary),
        "Select1000rowsText" => (Select1000Rows, Text),
        "Select1000rowsBinary" => (Select1000Rows, Binary),
        // parameter objects are library specific; the other library's run is meaningless
        "ExecuteDo1000ParamMySql" | "ExecuteDo1000PrepareParamMySql" if library != "MySql.Data" => {
            return Mapping::Skip
        }
        "ExecuteDo1000ParamComm" | "ExecuteDo1000PrepareParamCommPrepare"
            if library != "MySqlConnector" =>
        {
            return Mapping::Skip
        }
        "ExecuteDo1000ParamMySql" | "ExecuteDo1000ParamComm" => (Do1000Params, Text),
        "ExecuteDo1000PrepareParamMySql" | "ExecuteDo1000PrepareParamCommPrepare" => {
            (Do1000Params, Binary)
        }
        _ => return Mapping::Unknown,
    };
    Mapping::Keep(m.0, m.1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::names::{Benchmark, Variant};

    #[test]
    fn test_parses_brief_export() {
        let raw = br#"{
            "Title": "MySqlClient-20250101",
            "Benchmarks": [
                {"Method": "Select1", "Parameters": "Library=MySqlConnector",
                 "Statistics": {"Mean": 40000.0, "Median": 39000.0}},
                {"Method": "Select1", "Parameters": "Library=MySql.Data",
                 "Statistics": {"Mean": 80000.0}},
                {"Method": "ExecuteDo1000ParamComm", "Parameters": "Library=MySql.Data",
                 "Statistics": {"Mean": 1.0}},
                {"Method": "ExecuteDo1000PrepareParamCommPrepare", "Parameters": "Library=MySqlConnector",
                 "Statistics": {"Mean": 250000.0}},
                {"Method": "Select1000rowsText", "Parameters": "Library=MySqlConnector",
                 "Statistics": null}
            ]
        }"#;
        let parsed = parse(raw, &SourceLabel::new("dotnet", "")).unwrap();
        assert_eq!(parsed.samples.len(), 3);
        assert_eq!(parsed.samples[0].driver, "dotnet MySqlConnector");
        assert!((parsed.samples[0].ops_per_sec - 25_000.0).abs() < 1e-6);
        assert_eq!(parsed.samples[1].driver, "dotnet MySql.Data");
        assert_eq!(parsed.samples[2].benchmark, Benchmark::Do1000Params);
        assert_eq!(parsed.samples[2].variant, Variant::Binary);
        assert_eq!(parsed.unrecognized, ["Select1000rowsText (no usable measurement)"]);
    }

    #[test]
    fn test_parameter_lookup() {
        assert_eq!(parameter("Library=MySqlConnector&Rows=10", "Rows"), Some("10"));
        assert_eq!(parameter("", "Library"), None);
    }
}

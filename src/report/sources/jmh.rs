//! Java JMH results (`-rf json`).

use std::collections::BTreeMap;

use serde::Deserialize;

use super::{ops_from_seconds, positive, Mapping, Parsed, SourceError, SourceLabel};
use crate::report::names::{Benchmark::*, Variant::*};

#[derive(Deserialize)]
struct Record {
    benchmark: String,
    #[serde(default)]
    params: BTreeMap<String, String>,
    #[serde(rename = "primaryMetric")]
    primary_metric: PrimaryMetric,
}

#[derive(Deserialize)]
struct PrimaryMetric {
    score: f64,
    #[serde(rename = "scoreUnit", default = "default_unit")]
    score_unit: String,
}

fn default_unit() -> String {
    "ops/s".to_string()
}

pub fn parse(raw: &[u8], label: &SourceLabel) -> Result<Parsed, SourceError> {
    let records: Vec<Record> = serde_json::from_slice(raw)?;
    let mut out = Parsed::default();

    for r in &records {
        let connector = r
            .params
            .get("driver")
            .map(String::as_str)
            .unwrap_or(&label.connector);
        out.push(
            &r.benchmark,
            map_name(&r.benchmark, connector),
            label.driver(connector),
            rate(r.primary_metric.score, &r.primary_metric.score_unit),
        );
    }
    Ok(out)
}

/// Throughput mode reports ops per time unit, average-time mode reports time per op.
fn rate(score: f64, unit: &str) -> Option<f64> {
    match unit {
        "ops/s" => positive(score),
        "ops/ms" => positive(score * 1e3),
        "ops/us" => positive(score * 1e6),
        "ops/ns" => positive(score * 1e9),
        "s/op" => ops_from_seconds(score),
        "ms/op" => ops_from_seconds(score / 1e3),
        "us/op" => ops_from_seconds(score / 1e6),
        "ns/op" => ops_from_seconds(score / 1e9),
        _ => None,
    }
}

fn map_name(name: &str, driver: &str) -> Mapping {
    let mariadb = driver == "mariadb";
    let m = if name.contains(".Do_1.") {
        (Do1, Text)
    } else if name.contains(".Do_1000_params.") {
        (Do1000Params, Text)
    } else if name.contains(".Insert_batch.binary") {
        (InsertBatch, if mariadb { Bulk } else { BinaryExecuteOnly })
    } else if name.contains(".Insert_batch.rewrite") {
        (InsertBatch, if mariadb { Text } else { Rewrite })
    } else if name.contains(".Select_1_pool.") {
        (Select1Pool, Text)
    } else if name.contains(".Select_1.") {
        (Select1, Text)
    } else if name.contains(".Select_100_cols.text") {
        (Select100Cols, Text)
    } else if name.ends_with(".Select_100_cols.binary") {
        (Select100Cols, BinaryExecuteOnly)
    } else if name.contains(".Select_100_cols.binaryNoCache") {
        // MySQL Connector/J has no pipelining, its number would be mislabeled
        if driver == "mysql" {
            return Mapping::Skip;
        }
        (Select100Cols, BinaryPipeline)
    } else if name.contains(".Select_100_cols.binaryNoPipeline") {
        (Select100Cols, Binary)
    } else if name.contains(".Select_1000_Rows.text") {
        (Select1000Rows, Text)
    } else if name.contains(".Select_1000_Rows.binary") {
        (Select1000Rows, BinaryExecuteOnly)
    } else {
        return Mapping::Unknown;
    };
    Mapping::Keep(m.0, m.1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::names::{Benchmark, Variant};

    fn label() -> SourceLabel {
        SourceLabel::new("java", "mariadb")
    }

    #[test]
    fn test_parses_throughput_records() {
        let raw = br#"[
            {"benchmark": "org.java.connector.Do_1.run", "params": {"driver": "mariadb"},
             "primaryMetric": {"score": 41234.5, "scoreUnit": "ops/s"}},
            {"benchmark": "org.java.connector.Insert_batch.binary", "params": {"driver": "mysql"},
             "primaryMetric": {"score": 812.0, "scoreUnit": "ops/s"}},
            {"benchmark": "org.java.connector.Insert_batch.binary", "params": {"driver": "mariadb"},
             "primaryMetric": {"score": 2100.0, "scoreUnit": "ops/s"}}
        ]"#;
        let parsed = parse(raw, &label()).unwrap();
        assert!(parsed.unrecognized.is_empty());
        assert_eq!(parsed.samples.len(), 3);
        assert_eq!(parsed.samples[0].driver, "java mariadb");
        assert_eq!(parsed.samples[0].benchmark, Benchmark::Do1);
        assert_eq!(parsed.samples[1].variant, Variant::BinaryExecuteOnly);
        assert_eq!(parsed.samples[2].variant, Variant::Bulk);
    }

    #[test]
    fn test_average_time_mode_is_inverted() {
        let raw = br#"[{"benchmark": "org.java.connector.Select_1.run", "params": {"driver": "mysql"},
                        "primaryMetric": {"score": 20.0, "scoreUnit": "us/op"}}]"#;
        let parsed = parse(raw, &label()).unwrap();
        assert!((parsed.samples[0].ops_per_sec - 50_000.0).abs() < 1e-6);
    }

    #[test]
    fn test_select_100_binary_variants_disambiguated() {
        assert_eq!(
            map_name("x.Select_100_cols.binary", "mariadb"),
            Mapping::Keep(Select100Cols, BinaryExecuteOnly)
        );
        assert_eq!(
            map_name("x.Select_100_cols.binaryNoCache", "mariadb"),
            Mapping::Keep(Select100Cols, BinaryPipeline)
        );
        assert_eq!(map_name("x.Select_100_cols.binaryNoCache", "mysql"), Mapping::Skip);
        assert_eq!(
            map_name("x.Select_100_cols.binaryNoPipeline", "mysql"),
            Mapping::Keep(Select100Cols, Binary)
        );
        assert_eq!(
            map_name("x.Select_1_pool.run", "mysql"),
            Mapping::Keep(Select1Pool, Text)
        );
    }

    #[test]
    fn test_unknown_benchmark_reported() {
        let raw = br#"[{"benchmark": "org.java.connector.Fancy.run", "params": {"driver": "mysql"},
                        "primaryMetric": {"score": 1.0, "scoreUnit": "ops/s"}}]"#;
        let parsed = parse(raw, &label()).unwrap();
        assert!(parsed.samples.is_empty());
        assert_eq!(parsed.unrecognized, ["org.java.connector.Fancy.run"]);
    }
}

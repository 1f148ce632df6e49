//! Node benchmark.js results: `{ "<title>": [{ "name": driver, "iteration": ops/s }] }`.

use std::collections::BTreeMap;

use serde::Deserialize;

use super::{positive, Mapping, Parsed, SourceError, SourceLabel};
use crate::report::names::{Benchmark::*, Variant::*};

#[derive(Deserialize)]
struct Cycle {
    name: String,
    iteration: f64,
}

pub fn parse(raw: &[u8], label: &SourceLabel) -> Result<Parsed, SourceError> {
    let data: BTreeMap<String, Vec<Cycle>> = serde_json::from_slice(raw)?;
    let mut out = Parsed::default();

    for (title, cycles) in &data {
        for c in cycles {
            out.push(
                title,
                map_title(title, &c.name),
                label.driver(&c.name),
                positive(c.iteration),
            );
        }
    }
    Ok(out)
}

fn map_title(title: &str, connector: &str) -> Mapping {
    let m = match title {
        "do 1" => (Do1, Text),
        "do 1000 parameter" => (Do1000Params, Text),
        "select 1" => (Select1, Text),
        "select 100 int/varchar(32)" => (Select100Cols, Text),
        "select 100 int/varchar(32) - BINARY" => (Select100Cols, BinaryExecuteOnly),
        "select 1000 rows" => (Select1000Rows, Text),
        "select 1000 rows - BINARY" => (Select1000Rows, BinaryExecuteOnly),
        t if t.starts_with("100 * insert 100 characters using batch method") => (
            InsertBatch,
            if connector == "mariadb" { Bulk } else { Text },
        ),
        t if t.starts_with("SELECT 1 - pool") => (Select1Pool, Text),
        _ => return Mapping::Unknown,
    };
    Mapping::Keep(m.0, m.1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::names::{Benchmark, Variant};

    #[test]
    fn test_parses_titles_and_drivers() {
        let raw = br#"{
            "select 1": [
                {"name": "mysql2", "iteration": 18000.2, "variation": 1.2},
                {"name": "mariadb", "iteration": 24000.9, "variation": 0.8}
            ],
            "100 * insert 100 characters using batch method (for mariadb) or loop for other driver": [
                {"name": "mariadb", "iteration": 900.0},
                {"name": "mysql2", "iteration": 150.0}
            ],
            "select 1000 rows - rowsAsArray": [
                {"name": "mariadb", "iteration": 3000.0}
            ]
        }"#;
        let parsed = parse(raw, &SourceLabel::new("node", "")).unwrap();
        assert_eq!(parsed.samples.len(), 4);

        let bulk = parsed
            .samples
            .iter()
            .find(|s| s.benchmark == Benchmark::InsertBatch && s.driver == "node mariadb")
            .unwrap();
        assert_eq!(bulk.variant, Variant::Bulk);
        let looped = parsed
            .samples
            .iter()
            .find(|s| s.benchmark == Benchmark::InsertBatch && s.driver == "node mysql2")
            .unwrap();
        assert_eq!(looped.variant, Variant::Text);

        assert_eq!(parsed.unrecognized, ["select 1000 rows - rowsAsArray"]);
    }

    #[test]
    fn test_pool_title_maps() {
        assert_eq!(
            map_title("SELECT 1 - pool (16 connections, 100 concurrent)", "mariadb"),
            Mapping::Keep(Select1Pool, Text)
        );
    }
}

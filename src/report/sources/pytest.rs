//! pytest-benchmark compatible files, as written by the Python suite and by
//! `connector-bench run`. Test ids look like `test_do_1[mariadb]`; the rate
//! is the inverse of `stats.mean` (seconds).

use serde::Deserialize;

use super::{ops_from_seconds, Mapping, Parsed, SourceError, SourceLabel};
use crate::report::names::{Benchmark::*, Variant::*};

#[derive(Deserialize)]
struct File {
    benchmarks: Vec<Entry>,
}

// Only the fields the comparison needs; pytest-benchmark writes many more.
#[derive(Deserialize)]
struct Entry {
    name: String,
    stats: Stats,
}

#[derive(Deserialize)]
struct Stats {
    mean: f64,
}

pub fn parse(raw: &[u8], label: &SourceLabel) -> Result<Parsed, SourceError> {
    let file: File = serde_json::from_slice(raw)?;
    let mut out = Parsed::default();

    for e in &file.benchmarks {
        let (test, connector) = split_test_id(&e.name);
        let connector = connector.unwrap_or(&label.connector);
        out.push(
            &e.name,
            map_test(test, connector),
            label.driver(connector),
            ops_from_seconds(e.stats.mean),
        );
    }
    Ok(out)
}

/// `test_select_1[pymysql]` -> (`test_select_1`, Some(`pymysql`)).
pub fn split_test_id(name: &str) -> (&str, Option<&str>) {
    match name.split_once('[') {
        Some((test, rest)) => (test, Some(rest.trim_end_matches(']'))),
        None => (name, None),
    }
}

fn map_test(test: &str, connector: &str) -> Mapping {
    let test = test.strip_suffix("_async").unwrap_or(test);
    let m = match test {
        "test_do_1" => (Do1, Text),
        "test_do_1000_params" | "test_do_1000_params_text" => (Do1000Params, Text),
        "test_do_1000_params_binary" => (Do1000Params, BinaryExecuteOnly),
        "test_select_1" => (Select1, Text),
        "test_select_1_pool" => (Select1Pool, Text),
        "test_select_100_cols" | "test_select_100_cols_text" => (Select100Cols, Text),
        "test_select_100_cols_binary" => (Select100Cols, BinaryExecuteOnly),
        "test_select_1000_rows" | "test_select_1000_rows_text" => (Select1000Rows, Text),
        "test_select_1000_rows_binary" => (Select1000Rows, BinaryExecuteOnly),
        // executemany: MariaDB connectors send a bulk command, the others rewrite
        "test_insert_batch" => (
            InsertBatch,
            if connector.contains("mariadb") { Bulk } else { Rewrite },
        ),
        "test_insert_batch_loop" => (InsertBatch, Binary),
        "test_insert_batch_rewrite" => (InsertBatch, Rewrite),
        _ => return Mapping::Unknown,
    };
    Mapping::Keep(m.0, m.1)
}

//! Session-scoped collection of finished benchmark results.
//!
//! A [`ResultCollector`] is created when a session starts, handed to every
//! scenario by `&mut`, and turned into a [`ResultFile`] when the session ends.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::debug;

use crate::harness::BenchmarkResult;
use crate::schema::{
    commit_info_from_env, BenchmarkEntry, EntryStats, MachineInfo, ResultFile,
    RESULT_FILE_VERSION,
};

#[derive(Debug, Default)]
pub struct ResultCollector {
    // keyed by fullname; re-running a test replaces its previous entry
    entries: BTreeMap<String, BenchmarkEntry>,
    order: Vec<String>,
}

impl ResultCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(
        &mut self,
        name: &str,
        fullname: &str,
        params: BTreeMap<String, Value>,
        result: &BenchmarkResult,
    ) {
        debug!(fullname, mean = result.mean, "captured benchmark result");
        let entry = BenchmarkEntry {
            name: name.to_string(),
            fullname: fullname.to_string(),
            params,
            stats: EntryStats::from(result),
        };
        if self.entries.insert(fullname.to_string(), entry).is_none() {
            self.order.push(fullname.to_string());
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_result_file(mut self, machine_info: MachineInfo) -> ResultFile {
        let benchmarks = self
            .order
            .iter()
            .filter_map(|k| self.entries.remove(k))
            .collect();

        ResultFile {
            machine_info,
            commit_info: commit_info_from_env(),
            benchmarks,
            datetime: chrono::Local::now().format("%Y-%m-%dT%H:%M:%S").to_string(),
            version: RESULT_FILE_VERSION.to_string(),
        }
    }
}

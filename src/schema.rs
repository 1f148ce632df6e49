//! Persisted result file, compatible with pytest-benchmark's JSON layout.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;
use crate::harness::BenchmarkResult;

pub const RESULT_FILE_VERSION: &str = "1.0.0";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MachineInfo {
    #[serde(default)]
    pub node: String,
    #[serde(default)]
    pub processor: String,
    #[serde(default)]
    pub machine: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub implementation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub implementation_version: Option<String>,
    /// Keys written by other producers (`python_version`, ...).
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl MachineInfo {
    pub fn current() -> Self {
        let node = std::env::var("HOSTNAME")
            .or_else(|_| std::env::var("COMPUTERNAME"))
            .ok()
            .or_else(|| {
                fs::read_to_string("/etc/hostname")
                    .ok()
                    .map(|s| s.trim().to_string())
            })
            .unwrap_or_default();

        let mut extra = BTreeMap::new();
        extra.insert(
            "system".to_string(),
            Value::String(std::env::consts::OS.to_string()),
        );

        Self {
            node,
            processor: std::env::consts::ARCH.to_string(),
            machine: std::env::consts::ARCH.to_string(),
            implementation: Some(env!("CARGO_PKG_NAME").to_string()),
            implementation_version: Some(env!("CARGO_PKG_VERSION").to_string()),
            extra,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    pub stddev: f64,
    pub rounds: u64,
    pub iterations: u64,
}

impl From<&BenchmarkResult> for EntryStats {
    fn from(r: &BenchmarkResult) -> Self {
        Self {
            min: r.min,
            max: r.max,
            mean: r.mean,
            median: r.median,
            stddev: r.stddev,
            rounds: r.rounds,
            iterations: r.iterations,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkEntry {
    pub name: String,
    pub fullname: String,
    #[serde(default)]
    pub params: BTreeMap<String, Value>,
    pub stats: EntryStats,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultFile {
    pub machine_info: MachineInfo,
    #[serde(default)]
    pub commit_info: Map<String, Value>,
    pub benchmarks: Vec<BenchmarkEntry>,
    pub datetime: String,
    pub version: String,
}

impl ResultFile {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Writes the file unless it holds no benchmarks. Returns whether anything was written.
    pub fn write_json(&self, path: &Path) -> Result<bool> {
        if self.benchmarks.is_empty() {
            return Ok(false);
        }
        fs::write(path, self.to_json()?)?;
        Ok(true)
    }
}

pub fn commit_info_from_env() -> Map<String, Value> {
    // Best-effort: CI exports the revision under one of these.
    let mut info = Map::new();
    if let Some(sha) = std::env::var("GIT_SHA")
        .ok()
        .or_else(|| std::env::var("GITHUB_SHA").ok())
    {
        info.insert("id".to_string(), Value::String(sha.chars().take(12).collect()));
    }
    info
}

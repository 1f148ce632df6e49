//! The sqlx (MySQL protocol) benchmark suite.
//!
//! Scenarios run in a fixed order on one session connection; results land in
//! a [`ResultCollector`] under pytest-benchmark style names such as
//! `test_select_1[sqlx]` so the reporter reads them like any other suite.

use std::collections::BTreeMap;

use serde_json::Value;
use sqlx::mysql::MySqlConnectOptions;
use sqlx::{Connection, MySqlConnection};
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::capture::ResultCollector;
use crate::error::{Error, Result};
use crate::harness::{print_result, AsyncRunner, BenchConfig, BenchmarkResult, RunnerConfig};

pub mod fixtures;
mod workloads;

pub const DRIVER: &str = "sqlx";

/// Connection parameters of the server under test.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3306,
            user: "root".to_string(),
            password: String::new(),
            database: "bench".to_string(),
        }
    }
}

impl DbConfig {
    /// Connection URL with the password left out, for logs.
    pub fn url(&self) -> String {
        format!(
            "mysql://{}@{}:{}/{}",
            self.user, self.host, self.port, self.database
        )
    }

    pub fn connect_options(&self) -> MySqlConnectOptions {
        let options = MySqlConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .database(&self.database);
        if self.password.is_empty() {
            options
        } else {
            options.password(&self.password)
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scenario {
    Do1,
    Select1,
    Select1Pool,
    Select1000RowsText,
    Select1000RowsBinary,
    Select100ColsText,
    Select100ColsBinary,
    Do1000ParamsBinary,
    InsertBatchLoop,
    InsertBatchRewrite,
}

impl Scenario {
    pub const ALL: [Scenario; 10] = [
        Scenario::Do1,
        Scenario::Select1,
        Scenario::Select1Pool,
        Scenario::Select1000RowsText,
        Scenario::Select1000RowsBinary,
        Scenario::Select100ColsText,
        Scenario::Select100ColsBinary,
        Scenario::Do1000ParamsBinary,
        Scenario::InsertBatchLoop,
        Scenario::InsertBatchRewrite,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Scenario::Do1 => "test_do_1",
            Scenario::Select1 => "test_select_1",
            Scenario::Select1Pool => "test_select_1_pool",
            Scenario::Select1000RowsText => "test_select_1000_rows_text",
            Scenario::Select1000RowsBinary => "test_select_1000_rows_binary",
            Scenario::Select100ColsText => "test_select_100_cols_text",
            Scenario::Select100ColsBinary => "test_select_100_cols_binary",
            Scenario::Do1000ParamsBinary => "test_do_1000_params_binary",
            Scenario::InsertBatchLoop => "test_insert_batch_loop",
            Scenario::InsertBatchRewrite => "test_insert_batch_rewrite",
        }
    }

    /// Rounds and warmup as the suite declares them for a full run.
    pub fn declared(&self) -> RunnerConfig {
        match self {
            Scenario::Do1 | Scenario::Select1 => RunnerConfig::new(10_000, 1_000),
            Scenario::Select1Pool => RunnerConfig::new(100, 10),
            Scenario::InsertBatchLoop | Scenario::InsertBatchRewrite => RunnerConfig::new(200, 50),
            _ => RunnerConfig::new(1_000, 100),
        }
    }

    pub fn result_name(&self) -> String {
        format!("{}[{DRIVER}]", self.name())
    }

    pub fn fullname(&self) -> String {
        format!("scenarios::{}", self.result_name())
    }

    pub fn params() -> BTreeMap<String, Value> {
        BTreeMap::from([("driver".to_string(), Value::from(DRIVER))])
    }

    async fn measure(
        &self,
        runner: &AsyncRunner,
        conn: &Mutex<MySqlConnection>,
        db: &DbConfig,
        cfg: &BenchConfig,
    ) -> Result<BenchmarkResult> {
        match self {
            Scenario::Do1 => workloads::do_1(runner, conn).await,
            Scenario::Select1 => workloads::select_1(runner, conn).await,
            Scenario::Select1Pool => workloads::select_1_pool(runner, &db.connect_options()).await,
            Scenario::Select1000RowsText => workloads::select_1000_rows_text(runner, conn).await,
            Scenario::Select1000RowsBinary => workloads::select_1000_rows_binary(runner, conn).await,
            Scenario::Select100ColsText => workloads::select_100_cols_text(runner, conn).await,
            Scenario::Select100ColsBinary => workloads::select_100_cols_binary(runner, conn).await,
            Scenario::Do1000ParamsBinary => workloads::do_1000_params_binary(runner, conn).await,
            Scenario::InsertBatchLoop => {
                workloads::insert_batch_loop(runner, conn, &mut cfg.rng()).await
            }
            Scenario::InsertBatchRewrite => {
                workloads::insert_batch_rewrite(runner, conn, &mut cfg.rng()).await
            }
        }
    }
}

/// Scenarios whose name contains any of `filters`; all of them when empty.
pub fn select(filters: &[String]) -> Vec<Scenario> {
    Scenario::ALL
        .into_iter()
        .filter(|s| filters.is_empty() || filters.iter().any(|f| s.name().contains(f.as_str())))
        .collect()
}

/// Runs `scenarios` in order against the configured server.
///
/// A failing scenario is logged and the suite moves on; its name is reported
/// in [`Error::ScenariosFailed`] once the remaining scenarios have run.
/// Fixtures are dropped even when scenarios fail.
pub async fn run_suite(
    cfg: &BenchConfig,
    db: &DbConfig,
    scenarios: &[Scenario],
    collector: &mut ResultCollector,
) -> Result<()> {
    info!(url = %db.url(), profile = cfg.profile.as_str(), "connecting");
    let mut conn = MySqlConnection::connect_with(&db.connect_options()).await?;
    fixtures::setup(&mut conn).await?;
    let conn = Mutex::new(conn);

    let mut failed = Vec::new();
    for scenario in scenarios {
        let runner = AsyncRunner::new(cfg.scale(scenario.declared()));
        info!(
            scenario = scenario.name(),
            rounds = runner.config().rounds,
            warmup = runner.config().warmup_rounds,
            "running"
        );
        match scenario.measure(&runner, &conn, db, cfg).await {
            Ok(result) => {
                info!(
                    scenario = scenario.name(),
                    ops_per_sec = result.ops_per_sec(),
                    "finished"
                );
                print_result(&scenario.result_name(), &result);
                collector.record(
                    &scenario.result_name(),
                    &scenario.fullname(),
                    Scenario::params(),
                    &result,
                );
            }
            Err(e) => {
                error!(scenario = scenario.name(), error = %e, "scenario failed");
                failed.push(scenario.name().to_string());
            }
        }
    }

    let mut conn = conn.into_inner();
    if let Err(e) = fixtures::teardown(&mut conn).await {
        warn!(error = %e, "fixture teardown failed");
    }
    conn.close().await?;

    if failed.is_empty() {
        Ok(())
    } else {
        Err(Error::ScenariosFailed(failed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harness::Profile;

    #[test]
    fn test_names_map_back_through_reporter() {
        use crate::report::sources::pytest::split_test_id;

        for s in Scenario::ALL {
            let name = s.result_name();
            let (test, connector) = split_test_id(&name);
            assert_eq!(test, s.name());
            assert_eq!(connector, Some(DRIVER));
        }
        assert_eq!(Scenario::Select1.fullname(), "scenarios::test_select_1[sqlx]");
    }

    #[test]
    fn test_declared_protocols() {
        assert_eq!(Scenario::Do1.declared(), RunnerConfig::new(10_000, 1_000));
        assert_eq!(Scenario::Select1Pool.declared(), RunnerConfig::new(100, 10));
        assert_eq!(Scenario::Select100ColsBinary.declared(), RunnerConfig::new(1_000, 100));

        let quick = BenchConfig {
            profile: Profile::Quick,
            seed: 0,
        };
        let scaled = quick.scale(Scenario::Select1Pool.declared());
        assert_eq!((scaled.rounds, scaled.warmup_rounds), (10, 1));
    }

    #[test]
    fn test_select_by_substring() {
        assert_eq!(select(&[]).len(), Scenario::ALL.len());
        assert_eq!(
            select(&["select_1000".to_string()]),
            [Scenario::Select1000RowsText, Scenario::Select1000RowsBinary]
        );
        assert_eq!(
            select(&["test_do_1".to_string(), "pool".to_string()]),
            [Scenario::Do1, Scenario::Select1Pool, Scenario::Do1000ParamsBinary]
        );
        assert!(select(&["nothing".to_string()]).is_empty());
    }

    #[test]
    fn test_url_omits_password() {
        let db = DbConfig {
            password: "secret".to_string(),
            ..DbConfig::default()
        };
        assert_eq!(db.url(), "mysql://root@127.0.0.1:3306/bench");
    }

    #[test]
    fn test_params_name_driver() {
        assert_eq!(Scenario::params()["driver"], "sqlx");
    }
}

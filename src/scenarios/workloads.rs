//! The measured bodies. Each borrows the session connection through a
//! mutex so the workload closure can hand it to a fresh future per call.

use rand_chacha::ChaCha8Rng;
use sqlx::mysql::{MySqlConnectOptions, MySqlPoolOptions};
use sqlx::{Executor, MySql, MySqlConnection, Row};
use tokio::sync::Mutex;
use tokio::task::JoinSet;

use super::fixtures::{self, BATCH_ROWS, PAYLOAD_CHARS, SELECT_1000_ROWS, WIDE_COLUMNS, WIDE_TABLE};
use crate::error::{Error, Result};
use crate::harness::{AsyncRunner, BenchmarkResult, Workload};

pub const POOL_SIZE: u32 = 64;
pub const POOL_TASKS: usize = 500;
pub const DO_PARAMS: usize = 1000;

type Conn = Mutex<MySqlConnection>;

pub async fn do_1(runner: &AsyncRunner, conn: &Conn) -> Result<BenchmarkResult> {
    runner
        .run(Workload::from_async(move || async move {
            let mut conn = conn.lock().await;
            fixtures::exec(&mut conn, "DO 1").await?;
            Ok::<_, Error>(())
        }))
        .await
}

pub async fn select_1(runner: &AsyncRunner, conn: &Conn) -> Result<BenchmarkResult> {
    runner
        .run(Workload::from_async(move || async move {
            let mut conn = conn.lock().await;
            (&mut *conn).fetch_one("SELECT 1").await?;
            Ok::<_, Error>(())
        }))
        .await
}

/// `POOL_TASKS` concurrent `SELECT 1` over `POOL_SIZE` connections, timed as one call.
pub async fn select_1_pool(runner: &AsyncRunner, options: &MySqlConnectOptions) -> Result<BenchmarkResult> {
    let pool = MySqlPoolOptions::new()
        .max_connections(POOL_SIZE)
        .min_connections(POOL_SIZE)
        .connect_with(options.clone())
        .await?;

    let shared = &pool;
    let result = runner
        .run(Workload::from_async(move || async move {
            let mut tasks = JoinSet::new();
            for _ in 0..POOL_TASKS {
                let pool = shared.clone();
                tasks.spawn(async move { pool.fetch_one("SELECT 1").await });
            }
            while let Some(joined) = tasks.join_next().await {
                joined??;
            }
            Ok::<_, Error>(())
        }))
        .await;

    pool.close().await;
    result
}

pub async fn select_1000_rows_text(runner: &AsyncRunner, conn: &Conn) -> Result<BenchmarkResult> {
    runner
        .run(Workload::from_async(move || async move {
            let mut conn = conn.lock().await;
            let rows = (&mut *conn).fetch_all(SELECT_1000_ROWS).await?;
            decode_seq_rows(&rows)
        }))
        .await
}

pub async fn select_1000_rows_binary(runner: &AsyncRunner, conn: &Conn) -> Result<BenchmarkResult> {
    runner
        .run(Workload::from_async(move || async move {
            let mut conn = conn.lock().await;
            let rows = sqlx::query(SELECT_1000_ROWS).fetch_all(&mut *conn).await?;
            decode_seq_rows(&rows)
        }))
        .await
}

fn decode_seq_rows(rows: &[sqlx::mysql::MySqlRow]) -> Result<()> {
    for row in rows {
        row.try_get::<u64, _>(0)?;
        row.try_get::<String, _>(1)?;
    }
    Ok(())
}

pub async fn select_100_cols_text(runner: &AsyncRunner, conn: &Conn) -> Result<BenchmarkResult> {
    let sql = format!("SELECT * FROM {WIDE_TABLE}");
    let sql = sql.as_str();
    runner
        .run(Workload::from_async(move || async move {
            let mut conn = conn.lock().await;
            let row = (&mut *conn).fetch_one(sql).await?;
            decode_wide_row(&row)
        }))
        .await
}

pub async fn select_100_cols_binary(runner: &AsyncRunner, conn: &Conn) -> Result<BenchmarkResult> {
    let sql = format!("SELECT * FROM {WIDE_TABLE} WHERE 1 = ?");
    let sql = sql.as_str();
    runner
        .run(Workload::from_async(move || async move {
            let mut conn = conn.lock().await;
            let row = sqlx::query(sql).bind(1i32).fetch_one(&mut *conn).await?;
            decode_wide_row(&row)
        }))
        .await
}

fn decode_wide_row(row: &sqlx::mysql::MySqlRow) -> Result<()> {
    for i in 0..WIDE_COLUMNS {
        row.try_get::<i32, _>(i)?;
    }
    Ok(())
}

pub async fn do_1000_params_binary(runner: &AsyncRunner, conn: &Conn) -> Result<BenchmarkResult> {
    let sql = fixtures::do_params_sql(DO_PARAMS);
    let sql = sql.as_str();
    runner
        .run(Workload::from_async(move || async move {
            let mut query = sqlx::query::<MySql>(sql);
            for v in 1..=DO_PARAMS as i32 {
                query = query.bind(v);
            }
            let mut conn = conn.lock().await;
            query.execute(&mut *conn).await?;
            Ok::<_, Error>(())
        }))
        .await
}

/// One prepared single-row insert per row.
pub async fn insert_batch_loop(
    runner: &AsyncRunner,
    conn: &Conn,
    rng: &mut ChaCha8Rng,
) -> Result<BenchmarkResult> {
    let payload = fixtures::random_payload(rng, PAYLOAD_CHARS);
    let payload = payload.as_str();
    let sql = fixtures::insert_one_sql();
    let sql = sql.as_str();
    runner
        .run(Workload::from_async(move || async move {
            let mut conn = conn.lock().await;
            for _ in 0..BATCH_ROWS {
                sqlx::query(sql).bind(payload).execute(&mut *conn).await?;
            }
            Ok::<_, Error>(())
        }))
        .await
}

/// All rows in one multi-value insert.
pub async fn insert_batch_rewrite(
    runner: &AsyncRunner,
    conn: &Conn,
    rng: &mut ChaCha8Rng,
) -> Result<BenchmarkResult> {
    let payload = fixtures::random_payload(rng, PAYLOAD_CHARS);
    let payload = payload.as_str();
    let sql = fixtures::insert_rewrite_sql(BATCH_ROWS);
    let sql = sql.as_str();
    runner
        .run(Workload::from_async(move || async move {
            let mut query = sqlx::query::<MySql>(sql);
            for _ in 0..BATCH_ROWS {
                query = query.bind(payload);
            }
            let mut conn = conn.lock().await;
            query.execute(&mut *conn).await?;
            Ok::<_, Error>(())
        }))
        .await
}

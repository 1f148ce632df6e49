//! Tables the scenarios read from and insert into, plus their payloads.

use rand::Rng;
use sqlx::{Executor, MySqlConnection};
use tracing::{debug, info};

use crate::error::Result;

pub const WIDE_TABLE: &str = "test100";
pub const WIDE_COLUMNS: usize = 100;
pub const BATCH_TABLE: &str = "perfTestTextBatch";
pub const BATCH_ROWS: usize = 100;
pub const PAYLOAD_CHARS: usize = 100;

pub const SELECT_1000_ROWS: &str =
    "SELECT seq, 'abcdefghijabcdefghijabcdefghijaa' FROM seq_1_to_1000";

// Mixes 1-byte, escape-looking and 4-byte characters.
const ALPHABET: [&str; 30] = [
    "1", "2", "3", "4", "5", "6", "7", "8", "9", "a", "b", "c", "d", "e", "f", "g", "h", "i",
    "j", "k", "l", "m", "n", "o", "p", "\\Z", "😎", "🌶", "🎤", "🥂",
];

pub fn create_wide_table_sql() -> String {
    let cols: Vec<String> = (1..=WIDE_COLUMNS).map(|i| format!("i{i} int")).collect();
    format!("CREATE TABLE {WIDE_TABLE} ({})", cols.join(","))
}

pub fn insert_wide_row_sql() -> String {
    let vals: Vec<String> = (1..=WIDE_COLUMNS).map(|i| i.to_string()).collect();
    format!("INSERT INTO {WIDE_TABLE} VALUES ({})", vals.join(","))
}

pub fn create_batch_table_sql() -> String {
    format!(
        "CREATE TABLE {BATCH_TABLE} (id MEDIUMINT NOT NULL AUTO_INCREMENT, t0 text, PRIMARY KEY (id)) \
         COLLATE='utf8mb4_unicode_ci'"
    )
}

/// `DO ?,?,...` with `n` placeholders.
pub fn do_params_sql(n: usize) -> String {
    format!("DO {}", vec!["?"; n].join(","))
}

pub fn insert_one_sql() -> String {
    format!("INSERT INTO {BATCH_TABLE}(t0) VALUES (?)")
}

/// Multi-row insert the client builds itself instead of looping.
pub fn insert_rewrite_sql(rows: usize) -> String {
    format!(
        "INSERT INTO {BATCH_TABLE}(t0) VALUES {}",
        vec!["(?)"; rows].join(",")
    )
}

pub fn random_payload<R: Rng>(rng: &mut R, len: usize) -> String {
    (0..len)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())])
        .collect()
}

/// Runs one un-prepared statement.
pub(crate) async fn exec(conn: &mut MySqlConnection, sql: &str) -> sqlx::Result<()> {
    conn.execute(sql).await.map(|_| ())
}

/// Creates both tables, preferring in-memory engines so storage stays out of
/// the measurement. Falls back to the default engine when unavailable.
pub async fn setup(conn: &mut MySqlConnection) -> Result<()> {
    if let Err(e) = exec(conn, "INSTALL SONAME 'ha_blackhole'").await {
        debug!(error = %e, "blackhole engine not installed");
    }

    exec(conn, &format!("DROP TABLE IF EXISTS {WIDE_TABLE}")).await?;
    let create = create_wide_table_sql();
    if let Err(e) = exec(conn, &format!("{create} ENGINE = MEMORY")).await {
        debug!(error = %e, "MEMORY engine unavailable");
        exec(conn, &create).await?;
    }
    exec(conn, &insert_wide_row_sql()).await?;

    exec(conn, &format!("DROP TABLE IF EXISTS {BATCH_TABLE}")).await?;
    let create = create_batch_table_sql();
    if let Err(e) = exec(conn, &format!("{create} ENGINE = BLACKHOLE")).await {
        debug!(error = %e, "BLACKHOLE engine unavailable");
        exec(conn, &create).await?;
    }

    info!(tables = ?[WIDE_TABLE, BATCH_TABLE], "fixtures ready");
    Ok(())
}

pub async fn teardown(conn: &mut MySqlConnection) -> Result<()> {
    for table in [WIDE_TABLE, BATCH_TABLE] {
        exec(conn, &format!("DROP TABLE IF EXISTS {table}")).await?;
    }
    Ok(())
}

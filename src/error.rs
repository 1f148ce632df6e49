use thiserror::Error;

use crate::harness::RunnerError;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by benchmark sessions.
///
/// Reporting never produces these: a bad result file is logged and skipped.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Runner(#[from] RunnerError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("pool task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{} scenario(s) failed: {}", .0.len(), .0.join(", "))]
    ScenariosFailed(Vec<String>),
}

//! Benchmark harness for MariaDB/MySQL client drivers.
//!
//! [`harness`] measures async workloads, [`scenarios`] is the sqlx suite
//! built on it and [`report`] merges result files from every ecosystem's
//! suite into relative comparison tables.

pub mod capture;
pub mod error;
pub mod harness;
pub mod report;
pub mod scenarios;
pub mod schema;
pub mod stats;

pub use error::{Error, Result};

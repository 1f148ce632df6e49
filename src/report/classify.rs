//! Sync/async classification and driver filtering.

use clap::ValueEnum;

/// Language whose synchronous drivers serve as the 100% reference.
pub const REFERENCE_LANGUAGE: &str = "c";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriverMode {
    Sync,
    Async,
}

impl DriverMode {
    /// Classifies a `"<language> <connector>"` driver id.
    pub fn classify(driver: &str) -> DriverMode {
        let (language, connector) = split_driver(driver);
        let is_async = match language {
            "node" | "dotnet" => true,
            "python" => connector.contains("async"),
            "rust" => connector == "sqlx",
            _ => false,
        };
        if is_async {
            DriverMode::Async
        } else {
            DriverMode::Sync
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            DriverMode::Sync => "sync drivers",
            DriverMode::Async => "async drivers",
        }
    }
}

/// Which drivers the report covers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum ModeFilter {
    /// Synchronous drivers only.
    Sync,
    /// Asynchronous drivers only.
    Async,
    /// Separate sync and async tables.
    #[default]
    All,
}

impl ModeFilter {
    /// The driver modes rendered, one table each.
    pub fn modes(&self) -> &'static [DriverMode] {
        match self {
            ModeFilter::Sync => &[DriverMode::Sync],
            ModeFilter::Async => &[DriverMode::Async],
            ModeFilter::All => &[DriverMode::Sync, DriverMode::Async],
        }
    }
}

/// Keeps a driver when it matches a term exactly or its language equals a term.
/// An empty filter keeps everything.
#[derive(Clone, Debug, Default)]
pub struct DriverFilter {
    terms: Vec<String>,
}

impl DriverFilter {
    pub fn new<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            terms: terms.into_iter().map(Into::into).collect(),
        }
    }

    pub fn accepts(&self, driver: &str) -> bool {
        if self.terms.is_empty() {
            return true;
        }
        let (language, _) = split_driver(driver);
        self.terms.iter().any(|t| t == driver || t == language)
    }
}

pub fn is_reference(driver: &str) -> bool {
    split_driver(driver).0 == REFERENCE_LANGUAGE && DriverMode::classify(driver) == DriverMode::Sync
}

fn split_driver(driver: &str) -> (&str, &str) {
    driver.split_once(' ').unwrap_or((driver, ""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        for d in ["node mariadb", "node mysql2", "dotnet MySqlConnector", "rust sqlx"] {
            assert_eq!(DriverMode::classify(d), DriverMode::Async, "{d}");
        }
        for d in ["python async-mariadb", "python mysql_connector_async", "python asyncmy"] {
            assert_eq!(DriverMode::classify(d), DriverMode::Async, "{d}");
        }
        for d in [
            "c mariadb",
            "c++ mysql",
            "java mariadb",
            "go go-sql-driver",
            "python pymysql",
            "rust mysql",
        ] {
            assert_eq!(DriverMode::classify(d), DriverMode::Sync, "{d}");
        }
    }

    #[test]
    fn test_reference_drivers() {
        assert!(is_reference("c mariadb"));
        assert!(is_reference("c mysql"));
        assert!(!is_reference("c++ mariadb"));
        assert!(!is_reference("python mariadb"));
    }

    #[test]
    fn test_driver_filter() {
        let all = DriverFilter::default();
        assert!(all.accepts("java mysql"));

        let f = DriverFilter::new(["python", "c mariadb"]);
        assert!(f.accepts("python pymysql"));
        assert!(f.accepts("c mariadb"));
        assert!(!f.accepts("c mysql"));
        assert!(!f.accepts("c++ mariadb"));
    }

    #[test]
    fn test_mode_filter_tables() {
        assert_eq!(ModeFilter::All.modes(), [DriverMode::Sync, DriverMode::Async]);
        assert_eq!(ModeFilter::Async.modes(), [DriverMode::Async]);
    }
}

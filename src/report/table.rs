//! Relative comparison tables and their fixed-width text rendering.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use super::classify::{is_reference, DriverFilter, DriverMode, ModeFilter};
use super::names::{Benchmark, Variant};
use super::ResultMap;

const DETAIL_LABEL_WIDTH: usize = 53;
const AGGREGATE_LABEL_WIDTH: usize = 30;
const HEADER_WIDTH: usize = 13;

/// Rates above 1000 render as integers, smaller ones with one decimal.
pub fn format_rate(ops_per_sec: f64) -> String {
    if ops_per_sec > 1000.0 {
        format!("{}", ops_per_sec.round() as i64)
    } else {
        format!("{ops_per_sec:.1}")
    }
}

pub fn percentage(value: f64, baseline: f64) -> u64 {
    (value / baseline * 100.0).round() as u64
}

/// The 100% value of a group: the fastest reference driver if any is present,
/// otherwise the fastest driver overall. `None` for an empty group.
pub fn baseline(values: &[(&str, f64)]) -> Option<f64> {
    let max = |reference_only: bool| {
        values
            .iter()
            .filter(|(d, _)| !reference_only || is_reference(d))
            .map(|&(_, v)| v)
            .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.max(v))))
    };
    max(true).or_else(|| max(false))
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cell {
    pub ops_per_sec: f64,
    pub percent: u64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Row {
    pub benchmark: Benchmark,
    /// `None` in aggregate tables, where variants are collapsed.
    pub variant: Option<Variant>,
    pub baseline: f64,
    /// Aligned with the table's driver columns; `None` renders blank.
    pub cells: Vec<Option<Cell>>,
}

impl Row {
    fn new(benchmark: Benchmark, variant: Option<Variant>, drivers: &[String], values: &[(&str, f64)]) -> Option<Row> {
        let baseline = baseline(values)?;
        let cells = drivers
            .iter()
            .map(|d| {
                values.iter().find(|(name, _)| *name == d.as_str()).map(|&(_, v)| Cell {
                    ops_per_sec: v,
                    percent: percentage(v, baseline),
                })
            })
            .collect();
        Some(Row {
            benchmark,
            variant,
            baseline,
            cells,
        })
    }

    fn label(&self) -> String {
        match self.variant {
            Some(v) => format!("{:30} - {:20} |", self.benchmark, v),
            None => format!("{:30} |", self.benchmark),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ComparisonTable {
    pub mode: DriverMode,
    pub drivers: Vec<String>,
    pub rows: Vec<Row>,
}

impl ComparisonTable {
    /// One row per (benchmark, variant) with at least one selected driver.
    fn detail(map: &ResultMap, mode: DriverMode, drivers: Vec<String>) -> Self {
        let rows = map
            .rows()
            .filter_map(|(&(benchmark, variant), rates)| {
                let values = select(&drivers, rates.iter().map(|(d, &v)| (d.as_str(), v)));
                Row::new(benchmark, Some(variant), &drivers, &values)
            })
            .collect();
        Self { mode, drivers, rows }
    }

    /// One row per benchmark, each driver's best rate across variants.
    fn aggregate(map: &ResultMap, mode: DriverMode, drivers: Vec<String>) -> Self {
        let mut best: BTreeMap<Benchmark, BTreeMap<&str, f64>> = BTreeMap::new();
        for (&(benchmark, _), rates) in map.rows() {
            let per_driver = best.entry(benchmark).or_default();
            for (driver, &v) in rates {
                per_driver
                    .entry(driver.as_str())
                    .and_modify(|cur| *cur = cur.max(v))
                    .or_insert(v);
            }
        }
        let rows = best
            .into_iter()
            .filter_map(|(benchmark, rates)| {
                let values = select(&drivers, rates.into_iter());
                Row::new(benchmark, None, &drivers, &values)
            })
            .collect();
        Self { mode, drivers, rows }
    }

    pub fn row(&self, benchmark: Benchmark, variant: Option<Variant>) -> Option<&Row> {
        self.rows
            .iter()
            .find(|r| r.benchmark == benchmark && r.variant == variant)
    }

    pub fn cell(&self, benchmark: Benchmark, variant: Option<Variant>, driver: &str) -> Option<Cell> {
        let col = self.drivers.iter().position(|d| d == driver)?;
        self.row(benchmark, variant)?.cells[col]
    }

    fn render_into(&self, out: &mut String, label_width: usize) {
        let width = HEADER_WIDTH;
        let dashes = "-".repeat(width + 1);

        let _ = write!(out, "{:label_width$} |", "");
        for _ in &self.drivers {
            let _ = write!(out, "{dashes}|");
        }
        out.push('\n');

        let _ = write!(out, "{:label_width$} |", "");
        for driver in &self.drivers {
            let _ = write!(out, " {:width$}|", header_name(driver));
        }
        out.push('\n');

        let separator = {
            let mut s = format!("{}|", "-".repeat(label_width + 1));
            for _ in &self.drivers {
                let _ = write!(s, "{dashes}|");
            }
            s
        };
        let _ = writeln!(out, "{separator}");

        for row in &self.rows {
            out.push_str(&row.label());
            for cell in &row.cells {
                match cell {
                    Some(c) => {
                        let pct = format!("{}%", c.percent);
                        let _ = write!(out, "{:>6} | {:>4} |", format_rate(c.ops_per_sec), pct);
                    }
                    None => {
                        let _ = write!(out, "{:6} | {:4} |", "", "");
                    }
                }
            }
            out.push('\n');
        }
        let _ = writeln!(out, "{separator}");
    }
}

/// Driver ids wider than a column are cut to 12 characters plus `.`.
fn header_name(driver: &str) -> String {
    if driver.chars().count() > HEADER_WIDTH {
        let mut s: String = driver.chars().take(HEADER_WIDTH - 1).collect();
        s.push('.');
        s
    } else {
        driver.to_string()
    }
}

fn select<'a>(drivers: &[String], rates: impl Iterator<Item = (&'a str, f64)>) -> Vec<(&'a str, f64)> {
    rates
        .filter(|(d, _)| drivers.iter().any(|s| s.as_str() == *d))
        .collect()
}

/// Detail tables (one per rendered driver mode) followed by their aggregates.
#[derive(Clone, Debug, PartialEq)]
pub struct Report {
    pub tables: Vec<ComparisonTable>,
    pub aggregates: Vec<ComparisonTable>,
}

impl Report {
    pub fn table(&self, mode: DriverMode) -> Option<&ComparisonTable> {
        self.tables.iter().find(|t| t.mode == mode)
    }

    pub fn aggregate(&self, mode: DriverMode) -> Option<&ComparisonTable> {
        self.aggregates.iter().find(|t| t.mode == mode)
    }

    pub fn is_empty(&self) -> bool {
        self.tables.iter().all(|t| t.rows.is_empty())
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for table in &self.tables {
            render_titled(&mut out, table, DETAIL_LABEL_WIDTH);
        }
        out.push_str("\naggregate results:\n\n");
        for table in &self.aggregates {
            render_titled(&mut out, table, AGGREGATE_LABEL_WIDTH);
        }
        out
    }
}

fn render_titled(out: &mut String, table: &ComparisonTable, label_width: usize) {
    let _ = writeln!(out, "{}:", table.mode.title());
    if table.rows.is_empty() {
        out.push_str("(no results)\n\n");
        return;
    }
    table.render_into(out, label_width);
    out.push('\n');
}

pub fn build_report(map: &ResultMap, filter: &DriverFilter, mode: ModeFilter) -> Report {
    let mut tables = Vec::new();
    let mut aggregates = Vec::new();
    for &m in mode.modes() {
        let drivers: Vec<String> = map
            .drivers()
            .iter()
            .filter(|d| filter.accepts(d) && DriverMode::classify(d) == m)
            .cloned()
            .collect();
        tables.push(ComparisonTable::detail(map, m, drivers.clone()));
        aggregates.push(ComparisonTable::aggregate(map, m, drivers));
    }
    Report { tables, aggregates }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::sources::Sample;

    fn sample(benchmark: Benchmark, variant: Variant, driver: &str, ops: f64) -> Sample {
        Sample {
            benchmark,
            variant,
            driver: driver.to_string(),
            ops_per_sec: ops,
        }
    }

    fn select_1_map() -> ResultMap {
        [
            sample(Benchmark::Select1, Variant::Text, "c mariadb", 50_000.0),
            sample(Benchmark::Select1, Variant::Text, "python mariadb", 12_000.0),
            sample(Benchmark::Select1, Variant::Text, "python pymysql", 9_000.0),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_format_rate() {
        assert_eq!(format_rate(1500.0), "1500");
        assert_eq!(format_rate(1500.6), "1501");
        assert_eq!(format_rate(42.36), "42.4");
        assert_eq!(format_rate(1000.0), "1000.0");
    }

    #[test]
    fn test_baseline_prefers_reference_driver() {
        assert_eq!(baseline(&[("c mariadb", 10.0), ("java mariadb", 20.0)]), Some(10.0));
        assert_eq!(baseline(&[("java mariadb", 10.0), ("java mysql", 20.0)]), Some(20.0));
        assert_eq!(baseline(&[("c++ mysql", 30.0), ("c mysql", 5.0), ("c mariadb", 7.0)]), Some(7.0));
        assert_eq!(baseline(&[]), None);
    }

    #[test]
    fn test_end_to_end_percentages() {
        let report = build_report(&select_1_map(), &DriverFilter::default(), ModeFilter::Sync);
        let table = report.table(DriverMode::Sync).unwrap();
        let row = table.row(Benchmark::Select1, Some(Variant::Text)).unwrap();
        assert_eq!(row.baseline, 50_000.0);
        let pct: Vec<u64> = row.cells.iter().map(|c| c.unwrap().percent).collect();
        assert_eq!(pct, [100, 24, 18]);

        let text = report.render();
        assert!(text.contains(" 50000 | 100% |"), "{text}");
        assert!(text.contains(" 12000 |  24% |"), "{text}");
        assert!(text.contains("  9000 |  18% |"), "{text}");
    }

    #[test]
    fn test_two_sources_without_reference_use_max() {
        let map: ResultMap = [
            sample(Benchmark::Do1, Variant::Text, "java mariadb", 800.0),
            sample(Benchmark::Do1, Variant::Text, "go go-sql-driver", 1_000.0),
        ]
        .into_iter()
        .collect();
        let report = build_report(&map, &DriverFilter::default(), ModeFilter::Sync);
        let table = report.table(DriverMode::Sync).unwrap();
        assert_eq!(table.row(Benchmark::Do1, Some(Variant::Text)).unwrap().baseline, 1_000.0);
        assert_eq!(table.cell(Benchmark::Do1, Some(Variant::Text), "java mariadb").unwrap().percent, 80);
    }

    #[test]
    fn test_missing_cells_render_blank() {
        let mut map = select_1_map();
        map.insert(sample(Benchmark::Do1, Variant::Text, "python pymysql", 4_000.0));
        let report = build_report(&map, &DriverFilter::default(), ModeFilter::Sync);
        let table = report.table(DriverMode::Sync).unwrap();
        assert_eq!(table.cell(Benchmark::Do1, Some(Variant::Text), "c mariadb"), None);

        let text = report.render();
        let line = text.lines().find(|l| l.starts_with("do 1 ")).unwrap();
        assert_eq!(line.len(), 55 + 3 * 15);
        assert!(line.starts_with(&format!("{:30} - {:20} |{:6} | {:4} |", "do 1", "TEXT", "", "")));
        assert!(!line.contains(" 0 |"));
    }

    #[test]
    fn test_aggregate_takes_best_variant() {
        let map: ResultMap = [
            sample(Benchmark::Select100Cols, Variant::Text, "java mysql", 300.0),
            sample(Benchmark::Select100Cols, Variant::BinaryExecuteOnly, "java mysql", 500.0),
            sample(Benchmark::Select100Cols, Variant::Text, "c mysql", 400.0),
        ]
        .into_iter()
        .collect();
        let report = build_report(&map, &DriverFilter::default(), ModeFilter::Sync);
        let agg = report.aggregate(DriverMode::Sync).unwrap();
        let java = agg.cell(Benchmark::Select100Cols, None, "java mysql").unwrap();
        assert_eq!(java.ops_per_sec, 500.0);
        assert_eq!(java.percent, 125);
        assert!(report.render().contains(&format!("{:30} |", "Select 100 int cols")));
    }

    #[test]
    fn test_mode_all_splits_tables() {
        let mut map = select_1_map();
        map.insert(sample(Benchmark::Select1, Variant::Text, "node mariadb", 20_000.0));
        let report = build_report(&map, &DriverFilter::default(), ModeFilter::All);
        assert_eq!(report.tables.len(), 2);
        assert_eq!(report.table(DriverMode::Sync).unwrap().drivers.len(), 3);

        let async_table = report.table(DriverMode::Async).unwrap();
        assert_eq!(async_table.drivers, ["node mariadb"]);
        let cell = async_table
            .cell(Benchmark::Select1, Some(Variant::Text), "node mariadb")
            .unwrap();
        assert_eq!(cell.percent, 100);

        let text = report.render();
        let sync_at = text.find("sync drivers:").unwrap();
        let async_at = text.find("async drivers:").unwrap();
        let agg_at = text.find("aggregate results:").unwrap();
        assert!(sync_at < async_at && async_at < agg_at);
    }

    #[test]
    fn test_driver_filter_changes_baseline_group() {
        let filter = DriverFilter::new(["python"]);
        let report = build_report(&select_1_map(), &filter, ModeFilter::Sync);
        let table = report.table(DriverMode::Sync).unwrap();
        assert_eq!(table.drivers, ["python mariadb", "python pymysql"]);
        let cell = table
            .cell(Benchmark::Select1, Some(Variant::Text), "python pymysql")
            .unwrap();
        assert_eq!(cell.percent, 75);
    }

    #[test]
    fn test_long_driver_names_truncated_in_header() {
        assert_eq!(header_name("python mysql_connector_async"), "python mysql.");
        assert_eq!(header_name("c mariadb"), "c mariadb");
    }
}

//! Canonical benchmark and protocol-variant names shared by every source.

use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Benchmark {
    Do1,
    Do1000Params,
    InsertBatch,
    Select1,
    Select1Pool,
    Select100Cols,
    Select1000Rows,
}

impl Benchmark {
    pub const ALL: [Benchmark; 7] = [
        Benchmark::Do1,
        Benchmark::Do1000Params,
        Benchmark::InsertBatch,
        Benchmark::Select1,
        Benchmark::Select1Pool,
        Benchmark::Select100Cols,
        Benchmark::Select1000Rows,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Benchmark::Do1 => "do 1",
            Benchmark::Do1000Params => "do 1000 parameters",
            Benchmark::InsertBatch => "batch 100 insert of 100 chars",
            Benchmark::Select1 => "select 1",
            Benchmark::Select1Pool => "select 1 pool",
            Benchmark::Select100Cols => "Select 100 int cols",
            Benchmark::Select1000Rows => "select 1000 rows",
        }
    }
}

impl fmt::Display for Benchmark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Variant {
    Text,
    Binary,
    BinaryExecuteOnly,
    BinaryPipeline,
    Bulk,
    Rewrite,
}

impl Variant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::Text => "TEXT",
            Variant::Binary => "BINARY",
            Variant::BinaryExecuteOnly => "BINARY EXECUTE ONLY",
            Variant::BinaryPipeline => "BINARY PIPELINE",
            Variant::Bulk => "BULK",
            Variant::Rewrite => "REWRITE",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_respects_width() {
        assert_eq!(format!("{:12}|", Benchmark::Select1), "select 1    |");
        assert_eq!(format!("{:>6}", Variant::Bulk), "  BULK");
    }

    #[test]
    fn test_declaration_order_is_sort_order() {
        let mut all = Benchmark::ALL.to_vec();
        all.reverse();
        all.sort();
        assert_eq!(all, Benchmark::ALL);
        assert!(Variant::Text < Variant::Rewrite);
    }
}

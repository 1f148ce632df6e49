//! `go test -bench` text output, one result per line:
//!
//! ```text
//! BenchmarkSelect1-8        20000       61234 ns/op
//! ```

use super::{ops_from_nanos, Mapping, Parsed, SourceError, SourceLabel};
use crate::report::names::{Benchmark::*, Variant::*};

pub fn parse(raw: &[u8], label: &SourceLabel) -> Result<Parsed, SourceError> {
    let text = std::str::from_utf8(raw)?;
    let mut out = Parsed::default();
    let mut lines = 0usize;

    for line in text.lines().map(str::trim) {
        if !line.starts_with("Benchmark") {
            continue;
        }
        lines += 1;

        let fields: Vec<&str> = line.split_whitespace().collect();
        let raw_name = fields[0];
        let ns_per_op = fields
            .windows(2)
            .find(|w| w[1] == "ns/op")
            .and_then(|w| w[0].parse::<f64>().ok());

        out.push(
            raw_name,
            map_name(strip_procs(raw_name)),
            label.default_driver(),
            ns_per_op.and_then(ops_from_nanos),
        );
    }

    if lines == 0 {
        return Err(SourceError::Schema("no Benchmark result lines".to_string()));
    }
    Ok(out)
}

/// Drops the `-GOMAXPROCS` suffix.
fn strip_procs(name: &str) -> &str {
    match name.rsplit_once('-') {
        Some((base, procs)) if !procs.is_empty() && procs.bytes().all(|b| b.is_ascii_digit()) => base,
        _ => name,
    }
}

fn map_name(name: &str) -> Mapping {
    let m = match name {
        "BenchmarkDo1" => (Do1, Text),
        "BenchmarkSelect1" => (Select1, Text),
        "BenchmarkSelect1000Rows" => (Select1000Rows, Text),
        "BenchmarkSelect100Int" => (Select100Cols, Text),
        "BenchmarkDo1000Params" => (Do1000Params, Text),
        "BenchmarkDo1000ParamsBinary" => (Do1000Params, Binary),
        _ => return Mapping::Unknown,
    };
    Mapping::Keep(m.0, m.1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::names::Benchmark;

    const OUTPUT: &str = "goos: linux
goarch: amd64
pkg: bench
cpu: AMD EPYC 7B13
BenchmarkSelect1-8          	   20000	     50000 ns/op	     432 B/op	      12 allocs/op
BenchmarkDo1-8              	   30000	     40000 ns/op
BenchmarkSelect100Int       	    5000	    200000 ns/op
BenchmarkNewThing-8         	    5000	    200000 ns/op
BenchmarkBroken-8           	  --- FAIL
PASS
ok  	bench	12.345s
";

    #[test]
    fn test_parses_ns_per_op_lines() {
        let parsed = parse(OUTPUT.as_bytes(), &SourceLabel::new("go", "go-sql-driver")).unwrap();
        assert_eq!(parsed.samples.len(), 3);
        assert_eq!(parsed.samples[0].benchmark, Benchmark::Select1);
        assert!((parsed.samples[0].ops_per_sec - 20_000.0).abs() < 1e-6);
        assert_eq!(parsed.samples[0].driver, "go go-sql-driver");
        assert_eq!(parsed.samples[2].benchmark, Benchmark::Select100Cols);
        assert_eq!(parsed.unrecognized, ["BenchmarkNewThing-8", "BenchmarkBroken-8"]);
    }

    #[test]
    fn test_strip_procs() {
        assert_eq!(strip_procs("BenchmarkDo1-16"), "BenchmarkDo1");
        assert_eq!(strip_procs("BenchmarkDo1"), "BenchmarkDo1");
        assert_eq!(strip_procs("Benchmark-x"), "Benchmark-x");
    }

    #[test]
    fn test_non_go_output_is_malformed() {
        let err = parse(b"{\"benchmarks\": []}", &SourceLabel::new("go", "x")).unwrap_err();
        assert!(matches!(err, SourceError::Schema(_)));
        let err = parse(&[0xff, 0xfe], &SourceLabel::new("go", "x")).unwrap_err();
        assert!(matches!(err, SourceError::Utf8(_)));
    }
}

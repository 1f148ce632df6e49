use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use connector_bench::capture::ResultCollector;
use connector_bench::harness::{BenchConfig, Profile};
use connector_bench::report::{
    self, build_report, Aggregator, DriverFilter, ModeFilter, SourceOutcome, SourceSpec,
};
use connector_bench::scenarios::{self, DbConfig, Scenario};
use connector_bench::schema::MachineInfo;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ProfileArg {
    Quick,
    Full,
}

impl From<ProfileArg> for Profile {
    fn from(v: ProfileArg) -> Self {
        match v {
            ProfileArg::Quick => Profile::Quick,
            ProfileArg::Full => Profile::Full,
        }
    }
}

#[derive(clap::Args, Debug)]
struct DbArgs {
    #[arg(long, env = "TEST_DB_HOST", default_value = "127.0.0.1")]
    host: String,

    #[arg(long, env = "TEST_DB_PORT", default_value_t = 3306)]
    port: u16,

    #[arg(long, env = "TEST_DB_USER", default_value = "root")]
    user: String,

    #[arg(long, env = "TEST_DB_PASSWORD", default_value = "", hide_env_values = true)]
    password: String,

    #[arg(long, env = "TEST_DB_DATABASE", default_value = "bench")]
    database: String,
}

impl From<DbArgs> for DbConfig {
    fn from(a: DbArgs) -> Self {
        DbConfig {
            host: a.host,
            port: a.port,
            user: a.user,
            password: a.password,
            database: a.database,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the sqlx scenarios and emit a pytest-benchmark compatible JSON file.
    Run {
        #[command(flatten)]
        db: DbArgs,

        /// Only run scenarios whose name contains this text. Repeatable.
        #[arg(short, long, value_name = "NAME")]
        benchmark: Vec<String>,
    },

    /// Compare result files from every driver suite.
    Report {
        /// Directory holding the result files.
        #[arg(long, value_name = "DIR", default_value = ".")]
        dir: PathBuf,

        /// Explicit source as FORMAT:LANGUAGE:CONNECTOR:PATH. Repeatable;
        /// replaces discovery in --dir.
        #[arg(long, value_name = "SPEC")]
        source: Vec<SourceSpec>,

        /// Keep only these drivers ("python pymysql") or languages ("java"). Repeatable.
        #[arg(long, value_name = "DRIVER")]
        driver: Vec<String>,

        #[arg(long, value_enum, default_value_t = ModeFilter::All)]
        mode: ModeFilter,
    },

    /// List the scenario names accepted by `run --benchmark`.
    List,
}

#[derive(Parser, Debug)]
#[command(name = "connector-bench")]
#[command(about = "MariaDB/MySQL driver benchmarks and cross-language result report")]
struct Args {
    #[arg(long, value_enum, default_value_t = ProfileArg::Quick, global = true)]
    profile: ProfileArg,

    #[arg(long, default_value_t = 0, global = true)]
    seed: u64,

    /// Where to write the JSON results (run) or the report (report). If omitted, prints to stdout.
    #[arg(long, global = true)]
    out: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

fn init_logging() {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cfg: &BenchConfig, db: DbConfig, filters: &[String], out: Option<PathBuf>) -> anyhow::Result<()> {
    let selected = scenarios::select(filters);
    if selected.is_empty() {
        warn!(?filters, "no scenario matches");
        return Ok(());
    }

    let mut collector = ResultCollector::new();
    let outcome = scenarios::run_suite(cfg, &db, &selected, &mut collector).await;

    // whatever finished is still written when some scenarios failed
    let file = collector.into_result_file(MachineInfo::current());
    match out {
        Some(path) => {
            let written = file
                .write_json(&path)
                .with_context(|| format!("writing {}", path.display()))?;
            if written {
                info!(path = %path.display(), benchmarks = file.benchmarks.len(), "results written");
            } else {
                warn!("no benchmark completed, nothing written");
            }
        }
        None if !file.benchmarks.is_empty() => println!("{}", file.to_json()?),
        None => warn!("no benchmark completed"),
    }

    outcome.context("benchmark session")
}

fn compare(
    dir: PathBuf,
    sources: Vec<SourceSpec>,
    drivers: Vec<String>,
    mode: ModeFilter,
    out: Option<PathBuf>,
) -> anyhow::Result<()> {
    let specs = if sources.is_empty() {
        report::discover(&dir)
    } else {
        sources
    };

    let mut aggregator = Aggregator::new();
    aggregator.load_all(&specs);
    let loaded = aggregator
        .outcomes()
        .iter()
        .filter(|(_, o)| matches!(o, SourceOutcome::Loaded { .. }))
        .count();
    info!(
        loaded,
        candidates = specs.len(),
        rows = aggregator.results().len(),
        "sources read"
    );

    let comparison = build_report(aggregator.results(), &DriverFilter::new(drivers), mode);
    if comparison.is_empty() {
        warn!("no comparable results");
    }
    let text = comparison.render();
    match out {
        Some(path) => std::fs::write(&path, text).with_context(|| format!("writing {}", path.display()))?,
        None => print!("{text}"),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let args = Args::parse();
    let cfg = BenchConfig {
        profile: args.profile.into(),
        seed: args.seed,
    };

    match args.cmd {
        Command::Run { db, benchmark } => run(&cfg, db.into(), &benchmark, args.out).await,
        Command::Report {
            dir,
            source,
            driver,
            mode,
        } => compare(dir, source, driver, mode, args.out),
        Command::List => {
            for s in Scenario::ALL {
                let c = cfg.scale(s.declared());
                println!("{:32} rounds={:<6} warmup={}", s.name(), c.rounds, c.warmup_rounds);
            }
            Ok(())
        }
    }
}

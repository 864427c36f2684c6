//! Main entry point of the phenobench application.

#![allow(clippy::module_name_repetitions)]

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use tracing::level_filters::LevelFilter;

use phenobench::comparison::pairwise_comparisons;
use phenobench::summary::{write_summary_file, RunSummary};
use phenobench::{run_benchmark, BenchmarkConfig, EntityKind, RankTable};

/// CLI parser based on clap.
#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "phenobench - benchmarking of phenotype-driven prioritisation",
    long_about = "Ranks the known causative genes, variants and diseases of every case \
                  in the results of prioritisation tools and summarises the ranks per run"
)]
struct Cli {
    /// Commonly used arguments
    #[command(flatten)]
    common: CommonArgs,

    /// The sub command to run
    #[command(subcommand)]
    command: Commands,
}

/// Commonly used command line arguments.
#[derive(Debug, Args)]
struct CommonArgs {
    /// Verbosity of the program
    #[clap(flatten)]
    verbose: Verbosity<InfoLevel>,
}

/// Enum supporting the parsing of top-level commands.
#[derive(Debug, Subcommand)]
enum Commands {
    /// Assess all runs of a benchmark configuration.
    Benchmark(BenchmarkArgs),
    /// Compare the runs of an existing rank table.
    Compare(CompareArgs),
}

#[derive(Debug, Args)]
struct BenchmarkArgs {
    /// Path to the YAML benchmark configuration
    #[arg(long)]
    config: PathBuf,
    /// Prefix of all output files
    #[arg(long)]
    output_prefix: PathBuf,
}

#[derive(Debug, Args)]
struct CompareArgs {
    /// Path to a rank table written by `benchmark`
    #[arg(long)]
    ranks: PathBuf,
    /// Kind of entities in the rank table
    #[arg(long, default_value = "gene")]
    kind: EntityKind,
    /// Prefix of all output files
    #[arg(long)]
    output_prefix: PathBuf,
}

fn benchmark(args: &BenchmarkArgs) -> Result<(), anyhow::Error> {
    let config = BenchmarkConfig::from_file(&args.config)
        .with_context(|| format!("Failed to load benchmark config {:?}", args.config))?;
    let report = run_benchmark(&config)?;
    for path in report.write(&args.output_prefix)? {
        tracing::debug!("Wrote {}", path.display());
    }
    Ok(())
}

fn compare(args: &CompareArgs) -> Result<(), anyhow::Error> {
    let table = RankTable::from_file(&args.ranks)
        .with_context(|| format!("Failed to read rank table {:?}", args.ranks))?;
    let prefix = args.output_prefix.display();
    let kind = args.kind;

    let summaries = table
        .columns()
        .iter()
        .map(|run| RunSummary::from_table(&table, run, kind))
        .collect::<Result<Vec<_>, _>>()?;
    write_summary_file(format!("{prefix}-{kind}_summary.tsv"), &summaries)?;

    for comparison in pairwise_comparisons(&table, table.columns())? {
        tracing::info!(
            "{} vs {}: {} gained, {} lost",
            comparison.run_1(),
            comparison.run_2(),
            comparison.gained(),
            comparison.lost()
        );
        comparison.write_to_file(format!(
            "{prefix}-{kind}_{}_vs_{}.tsv",
            comparison.run_1(),
            comparison.run_2()
        ))?;
    }
    Ok(())
}

/// Maximum tracing level for the verbosity flags, `None` silences all output
fn level_filter(level: Option<log::Level>) -> LevelFilter {
    match level {
        Some(log::Level::Error) => LevelFilter::ERROR,
        Some(log::Level::Warn) => LevelFilter::WARN,
        Some(log::Level::Info) => LevelFilter::INFO,
        Some(log::Level::Debug) => LevelFilter::DEBUG,
        Some(log::Level::Trace) => LevelFilter::TRACE,
        None => LevelFilter::OFF,
    }
}

fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    // Build a tracing subscriber according to the configuration in `cli.common`.
    let collector = tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_max_level(level_filter(cli.common.verbose.log_level()))
        .compact()
        .finish();
    tracing::subscriber::set_global_default(collector)?;

    tracing::info!("Starting phenobench");

    match &cli.command {
        Commands::Benchmark(args) => benchmark(args)?,
        Commands::Compare(args) => compare(args)?,
    }

    tracing::info!("All done.");

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    fn level(flags: &[&str]) -> LevelFilter {
        let mut args = vec!["phenobench"];
        args.extend_from_slice(flags);
        args.extend(["compare", "--ranks", "ranks.tsv", "--output-prefix", "out"]);
        let cli = Cli::parse_from(args);
        level_filter(cli.common.verbose.log_level())
    }

    #[test]
    fn verbosity_flags() {
        assert_eq!(level(&[]), LevelFilter::INFO);
        assert_eq!(level(&["-v"]), LevelFilter::DEBUG);
        assert_eq!(level(&["-q"]), LevelFilter::WARN);
        assert_eq!(level(&["-qq"]), LevelFilter::ERROR);
        assert_eq!(level(&["-qqq"]), LevelFilter::OFF);
    }
}

//! Running a complete benchmark
//!
//! Every run of a [`BenchmarkConfig`] is assessed independently, in
//! parallel. Each run fills its own [`RankTable`] per kind of entity. Once
//! all runs are finished, the columns are merged into one table per kind,
//! in the order of the configuration, and all pairs of runs are compared.
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{debug, info};

use crate::assess::Assessor;
use crate::comparison::{pairwise_comparisons, RankComparison};
use crate::config::{BenchmarkConfig, RunConfig};
use crate::entity::EntityKind;
use crate::parser::{KnownEntities, ResultDirectory};
use crate::summary::{write_summary_file, RunSummary};
use crate::table::RankTable;
use crate::{BenchError, BenchResult};

/// The outcome of one run for one kind of entity
#[derive(Debug)]
struct KindOutcome {
    table: RankTable,
    summary: RunSummary,
}

/// Assesses all cases of a single run
fn assess_run(run: &RunConfig) -> BenchResult<Vec<KindOutcome>> {
    let kinds = run.kinds();
    let truth = KnownEntities::from_dir(&run.case_dir, &kinds, run.genome_assembly)?;
    let results = ResultDirectory::new(&run.results_dir, run.score_order);

    let mut outcomes = Vec::with_capacity(kinds.len());
    for kind in kinds {
        let mut table = RankTable::new();
        let mut assessor = Assessor::new(&mut table, kind, &run.run_identifier, run.threshold());
        for case_id in truth.case_ids() {
            debug!("Assessing {kind} prioritisation of {case_id}");
            assessor.assess_case(case_id, &truth, &results)?;
        }
        let (rank_stats, classification) = assessor.finish();
        info!(
            "Run {}: {} of {} known {kind}s found, {} ranked first",
            run.run_identifier,
            rank_stats.found(),
            rank_stats.total(),
            rank_stats.top()
        );
        outcomes.push(KindOutcome {
            table,
            summary: RunSummary::new(&run.run_identifier, kind, rank_stats, classification),
        });
    }
    Ok(outcomes)
}

/// The results of all runs for one kind of entity
#[derive(Debug)]
pub struct KindReport {
    kind: EntityKind,
    table: RankTable,
    summaries: Vec<RunSummary>,
    comparisons: Vec<RankComparison>,
}

impl KindReport {
    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Matched ranks of all runs, one column per run
    pub fn table(&self) -> &RankTable {
        &self.table
    }

    /// One summary per run, in configuration order
    pub fn summaries(&self) -> &[RunSummary] {
        &self.summaries
    }

    /// Comparisons of all pairs of runs
    pub fn comparisons(&self) -> &[RankComparison] {
        &self.comparisons
    }

    fn write(&self, prefix: &str) -> BenchResult<Vec<PathBuf>> {
        let mut written = Vec::new();

        let path = PathBuf::from(format!("{prefix}-{}_summary.tsv", self.kind));
        write_summary_file(&path, &self.summaries)?;
        written.push(path);

        let path = PathBuf::from(format!("{prefix}-{}_rank_table.tsv", self.kind));
        self.table.write_to_file(&path)?;
        written.push(path);

        for comparison in &self.comparisons {
            let path = PathBuf::from(format!(
                "{prefix}-{}_{}_vs_{}.tsv",
                self.kind,
                comparison.run_1(),
                comparison.run_2()
            ));
            comparison.write_to_file(&path)?;
            written.push(path);
        }
        Ok(written)
    }
}

/// The results of a complete benchmark
#[derive(Debug)]
pub struct BenchmarkReport {
    name: String,
    reports: Vec<KindReport>,
}

impl BenchmarkReport {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// One report per analysed kind of entity
    pub fn reports(&self) -> &[KindReport] {
        &self.reports
    }

    /// The report of a single kind of entity
    pub fn report(&self, kind: EntityKind) -> Option<&KindReport> {
        self.reports.iter().find(|report| report.kind == kind)
    }

    /// Writes summaries, rank tables and comparisons of all kinds
    ///
    /// Returns the paths of all written files.
    ///
    /// # Errors
    ///
    /// [`BenchError::CannotWriteFile`] if a file cannot be written
    pub fn write<P: AsRef<Path>>(&self, prefix: P) -> BenchResult<Vec<PathBuf>> {
        let prefix = prefix.as_ref().display().to_string();
        let mut written = Vec::new();
        for report in &self.reports {
            written.extend(report.write(&prefix)?);
        }
        info!("Wrote {} files for benchmark {}", written.len(), self.name);
        Ok(written)
    }
}

/// Runs all runs of the benchmark and collects their results
///
/// # Errors
///
/// - [`BenchError::Configuration`] if the configuration is invalid. No
///   case is processed in that case.
/// - [`BenchError::RunFailed`] with the first run that failed
///
/// # Examples
///
/// ```no_run
/// use phenobench::{run_benchmark, BenchmarkConfig};
///
/// let config = BenchmarkConfig::from_file("benchmark.yaml").unwrap();
/// let report = run_benchmark(&config).unwrap();
/// report.write("output/exomiser").unwrap();
/// ```
pub fn run_benchmark(config: &BenchmarkConfig) -> BenchResult<BenchmarkReport> {
    config.validate()?;
    info!(
        "Starting benchmark {} with {} runs",
        config.benchmark_name,
        config.runs.len()
    );

    let runs: Vec<(&RunConfig, Vec<KindOutcome>)> = config
        .runs
        .par_iter()
        .map(|run| {
            assess_run(run)
                .map(|outcomes| (run, outcomes))
                .map_err(|err| BenchError::RunFailed {
                    run: run.run_identifier.clone(),
                    source: Box::new(err),
                })
        })
        .collect::<BenchResult<_>>()?;

    let mut reports = Vec::new();
    for kind in config.kinds() {
        let mut table = RankTable::new();
        let mut summaries = Vec::new();
        let mut run_ids = Vec::new();
        for (run, outcomes) in &runs {
            let Some(outcome) = outcomes.iter().find(|o| o.summary.kind() == kind) else {
                continue;
            };
            table.merge_column(&outcome.table, &run.run_identifier)?;
            summaries.push(outcome.summary.clone());
            run_ids.push(run.run_identifier.clone());
        }
        let comparisons = pairwise_comparisons(&table, &run_ids)?;
        reports.push(KindReport {
            kind,
            table,
            summaries,
            comparisons,
        });
    }

    Ok(BenchmarkReport {
        name: config.benchmark_name.clone(),
        reports,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use std::fs;

    fn write_run(root: &Path, run: &str, rows: &str) {
        let dir = root.join(run).join("pheval_gene_results");
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("patient_1-pheval_gene_result.tsv"),
            format!("gene_symbol\tgene_identifier\tscore\n{rows}"),
        )
        .unwrap();
    }

    fn config(root: &Path) -> BenchmarkConfig {
        let cases = root.join("cases");
        fs::create_dir_all(&cases).unwrap();
        fs::write(
            cases.join("known_genes.tsv"),
            "case_id\tgene_symbol\tgene_identifier\npatient_1\tPLXNA1\tENSG00000114554\n",
        )
        .unwrap();
        write_run(root, "run_1", "PLXNA1\tENSG00000114554\t0.4\nGBA1\tENSG00000177628\t0.9\n");
        write_run(root, "run_2", "PLXNA1\tENSG00000114554\t0.95\nGBA1\tENSG00000177628\t0.9\n");

        let yaml = format!(
            "benchmark_name: test
runs:
  - run_identifier: run_1
    case_dir: {cases}
    results_dir: {run_1}
    gene_analysis: true
  - run_identifier: run_2
    case_dir: {cases}
    results_dir: {run_2}
    gene_analysis: true
",
            cases = cases.display(),
            run_1 = root.join("run_1").display(),
            run_2 = root.join("run_2").display(),
        );
        BenchmarkConfig::from_yaml_str(&yaml).unwrap()
    }

    #[test]
    fn two_runs() {
        let dir = tempfile::tempdir().unwrap();
        let report = run_benchmark(&config(dir.path())).unwrap();

        let genes = report.report(EntityKind::Gene).unwrap();
        assert!(report.report(EntityKind::Disease).is_none());
        assert_eq!(genes.table().columns(), &["run_1", "run_2"]);
        assert_eq!(genes.table().get("patient_1", "PLXNA1", "run_1").unwrap(), Some(2));
        assert_eq!(genes.table().get("patient_1", "PLXNA1", "run_2").unwrap(), Some(1));
        assert_eq!(genes.summaries()[0].rank_stats().top(), 0);
        assert_eq!(genes.summaries()[1].rank_stats().top(), 1);
        assert_eq!(genes.comparisons().len(), 1);
    }

    #[test]
    fn failing_run_is_named() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config(dir.path());
        config.runs[1].case_dir = dir.path().join("missing");

        match run_benchmark(&config) {
            Err(BenchError::RunFailed { run, .. }) => assert_eq!(run, "run_2"),
            other => panic!("expected a failed run, got {other:?}"),
        }
    }

    #[test]
    fn invalid_config_fails_early() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config(dir.path());
        config.runs[0].gene_analysis = false;
        assert!(matches!(
            run_benchmark(&config),
            Err(BenchError::Configuration(_))
        ));
    }
}

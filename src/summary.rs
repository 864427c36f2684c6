//! Summary statistics of finished runs
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::entity::EntityKind;
use crate::stats::{BinaryClassificationStats, RankStats};
use crate::table::RankTable;
use crate::{BenchError, BenchResult};

/// The `k` values of precision@k, MAP@k and F-beta@k
const K_VALUES: [usize; 4] = [1, 3, 5, 10];

/// The `k` values of NDCG@k
const NDCG_K_VALUES: [usize; 3] = [3, 5, 10];

/// Column names of a summary file
pub const SUMMARY_HEADER: [&str; 42] = [
    "run_identifier",
    "top",
    "top3",
    "top5",
    "top10",
    "found",
    "total",
    "percentage_top",
    "percentage_top3",
    "percentage_top5",
    "percentage_top10",
    "percentage_found",
    "mean_reciprocal_rank",
    "precision@1",
    "precision@3",
    "precision@5",
    "precision@10",
    "MAP@1",
    "MAP@3",
    "MAP@5",
    "MAP@10",
    "f_beta_score@1",
    "f_beta_score@3",
    "f_beta_score@5",
    "f_beta_score@10",
    "NDCG@3",
    "NDCG@5",
    "NDCG@10",
    "true_positives",
    "false_positives",
    "true_negatives",
    "false_negatives",
    "sensitivity",
    "specificity",
    "precision",
    "negative_predictive_value",
    "false_positive_rate",
    "false_discovery_rate",
    "false_negative_rate",
    "accuracy",
    "f1_score",
    "matthews_correlation_coefficient",
];

/// The finalized statistics of one run and kind of entity
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    run: String,
    kind: EntityKind,
    rank_stats: RankStats,
    classification: BinaryClassificationStats,
}

impl RunSummary {
    pub fn new(
        run: &str,
        kind: EntityKind,
        rank_stats: RankStats,
        classification: BinaryClassificationStats,
    ) -> Self {
        Self {
            run: run.to_string(),
            kind,
            rank_stats,
            classification,
        }
    }

    /// Recomputes the rank statistics of a run from a persisted rank table
    ///
    /// The confusion matrix is not part of the rank table and is left
    /// empty.
    ///
    /// # Errors
    ///
    /// [`BenchError::UnknownColumn`] if the table has no column for `run`
    pub fn from_table(table: &RankTable, run: &str, kind: EntityKind) -> BenchResult<Self> {
        let cases = table.case_ranks(run)?;
        let rank_stats = RankStats::from_case_ranks(cases.into_iter().map(|(_, ranks)| ranks));
        Ok(Self::new(
            run,
            kind,
            rank_stats,
            BinaryClassificationStats::new(),
        ))
    }

    pub fn run(&self) -> &str {
        &self.run
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn rank_stats(&self) -> &RankStats {
        &self.rank_stats
    }

    pub fn classification(&self) -> &BinaryClassificationStats {
        &self.classification
    }

    /// F-beta@k, with the top-k percentage as recall
    fn f_beta_score_at_k(&self, k: usize) -> f64 {
        let stats = &self.rank_stats;
        let percentage = match k {
            1 => stats.percentage_top(),
            3 => stats.percentage_top3(),
            5 => stats.percentage_top5(),
            _ => stats.percentage_top10(),
        };
        stats.f_beta_score_at_k(percentage, k)
    }

    /// The rank based metrics, in the order of [`SUMMARY_HEADER`]
    pub fn rank_metrics(&self) -> Vec<f64> {
        let stats = &self.rank_stats;
        let mut metrics = vec![
            stats.percentage_top(),
            stats.percentage_top3(),
            stats.percentage_top5(),
            stats.percentage_top10(),
            stats.percentage_found(),
            stats.mean_reciprocal_rank(),
        ];
        metrics.extend(K_VALUES.iter().map(|k| stats.precision_at_k(*k)));
        metrics.extend(K_VALUES.iter().map(|k| stats.mean_average_precision_at_k(*k)));
        metrics.extend(K_VALUES.iter().map(|k| self.f_beta_score_at_k(*k)));
        metrics.extend(
            NDCG_K_VALUES
                .iter()
                .map(|k| stats.mean_normalised_discounted_cumulative_gain(*k)),
        );
        metrics
    }

    /// The derived classification metrics, in the order of the header
    pub fn classification_metrics(&self) -> Vec<f64> {
        let stats = &self.classification;
        vec![
            stats.sensitivity(),
            stats.specificity(),
            stats.precision(),
            stats.negative_predictive_value(),
            stats.false_positive_rate(),
            stats.false_discovery_rate(),
            stats.false_negative_rate(),
            stats.accuracy(),
            stats.f1_score(),
            stats.matthews_correlation_coefficient(),
        ]
    }

    /// All cells of the summary row
    pub fn cells(&self) -> Vec<String> {
        let stats = &self.rank_stats;
        let classification = &self.classification;

        let mut cells = vec![self.run.clone()];
        cells.extend(
            [
                stats.top(),
                stats.top3(),
                stats.top5(),
                stats.top10(),
                stats.found(),
                stats.total(),
            ]
            .iter()
            .map(ToString::to_string),
        );
        cells.extend(self.rank_metrics().iter().map(ToString::to_string));
        cells.extend(
            [
                classification.true_positives(),
                classification.false_positives(),
                classification.true_negatives(),
                classification.false_negatives(),
            ]
            .iter()
            .map(ToString::to_string),
        );
        cells.extend(self.classification_metrics().iter().map(ToString::to_string));
        cells
    }
}

/// Writes one summary row per run as TSV
///
/// # Errors
///
/// Returns the underlying IO error
pub fn write_summary<W: Write>(writer: &mut W, summaries: &[RunSummary]) -> std::io::Result<()> {
    writeln!(writer, "{}", SUMMARY_HEADER.join("\t"))?;
    for summary in summaries {
        writeln!(writer, "{}", summary.cells().join("\t"))?;
    }
    Ok(())
}

/// Writes the summary to a TSV file
///
/// # Errors
///
/// [`BenchError::CannotWriteFile`] if the file cannot be created or written
pub fn write_summary_file<P: AsRef<Path>>(path: P, summaries: &[RunSummary]) -> BenchResult<()> {
    let filename = path.as_ref().display().to_string();
    let file = File::create(path).map_err(|_| BenchError::CannotWriteFile(filename.clone()))?;
    let mut writer = BufWriter::new(file);
    write_summary(&mut writer, summaries)
        .and_then(|()| writer.flush())
        .map_err(|_| BenchError::CannotWriteFile(filename))
}

#[cfg(test)]
mod test {
    use super::*;

    fn summary() -> RunSummary {
        let rank_stats = RankStats::from_case_ranks(vec![vec![1], vec![2], vec![0], vec![4]]);
        RunSummary::new("run_1", EntityKind::Gene, rank_stats, BinaryClassificationStats::new())
    }

    #[test]
    fn header_matches_cells() {
        let cells = summary().cells();
        assert_eq!(cells.len(), SUMMARY_HEADER.len());
        assert_eq!(cells[0], "run_1");
        assert_eq!(cells[1], "1");
        assert_eq!(cells[6], "4");
        assert_eq!(cells[7], "25");
    }

    #[test]
    fn write_rows() {
        let mut buffer = Vec::new();
        write_summary(&mut buffer, &[summary(), summary()]).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("run_identifier\ttop\ttop3"));
        assert!(lines[0].ends_with("accuracy\tf1_score\tmatthews_correlation_coefficient"));
        assert!(lines[1].starts_with("run_1\t1\t2\t3\t3\t3\t4\t"));
    }

    #[test]
    fn recompute_from_table() {
        let mut table = RankTable::new();
        table.add_column("run_1");
        table.update("case_1", "PLXNA1", "run_1", 1).unwrap();
        table.update("case_2", "GBA1", "run_1", 2).unwrap();
        table.update("case_3", "DMD", "run_1", 0).unwrap();
        table.update("case_4", "EZH2", "run_1", 4).unwrap();

        let from_table = RunSummary::from_table(&table, "run_1", EntityKind::Gene).unwrap();
        assert_eq!(from_table.rank_stats(), summary().rank_stats());
        assert!(RunSummary::from_table(&table, "run_2", EntityKind::Gene).is_err());
    }
}

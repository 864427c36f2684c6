//! Matching of known causative entities against ranked results
//!
//! The [`Assessor`] is the work-horse of a benchmark run. It is created
//! once per run and entity kind, assesses all cases one after the other
//! and finally hands out the accumulated statistics.
use tracing::debug;

use crate::entity::{EntityKind, KnownEntity, PrioritisationResult};
use crate::parser::{CaseTruthReader, ResultReader};
use crate::ranking::{ScoreOrder, Scored};
use crate::stats::{BinaryClassificationStats, CaseRanks, RankStats};
use crate::table::RankTable;
use crate::BenchResult;

/// Score threshold that a matched result must pass to be counted
///
/// A threshold of `0.0` disables filtering. Otherwise the score must be
/// strictly better than the threshold: higher for
/// [`ScoreOrder::Descending`] scores and lower for
/// [`ScoreOrder::Ascending`] scores (such as p-values).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Threshold {
    value: f64,
    order: ScoreOrder,
}

impl Threshold {
    pub fn new(value: f64, order: ScoreOrder) -> Self {
        Self { value, order }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn order(&self) -> ScoreOrder {
        self.order
    }

    /// Returns the rank if the score passes the threshold, `0` otherwise
    ///
    /// # Examples
    ///
    /// ```
    /// use phenobench::{ScoreOrder, Threshold};
    ///
    /// let threshold = Threshold::new(0.9, ScoreOrder::Descending);
    /// assert_eq!(threshold.record(1, 0.88), 0);
    /// assert_eq!(threshold.record(1, 0.95), 1);
    ///
    /// let threshold = Threshold::new(0.1, ScoreOrder::Ascending);
    /// assert_eq!(threshold.record(1, 0.0484), 1);
    /// ```
    #[allow(clippy::float_cmp)]
    pub fn record(&self, rank: usize, score: f64) -> usize {
        if self.value == 0.0 {
            return rank;
        }
        let passes = match self.order {
            ScoreOrder::Ascending => self.value > score,
            ScoreOrder::Descending => self.value < score,
        };
        if passes {
            rank
        } else {
            0
        }
    }
}

#[cfg_attr(doc, aquamarine::aquamarine)]
/// Assesses the cases of one run for one kind of entity
///
/// The `Assessor` writes the matched rank of every known entity into its
/// column of a [`RankTable`] and accumulates [`RankStats`] and
/// [`BinaryClassificationStats`] over all cases.
///
/// ```mermaid
/// stateDiagram-v2
///     [*] --> Init: Assessor::new
///     Init --> Assess: column added to RankTable
///     Assess --> Assess: assess / assess_case
///     Assess --> Finalized: finish
///     Finalized --> [*]
/// ```
///
/// The table is borrowed for the lifetime of the `Assessor`, so a table
/// can only ever be written by one run at a time.
#[derive(Debug)]
pub struct Assessor<'a> {
    table: &'a mut RankTable,
    kind: EntityKind,
    column: String,
    threshold: Threshold,
    rank_stats: RankStats,
    classification: BinaryClassificationStats,
}

impl<'a> Assessor<'a> {
    /// Binds a new `Assessor` to the table and adds the run's column
    pub fn new(table: &'a mut RankTable, kind: EntityKind, column: &str, threshold: Threshold) -> Self {
        table.add_column(column);
        Self {
            table,
            kind,
            column: column.to_string(),
            threshold,
            rank_stats: RankStats::new(),
            classification: BinaryClassificationStats::new(),
        }
    }

    /// The kind of entity that is assessed
    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Returns the rank of the matched result, filtered by the threshold
    pub fn record_matched<T: Scored>(&self, result: &T) -> usize {
        self.threshold.record(result.rank(), result.score())
    }

    /// Assesses a single case
    ///
    /// Every known entity is matched against the ranked `results`. The
    /// first matching result determines the rank, which is stored in the
    /// rank table and added to the run statistics.
    ///
    /// A case without known entities only adds its results to the
    /// confusion matrix. It does not count as a case for MAP@k and NDCG@k.
    ///
    /// # Errors
    ///
    /// Returns an error if the rank could not be written to the table
    pub fn assess(
        &mut self,
        case_id: &str,
        known: &[KnownEntity],
        results: &[PrioritisationResult],
    ) -> BenchResult<()> {
        if known.is_empty() {
            self.classification.add_classification(results, &[]);
            return Ok(());
        }

        let mut case_ranks = CaseRanks::new();
        for entity in known {
            let key = entity.key();
            let rank = results
                .iter()
                .find(|result| entity.matches(result))
                .map_or(0, |result| self.record_matched(result));

            debug!("{case_id}\t{key}\trank {rank}");
            self.rank_stats.add_rank(rank);
            self.table.update(case_id, &key, &self.column, rank)?;
            case_ranks.push(rank);
        }

        self.rank_stats.add_total(known.len());
        self.classification.add_classification(results, &case_ranks);
        self.rank_stats.add_case_ranks(case_ranks);
        Ok(())
    }

    /// Loads the known entities and results of a case and assesses it
    ///
    /// # Errors
    ///
    /// Returns the error of the truth reader, which aborts the run. A
    /// missing result file is not an error, see [`ResultReader`].
    pub fn assess_case<T, R>(&mut self, case_id: &str, truth: &T, results: &R) -> BenchResult<()>
    where
        T: CaseTruthReader + ?Sized,
        R: ResultReader + ?Sized,
    {
        let known = truth.known_entities(case_id, self.kind)?;
        let ranked = results.read_ranked_results(case_id, self.kind)?;
        self.assess(case_id, &known, &ranked)
    }

    /// Finalizes the run and returns its statistics
    pub fn finish(self) -> (RankStats, BinaryClassificationStats) {
        (self.rank_stats, self.classification)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::entity::{GeneResult, KnownGene};

    fn plxna1_results() -> Vec<PrioritisationResult> {
        vec![
            GeneResult::new("PLXNA1", "ENSG00000114554", 0.88).with_rank(1),
            GeneResult::new("ZNF804B", "ENSG00000182348", 0.58).with_rank(2),
            GeneResult::new("SMCO2", "ENSG00000165935", 0.58).with_rank(2),
            GeneResult::new("SPNS1", "ENSG00000169682", 0.38).with_rank(4),
        ]
        .into_iter()
        .map(PrioritisationResult::Gene)
        .collect()
    }

    fn plxna1() -> Vec<KnownEntity> {
        vec![KnownEntity::Gene(KnownGene::new("PLXNA1", "ENSG00000114554"))]
    }

    #[test]
    fn exact_rank_without_threshold() {
        let mut table = RankTable::new();
        let mut assessor =
            Assessor::new(&mut table, EntityKind::Gene, "run_1", Threshold::default());
        assessor.assess("case_1", &plxna1(), &plxna1_results()).unwrap();
        let (ranks, classification) = assessor.finish();

        assert_eq!(ranks.top(), 1);
        assert_eq!(ranks.total(), 1);
        assert_eq!(classification.true_positives(), 1);
        assert_eq!(classification.false_positives(), 0);
        assert_eq!(classification.true_negatives(), 3);
        assert_eq!(classification.false_negatives(), 0);
        assert_eq!(table.get("case_1", "PLXNA1", "run_1").unwrap(), Some(1));
    }

    #[test]
    fn descending_threshold_excludes() {
        let mut table = RankTable::new();
        let threshold = Threshold::new(0.9, ScoreOrder::Descending);
        let mut assessor = Assessor::new(&mut table, EntityKind::Gene, "run_1", threshold);
        assessor.assess("case_1", &plxna1(), &plxna1_results()).unwrap();
        let (ranks, classification) = assessor.finish();

        assert_eq!(ranks.found(), 0);
        assert_eq!(ranks.total(), 1);
        assert_eq!(classification.false_negatives(), 1);
        assert_eq!(table.get("case_1", "PLXNA1", "run_1").unwrap(), Some(0));
    }

    #[test]
    fn ascending_threshold_passes() {
        let threshold = Threshold::new(0.1, ScoreOrder::Ascending);
        assert_eq!(threshold.record(1, 0.0484), 1);
        assert_eq!(threshold.record(1, 0.1), 0);
        assert_eq!(threshold.record(3, 0.5), 0);
    }

    #[test]
    fn threshold_monotonic() {
        let scores = [0.05, 0.2, 0.35, 0.5, 0.61, 0.77, 0.9, 0.99];
        let mut previous = usize::MAX;
        for step in 1..=20 {
            let threshold = Threshold::new(f64::from(step) * 0.05, ScoreOrder::Descending);
            let passing = scores
                .iter()
                .filter(|score| threshold.record(1, **score) != 0)
                .count();
            assert!(passing <= previous);
            previous = passing;
        }
    }

    #[test]
    fn missing_entity_counts_towards_total() {
        let mut table = RankTable::new();
        let mut assessor =
            Assessor::new(&mut table, EntityKind::Gene, "run_1", Threshold::default());
        let known = vec![
            KnownEntity::Gene(KnownGene::new("PLXNA1", "ENSG00000114554")),
            KnownEntity::Gene(KnownGene::new("DMD", "ENSG00000198947")),
        ];
        assessor.assess("case_1", &known, &plxna1_results()).unwrap();
        assessor.assess("case_2", &plxna1(), &[]).unwrap();
        let (ranks, classification) = assessor.finish();

        assert_eq!(ranks.total(), 3);
        assert_eq!(ranks.found(), 1);
        assert_eq!(
            ranks.relevant_result_ranks()[0].as_slice(),
            &[1, 0]
        );
        assert_eq!(classification.true_positives(), 1);
        assert_eq!(classification.false_negatives(), 2);
        assert_eq!(table.get("case_1", "DMD", "run_1").unwrap(), Some(0));
        assert_eq!(table.get("case_2", "PLXNA1", "run_1").unwrap(), Some(0));
    }

    #[test]
    fn first_match_wins() {
        let mut table = RankTable::new();
        let mut assessor =
            Assessor::new(&mut table, EntityKind::Gene, "run_1", Threshold::default());
        let results: Vec<PrioritisationResult> = vec![
            GeneResult::new("OTHER", "ENSG00000114554", 0.9).with_rank(1),
            GeneResult::new("PLXNA1", "ENSG00000114554", 0.5).with_rank(2),
        ]
        .into_iter()
        .map(PrioritisationResult::Gene)
        .collect();
        assessor.assess("case_1", &plxna1(), &results).unwrap();
        drop(assessor);
        assert_eq!(table.get("case_1", "PLXNA1", "run_1").unwrap(), Some(1));
    }

    #[test]
    fn case_without_known_entities_is_classified() {
        let mut table = RankTable::new();
        let mut assessor =
            Assessor::new(&mut table, EntityKind::Gene, "run_1", Threshold::default());
        let results: Vec<PrioritisationResult> = vec![
            GeneResult::new("GBA1", "ENSG00000177628", 0.9).with_rank(1),
            GeneResult::new("PLXNA1", "ENSG00000114554", 0.7).with_rank(2),
        ]
        .into_iter()
        .map(PrioritisationResult::Gene)
        .collect();
        assessor.assess("case_1", &plxna1(), &results).unwrap();
        assessor.assess("case_2", &[], &results).unwrap();
        let (ranks, classification) = assessor.finish();

        assert_eq!(ranks.total(), 1);
        assert_eq!(ranks.relevant_result_ranks().len(), 1);
        assert_eq!(classification.true_positives(), 0);
        assert_eq!(classification.false_negatives(), 1);
        assert_eq!(classification.false_positives(), 2);
        assert_eq!(classification.true_negatives(), 1);
        assert_eq!(classification.labels().len(), 4);
        assert_eq!(table.case_rows("case_2").count(), 0);
    }
}

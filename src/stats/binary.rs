use crate::ranking::Scored;
use crate::stats::{f64_from_usize, ratio};

/// Confusion matrix of a run, where rank 1 is the only positive prediction
///
/// For every case, each known entity is a true positive if it was ranked
/// first, and a false negative otherwise. All other results of the case
/// are false positives if they are ranked first, and true negatives
/// otherwise.
///
/// In addition, every result is stored as a `(label, score)` pair, which
/// can be used to draw ROC or precision-recall curves.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct BinaryClassificationStats {
    true_positives: usize,
    true_negatives: usize,
    false_positives: usize,
    false_negatives: usize,
    labels: Vec<u8>,
    scores: Vec<f64>,
}

impl BinaryClassificationStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classifies all results of a single case
    ///
    /// `known_ranks` holds the matched rank of every known entity of the
    /// case (`0` if it was not found).
    ///
    /// # Examples
    ///
    /// ```
    /// use phenobench::entity::GeneResult;
    /// use phenobench::BinaryClassificationStats;
    ///
    /// let results = vec![
    ///     GeneResult::new("PLXNA1", "1", 0.88).with_rank(1),
    ///     GeneResult::new("ZNF804B", "2", 0.58).with_rank(2),
    ///     GeneResult::new("SMCO2", "3", 0.58).with_rank(2),
    ///     GeneResult::new("SPNS1", "4", 0.38).with_rank(4),
    /// ];
    ///
    /// let mut stats = BinaryClassificationStats::new();
    /// stats.add_classification(&results, &[1]);
    ///
    /// assert_eq!(stats.true_positives(), 1);
    /// assert_eq!(stats.false_positives(), 0);
    /// assert_eq!(stats.true_negatives(), 3);
    /// assert_eq!(stats.false_negatives(), 0);
    /// ```
    pub fn add_classification<T: Scored>(&mut self, all_results: &[T], known_ranks: &[usize]) {
        for rank in known_ranks {
            if *rank == 1 {
                self.true_positives += 1;
            } else {
                self.false_negatives += 1;
            }
        }

        // every known rank removes at most one result
        let mut leftover: Vec<usize> = all_results.iter().map(Scored::rank).collect();
        for rank in known_ranks {
            if let Some(idx) = leftover.iter().position(|r| r == rank) {
                leftover.remove(idx);
            }
        }

        for rank in leftover {
            if rank == 1 {
                self.false_positives += 1;
            } else {
                self.true_negatives += 1;
            }
        }

        self.add_labels_and_scores(all_results, known_ranks);
    }

    fn add_labels_and_scores<T: Scored>(&mut self, all_results: &[T], known_ranks: &[usize]) {
        let mut pending = known_ranks.to_vec();
        for result in all_results {
            let label = match pending.iter().position(|r| *r == result.rank()) {
                Some(idx) => {
                    pending.swap_remove(idx);
                    1
                }
                None => 0,
            };
            self.labels.push(label);
            self.scores.push(result.score());
        }
    }

    pub fn true_positives(&self) -> usize {
        self.true_positives
    }

    pub fn true_negatives(&self) -> usize {
        self.true_negatives
    }

    pub fn false_positives(&self) -> usize {
        self.false_positives
    }

    pub fn false_negatives(&self) -> usize {
        self.false_negatives
    }

    /// `1` for every result that is a known entity, `0` otherwise
    pub fn labels(&self) -> &[u8] {
        &self.labels
    }

    /// The scores of all results, in the same order as [`Self::labels`]
    pub fn scores(&self) -> &[f64] {
        &self.scores
    }

    /// Sensitivity (recall, true positive rate): TP / (TP + FN)
    pub fn sensitivity(&self) -> f64 {
        ratio(
            self.true_positives,
            self.true_positives + self.false_negatives,
        )
    }

    /// Specificity (true negative rate): TN / (TN + FP)
    pub fn specificity(&self) -> f64 {
        ratio(
            self.true_negatives,
            self.true_negatives + self.false_positives,
        )
    }

    /// Precision (positive predictive value): TP / (TP + FP)
    pub fn precision(&self) -> f64 {
        ratio(
            self.true_positives,
            self.true_positives + self.false_positives,
        )
    }

    /// TN / (TN + FN)
    pub fn negative_predictive_value(&self) -> f64 {
        ratio(
            self.true_negatives,
            self.true_negatives + self.false_negatives,
        )
    }

    /// FP / (FP + TN)
    pub fn false_positive_rate(&self) -> f64 {
        ratio(
            self.false_positives,
            self.false_positives + self.true_negatives,
        )
    }

    /// FP / (FP + TP)
    pub fn false_discovery_rate(&self) -> f64 {
        ratio(
            self.false_positives,
            self.false_positives + self.true_positives,
        )
    }

    /// FN / (FN + TP)
    pub fn false_negative_rate(&self) -> f64 {
        ratio(
            self.false_negatives,
            self.false_negatives + self.true_positives,
        )
    }

    /// (TP + TN) / (TP + FP + TN + FN)
    pub fn accuracy(&self) -> f64 {
        ratio(
            self.true_positives + self.true_negatives,
            self.true_positives + self.false_positives + self.true_negatives + self.false_negatives,
        )
    }

    /// 2TP / (2TP + FP + FN)
    pub fn f1_score(&self) -> f64 {
        ratio(
            2 * self.true_positives,
            2 * self.true_positives + self.false_positives + self.false_negatives,
        )
    }

    /// Matthews correlation coefficient
    pub fn matthews_correlation_coefficient(&self) -> f64 {
        let tp = f64_from_usize(self.true_positives);
        let tn = f64_from_usize(self.true_negatives);
        let fp = f64_from_usize(self.false_positives);
        let fneg = f64_from_usize(self.false_negatives);

        let denominator = ((tp + fp) * (tp + fneg) * (tn + fp) * (tn + fneg)).sqrt();
        if denominator == 0.0 {
            return 0.0;
        }
        (tp * tn - fp * fneg) / denominator
    }
}

#[cfg(test)]
mod test {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::entity::GeneResult;

    fn ranked(ranks: &[usize]) -> Vec<GeneResult> {
        ranks
            .iter()
            .enumerate()
            .map(|(idx, rank)| {
                GeneResult::new(&format!("G{idx}"), "", 1.0 / (idx as f64 + 1.0)).with_rank(*rank)
            })
            .collect()
    }

    #[test]
    fn known_gene_ranked_first() {
        let mut stats = BinaryClassificationStats::new();
        stats.add_classification(&ranked(&[1, 2, 2, 4]), &[1]);
        assert_eq!(stats.true_positives(), 1);
        assert_eq!(stats.false_positives(), 0);
        assert_eq!(stats.true_negatives(), 3);
        assert_eq!(stats.false_negatives(), 0);
        assert_eq!(stats.labels(), &[1, 0, 0, 0]);
        assert_eq!(stats.scores().len(), 4);
    }

    #[test]
    fn known_gene_ranked_second() {
        let mut stats = BinaryClassificationStats::new();
        stats.add_classification(&ranked(&[1, 2, 3]), &[2]);
        assert_eq!(stats.true_positives(), 0);
        assert_eq!(stats.false_negatives(), 1);
        assert_eq!(stats.false_positives(), 1);
        assert_eq!(stats.true_negatives(), 1);
        assert_eq!(stats.labels(), &[0, 1, 0]);
    }

    #[test]
    fn known_gene_not_found() {
        let mut stats = BinaryClassificationStats::new();
        stats.add_classification(&ranked(&[1, 2]), &[0]);
        assert_eq!(stats.false_negatives(), 1);
        assert_eq!(stats.false_positives(), 1);
        assert_eq!(stats.true_negatives(), 1);
        assert_eq!(stats.labels(), &[0, 0]);
    }

    #[test]
    fn repeated_ranks_are_consumed_once() {
        // two known entities tied on rank 2, a third result also on rank 2
        let mut stats = BinaryClassificationStats::new();
        stats.add_classification(&ranked(&[1, 2, 2, 2]), &[2, 2]);
        assert_eq!(stats.false_negatives(), 2);
        assert_eq!(stats.false_positives(), 1);
        assert_eq!(stats.true_negatives(), 1);
        assert_eq!(stats.labels(), &[0, 1, 1, 0]);
    }

    #[test]
    fn empty_results() {
        let mut stats = BinaryClassificationStats::new();
        let results: Vec<GeneResult> = Vec::new();
        stats.add_classification(&results, &[0, 0]);
        assert_eq!(stats.false_negatives(), 2);
        assert_eq!(stats.true_negatives() + stats.false_positives(), 0);
        assert!(stats.labels().is_empty());
    }

    #[test]
    fn confusion_matrix_closure() {
        let mut stats = BinaryClassificationStats::new();
        let cases: [(&[usize], &[usize]); 3] = [
            (&[1, 2, 3, 4], &[1]),
            (&[1, 1, 3], &[3, 0]),
            (&[1, 2, 2, 4, 5], &[2, 5]),
        ];
        let mut known = 0;
        let mut others = 0;
        for (results, known_ranks) in cases {
            stats.add_classification(&ranked(results), known_ranks);
            known += known_ranks.len();
            others += results.len() - known_ranks.iter().filter(|r| **r != 0).count();
        }
        assert_eq!(stats.true_positives() + stats.false_negatives(), known);
        assert_eq!(stats.false_positives() + stats.true_negatives(), others);
    }

    #[test]
    fn derived_metrics() {
        let stats = BinaryClassificationStats {
            true_positives: 6,
            true_negatives: 80,
            false_positives: 4,
            false_negatives: 10,
            labels: Vec::new(),
            scores: Vec::new(),
        };
        assert_abs_diff_eq!(stats.sensitivity(), 0.375);
        assert_abs_diff_eq!(stats.specificity(), 80.0 / 84.0);
        assert_abs_diff_eq!(stats.precision(), 0.6);
        assert_abs_diff_eq!(stats.negative_predictive_value(), 80.0 / 90.0);
        assert_abs_diff_eq!(stats.false_positive_rate(), 4.0 / 84.0);
        assert_abs_diff_eq!(stats.false_discovery_rate(), 0.4);
        assert_abs_diff_eq!(stats.false_negative_rate(), 0.625);
        assert_abs_diff_eq!(stats.accuracy(), 0.86);
        assert_abs_diff_eq!(stats.f1_score(), 12.0 / 26.0);
        assert_abs_diff_eq!(
            stats.matthews_correlation_coefficient(),
            (6.0 * 80.0 - 4.0 * 10.0) / (10.0f64 * 16.0 * 84.0 * 90.0).sqrt(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn empty_stats_are_zero() {
        let stats = BinaryClassificationStats::new();
        assert_eq!(stats.sensitivity(), 0.0);
        assert_eq!(stats.specificity(), 0.0);
        assert_eq!(stats.precision(), 0.0);
        assert_eq!(stats.accuracy(), 0.0);
        assert_eq!(stats.f1_score(), 0.0);
        assert_eq!(stats.matthews_correlation_coefficient(), 0.0);
    }
}

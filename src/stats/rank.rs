use smallvec::SmallVec;
use statrs::statistics::Statistics;

use crate::stats::{f64_from_usize, ratio};
use crate::DEFAULT_NUM_KNOWN;

/// The matched ranks of all known entities of a single case
///
/// A rank of `0` means the entity was not found (or did not pass the
/// score threshold).
pub type CaseRanks = SmallVec<[usize; DEFAULT_NUM_KNOWN]>;

/// Relevance assigned to a known entity when calculating NDCG
const RELEVANCE: f64 = 3.0;

/// Rank based retrieval metrics of a run
///
/// `total` counts all known entities of all assessed cases, `found` only
/// those that were matched with a non-zero rank. All percentages and most
/// ratios use `total` as denominator, so unmatched entities lower the
/// scores.
///
/// The counters satisfy `top <= top3 <= top5 <= top10 <= found <= total`.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RankStats {
    top: usize,
    top3: usize,
    top5: usize,
    top10: usize,
    found: usize,
    total: usize,
    reciprocal_ranks: Vec<f64>,
    relevant_result_ranks: Vec<CaseRanks>,
}

impl RankStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds the statistics from the matched ranks of every case
    ///
    /// This produces the same statistics as assessing the cases one by
    /// one with an [`crate::Assessor`].
    ///
    /// # Examples
    ///
    /// ```
    /// use phenobench::RankStats;
    ///
    /// let stats = RankStats::from_case_ranks(vec![vec![1], vec![4, 0], vec![]]);
    ///
    /// assert_eq!(stats.total(), 3);
    /// assert_eq!(stats.found(), 2);
    /// assert_eq!(stats.top(), 1);
    /// assert_eq!(stats.top5(), 2);
    /// ```
    pub fn from_case_ranks<I, C>(cases: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: IntoIterator<Item = usize>,
    {
        let mut stats = Self::new();
        for case in cases {
            let ranks: CaseRanks = case.into_iter().collect();
            for rank in &ranks {
                stats.add_rank(*rank);
            }
            stats.add_total(ranks.len());
            stats.add_case_ranks(ranks);
        }
        stats
    }

    /// Records the matched rank of a known entity
    ///
    /// Only non-zero ranks are counted, a rank of `0` is ignored. Entities
    /// that were not found are only added to [`RankStats::add_total`].
    pub fn add_rank(&mut self, rank: usize) {
        if rank == 0 {
            return;
        }
        self.reciprocal_ranks.push(1.0 / f64_from_usize(rank));
        self.found += 1;
        if rank == 1 {
            self.top += 1;
        }
        if rank <= 3 {
            self.top3 += 1;
        }
        if rank <= 5 {
            self.top5 += 1;
        }
        if rank <= 10 {
            self.top10 += 1;
        }
    }

    /// Adds the number of known entities of a case
    pub fn add_total(&mut self, known_entities: usize) {
        self.total += known_entities;
    }

    /// Stores the matched ranks of a case for MAP and NDCG
    pub fn add_case_ranks(&mut self, ranks: CaseRanks) {
        self.relevant_result_ranks.push(ranks);
    }

    pub fn top(&self) -> usize {
        self.top
    }

    pub fn top3(&self) -> usize {
        self.top3
    }

    pub fn top5(&self) -> usize {
        self.top5
    }

    pub fn top10(&self) -> usize {
        self.top10
    }

    pub fn found(&self) -> usize {
        self.found
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// The matched ranks of every assessed case
    pub fn relevant_result_ranks(&self) -> &[CaseRanks] {
        &self.relevant_result_ranks
    }

    fn percentage(&self, count: usize) -> f64 {
        100.0 * ratio(count, self.total)
    }

    /// Percentage of all known entities that are ranked first
    pub fn percentage_top(&self) -> f64 {
        self.percentage(self.top)
    }

    /// Percentage of all known entities within the top 3
    pub fn percentage_top3(&self) -> f64 {
        self.percentage(self.top3)
    }

    /// Percentage of all known entities within the top 5
    pub fn percentage_top5(&self) -> f64 {
        self.percentage(self.top5)
    }

    /// Percentage of all known entities within the top 10
    pub fn percentage_top10(&self) -> f64 {
        self.percentage(self.top10)
    }

    /// Percentage of all known entities that were found at all
    pub fn percentage_found(&self) -> f64 {
        self.percentage(self.found)
    }

    /// Number of known entities ranked at or above `k`
    fn found_within(&self, k: usize) -> usize {
        match k {
            1 => self.top,
            3 => self.top3,
            5 => self.top5,
            10 => self.top10,
            _ => self
                .relevant_result_ranks
                .iter()
                .flatten()
                .filter(|rank| **rank > 0 && **rank <= k)
                .count(),
        }
    }

    /// Mean reciprocal rank over all known entities
    ///
    /// Entities that were not found contribute a reciprocal rank of `0`.
    pub fn mean_reciprocal_rank(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        let mut reciprocal_ranks = self.reciprocal_ranks.clone();
        if reciprocal_ranks.len() < self.total {
            reciprocal_ranks.resize(self.total, 0.0);
        }
        reciprocal_ranks.iter().mean()
    }

    /// Precision at `k`
    ///
    /// Calculated as the number of entities ranked within `k`, divided by
    /// `total * k`.
    pub fn precision_at_k(&self, k: usize) -> f64 {
        ratio(self.found_within(k), self.total.saturating_mul(k))
    }

    /// Mean average precision at `k`
    ///
    /// The matched ranks of each case are walked in the order of its known
    /// entities. Every
    /// relevant rank `r <= k` adds `n / r` to the running precision sum of
    /// the case (`n` being the number of relevant ranks seen so far), and
    /// then adds the running average `sum / n` to the overall total. The
    /// total is divided by the number of known entities.
    pub fn mean_average_precision_at_k(&self, k: usize) -> f64 {
        let mut cumulative_average_precision = 0.0;
        for case_ranks in &self.relevant_result_ranks {
            let mut precision_sum = 0.0;
            let mut relevant = 0usize;
            for rank in case_ranks.iter().filter(|rank| **rank > 0 && **rank <= k) {
                relevant += 1;
                precision_sum += f64_from_usize(relevant) / f64_from_usize(*rank);
                cumulative_average_precision += precision_sum / f64_from_usize(relevant);
            }
        }
        if self.total == 0 {
            return 0.0;
        }
        cumulative_average_precision / f64_from_usize(self.total)
    }

    /// F-beta score (beta = 1) at `k`
    ///
    /// Combines [`RankStats::precision_at_k`] with the recall given as
    /// `percentage_at_k`, e.g. [`RankStats::percentage_top3`] for `k = 3`.
    pub fn f_beta_score_at_k(&self, percentage_at_k: f64, k: usize) -> f64 {
        let precision = self.precision_at_k(k);
        let recall = percentage_at_k / 100.0;
        if precision + recall == 0.0 {
            return 0.0;
        }
        2.0 * precision * recall / (precision + recall)
    }

    /// Mean normalised discounted cumulative gain at `k`, averaged over cases
    ///
    /// Every case is turned into a relevance vector of length `k`, with a
    /// relevance of 3 at the position of each matched rank `<= k`. The DCG
    /// of that vector is normalised by the DCG of the same vector sorted
    /// descending. Cases without a matched rank `<= k` score `0`.
    pub fn mean_normalised_discounted_cumulative_gain(&self, k: usize) -> f64 {
        if k == 0 || self.relevant_result_ranks.is_empty() {
            return 0.0;
        }
        self.relevant_result_ranks
            .iter()
            .map(|ranks| ndcg(ranks, k))
            .collect::<Vec<f64>>()
            .mean()
    }
}

/// NDCG at `k` of a single case
fn ndcg(ranks: &[usize], k: usize) -> f64 {
    let mut relevance = vec![0.0; k];
    for rank in ranks.iter().filter(|rank| **rank > 0 && **rank <= k) {
        relevance[rank - 1] = RELEVANCE;
    }
    let dcg = discounted_cumulative_gain(&relevance);

    relevance.sort_by(|a, b| b.total_cmp(a));
    let ideal = discounted_cumulative_gain(&relevance);

    if ideal == 0.0 {
        return 0.0;
    }
    dcg / ideal
}

fn discounted_cumulative_gain(relevance: &[f64]) -> f64 {
    relevance
        .iter()
        .enumerate()
        .map(|(idx, rel)| rel / (f64_from_usize(idx) + 2.0).log2())
        .sum()
}

#[cfg(test)]
mod test {
    use approx::assert_abs_diff_eq;

    use super::*;

    fn stats(cases: &[&[usize]]) -> RankStats {
        RankStats::from_case_ranks(cases.iter().map(|c| c.iter().copied()))
    }

    #[test]
    fn add_rank_counters() {
        let mut stats = RankStats::new();
        for rank in [1, 2, 4, 7, 12] {
            stats.add_rank(rank);
        }
        stats.add_rank(0);
        stats.add_total(6);
        assert_eq!(stats.top(), 1);
        assert_eq!(stats.top3(), 2);
        assert_eq!(stats.top5(), 3);
        assert_eq!(stats.top10(), 4);
        assert_eq!(stats.found(), 5);
        assert_eq!(stats.total(), 6);
    }

    #[test]
    fn counter_invariant() {
        let stats = stats(&[&[1, 0], &[3], &[5, 6, 11], &[0], &[2, 10]]);
        assert!(stats.top() <= stats.top3());
        assert!(stats.top3() <= stats.top5());
        assert!(stats.top5() <= stats.top10());
        assert!(stats.top10() <= stats.found());
        assert!(stats.found() <= stats.total());
        assert!(stats.percentage_found() <= 100.0);
        assert_eq!(stats.total(), 9);
        assert_eq!(stats.found(), 7);
    }

    #[test]
    fn percentages_use_total() {
        let stats = stats(&[&[1], &[2], &[0], &[0]]);
        assert_abs_diff_eq!(stats.percentage_top(), 25.0);
        assert_abs_diff_eq!(stats.percentage_top3(), 50.0);
        assert_abs_diff_eq!(stats.percentage_found(), 50.0);
    }

    #[test]
    fn mean_reciprocal_rank_penalises_missing() {
        let stats = stats(&[&[1], &[2], &[0], &[4]]);
        assert_abs_diff_eq!(
            stats.mean_reciprocal_rank(),
            (1.0 + 0.5 + 0.25) / 4.0,
            epsilon = 1e-12
        );

        let all_first = self::stats(&[&[1], &[1]]);
        assert_abs_diff_eq!(all_first.mean_reciprocal_rank(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn mean_reciprocal_rank_bounds() {
        let stats = stats(&[&[3, 0], &[7], &[1], &[0, 0, 2]]);
        let mrr = stats.mean_reciprocal_rank();
        assert!((0.0..=1.0).contains(&mrr));
        assert!(mrr < ratio(stats.found(), stats.total()));
    }

    #[test]
    fn precision_at_k_divides_by_total_times_k() {
        let stats = stats(&[&[1], &[2], &[3], &[0]]);
        assert_abs_diff_eq!(stats.precision_at_k(1), 0.25);
        assert_abs_diff_eq!(stats.precision_at_k(3), 3.0 / 12.0);
        assert_abs_diff_eq!(stats.precision_at_k(5), 3.0 / 20.0);
        assert_abs_diff_eq!(stats.precision_at_k(2), 2.0 / 8.0);
        assert_eq!(stats.precision_at_k(0), 0.0);
    }

    #[test]
    fn map_single_entity_cases() {
        let stats = stats(&[&[1], &[2], &[0], &[4]]);
        assert_abs_diff_eq!(stats.mean_average_precision_at_k(1), 1.0 / 4.0);
        assert_abs_diff_eq!(stats.mean_average_precision_at_k(3), 1.5 / 4.0);
        assert_abs_diff_eq!(stats.mean_average_precision_at_k(5), 1.75 / 4.0);
    }

    #[test]
    fn map_accumulates_per_relevant_rank() {
        // ranks 3 then 1: precision sum 1/3, then 1/3 + 2/1.
        // totals added: (1/3)/1 and (7/3)/2
        let stats = stats(&[&[3, 1]]);
        assert_abs_diff_eq!(stats.mean_average_precision_at_k(3), 0.75, epsilon = 1e-12);

        // ranks 1 then 3: totals added 1/1 and (5/3)/2
        let ascending = self::stats(&[&[1, 3]]);
        assert_abs_diff_eq!(
            ascending.mean_average_precision_at_k(3),
            11.0 / 12.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn precision_at_large_k() {
        let stats = stats(&[&[1], &[2]]);
        let precision = stats.precision_at_k(usize::MAX);
        assert!(precision > 0.0 && precision < 1e-15);
    }

    #[test]
    fn f_beta() {
        let stats = stats(&[&[1], &[2], &[3], &[0]]);
        let precision = stats.precision_at_k(3);
        let recall = stats.percentage_top3() / 100.0;
        assert_abs_diff_eq!(
            stats.f_beta_score_at_k(stats.percentage_top3(), 3),
            2.0 * precision * recall / (precision + recall)
        );
        assert_eq!(RankStats::new().f_beta_score_at_k(0.0, 3), 0.0);
    }

    #[test]
    fn ndcg_single_case() {
        assert_abs_diff_eq!(ndcg(&[1], 3), 1.0);
        assert_abs_diff_eq!(ndcg(&[2], 3), 1.0 / 3f64.log2(), epsilon = 1e-12);
        assert_abs_diff_eq!(ndcg(&[0], 3), 0.0);
        assert_abs_diff_eq!(ndcg(&[4], 3), 0.0);
        let expected = (1.0 + 1.0 / 4f64.log2()) / (1.0 + 1.0 / 3f64.log2());
        assert_abs_diff_eq!(ndcg(&[1, 3], 3), expected, epsilon = 1e-12);
    }

    #[test]
    fn mean_ndcg_over_cases() {
        let stats = stats(&[&[1], &[0], &[2]]);
        let expected = (1.0 + 0.0 + 1.0 / 3f64.log2()) / 3.0;
        assert_abs_diff_eq!(
            stats.mean_normalised_discounted_cumulative_gain(3),
            expected,
            epsilon = 1e-12
        );
        assert_eq!(stats.mean_normalised_discounted_cumulative_gain(0), 0.0);
    }

    #[test]
    fn empty_stats_are_zero() {
        let stats = RankStats::new();
        assert_eq!(stats.percentage_top(), 0.0);
        assert_eq!(stats.mean_reciprocal_rank(), 0.0);
        assert_eq!(stats.precision_at_k(1), 0.0);
        assert_eq!(stats.mean_average_precision_at_k(10), 0.0);
        assert_eq!(stats.mean_normalised_discounted_cumulative_gain(10), 0.0);
    }
}

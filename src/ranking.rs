//! Best-first ordering and competition ranking of scored results
//!
//! Ranking is done in two steps:
//! 1. [`sort_best_first`] orders the results, ascending or descending,
//!    depending on the [`ScoreOrder`] of the score.
//! 2. [`ScoreRanker`] assigns competition ranks (`1, 1, 1, 4, 5`) to the
//!    sorted scores.
//!
//! [`rank_results`] combines both steps.
//!
//! Scores are compared with exact floating point equality. Two scores are
//! tied only if they are bit-for-bit identical (after rounding with
//! [`round_score`]); no tolerance is applied.
use std::cmp::Ordering;
use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{BenchError, SCORE_DECIMALS};

/// Metric names for which a lower score is better
pub const LOWER_IS_BETTER: [&str; 5] = ["pvalue", "p_value", "p-value", "evalue", "e_value"];

/// Common interface for all results that carry a score and a rank
pub trait Scored {
    /// The score assigned by the prioritisation tool
    fn score(&self) -> f64;

    /// The rank of the result, `0` if it was not ranked yet
    fn rank(&self) -> usize;

    /// Sets the rank of the result
    fn set_rank(&mut self, rank: usize);
}

/// The direction in which scores are ordered best-first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreOrder {
    /// Lower scores are better, e.g. p-values
    Ascending,
    /// Higher scores are better, e.g. similarity or combined scores
    #[default]
    Descending,
}

impl ScoreOrder {
    /// Returns the order for the named ranking metric
    ///
    /// # Examples
    ///
    /// ```
    /// use phenobench::ScoreOrder;
    ///
    /// assert_eq!(ScoreOrder::for_metric("pValue"), ScoreOrder::Ascending);
    /// assert_eq!(ScoreOrder::for_metric("combinedScore"), ScoreOrder::Descending);
    /// ```
    pub fn for_metric(metric: &str) -> Self {
        let metric = metric.to_lowercase();
        if LOWER_IS_BETTER.contains(&metric.as_str()) {
            ScoreOrder::Ascending
        } else {
            ScoreOrder::Descending
        }
    }

    /// Compares two scores so that the better score is `Less`
    pub fn best_first(&self, a: f64, b: f64) -> Ordering {
        match self {
            ScoreOrder::Ascending => a.total_cmp(&b),
            ScoreOrder::Descending => b.total_cmp(&a),
        }
    }
}

impl FromStr for ScoreOrder {
    type Err = BenchError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ascending" => Ok(ScoreOrder::Ascending),
            "descending" => Ok(ScoreOrder::Descending),
            _ => Err(BenchError::Configuration(format!(
                "invalid score order `{s}`, expected `ascending` or `descending`"
            ))),
        }
    }
}

impl Display for ScoreOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScoreOrder::Ascending => write!(f, "ascending"),
            ScoreOrder::Descending => write!(f, "descending"),
        }
    }
}

/// Assigns competition ranks to scores that are sorted best-first
///
/// Equal consecutive scores receive the rank of the first score of the
/// tie-group. The next differing score is ranked by its 1-based position.
///
/// # Examples
///
/// ```
/// use phenobench::ScoreRanker;
///
/// let mut ranker = ScoreRanker::new();
/// let ranks: Vec<usize> = [10.0, 10.0, 10.0, 5.0, 3.0]
///     .into_iter()
///     .map(|score| ranker.check_rank(score))
///     .collect();
///
/// assert_eq!(ranks, vec![1, 1, 1, 4, 5]);
/// ```
#[derive(Debug, Default, Clone)]
pub struct ScoreRanker {
    rank: usize,
    current_score: Option<f64>,
    count: usize,
}

impl ScoreRanker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the rank of the next score
    ///
    /// Ties are detected with exact equality. `NaN` is never tied.
    #[allow(clippy::float_cmp)]
    pub fn check_rank(&mut self, score: f64) -> usize {
        self.count += 1;
        if self.current_score == Some(score) {
            return self.rank;
        }
        self.current_score = Some(score);
        self.rank = self.count;
        self.rank
    }
}

/// Sorts the results best-first
///
/// The sort is stable, tied results keep their input order.
pub fn sort_best_first<T: Scored>(results: &mut [T], order: ScoreOrder) {
    results.sort_by(|a, b| order.best_first(a.score(), b.score()));
}

/// Sorts the results best-first, using the order of the named metric
///
/// See [`ScoreOrder::for_metric`]
pub fn sort_by_metric<T: Scored>(results: &mut [T], metric: &str) {
    sort_best_first(results, ScoreOrder::for_metric(metric));
}

/// Sorts and ranks the results in place
pub fn rank_results<T: Scored>(results: &mut [T], order: ScoreOrder) {
    sort_best_first(results, order);
    let mut ranker = ScoreRanker::new();
    for result in results.iter_mut() {
        let rank = ranker.check_rank(result.score());
        result.set_rank(rank);
    }
}

/// Rounds a score to [`SCORE_DECIMALS`] decimal places
///
/// Halfway cases are rounded away from zero.
pub fn round_score(score: f64) -> f64 {
    let factor = 10f64.powi(SCORE_DECIMALS);
    (score * factor).round() / factor
}

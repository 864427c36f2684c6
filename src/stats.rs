//! Statistics that are accumulated over all cases of a run
//!
//! Each run owns one [`RankStats`] and one [`BinaryClassificationStats`].
//! Both are filled case by case by an [`crate::Assessor`] and are
//! read-only once all cases are assessed.
//!
//! All ratios guard against a zero denominator and return `0.0` instead,
//! so an empty run reports all-zero statistics.

mod binary;
mod rank;

pub use binary::BinaryClassificationStats;
pub use rank::{CaseRanks, RankStats};

/// Divides two counts, returns `0.0` if the denominator is `0`
fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    f64_from_usize(numerator) / f64_from_usize(denominator)
}

/// Counts are converted to `f64` for all ratios. They are far below
/// 2^52, so the conversion is exact.
#[allow(clippy::cast_precision_loss)]
fn f64_from_usize(n: usize) -> f64 {
    n as f64
}

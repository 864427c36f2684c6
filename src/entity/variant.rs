use std::fmt::Display;

use crate::ranking::Scored;

/// A sequence variant in the ranked output of a prioritisation tool
#[derive(Default, Debug, Clone, PartialEq)]
pub struct VariantResult {
    chrom: String,
    pos: u64,
    reference: String,
    alternate: String,
    score: f64,
    rank: usize,
}

impl VariantResult {
    /// Initializes a new, not yet ranked, `VariantResult`
    pub fn new(chrom: &str, pos: u64, reference: &str, alternate: &str, score: f64) -> Self {
        Self {
            chrom: chrom.to_string(),
            pos,
            reference: reference.to_string(),
            alternate: alternate.to_string(),
            score,
            rank: 0,
        }
    }

    /// Sets the rank of the result
    #[must_use]
    pub fn with_rank(mut self, rank: usize) -> Self {
        self.rank = rank;
        self
    }

    pub fn chrom(&self) -> &str {
        &self.chrom
    }

    pub fn pos(&self) -> u64 {
        self.pos
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn alternate(&self) -> &str {
        &self.alternate
    }
}

impl Scored for VariantResult {
    fn score(&self) -> f64 {
        self.score
    }

    fn rank(&self) -> usize {
        self.rank
    }

    fn set_rank(&mut self, rank: usize) {
        self.rank = rank;
    }
}

/// A variant that is known to be causative for a case
///
/// Compound heterozygous cases have more than one known variant.
#[derive(Default, Debug, Clone, PartialEq, Eq, Hash)]
pub struct KnownVariant {
    chrom: String,
    pos: u64,
    reference: String,
    alternate: String,
}

impl KnownVariant {
    pub fn new(chrom: &str, pos: u64, reference: &str, alternate: &str) -> Self {
        Self {
            chrom: chrom.to_string(),
            pos,
            reference: reference.to_string(),
            alternate: alternate.to_string(),
        }
    }

    /// The key of the variant in a rank table, `chrom-pos-ref-alt`
    pub fn key(&self) -> String {
        self.to_string()
    }

    /// Returns `true` if chrom, pos, ref and alt are identical
    pub fn matches(&self, result: &VariantResult) -> bool {
        self.chrom == result.chrom
            && self.pos == result.pos
            && self.reference == result.reference
            && self.alternate == result.alternate
    }
}

impl Display for KnownVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}-{}-{}-{}",
            self.chrom, self.pos, self.reference, self.alternate
        )
    }
}

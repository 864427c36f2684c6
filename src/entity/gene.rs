use crate::entity::list_items;
use crate::ranking::Scored;

/// A gene in the ranked output of a prioritisation tool
///
/// Both `symbol` and `identifier` may contain several values
/// (see [`KnownGene::matches`]).
#[derive(Default, Debug, Clone, PartialEq)]
pub struct GeneResult {
    symbol: String,
    identifier: String,
    score: f64,
    rank: usize,
}

impl GeneResult {
    /// Initializes a new, not yet ranked, `GeneResult`
    pub fn new(symbol: &str, identifier: &str, score: f64) -> Self {
        Self {
            symbol: symbol.to_string(),
            identifier: identifier.to_string(),
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

    /// The gene symbol, e.g. `PLXNA1`
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// The gene identifier, e.g. an ENSEMBL or HGNC ID
    pub fn identifier(&self) -> &str {
        &self.identifier
    }
}

impl Scored for GeneResult {
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

/// A gene that is known to be causative for a case
#[derive(Default, Debug, Clone, PartialEq, Eq, Hash)]
pub struct KnownGene {
    symbol: String,
    identifier: String,
}

impl KnownGene {
    /// Initializes a new `KnownGene`
    pub fn new(symbol: &str, identifier: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            identifier: identifier.to_string(),
        }
    }

    /// The gene symbol
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// The gene identifier
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// The key of the gene in a rank table: the symbol, or the identifier
    /// if no symbol is known
    pub fn key(&self) -> String {
        if self.symbol.is_empty() {
            self.identifier.clone()
        } else {
            self.symbol.clone()
        }
    }

    /// Returns `true` if the result has the same symbol or the same identifier
    ///
    /// # Examples
    ///
    /// ```
    /// use phenobench::entity::{GeneResult, KnownGene};
    ///
    /// let known = KnownGene::new("GBA1", "ENSG00000177628");
    ///
    /// assert!(known.matches(&GeneResult::new("GBA1", "", 0.5)));
    /// assert!(known.matches(&GeneResult::new("GBA", "['ENSG01', 'ENSG00000177628']", 0.5)));
    /// assert!(!known.matches(&GeneResult::new("GBAP1", "ENSG00000160766", 0.5)));
    /// ```
    pub fn matches(&self, result: &GeneResult) -> bool {
        (!self.symbol.is_empty() && list_items(result.symbol()).any(|s| s == self.symbol))
            || (!self.identifier.is_empty()
                && list_items(result.identifier()).any(|id| id == self.identifier))
    }
}

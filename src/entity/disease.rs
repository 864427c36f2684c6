use crate::ranking::Scored;

/// A disease in the ranked output of a prioritisation tool
#[derive(Default, Debug, Clone, PartialEq)]
pub struct DiseaseResult {
    identifier: String,
    name: String,
    score: f64,
    rank: usize,
}

impl DiseaseResult {
    /// Initializes a new, not yet ranked, `DiseaseResult`
    pub fn new(identifier: &str, name: &str, score: f64) -> Self {
        Self {
            identifier: identifier.to_string(),
            name: name.to_string(),
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

    /// The disease identifier, e.g. `OMIM:612567`
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// The name of the disease
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Scored for DiseaseResult {
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

/// The diagnosed disease of a case
#[derive(Default, Debug, Clone, PartialEq, Eq, Hash)]
pub struct KnownDisease {
    identifier: String,
    name: String,
}

impl KnownDisease {
    pub fn new(identifier: &str, name: &str) -> Self {
        Self {
            identifier: identifier.to_string(),
            name: name.to_string(),
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The key of the disease in a rank table, the identifier
    pub fn key(&self) -> String {
        if self.identifier.is_empty() {
            self.name.clone()
        } else {
            self.identifier.clone()
        }
    }

    /// Returns `true` if the result has the same identifier or the same name
    pub fn matches(&self, result: &DiseaseResult) -> bool {
        (!self.identifier.is_empty() && self.identifier == result.identifier)
            || (!self.name.is_empty() && self.name == result.name)
    }
}

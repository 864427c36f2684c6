//! Reading the known causative entities and the standardised results
//!
//! The [`crate::Assessor`] does not read any files itself. It consumes a
//! [`CaseTruthReader`] for the known entities of a case and a
//! [`ResultReader`] for the ranked results of a prioritisation tool.
//! [`KnownEntities`] and [`ResultDirectory`] implement both traits for the
//! TSV files that `phenobench` uses.
use crate::entity::{
    EntityKind, KnownDisease, KnownEntity, KnownGene, KnownVariant, PrioritisationResult,
};
use crate::BenchResult;

mod known;
mod results;

pub use known::KnownEntities;
pub use results::{parse_results, ResultDirectory};

/// Provides the known causative entities of every case
pub trait CaseTruthReader {
    /// The known causative genes of the case
    ///
    /// # Errors
    ///
    /// Returns an error if the known genes cannot be determined
    fn known_genes(&self, case_id: &str) -> BenchResult<Vec<KnownGene>>;

    /// The known causative variants of the case
    ///
    /// # Errors
    ///
    /// Returns an error if the known variants cannot be determined
    fn known_variants(&self, case_id: &str) -> BenchResult<Vec<KnownVariant>>;

    /// The known diagnoses of the case
    ///
    /// # Errors
    ///
    /// Returns an error if the known diseases cannot be determined
    fn known_diseases(&self, case_id: &str) -> BenchResult<Vec<KnownDisease>>;

    /// The known entities of one kind, wrapped as [`KnownEntity`]
    ///
    /// # Errors
    ///
    /// Returns the error of the underlying reader method
    fn known_entities(&self, case_id: &str, kind: EntityKind) -> BenchResult<Vec<KnownEntity>> {
        Ok(match kind {
            EntityKind::Gene => self
                .known_genes(case_id)?
                .into_iter()
                .map(KnownEntity::Gene)
                .collect(),
            EntityKind::Variant => self
                .known_variants(case_id)?
                .into_iter()
                .map(KnownEntity::Variant)
                .collect(),
            EntityKind::Disease => self
                .known_diseases(case_id)?
                .into_iter()
                .map(KnownEntity::Disease)
                .collect(),
        })
    }
}

/// Provides the ranked results of a prioritisation tool
pub trait ResultReader {
    /// The results of one case, ranked best-first
    ///
    /// Implementations must assign ranks if the source does not provide
    /// them. Missing results are returned as an empty list.
    ///
    /// # Errors
    ///
    /// Returns an error if existing results cannot be parsed
    fn read_ranked_results(
        &self,
        case_id: &str,
        kind: EntityKind,
    ) -> BenchResult<Vec<PrioritisationResult>>;
}

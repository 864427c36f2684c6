//! Genes, variants and diseases are the entities that prioritisation tools rank
//!
//! This module contains structs for both sides of a benchmark:
//! - the ranked results of a prioritisation tool ([`GeneResult`],
//!   [`VariantResult`], [`DiseaseResult`]), and
//! - the known causative entities of a case ([`KnownGene`],
//!   [`KnownVariant`], [`KnownDisease`]).
//!
//! The entity types are wrapped in the sum types [`PrioritisationResult`]
//! and [`KnownEntity`], so that the matching of results against known
//! entities can be done with a single code path for all kinds of
//! entities.

use std::fmt::Display;
use std::str::FromStr;

use crate::ranking::Scored;
use crate::BenchError;

mod disease;
mod gene;
mod variant;
pub use disease::{DiseaseResult, KnownDisease};
pub use gene::{GeneResult, KnownGene};
pub use variant::{KnownVariant, VariantResult};

/// The kind of entity that is prioritised
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    /// Genes, identified by symbol or identifier
    Gene,
    /// Sequence variants, identified by chrom, pos, ref and alt
    Variant,
    /// Diseases, identified by identifier or name
    Disease,
}

impl EntityKind {
    /// All kinds, in the order they are reported
    pub const ALL: [EntityKind; 3] = [EntityKind::Gene, EntityKind::Variant, EntityKind::Disease];

    /// Lowercase name of the kind, as used in file names
    pub fn name(&self) -> &'static str {
        match self {
            EntityKind::Gene => "gene",
            EntityKind::Variant => "variant",
            EntityKind::Disease => "disease",
        }
    }

    /// Name of the directory with the standardised results of this kind
    ///
    /// ```
    /// use phenobench::EntityKind;
    ///
    /// assert_eq!(EntityKind::Variant.results_dir_name(), "pheval_variant_results");
    /// ```
    pub fn results_dir_name(&self) -> String {
        format!("pheval_{}_results", self.name())
    }

    /// Name of the standardised result file of a single case
    pub fn result_file_name(&self, case_id: &str) -> String {
        format!("{}-pheval_{}_result.tsv", case_id, self.name())
    }

    /// Name of the file holding the known entities of all cases
    pub fn known_file_name(&self) -> &'static str {
        match self {
            EntityKind::Gene => "known_genes.tsv",
            EntityKind::Variant => "known_variants.tsv",
            EntityKind::Disease => "known_diseases.tsv",
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for EntityKind {
    type Err = BenchError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gene" | "genes" => Ok(EntityKind::Gene),
            "variant" | "variants" => Ok(EntityKind::Variant),
            "disease" | "diseases" => Ok(EntityKind::Disease),
            _ => Err(BenchError::InvalidInput(format!("unknown entity kind `{s}`"))),
        }
    }
}

/// A single entry of a ranked result list of one case
#[derive(Debug, Clone, PartialEq)]
pub enum PrioritisationResult {
    /// A ranked gene
    Gene(GeneResult),
    /// A ranked variant
    Variant(VariantResult),
    /// A ranked disease
    Disease(DiseaseResult),
}

impl PrioritisationResult {
    /// The kind of the wrapped result
    pub fn kind(&self) -> EntityKind {
        match self {
            PrioritisationResult::Gene(_) => EntityKind::Gene,
            PrioritisationResult::Variant(_) => EntityKind::Variant,
            PrioritisationResult::Disease(_) => EntityKind::Disease,
        }
    }
}

impl Scored for PrioritisationResult {
    fn score(&self) -> f64 {
        match self {
            PrioritisationResult::Gene(gene) => gene.score(),
            PrioritisationResult::Variant(variant) => variant.score(),
            PrioritisationResult::Disease(disease) => disease.score(),
        }
    }

    fn rank(&self) -> usize {
        match self {
            PrioritisationResult::Gene(gene) => gene.rank(),
            PrioritisationResult::Variant(variant) => variant.rank(),
            PrioritisationResult::Disease(disease) => disease.rank(),
        }
    }

    fn set_rank(&mut self, rank: usize) {
        match self {
            PrioritisationResult::Gene(gene) => gene.set_rank(rank),
            PrioritisationResult::Variant(variant) => variant.set_rank(rank),
            PrioritisationResult::Disease(disease) => disease.set_rank(rank),
        }
    }
}

/// A known causative entity of a case
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KnownEntity {
    /// A causative gene
    Gene(KnownGene),
    /// A causative variant
    Variant(KnownVariant),
    /// A causative disease (the diagnosis)
    Disease(KnownDisease),
}

impl KnownEntity {
    /// The kind of the wrapped entity
    pub fn kind(&self) -> EntityKind {
        match self {
            KnownEntity::Gene(_) => EntityKind::Gene,
            KnownEntity::Variant(_) => EntityKind::Variant,
            KnownEntity::Disease(_) => EntityKind::Disease,
        }
    }

    /// The key of the entity in a [`crate::RankTable`]
    pub fn key(&self) -> String {
        match self {
            KnownEntity::Gene(gene) => gene.key(),
            KnownEntity::Variant(variant) => variant.key(),
            KnownEntity::Disease(disease) => disease.key(),
        }
    }

    /// Returns `true` if the result identifies the same real-world entity
    ///
    /// Results of a different kind never match.
    pub fn matches(&self, result: &PrioritisationResult) -> bool {
        match (self, result) {
            (KnownEntity::Gene(known), PrioritisationResult::Gene(result)) => known.matches(result),
            (KnownEntity::Variant(known), PrioritisationResult::Variant(result)) => {
                known.matches(result)
            }
            (KnownEntity::Disease(known), PrioritisationResult::Disease(result)) => {
                known.matches(result)
            }
            _ => false,
        }
    }
}

/// Iterates the items of a result field that may hold several values
///
/// Some tools report multiple identifiers in a single column, either as a
/// plain delimited list (`A,B` or `A|B`) or in the style of a serialised
/// list (`['A', 'B']`). Empty items are skipped.
pub(crate) fn list_items(field: &str) -> impl Iterator<Item = &str> {
    field
        .trim()
        .trim_start_matches('[')
        .trim_end_matches(']')
        .split([',', '|', ';'])
        .map(|item| item.trim().trim_matches(|c| c == '\'' || c == '"').trim())
        .filter(|item| !item.is_empty())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn list_items_plain() {
        let items: Vec<&str> = list_items("ENSG01").collect();
        assert_eq!(items, vec!["ENSG01"]);
    }

    #[test]
    fn list_items_encoded() {
        let items: Vec<&str> = list_items("['ENSG01', \"ENSG02\"]").collect();
        assert_eq!(items, vec!["ENSG01", "ENSG02"]);

        let items: Vec<&str> = list_items("ENSG01|ENSG02,,").collect();
        assert_eq!(items, vec!["ENSG01", "ENSG02"]);
    }

    #[test]
    fn list_items_empty() {
        assert!(list_items("").next().is_none());
        assert!(list_items("[]").next().is_none());
    }

    #[test]
    fn kinds_never_cross_match() {
        let known = KnownEntity::Gene(KnownGene::new("OMIM:1", "OMIM:1"));
        let result = PrioritisationResult::Disease(DiseaseResult::new("OMIM:1", "OMIM:1", 1.0));
        assert!(!known.matches(&result));
    }

    #[test]
    fn file_names() {
        assert_eq!(
            EntityKind::Gene.result_file_name("patient_1"),
            "patient_1-pheval_gene_result.tsv"
        );
        assert_eq!(EntityKind::Disease.known_file_name(), "known_diseases.tsv");
        assert_eq!(EntityKind::Disease.to_string(), "disease");
        assert_eq!("Variants".parse::<EntityKind>().unwrap(), EntityKind::Variant);
        assert!("protein".parse::<EntityKind>().is_err());
    }
}

//! `phenobench` benchmarks the output of phenotype-driven prioritisation tools
//!
//! Prioritisation tools rank candidate genes, variants or diseases for a
//! patient case. `phenobench` compares those ranked lists against the known
//! causative entities of each case and aggregates rank-based accuracy
//! statistics over all cases of a run:
//!
//! - top-N counts and percentages, mean reciprocal rank
//! - precision@k, mean average precision@k, F-beta@k and NDCG@k
//! - a confusion matrix (rank 1 is a positive prediction) with the
//!   derived binary classification metrics
//!
//! Multiple runs over the same cases can be compared to each other, which
//! reports for every known entity whether it was gained, lost or moved.
//!
//! # Examples
//!
//! ```
//! use phenobench::assess::{Assessor, Threshold};
//! use phenobench::entity::{EntityKind, GeneResult, KnownEntity, KnownGene, PrioritisationResult};
//! use phenobench::table::RankTable;
//!
//! let mut table = RankTable::new();
//! let mut assessor = Assessor::new(&mut table, EntityKind::Gene, "run_1", Threshold::default());
//!
//! let known = vec![KnownEntity::Gene(KnownGene::new("PLXNA1", "ENSG00000114554"))];
//! let results = vec![
//!     PrioritisationResult::Gene(GeneResult::new("PLXNA1", "ENSG00000114554", 0.88).with_rank(1)),
//!     PrioritisationResult::Gene(GeneResult::new("ZNF804B", "ENSG00000182348", 0.58).with_rank(2)),
//! ];
//!
//! assessor.assess("case_1", &known, &results).unwrap();
//! let (rank_stats, classification) = assessor.finish();
//!
//! assert_eq!(rank_stats.top(), 1);
//! assert_eq!(classification.true_positives(), 1);
//! assert_eq!(table.get("case_1", "PLXNA1", "run_1").unwrap(), Some(1));
//! ```
use std::num::{ParseFloatError, ParseIntError};

use thiserror::Error;

pub mod assess;
pub mod benchmark;
pub mod comparison;
pub mod config;
pub mod entity;
pub mod parser;
pub mod ranking;
pub mod stats;
pub mod summary;
pub mod table;
pub mod utils;

pub use assess::{Assessor, Threshold};
pub use benchmark::{run_benchmark, BenchmarkReport};
pub use config::BenchmarkConfig;
pub use entity::EntityKind;
pub use ranking::{ScoreOrder, ScoreRanker};
pub use stats::{BinaryClassificationStats, RankStats};
pub use table::RankTable;

/// Scores are rounded to this number of decimal places before they are ranked
pub const SCORE_DECIMALS: i32 = 4;

/// Most cases have one or two causative entities
const DEFAULT_NUM_KNOWN: usize = 2;

/// Main Error type for this crate
#[derive(Error, Debug)]
pub enum BenchError {
    /// The benchmark configuration is invalid
    #[error("invalid configuration: {0}")]
    Configuration(String),
    /// A file could not be opened or read
    #[error("unable to open file {0}")]
    CannotOpenFile(String),
    /// A file could not be created or written
    #[error("unable to write file {0}")]
    CannotWriteFile(String),
    /// A line of an input file is not valid
    #[error("invalid data: {0}")]
    InvalidInput(String),
    /// The known causative entities of a case cannot be parsed
    #[error("malformed case record `{case_id}`: {reason}")]
    MalformedCaseRecord {
        /// The affected case
        case_id: String,
        /// Description of the problem
        reason: String,
    },
    /// A case record was created for a different genome assembly
    #[error("case `{case_id}` uses assembly {found}, but the run expects {expected}")]
    IncompatibleAssembly {
        /// The affected case
        case_id: String,
        /// Assembly of the run
        expected: String,
        /// Assembly of the case record
        found: String,
    },
    /// The rank table does not contain the requested column
    #[error("rank table has no column `{0}`")]
    UnknownColumn(String),
    /// A run was aborted
    #[error("run `{run}` failed: {source}")]
    RunFailed {
        /// Identifier of the failed run
        run: String,
        /// The error that aborted the run
        #[source]
        source: Box<BenchError>,
    },
}

impl From<ParseIntError> for BenchError {
    fn from(err: ParseIntError) -> Self {
        BenchError::InvalidInput(format!("unable to parse integer: {err}"))
    }
}

impl From<ParseFloatError> for BenchError {
    fn from(err: ParseFloatError) -> Self {
        BenchError::InvalidInput(format!("unable to parse score: {err}"))
    }
}

/// Shortcut for `Result<T, BenchError>`
pub type BenchResult<T> = Result<T, BenchError>;

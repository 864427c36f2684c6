//! Comparison of matched ranks between runs
//!
//! For every known entity, the ranks of two runs are compared:
//!
//! | run 1 | run 2 | comparison |
//! |-------|-------|------------|
//! | 0     | 5     | `GAINED`   |
//! | 3     | 0     | `LOST`     |
//! | 3     | 1     | `2`        |
//!
//! A positive delta means that the entity moved up in the second run.
use std::fmt::Display;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::debug;

use crate::table::RankTable;
use crate::utils::Combinations;
use crate::{BenchError, BenchResult};

/// The change of a matched rank between two runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankDelta {
    /// Not found in the first run, but found in the second one
    Gained,
    /// Found in the first run, but not in the second one
    Lost,
    /// `rank_1 - rank_2`, `0` if both runs did not find the entity
    Delta(i64),
}

impl RankDelta {
    /// Compares the rank of the first run with the rank of the second run
    ///
    /// # Examples
    ///
    /// ```
    /// use phenobench::comparison::RankDelta;
    ///
    /// assert_eq!(RankDelta::between(0, 5), RankDelta::Gained);
    /// assert_eq!(RankDelta::between(3, 0), RankDelta::Lost);
    /// assert_eq!(RankDelta::between(3, 1), RankDelta::Delta(2));
    /// ```
    #[allow(clippy::cast_possible_wrap)]
    pub fn between(rank_1: usize, rank_2: usize) -> Self {
        match (rank_1, rank_2) {
            (0, r) if r != 0 => RankDelta::Gained,
            (r, 0) if r != 0 => RankDelta::Lost,
            (r1, r2) => RankDelta::Delta(r1 as i64 - r2 as i64),
        }
    }
}

impl Display for RankDelta {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RankDelta::Gained => write!(f, "GAINED"),
            RankDelta::Lost => write!(f, "LOST"),
            RankDelta::Delta(delta) => write!(f, "{delta}"),
        }
    }
}

/// The comparison of a single `(case_id, entity)` row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonRow {
    pub case_id: String,
    pub entity: String,
    pub rank_1: usize,
    pub rank_2: usize,
    pub delta: RankDelta,
}

/// Row-wise comparison of two columns of a [`RankTable`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankComparison {
    run_1: String,
    run_2: String,
    rows: Vec<ComparisonRow>,
}

impl RankComparison {
    /// Compares the ranks of `run_1` against `run_2`
    ///
    /// # Errors
    ///
    /// [`BenchError::UnknownColumn`] if the table misses one of the runs
    pub fn new(table: &RankTable, run_1: &str, run_2: &str) -> BenchResult<Self> {
        let first = table.column(run_1)?;
        let second = table.column(run_2)?;

        let rows: Vec<ComparisonRow> = first
            .into_iter()
            .zip(second)
            .map(|((case_id, entity, rank_1), (_, _, rank_2))| ComparisonRow {
                case_id: case_id.to_string(),
                entity: entity.to_string(),
                rank_1,
                rank_2,
                delta: RankDelta::between(rank_1, rank_2),
            })
            .collect();

        debug!("Compared {run_1} with {run_2}: {} rows", rows.len());
        Ok(Self {
            run_1: run_1.to_string(),
            run_2: run_2.to_string(),
            rows,
        })
    }

    pub fn run_1(&self) -> &str {
        &self.run_1
    }

    pub fn run_2(&self) -> &str {
        &self.run_2
    }

    pub fn rows(&self) -> &[ComparisonRow] {
        &self.rows
    }

    /// Number of entities that were only found by the second run
    pub fn gained(&self) -> usize {
        self.rows
            .iter()
            .filter(|row| row.delta == RankDelta::Gained)
            .count()
    }

    /// Number of entities that were only found by the first run
    pub fn lost(&self) -> usize {
        self.rows
            .iter()
            .filter(|row| row.delta == RankDelta::Lost)
            .count()
    }

    /// Writes the comparison as TSV
    ///
    /// # Errors
    ///
    /// Returns the underlying IO error
    pub fn write_tsv<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        writeln!(
            writer,
            "case_id\tentity\t{}\t{}\tcomparison",
            self.run_1, self.run_2
        )?;
        for row in &self.rows {
            writeln!(
                writer,
                "{}\t{}\t{}\t{}\t{}",
                row.case_id, row.entity, row.rank_1, row.rank_2, row.delta
            )?;
        }
        Ok(())
    }

    /// Writes the comparison to a TSV file
    ///
    /// # Errors
    ///
    /// [`BenchError::CannotWriteFile`] if the file cannot be created or written
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> BenchResult<()> {
        let filename = path.as_ref().display().to_string();
        let file = File::create(path).map_err(|_| BenchError::CannotWriteFile(filename.clone()))?;
        let mut writer = BufWriter::new(file);
        self.write_tsv(&mut writer)
            .and_then(|()| writer.flush())
            .map_err(|_| BenchError::CannotWriteFile(filename))
    }
}

/// Compares every pair of runs, in the given order
///
/// For `n` runs, this returns `n * (n - 1) / 2` comparisons.
///
/// # Errors
///
/// [`BenchError::UnknownColumn`] if the table misses one of the runs
pub fn pairwise_comparisons(table: &RankTable, runs: &[String]) -> BenchResult<Vec<RankComparison>> {
    Combinations::new(runs)
        .map(|(run_1, run_2)| RankComparison::new(table, run_1, run_2))
        .collect()
}

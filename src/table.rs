//! Persistent storage of matched ranks
//!
//! A [`RankTable`] stores one row per `(case_id, entity)` pair and one
//! column per run. Every value defaults to `0` (not found). Cases are
//! ordered by id, the rows of a case keep the order in which they were
//! added. Tables are persisted as TSV files:
//!
//! ```text
//! case_id     entity  run_1   run_2
//! patient_1   PLXNA1  1       3
//! patient_2   GBA1    0       12
//! ```
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use tracing::{debug, error};

use crate::stats::CaseRanks;
use crate::{BenchError, BenchResult};

/// The `(entity, values)` rows of a single case, in insertion order
type CaseRows = Vec<(String, Vec<usize>)>;

/// In-memory rank table, keyed by case and entity
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RankTable {
    columns: Vec<String>,
    rows: BTreeMap<String, CaseRows>,
}

impl RankTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The names of all rank columns
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Adds a new column, with a value of `0` for every row
    ///
    /// Adding an existing column does nothing and returns `false`.
    pub fn add_column(&mut self, name: &str) -> bool {
        if self.columns.iter().any(|col| col == name) {
            return false;
        }
        self.columns.push(name.to_string());
        for (_, values) in self.rows.values_mut().flatten() {
            values.push(0);
        }
        true
    }

    fn column_index(&self, name: &str) -> BenchResult<usize> {
        self.columns
            .iter()
            .position(|col| col == name)
            .ok_or_else(|| BenchError::UnknownColumn(name.to_string()))
    }

    fn row_mut(&mut self, case_id: &str, entity: &str) -> &mut Vec<usize> {
        let width = self.columns.len();
        let rows = self.rows.entry(case_id.to_string()).or_default();
        let idx = match rows.iter().position(|(name, _)| name == entity) {
            Some(idx) => idx,
            None => {
                rows.push((entity.to_string(), vec![0; width]));
                rows.len() - 1
            }
        };
        &mut rows[idx].1
    }

    /// Adds a row with default values, unless it exists already
    pub fn ensure_row(&mut self, case_id: &str, entity: &str) {
        self.row_mut(case_id, entity);
    }

    /// Sets the value of a single cell, adding the row if needed
    ///
    /// # Errors
    ///
    /// [`BenchError::UnknownColumn`] if the column does not exist
    pub fn update(
        &mut self,
        case_id: &str,
        entity: &str,
        column: &str,
        value: usize,
    ) -> BenchResult<()> {
        let idx = self.column_index(column)?;
        self.row_mut(case_id, entity)[idx] = value;
        Ok(())
    }

    /// Returns the value of a single cell, `None` if the row does not exist
    ///
    /// # Errors
    ///
    /// [`BenchError::UnknownColumn`] if the column does not exist
    pub fn get(&self, case_id: &str, entity: &str, column: &str) -> BenchResult<Option<usize>> {
        let idx = self.column_index(column)?;
        Ok(self
            .rows
            .get(case_id)
            .and_then(|rows| rows.iter().find(|(name, _)| name == entity))
            .map(|(_, values)| values[idx]))
    }

    /// Iterates all rows of a single case as `(entity, values)`, in
    /// insertion order
    pub fn case_rows<'a>(&'a self, case_id: &str) -> impl Iterator<Item = (&'a str, &'a [usize])> {
        self.rows
            .get(case_id)
            .into_iter()
            .flatten()
            .map(|(entity, values)| (entity.as_str(), values.as_slice()))
    }

    fn iter_rows(&self) -> impl Iterator<Item = (&str, &str, &[usize])> {
        self.rows.iter().flat_map(|(case, rows)| {
            rows.iter()
                .map(move |(entity, values)| (case.as_str(), entity.as_str(), values.as_slice()))
        })
    }

    /// All values of a column as `(case_id, entity, value)`, in row order
    ///
    /// # Errors
    ///
    /// [`BenchError::UnknownColumn`] if the column does not exist
    pub fn column(&self, name: &str) -> BenchResult<Vec<(&str, &str, usize)>> {
        let idx = self.column_index(name)?;
        Ok(self
            .iter_rows()
            .map(|(case, entity, values)| (case, entity, values[idx]))
            .collect())
    }

    /// The values of a column, grouped by case
    ///
    /// The ranks of a case are in the order their rows were added.
    ///
    /// # Errors
    ///
    /// [`BenchError::UnknownColumn`] if the column does not exist
    pub fn case_ranks(&self, name: &str) -> BenchResult<Vec<(String, CaseRanks)>> {
        let mut res: Vec<(String, CaseRanks)> = Vec::new();
        for (case, _, value) in self.column(name)? {
            match res.last_mut() {
                Some((last, ranks)) if last.as_str() == case => ranks.push(value),
                _ => res.push((case.to_string(), CaseRanks::from_elem(value, 1))),
            }
        }
        Ok(res)
    }

    /// Copies a column from another table into this table
    ///
    /// The column is added if needed, missing rows are added with default
    /// values.
    ///
    /// # Errors
    ///
    /// [`BenchError::UnknownColumn`] if `other` does not have the column
    pub fn merge_column(&mut self, other: &RankTable, name: &str) -> BenchResult<()> {
        let values = other.column(name)?;
        self.add_column(name);
        for (case, entity, value) in values {
            self.update(case, entity, name, value)?;
        }
        Ok(())
    }

    /// Writes the table as TSV
    ///
    /// # Errors
    ///
    /// Returns the underlying IO error
    pub fn write_tsv<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        write!(writer, "case_id\tentity")?;
        for column in &self.columns {
            write!(writer, "\t{column}")?;
        }
        writeln!(writer)?;

        for (case, entity, values) in self.iter_rows() {
            write!(writer, "{case}\t{entity}")?;
            for value in values {
                write!(writer, "\t{value}")?;
            }
            writeln!(writer)?;
        }
        Ok(())
    }

    /// Writes the table to a TSV file
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

    /// Reads a table from TSV
    ///
    /// # Errors
    ///
    /// [`BenchError::InvalidInput`] if the header or a row is malformed
    pub fn read_tsv<R: BufRead>(reader: R) -> BenchResult<Self> {
        let mut lines = reader.lines();
        let header = match lines.next() {
            Some(Ok(header)) => header,
            _ => {
                error!("Rank table has no header");
                return Err(BenchError::InvalidInput("missing rank table header".to_string()));
            }
        };

        let mut cols = header.trim_end().split('\t');
        if cols.next() != Some("case_id") || cols.next() != Some("entity") {
            return Err(BenchError::InvalidInput(format!(
                "invalid rank table header: {header}"
            )));
        }

        let mut table = RankTable::new();
        for column in cols {
            if !table.add_column(column) {
                return Err(BenchError::InvalidInput(format!(
                    "duplicate rank table column `{column}`"
                )));
            }
        }

        for line in lines {
            let line = line.map_err(|_| {
                BenchError::InvalidInput("Invalid data in rank table".to_string())
            })?;
            if line.trim().is_empty() {
                continue;
            }
            table.parse_row(&line)?;
        }
        debug!("Read rank table with {} rows", table.len());
        Ok(table)
    }

    fn parse_row(&mut self, line: &str) -> BenchResult<()> {
        let mut cols = line.trim_end_matches(['\r', '\n']).split('\t');

        let Some(case_id) = cols.next() else {
            return Err(BenchError::InvalidInput(line.to_string()));
        };
        let Some(entity) = cols.next() else {
            return Err(BenchError::InvalidInput(line.to_string()));
        };

        let values = cols
            .map(str::parse::<usize>)
            .collect::<Result<Vec<usize>, _>>()?;
        if values.len() != self.columns.len() {
            return Err(BenchError::InvalidInput(line.to_string()));
        }
        *self.row_mut(case_id, entity) = values;
        Ok(())
    }

    /// Reads a table from a TSV file
    ///
    /// # Errors
    ///
    /// [`BenchError::CannotOpenFile`] if the file cannot be opened and
    /// [`BenchError::InvalidInput`] if it is malformed
    pub fn from_file<P: AsRef<Path>>(path: P) -> BenchResult<Self> {
        let filename = path.as_ref().display().to_string();
        let file = File::open(path).map_err(|_| BenchError::CannotOpenFile(filename))?;
        Self::read_tsv(BufReader::new(file))
    }
}

use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::PathBuf;

use tracing::{debug, error, warn};

use crate::entity::{DiseaseResult, EntityKind, GeneResult, PrioritisationResult, VariantResult};
use crate::parser::ResultReader;
use crate::ranking::{rank_results, round_score, ScoreOrder, Scored};
use crate::{BenchError, BenchResult};

/// Columns that identify the entity of a result row
fn entity_columns(kind: EntityKind) -> &'static [&'static str] {
    match kind {
        EntityKind::Gene => &["gene_symbol", "gene_identifier"],
        EntityKind::Variant => &["chrom", "pos", "ref", "alt"],
        EntityKind::Disease => &["disease_identifier", "disease_name"],
    }
}

/// Positions of the required and optional columns in a result file
struct Header {
    entity: Vec<usize>,
    score: usize,
    rank: Option<usize>,
}

impl Header {
    fn parse(line: &str, kind: EntityKind) -> BenchResult<Self> {
        let names: Vec<&str> = line.trim_end().split('\t').map(str::trim).collect();
        let position = |name: &str| names.iter().position(|col| *col == name);
        let required = |name: &str| {
            position(name).ok_or_else(|| {
                error!("Result file for {kind} has no `{name}` column");
                BenchError::InvalidInput(format!("missing column `{name}` in {kind} results"))
            })
        };

        Ok(Self {
            entity: entity_columns(kind)
                .iter()
                .copied()
                .map(|name| required(name))
                .collect::<BenchResult<Vec<usize>>>()?,
            score: required("score")?,
            rank: position("rank"),
        })
    }
}

fn parse_line(line: &str, header: &Header, kind: EntityKind) -> BenchResult<PrioritisationResult> {
    let cells: Vec<&str> = line.split('\t').map(str::trim).collect();
    let cell = |idx: usize| {
        cells
            .get(idx)
            .copied()
            .ok_or_else(|| BenchError::InvalidInput(line.to_string()))
    };
    let entity = |n: usize| cell(header.entity[n]);

    let score = round_score(cell(header.score)?.parse::<f64>()?);
    let rank = match header
        .rank
        .and_then(|idx| cells.get(idx).copied())
        .filter(|rank| !rank.is_empty())
    {
        Some(rank) => rank.parse::<usize>()?,
        None => 0,
    };

    Ok(match kind {
        EntityKind::Gene => PrioritisationResult::Gene(
            GeneResult::new(entity(0)?, entity(1)?, score).with_rank(rank),
        ),
        EntityKind::Variant => PrioritisationResult::Variant(
            VariantResult::new(
                entity(0)?,
                entity(1)?.parse::<u64>()?,
                entity(2)?,
                entity(3)?,
                score,
            )
            .with_rank(rank),
        ),
        EntityKind::Disease => PrioritisationResult::Disease(
            DiseaseResult::new(entity(0)?, entity(1)?, score).with_rank(rank),
        ),
    })
}

/// Parses a standardised result file
///
/// Scores are rounded to [`crate::SCORE_DECIMALS`] decimal places. If the
/// file has no `rank` column, or any row lacks a rank, all results are
/// sorted best-first according to `order` and ranked again. Otherwise the
/// results are ordered by their rank.
///
/// # Errors
///
/// [`BenchError::InvalidInput`] if the header misses a required column or
/// a row cannot be parsed
///
/// # Examples
///
/// ```
/// use phenobench::parser::parse_results;
/// use phenobench::ranking::Scored;
/// use phenobench::{EntityKind, ScoreOrder};
///
/// let tsv = "gene_symbol\tgene_identifier\tscore
/// SPNS1\tENSG00000169682\t0.38
/// PLXNA1\tENSG00000114554\t0.88
/// ZNF804B\tENSG00000182348\t0.58
/// SMCO2\tENSG00000165935\t0.58
/// ";
/// let results = parse_results(tsv.as_bytes(), EntityKind::Gene, ScoreOrder::Descending).unwrap();
/// let ranks: Vec<usize> = results.iter().map(Scored::rank).collect();
///
/// assert_eq!(ranks, vec![1, 2, 2, 4]);
/// ```
pub fn parse_results<R: BufRead>(
    reader: R,
    kind: EntityKind,
    order: ScoreOrder,
) -> BenchResult<Vec<PrioritisationResult>> {
    let mut lines = reader.lines();
    let header = match lines.next() {
        Some(Ok(line)) => Header::parse(&line, kind)?,
        Some(Err(_)) => {
            return Err(BenchError::InvalidInput(format!(
                "Invalid data in {kind} results"
            )))
        }
        None => return Ok(Vec::new()),
    };

    let mut results = Vec::new();
    let mut needs_ranking = header.rank.is_none();
    for line in lines {
        let line = line
            .map_err(|_| BenchError::InvalidInput(format!("Invalid data in {kind} results")))?;
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }
        let result = parse_line(line, &header, kind).map_err(|err| {
            error!("Invalid result line: {line}");
            err
        })?;
        needs_ranking |= result.rank() == 0;
        results.push(result);
    }

    if needs_ranking {
        rank_results(&mut results, order);
    } else {
        results.sort_by_key(Scored::rank);
    }
    Ok(results)
}

/// The standardised results of one run
///
/// Results are stored per kind and case:
/// `<root>/pheval_<kind>_results/<case_id>-pheval_<kind>_result.tsv`
#[derive(Debug, Clone)]
pub struct ResultDirectory {
    root: PathBuf,
    order: ScoreOrder,
}

impl ResultDirectory {
    /// `order` is used to rank results that are not ranked yet
    pub fn new<P: Into<PathBuf>>(root: P, order: ScoreOrder) -> Self {
        Self {
            root: root.into(),
            order,
        }
    }

    /// The path of the result file of a case
    pub fn result_path(&self, case_id: &str, kind: EntityKind) -> PathBuf {
        self.root
            .join(kind.results_dir_name())
            .join(kind.result_file_name(case_id))
    }
}

impl ResultReader for ResultDirectory {
    fn read_ranked_results(
        &self,
        case_id: &str,
        kind: EntityKind,
    ) -> BenchResult<Vec<PrioritisationResult>> {
        let path = self.result_path(case_id, kind);
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                warn!("No {kind} results for {case_id}: {}", path.display());
                return Ok(Vec::new());
            }
            Err(_) => return Err(BenchError::CannotOpenFile(path.display().to_string())),
        };
        let results = parse_results(BufReader::new(file), kind, self.order)?;
        debug!("Read {} {kind} results for {case_id}", results.len());
        Ok(results)
    }
}

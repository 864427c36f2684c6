use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::{error, info};

use crate::config::Assembly;
use crate::entity::{EntityKind, KnownDisease, KnownGene, KnownVariant};
use crate::parser::CaseTruthReader;
use crate::{BenchError, BenchResult};

/// The known causative entities of all cases of a case directory
///
/// Every kind of entity is stored in its own TSV file with a header line:
///
/// | file                 | columns                                            |
/// |----------------------|----------------------------------------------------|
/// | `known_genes.tsv`    | `case_id gene_symbol gene_identifier`              |
/// | `known_variants.tsv` | `case_id chrom pos ref alt [assembly]`             |
/// | `known_diseases.tsv` | `case_id disease_identifier disease_name`          |
///
/// A case may be listed on several lines, once per known entity.
#[derive(Debug, Default, Clone)]
pub struct KnownEntities {
    case_ids: Vec<String>,
    genes: HashMap<String, Vec<KnownGene>>,
    variants: HashMap<String, Vec<KnownVariant>>,
    diseases: HashMap<String, Vec<KnownDisease>>,
}

fn malformed(case_id: &str, reason: &str) -> BenchError {
    error!("Malformed case record {case_id}: {reason}");
    BenchError::MalformedCaseRecord {
        case_id: case_id.to_string(),
        reason: reason.to_string(),
    }
}

impl KnownEntities {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the files of all `kinds` from the case directory
    ///
    /// # Errors
    ///
    /// - [`BenchError::CannotOpenFile`] if a file does not exist
    /// - [`BenchError::MalformedCaseRecord`] if a row cannot be parsed
    /// - [`BenchError::IncompatibleAssembly`] if a variant was called on a
    ///   different assembly than `assembly`
    pub fn from_dir<P: AsRef<Path>>(
        case_dir: P,
        kinds: &[EntityKind],
        assembly: Option<Assembly>,
    ) -> BenchResult<Self> {
        let mut known = Self::new();
        for kind in kinds {
            let path = case_dir.as_ref().join(kind.known_file_name());
            let file = File::open(&path)
                .map_err(|_| BenchError::CannotOpenFile(path.display().to_string()))?;
            known.read_tsv(BufReader::new(file), *kind, assembly)?;
        }
        info!(
            "Read known entities of {} cases from {}",
            known.case_ids.len(),
            case_dir.as_ref().display()
        );
        Ok(known)
    }

    /// Adds all known entities of one kind from TSV
    ///
    /// # Errors
    ///
    /// See [`KnownEntities::from_dir`]
    pub fn read_tsv<R: BufRead>(
        &mut self,
        reader: R,
        kind: EntityKind,
        assembly: Option<Assembly>,
    ) -> BenchResult<()> {
        let mut lines = reader.lines();
        match lines.next() {
            Some(Ok(header)) if header.starts_with("case_id") => {}
            _ => {
                return Err(BenchError::InvalidInput(format!(
                    "{} must start with a `case_id` header",
                    kind.known_file_name()
                )))
            }
        }

        for line in lines {
            let line = line.map_err(|_| {
                BenchError::InvalidInput(format!("Invalid data in {}", kind.known_file_name()))
            })?;
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }
            match kind {
                EntityKind::Gene => self.gene_line(line)?,
                EntityKind::Variant => self.variant_line(line, assembly)?,
                EntityKind::Disease => self.disease_line(line)?,
            }
        }
        Ok(())
    }

    fn register_case(&mut self, case_id: &str) {
        if !self.case_ids.iter().any(|id| id == case_id) {
            self.case_ids.push(case_id.to_string());
        }
    }

    fn gene_line(&mut self, line: &str) -> BenchResult<()> {
        let mut cols = line.split('\t').map(str::trim);

        let case_id = cols.next().unwrap_or_default();
        if case_id.is_empty() {
            return Err(malformed(line, "missing case_id"));
        }
        let Some(symbol) = cols.next() else {
            return Err(malformed(case_id, "missing gene_symbol column"));
        };
        let identifier = cols.next().unwrap_or_default();
        if symbol.is_empty() && identifier.is_empty() {
            return Err(malformed(case_id, "gene has neither symbol nor identifier"));
        }

        self.register_case(case_id);
        self.genes
            .entry(case_id.to_string())
            .or_default()
            .push(KnownGene::new(symbol, identifier));
        Ok(())
    }

    fn variant_line(&mut self, line: &str, assembly: Option<Assembly>) -> BenchResult<()> {
        let mut cols = line.split('\t').map(str::trim);

        let case_id = cols.next().unwrap_or_default();
        if case_id.is_empty() {
            return Err(malformed(line, "missing case_id"));
        }
        let (Some(chrom), Some(pos), Some(reference), Some(alternate)) =
            (cols.next(), cols.next(), cols.next(), cols.next())
        else {
            return Err(malformed(case_id, "variant requires chrom, pos, ref and alt"));
        };
        let Ok(pos) = pos.parse::<u64>() else {
            return Err(malformed(case_id, &format!("invalid variant position `{pos}`")));
        };

        if let (Some(expected), Some(found)) = (assembly, cols.next().filter(|a| !a.is_empty())) {
            let Ok(found) = found.parse::<Assembly>() else {
                return Err(malformed(case_id, &format!("unknown assembly `{found}`")));
            };
            if found != expected {
                error!("Case {case_id} uses {found}, expected {expected}");
                return Err(BenchError::IncompatibleAssembly {
                    case_id: case_id.to_string(),
                    expected: expected.to_string(),
                    found: found.to_string(),
                });
            }
        }

        self.register_case(case_id);
        self.variants
            .entry(case_id.to_string())
            .or_default()
            .push(KnownVariant::new(chrom, pos, reference, alternate));
        Ok(())
    }

    fn disease_line(&mut self, line: &str) -> BenchResult<()> {
        let mut cols = line.split('\t').map(str::trim);

        let case_id = cols.next().unwrap_or_default();
        if case_id.is_empty() {
            return Err(malformed(line, "missing case_id"));
        }
        let Some(identifier) = cols.next() else {
            return Err(malformed(case_id, "missing disease_identifier column"));
        };
        let name = cols.next().unwrap_or_default();
        if identifier.is_empty() && name.is_empty() {
            return Err(malformed(case_id, "disease has neither identifier nor name"));
        }

        self.register_case(case_id);
        self.diseases
            .entry(case_id.to_string())
            .or_default()
            .push(KnownDisease::new(identifier, name));
        Ok(())
    }

    /// All case ids, in the order they were first seen
    pub fn case_ids(&self) -> &[String] {
        &self.case_ids
    }

    /// Number of known entities of one kind, over all cases
    pub fn count(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::Gene => self.genes.values().map(Vec::len).sum(),
            EntityKind::Variant => self.variants.values().map(Vec::len).sum(),
            EntityKind::Disease => self.diseases.values().map(Vec::len).sum(),
        }
    }
}

impl CaseTruthReader for KnownEntities {
    fn known_genes(&self, case_id: &str) -> BenchResult<Vec<KnownGene>> {
        Ok(self.genes.get(case_id).cloned().unwrap_or_default())
    }

    fn known_variants(&self, case_id: &str) -> BenchResult<Vec<KnownVariant>> {
        Ok(self.variants.get(case_id).cloned().unwrap_or_default())
    }

    fn known_diseases(&self, case_id: &str) -> BenchResult<Vec<KnownDisease>> {
        Ok(self.diseases.get(case_id).cloned().unwrap_or_default())
    }
}

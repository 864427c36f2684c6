//! Configuration of a benchmark
//!
//! A benchmark consists of one or more runs. Each run points to a
//! directory with the known causative entities of all cases and to the
//! standardised results of one prioritisation tool run.
//!
//! ```yaml
//! benchmark_name: exomiser_runs
//! runs:
//!   - run_identifier: run_1
//!     case_dir: data/cases
//!     results_dir: data/run_1
//!     gene_analysis: true
//!     variant_analysis: false
//!     disease_analysis: true
//!     threshold: 0.0
//!     score_order: descending
//!     genome_assembly: GRCh38
//! ```
use std::collections::HashSet;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::assess::Threshold;
use crate::entity::EntityKind;
use crate::ranking::ScoreOrder;
use crate::{BenchError, BenchResult};

/// Reference genome assembly of variant coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Assembly {
    /// GRCh37
    #[serde(rename = "GRCh37", alias = "grch37", alias = "hg19")]
    Grch37,
    /// GRCh38
    #[serde(rename = "GRCh38", alias = "grch38", alias = "hg38")]
    Grch38,
}

impl FromStr for Assembly {
    type Err = BenchError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "grch37" | "hg19" => Ok(Assembly::Grch37),
            "grch38" | "hg38" => Ok(Assembly::Grch38),
            _ => Err(BenchError::InvalidInput(format!("unknown genome assembly `{s}`"))),
        }
    }
}

impl Display for Assembly {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Assembly::Grch37 => write!(f, "GRCh37"),
            Assembly::Grch38 => write!(f, "GRCh38"),
        }
    }
}

/// A single prioritisation tool run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Unique name of the run, used as column name of the rank tables
    pub run_identifier: String,
    /// Directory with the known causative entities of all cases
    pub case_dir: PathBuf,
    /// Directory with the standardised results of the run
    pub results_dir: PathBuf,
    #[serde(default)]
    pub gene_analysis: bool,
    #[serde(default)]
    pub variant_analysis: bool,
    #[serde(default)]
    pub disease_analysis: bool,
    /// Score threshold, `0.0` disables the threshold
    #[serde(default)]
    pub threshold: f64,
    #[serde(default)]
    pub score_order: ScoreOrder,
    /// Expected assembly of the known variants
    #[serde(default)]
    pub genome_assembly: Option<Assembly>,
}

impl RunConfig {
    /// The kinds of entities that are analysed in this run
    pub fn kinds(&self) -> Vec<EntityKind> {
        EntityKind::ALL
            .into_iter()
            .filter(|kind| self.analyses(*kind))
            .collect()
    }

    /// Returns `true` if the kind of entity is analysed in this run
    pub fn analyses(&self, kind: EntityKind) -> bool {
        match kind {
            EntityKind::Gene => self.gene_analysis,
            EntityKind::Variant => self.variant_analysis,
            EntityKind::Disease => self.disease_analysis,
        }
    }

    pub fn threshold(&self) -> Threshold {
        Threshold::new(self.threshold, self.score_order)
    }

    fn validate(&self) -> BenchResult<()> {
        if self.run_identifier.trim().is_empty() {
            return Err(BenchError::Configuration(
                "run_identifier must not be empty".to_string(),
            ));
        }
        if self.run_identifier.contains(['\t', '\n']) {
            return Err(BenchError::Configuration(format!(
                "run_identifier `{}` contains whitespace control characters",
                self.run_identifier
            )));
        }
        if self.kinds().is_empty() {
            return Err(BenchError::Configuration(format!(
                "run `{}` does not enable any analysis",
                self.run_identifier
            )));
        }
        if !self.threshold.is_finite() || self.threshold < 0.0 {
            return Err(BenchError::Configuration(format!(
                "run `{}` has an invalid threshold {}",
                self.run_identifier, self.threshold
            )));
        }
        Ok(())
    }
}

/// Configuration of a complete benchmark
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkConfig {
    pub benchmark_name: String,
    pub runs: Vec<RunConfig>,
}

impl BenchmarkConfig {
    /// Parses and validates a YAML configuration
    ///
    /// # Errors
    ///
    /// [`BenchError::Configuration`] if the YAML is malformed or invalid
    ///
    /// # Examples
    ///
    /// ```
    /// use phenobench::{BenchmarkConfig, ScoreOrder};
    ///
    /// let config = BenchmarkConfig::from_yaml_str(r#"
    /// benchmark_name: example
    /// runs:
    ///   - run_identifier: run_1
    ///     case_dir: cases
    ///     results_dir: results
    ///     gene_analysis: true
    ///     score_order: ascending
    ///     threshold: 0.05
    /// "#).unwrap();
    ///
    /// assert_eq!(config.runs[0].score_order, ScoreOrder::Ascending);
    /// assert!(!config.runs[0].disease_analysis);
    /// ```
    pub fn from_yaml_str(yaml: &str) -> BenchResult<Self> {
        let config: Self = serde_yaml::from_str(yaml).map_err(|err| {
            error!("Invalid benchmark configuration: {err}");
            BenchError::Configuration(err.to_string())
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a YAML configuration file
    ///
    /// Relative `case_dir` and `results_dir` paths are resolved against
    /// the directory of the configuration file.
    ///
    /// # Errors
    ///
    /// [`BenchError::CannotOpenFile`] if the file cannot be read,
    /// [`BenchError::Configuration`] if it is malformed or invalid
    pub fn from_file<P: AsRef<Path>>(path: P) -> BenchResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|_| BenchError::CannotOpenFile(path.display().to_string()))?;
        let mut config = Self::from_yaml_str(&content)?;

        if let Some(base) = path.parent() {
            for run in &mut config.runs {
                if run.case_dir.is_relative() {
                    run.case_dir = base.join(&run.case_dir);
                }
                if run.results_dir.is_relative() {
                    run.results_dir = base.join(&run.results_dir);
                }
            }
        }
        debug!("Loaded benchmark {} from {}", config.benchmark_name, path.display());
        Ok(config)
    }

    /// Checks the configuration before any case is processed
    ///
    /// # Errors
    ///
    /// [`BenchError::Configuration`] for the first violation
    pub fn validate(&self) -> BenchResult<()> {
        if self.runs.is_empty() {
            return Err(BenchError::Configuration(
                "benchmark must contain at least one run".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        for run in &self.runs {
            run.validate()?;
            if !seen.insert(run.run_identifier.as_str()) {
                return Err(BenchError::Configuration(format!(
                    "duplicate run_identifier `{}`",
                    run.run_identifier
                )));
            }
        }
        Ok(())
    }

    /// All kinds of entities that are analysed by at least one run
    pub fn kinds(&self) -> Vec<EntityKind> {
        EntityKind::ALL
            .into_iter()
            .filter(|kind| self.runs.iter().any(|run| run.analyses(*kind)))
            .collect()
    }

    /// The runs that analyse the kind of entity, in configuration order
    pub fn runs_for(&self, kind: EntityKind) -> impl Iterator<Item = &RunConfig> {
        self.runs.iter().filter(move |run| run.analyses(kind))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const YAML: &str = r#"
benchmark_name: test
runs:
  - run_identifier: run_1
    case_dir: cases
    results_dir: run_1
    gene_analysis: true
    variant_analysis: true
    genome_assembly: GRCh38
  - run_identifier: run_2
    case_dir: cases
    results_dir: run_2
    disease_analysis: true
    threshold: 0.1
    score_order: ascending
"#;

    #[test]
    fn parse_config() {
        let config = BenchmarkConfig::from_yaml_str(YAML).unwrap();
        assert_eq!(config.runs.len(), 2);
        let run_1 = &config.runs[0];
        assert_eq!(run_1.kinds(), vec![EntityKind::Gene, EntityKind::Variant]);
        assert_eq!(run_1.threshold(), Threshold::default());
        assert_eq!(run_1.genome_assembly, Some(Assembly::Grch38));

        let run_2 = &config.runs[1];
        assert_eq!(run_2.threshold(), Threshold::new(0.1, ScoreOrder::Ascending));
        assert_eq!(run_2.genome_assembly, None);

        assert_eq!(
            config.kinds(),
            vec![EntityKind::Gene, EntityKind::Variant, EntityKind::Disease]
        );
        assert_eq!(config.runs_for(EntityKind::Disease).count(), 1);
    }

    #[test]
    fn invalid_score_order() {
        let yaml = YAML.replace("ascending", "upwards");
        assert!(matches!(
            BenchmarkConfig::from_yaml_str(&yaml),
            Err(BenchError::Configuration(_))
        ));
    }

    #[test]
    fn missing_required_field() {
        let yaml = YAML.replace("    results_dir: run_2\n", "");
        assert!(BenchmarkConfig::from_yaml_str(&yaml).is_err());
    }

    #[test]
    fn duplicate_run_identifier() {
        let yaml = YAML.replace("run_identifier: run_2", "run_identifier: run_1");
        assert!(BenchmarkConfig::from_yaml_str(&yaml).is_err());
    }

    #[test]
    fn no_analysis_enabled() {
        let yaml = YAML.replace("    disease_analysis: true\n", "");
        assert!(BenchmarkConfig::from_yaml_str(&yaml).is_err());
    }

    #[test]
    fn negative_threshold() {
        let yaml = YAML.replace("threshold: 0.1", "threshold: -0.1");
        assert!(BenchmarkConfig::from_yaml_str(&yaml).is_err());
    }

    #[test]
    fn empty_runs() {
        assert!(BenchmarkConfig::from_yaml_str("benchmark_name: x\nruns: []\n").is_err());
    }

    #[test]
    fn assembly_names() {
        assert_eq!("hg19".parse::<Assembly>().unwrap(), Assembly::Grch37);
        assert_eq!("GRCh38".parse::<Assembly>().unwrap(), Assembly::Grch38);
        assert!("hg17".parse::<Assembly>().is_err());
        assert_eq!(Assembly::Grch37.to_string(), "GRCh37");
    }

    #[test]
    fn relative_paths_resolved() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, YAML).unwrap();
        let config = BenchmarkConfig::from_file(&path).unwrap();
        assert_eq!(config.runs[0].case_dir, dir.path().join("cases"));
    }
}

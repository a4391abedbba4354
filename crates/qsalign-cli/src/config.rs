use crate::error::{CliError, Result};
use qsalign::engine::config::{AlignParams, ClusterParams, QsAlignConfig};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable naming a local mirror of structure files.
pub const PDB_DIR_VAR: &str = "PDB_DIR";

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialClusteringConfig {
    #[serde(rename = "min-sequence-length")]
    min_sequence_length: Option<usize>,
    #[serde(rename = "sequence-identity-threshold")]
    sequence_identity_threshold: Option<f64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialAlignmentConfig {
    #[serde(rename = "distance-cutoff")]
    distance_cutoff: Option<f64>,
    #[serde(rename = "max-rmsd")]
    max_rmsd: Option<f64>,
    #[serde(rename = "max-orientation-angle")]
    max_orientation_angle: Option<f64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialLoaderConfig {
    #[serde(rename = "search-paths")]
    search_paths: Option<Vec<PathBuf>>,
}

/// Configuration as read from a TOML file; every value is optional.
#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialQsAlignConfig {
    clustering: Option<PartialClusteringConfig>,
    alignment: Option<PartialAlignmentConfig>,
    loader: Option<PartialLoaderConfig>,
}

/// Engine parameters and loader search paths after defaults are applied.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub engine: QsAlignConfig,
    pub search_paths: Vec<PathBuf>,
}

impl PartialQsAlignConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    /// Loads `path` if given, otherwise starts from an empty configuration.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Fills every missing value with its default and validates the result.
    ///
    /// Search paths are the configured ones, then `pdb_dir`, then the current
    /// directory.
    pub fn resolve(self, pdb_dir: Option<PathBuf>) -> Result<ResolvedConfig> {
        let clustering = self.clustering.unwrap_or_default();
        let alignment = self.alignment.unwrap_or_default();
        let loader = self.loader.unwrap_or_default();

        let cluster_defaults = ClusterParams::default();
        let cluster = ClusterParams {
            min_sequence_length: clustering
                .min_sequence_length
                .unwrap_or(cluster_defaults.min_sequence_length),
            sequence_identity_threshold: clustering
                .sequence_identity_threshold
                .unwrap_or(cluster_defaults.sequence_identity_threshold),
        };

        let align_defaults = AlignParams::default();
        let align = AlignParams {
            distance_cutoff: alignment
                .distance_cutoff
                .unwrap_or(align_defaults.distance_cutoff),
            max_rmsd: alignment.max_rmsd.unwrap_or(align_defaults.max_rmsd),
            max_orientation_angle: alignment
                .max_orientation_angle
                .unwrap_or(align_defaults.max_orientation_angle),
        };

        let engine =
            QsAlignConfig::new(cluster, align).map_err(|e| CliError::Config(e.to_string()))?;

        let mut search_paths = loader.search_paths.unwrap_or_default();
        search_paths.extend(pdb_dir);
        search_paths.push(PathBuf::from("."));

        Ok(ResolvedConfig {
            engine,
            search_paths,
        })
    }
}

use super::pdb::{PdbError, PdbFile};
use super::traits::StructureFile;
use crate::core::models::structure::Structure;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Structure '{identifier}' could not be resolved (searched {searched} location(s))")]
    NotFound { identifier: String, searched: usize },

    #[error("Failed to read structure '{identifier}' from '{path}': {source}", path = path.display())]
    Read {
        identifier: String,
        path: PathBuf,
        #[source]
        source: PdbError,
    },
}

/// Resolves an assembly identifier to an in-memory [`Structure`].
pub trait StructureLoader {
    fn resolve(&self, identifier: &str) -> Result<Structure, LoadError>;
}

/// Resolves identifiers against the local filesystem.
///
/// An identifier that names an existing file is read directly. Otherwise each
/// search directory is probed, in order, for the usual local-mirror file names
/// (`<id>.pdb`, `<id lowercase>.pdb`, `<id>.ent`, `pdb<id lowercase>.ent`).
#[derive(Debug, Clone, Default)]
pub struct LocalStructureLoader {
    search_paths: Vec<PathBuf>,
}

impl LocalStructureLoader {
    pub fn new(search_paths: Vec<PathBuf>) -> Self {
        Self { search_paths }
    }

    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    fn candidate_names(identifier: &str) -> Vec<String> {
        let lower = identifier.to_lowercase();
        let mut names = vec![
            format!("{identifier}.pdb"),
            format!("{lower}.pdb"),
            format!("{identifier}.ent"),
            format!("pdb{lower}.ent"),
        ];
        names.dedup();
        names
    }

    fn locate(&self, identifier: &str) -> Result<PathBuf, LoadError> {
        let direct = Path::new(identifier);
        if direct.is_file() {
            return Ok(direct.to_path_buf());
        }

        let names = Self::candidate_names(identifier);
        for dir in &self.search_paths {
            for name in &names {
                let candidate = dir.join(name);
                debug!("Probing {:?} for structure '{}'", candidate, identifier);
                if candidate.is_file() {
                    return Ok(candidate);
                }
            }
        }

        Err(LoadError::NotFound {
            identifier: identifier.to_string(),
            searched: 1 + self.search_paths.len() * names.len(),
        })
    }
}

impl StructureLoader for LocalStructureLoader {
    fn resolve(&self, identifier: &str) -> Result<Structure, LoadError> {
        let path = self.locate(identifier)?;
        debug!("Reading structure '{}' from {:?}", identifier, path);
        PdbFile::read_from_path(&path, identifier).map_err(|source| LoadError::Read {
            identifier: identifier.to_string(),
            path,
            source,
        })
    }
}

use super::config::ConfigError;
use crate::core::utils::geometry::GeometryError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Alignment failed: {0}")]
    AlignmentFailure(String),

    #[error("Invalid correspondence for pair {query}-{target}: {reason}")]
    InvalidCorrespondence {
        query: String,
        target: String,
        reason: String,
    },

    #[error("Superposition failed: {source}")]
    Superposition {
        #[from]
        source: GeometryError,
    },
}

use qsalign::core::io::loader::LoadError;
use qsalign::engine::error::EngineError;
use qsalign::engine::report::ReportError;
use qsalign::workflows::compare::WorkflowError;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Resolution(#[from] LoadError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Report(#[from] ReportError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse file '{path}': {source}", path = path.display())]
    FileParsing {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid argument: {0}")]
    Argument(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<WorkflowError> for CliError {
    fn from(e: WorkflowError) -> Self {
        match e {
            WorkflowError::Load(e) => CliError::Resolution(e),
            WorkflowError::Engine(e) => CliError::Engine(e),
            WorkflowError::Report(e) => CliError::Report(e),
        }
    }
}

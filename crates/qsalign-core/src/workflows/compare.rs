use crate::core::io::loader::{LoadError, StructureLoader};
use crate::engine::aligner::QuaternaryAligner;
use crate::engine::config::QsAlignConfig;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter, Stage};
use crate::engine::report::{self, ReportError};
use crate::engine::result::AlignmentResult;
use crate::engine::scoring::{self, PairOrientation};
use thiserror::Error;
use tracing::{info, instrument};

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Report(#[from] ReportError),
}

/// Outcome of comparing one query assembly with one target assembly.
#[derive(Debug, Clone)]
pub struct Comparison {
    pub query_id: String,
    pub target_id: String,
    pub result: AlignmentResult,
    pub orientations: Vec<PairOrientation>,
}

impl Comparison {
    /// Renders the two-line tab-delimited report for this comparison.
    pub fn render(&self) -> Result<String, ReportError> {
        report::render(
            &self.query_id,
            &self.target_id,
            &self.result,
            &self.orientations,
        )
    }
}

/// Resolves both assemblies, aligns them and scores every mapped subunit pair.
///
/// The query is resolved before the target, so a missing query is reported
/// even when the target is missing too.
#[instrument(skip_all, name = "compare_workflow", fields(query = query_id, target = target_id))]
pub fn run<L, A>(
    loader: &L,
    aligner: &A,
    query_id: &str,
    target_id: &str,
    config: &QsAlignConfig,
    reporter: &ProgressReporter,
) -> Result<Comparison, WorkflowError>
where
    L: StructureLoader + ?Sized,
    A: QuaternaryAligner + ?Sized,
{
    config.validate().map_err(EngineError::from)?;

    let (query, target) = reporter.stage(Stage::Loading, || {
        Ok::<_, LoadError>((loader.resolve(query_id)?, loader.resolve(target_id)?))
    })?;
    info!(
        "Loaded query '{}' ({} chains) and target '{}' ({} chains).",
        query_id,
        query.chains().len(),
        target_id,
        target.chains().len()
    );

    let result = reporter.stage(Stage::Aligning, || aligner.align(&query, &target, config))?;
    let orientations = reporter.stage(Stage::Scoring, || scoring::score(&result))?;

    info!(
        "Comparison finished: {} ({} pair(s), RMSD {:.2}).",
        result.relation(),
        result.length(),
        result.rmsd()
    );
    reporter.report(Progress::Compared {
        relation: result.relation(),
        pairs: result.length(),
        rmsd: result.rmsd(),
    });

    Ok(Comparison {
        query_id: query_id.to_string(),
        target_id: target_id.to_string(),
        result,
        orientations,
    })
}

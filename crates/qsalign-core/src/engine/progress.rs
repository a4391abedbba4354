use super::result::Relation;
use std::fmt;

/// Stages of a single query/target comparison, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Loading,
    Aligning,
    Scoring,
}

impl Stage {
    pub fn label(self) -> &'static str {
        match self {
            Stage::Loading => "Loading assemblies",
            Stage::Aligning => "Aligning subunits",
            Stage::Scoring => "Scoring orientations",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Progress events emitted by the comparison workflow and the aligner.
#[derive(Debug, Clone, PartialEq)]
pub enum Progress {
    StageStarted(Stage),
    StageFinished(Stage),

    /// Seed-and-extend begins over `seeds` cluster-compatible subunit pairs.
    SeedsQueued { seeds: u64 },
    /// One seed pair was evaluated; `extended` is false when it was screened out.
    SeedEvaluated { extended: bool },
    /// All seeds are done and `candidates` of them produced an alignment.
    SeedsDone { candidates: usize },

    /// Final outcome of the comparison.
    Compared {
        relation: Relation,
        pairs: usize,
        rmsd: f64,
    },
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

/// Forwards progress events to an optional callback.
///
/// The callback may be invoked from worker threads while seed pairs are
/// evaluated in parallel.
#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    #[inline]
    pub fn report(&self, event: Progress) {
        if let Some(cb) = &self.callback {
            cb(event);
        }
    }

    /// Runs `work` bracketed by the start and finish events of `stage`.
    ///
    /// The finish event is sent even when `work` returns an error value.
    pub fn stage<T>(&self, stage: Stage, work: impl FnOnce() -> T) -> T {
        self.report(Progress::StageStarted(stage));
        let output = work();
        self.report(Progress::StageFinished(stage));
        output
    }
}

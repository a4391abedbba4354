use crate::cli::Cli;
use crate::config::{PDB_DIR_VAR, PartialQsAlignConfig, ResolvedConfig};
use crate::error::Result;
use crate::output::OutputSink;
use crate::utils::progress::CliProgressHandler;
use qsalign::{
    core::io::loader::LocalStructureLoader,
    engine::{aligner::QsAligner, progress::ProgressReporter},
    workflows,
};
use std::path::PathBuf;
use tracing::{debug, info};

pub fn run(args: &Cli) -> Result<()> {
    let config = PartialQsAlignConfig::load(args.config.as_deref())?
        .resolve(std::env::var_os(PDB_DIR_VAR).map(PathBuf::from))?;
    debug!("Structure search paths: {:?}", config.search_paths);

    let sink = OutputSink::open(args.output.as_deref())?;
    match compare(args, &config) {
        Ok(report) => {
            sink.write_all(&report)?;
            if let Some(path) = &args.output {
                info!("Report written to {:?}", path);
            }
            Ok(())
        }
        Err(e) => {
            sink.discard();
            Err(e)
        }
    }
}

fn compare(args: &Cli, config: &ResolvedConfig) -> Result<String> {
    let loader = LocalStructureLoader::new(config.search_paths.clone());

    let progress_handler = CliProgressHandler::new(!args.quiet);
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());
    let aligner = QsAligner::with_reporter(&reporter);

    info!(
        "Comparing query '{}' against target '{}'.",
        args.query, args.target
    );
    let comparison = workflows::compare::run(
        &loader,
        &aligner,
        &args.query,
        &args.target,
        &config.engine,
        &reporter,
    )?;

    Ok(comparison.render()?)
}

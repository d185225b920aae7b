use std::process::ExitCode;

use anyhow::{Context, Result};
use manifold_engine::logging;
use manifold_engine_core::{
    ClassifiedArguments, EngineConfig, Error, InitialOptions, ManifestCatalog, Orchestrator,
    RunOutcome, Verbosity,
};
use tracing::{debug, error};

/// A malformed command line or an unexpected failure
const EXIT_FAILURE: u8 = 1;
/// The engine reported an error (missing backend, unknown plugin, unreadable
/// input...) and stopped. `--help` lists these codes.
const EXIT_REPORTED: u8 = 2;

fn main() -> ExitCode {
    let log_handle = logging::init();
    let args: Vec<String> = std::env::args().skip(1).collect();

    let mut engine = None;
    let result = run(&args, log_handle, &mut engine);
    let verbosity = engine
        .as_ref()
        .map(Orchestrator::verbosity)
        .unwrap_or_default();

    match result {
        Ok(RunOutcome::Help(text)) => {
            print!("{text}");
            ExitCode::SUCCESS
        }
        Ok(outcome) => {
            debug!("finished: {:?}", outcome);
            ExitCode::SUCCESS
        }
        Err(err) => report(&err, verbosity),
    }
}

fn run(
    args: &[String],
    log_handle: logging::LogHandle,
    engine: &mut Option<Orchestrator>,
) -> Result<RunOutcome> {
    // two independent views of the same arguments
    let classified = ClassifiedArguments::partition(args)?;
    let initial = InitialOptions::extract(args)?;
    debug!("initial options: {:?}", initial);

    let catalog = ManifestCatalog::new(EngineConfig::from_env());
    let orchestrator = engine.insert(
        Orchestrator::new(initial, classified, Box::new(catalog))
            .with_log_control(Box::new(log_handle)),
    );
    let outcome = orchestrator.run().context("engine run failed")?;
    Ok(outcome)
}

fn report(err: &anyhow::Error, verbosity: Verbosity) -> ExitCode {
    match err.downcast_ref::<Error>() {
        Some(engine_err) if engine_err.is_reportable() => {
            error!("{}", engine_err);
            ExitCode::from(EXIT_REPORTED)
        }
        Some(engine_err) if engine_err.is_parse_error() => {
            error!("{}", engine_err);
            ExitCode::from(EXIT_FAILURE)
        }
        _ => {
            error!("{}", err.root_cause());
            if verbosity == Verbosity::Verbose {
                error!("{:?}", err);
            }
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

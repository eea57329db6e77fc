mod bootstrap_config;
mod config;
mod export;
mod map;

use crate::config::{load_config, ConfigError};
use bootstrap_config::BootstrapConfig;
use common::types::config::Config;
use common::util::logging;
use export::ExportError;
use log::{error, info, SetLoggerError};
use planning::generation::{generate, GenerationError};
use planning::pipeline::{plan, PlanningError, PlanningOutput};
use std::fmt::{Display, Formatter};
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err);
            ExitCode::FAILURE
        }
    }
}

fn report(err: &StopclusterError) {
    if err.has_logger() {
        error!(target: "main", "{}", err);
    } else {
        eprintln!("{}", err);
    }
}

fn run() -> Result<(), StopclusterError> {
    let bootstrap_config = BootstrapConfig::read();

    logging::initialize_logging(bootstrap_config.log_level.clone().into())?;
    print_startup_message();

    let Config::Version1 { generation, planning, export: export_config } = load_config(&bootstrap_config)?;

    let input = logging::run_with_spinner("generation", "Generating stops and ridership", || {
        generate(&generation)
    })?;

    let output = plan(input, &planning)?;
    print_summary(&output);

    logging::run_with_spinner("export", "Exporting results", || {
        export::export(&export_config, &output)
    })?;

    Ok(())
}

fn print_startup_message() {
    info!("\n     _                   _           _            \n ___| |_ ___  _ __   ___| |_   _ ___| |_ ___ _ __ \n/ __| __/ _ \\| '_ \\ / __| | | | / __| __/ _ \\ '__|\n\\__ \\ || (_) | |_) | (__| | |_| \\__ \\ ||  __/ |   \n|___/\\__\\___/| .__/ \\___|_|\\__,_|___/\\__\\___|_|   \n             |_|                                  \n S T O P   C L U S T E R I N G\n");
}

fn print_summary(output: &PlanningOutput) {
    info!(target: "main", "Cluster summary:\n{}", output.clusters);
    for route in &output.routes {
        info!(target: "main", "{}", route);
    }
}

#[derive(thiserror::Error, Debug)]
pub enum StopclusterError {
    Logging(#[from] SetLoggerError),
    Config(#[from] ConfigError),
    Generation(#[from] GenerationError),
    Planning(#[from] PlanningError),
    Export(#[from] ExportError),
}

impl StopclusterError {
    /// Whether logging was set up when the error occurred
    fn has_logger(&self) -> bool {
        !matches!(self, StopclusterError::Logging(_))
    }
}

impl Display for StopclusterError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let err: &dyn Display = match self {
            StopclusterError::Logging(err) => err,
            StopclusterError::Config(err) => err,
            StopclusterError::Generation(err) => err,
            StopclusterError::Planning(err) => err,
            StopclusterError::Export(err) => err,
        };
        let prefix = match self {
            StopclusterError::Logging(_) => "Initializing logging",
            StopclusterError::Config(_) => "Reading config file",
            StopclusterError::Generation(_) => "Generating input data",
            StopclusterError::Planning(_) => "Planning routes",
            StopclusterError::Export(_) => "Exporting results",
        };
        write!(f, "{}: {}", prefix, err)
    }
}

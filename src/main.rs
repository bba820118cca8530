//! tljh-bootstrap CLI entry point.

use std::process::ExitCode;

use tljh_bootstrap::cli::{Cli, Commands};
use tljh_bootstrap::config::InstallConfig;
use tljh_bootstrap::install::{BootstrapRequest, Orchestrator};
use tljh_bootstrap::logging::InstallLog;
use tljh_bootstrap::progress::{self, ProcessLauncher};
use tljh_bootstrap::shell::SystemRunner;
use tljh_bootstrap::BootstrapError;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize tracing for the progress server process.
///
/// The server has no installer log of its own; it reports to stderr only.
fn init_server_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tljh_bootstrap=info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();
}

/// Log a fatal error, falling back to stderr when the log never came up.
fn report_error(err: &BootstrapError) {
    if tracing::dispatcher::has_been_set() {
        tracing::error!("Error: {}", err);
    } else {
        eprintln!("Error: {err}");
    }
}

fn main() -> ExitCode {
    let (cli, forwarded) = Cli::parse_known(std::env::args());

    if let Some(Commands::ProgressServer(args)) = &cli.command {
        init_server_tracing();
        return match progress::serve(args.log_file.clone(), args.port) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                tracing::error!("Progress page stopped: {:#}", e);
                ExitCode::from(1)
            }
        };
    }

    let request = BootstrapRequest {
        show_progress_page: cli.show_progress_page,
        version: cli.requested_version().map(String::from),
        forwarded,
    };

    let config = InstallConfig::from_env();
    let runner = SystemRunner;
    let launcher = ProcessLauncher::new();
    let orchestrator = Orchestrator::new(&config, &runner, &launcher);

    let handoff = match orchestrator.run(&request, |config| InstallLog::init(config).map(drop)) {
        Ok(handoff) => handoff,
        Err(BootstrapError::IncompatibleHost(reason)) => {
            reason.report();
            return ExitCode::from(1);
        }
        Err(e) => {
            report_error(&e);
            return ExitCode::from(1);
        }
    };

    match handoff.exec() {
        Ok(code) => code,
        Err(e) => {
            report_error(&e);
            ExitCode::from(1)
        }
    }
}

//! Optional progress page shown while the bootstrap runs.
//!
//! The page is served by a separate process (this binary re-executed with
//! the hidden `progress-server` subcommand) so a stuck request can never
//! stall provisioning. The downstream installer receives the process id
//! and is responsible for stopping it.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use tljh_bootstrap::progress::{ProcessLauncher, ProgressLauncher};
//!
//! let launcher = ProcessLauncher::new();
//! match launcher.launch(Path::new("/opt/tljh/installer.log")) {
//!     Ok(handle) => println!("progress page pid {}", handle.pid),
//!     Err(_unavailable) => println!("continuing without progress page"),
//! }
//! ```

pub mod page;
pub mod server;

use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::debug;

use crate::error::{BootstrapError, Result};

pub use server::{router, serve, READY_MESSAGE};

/// Port the progress page listens on.
pub const PROGRESS_PAGE_PORT: u16 = 80;

/// Flag telling the downstream installer which process to stop.
pub const SERVER_PID_FLAG: &str = "--progress-page-server-pid";

/// Hidden subcommand that runs the server.
pub const SERVER_SUBCOMMAND: &str = "progress-server";

/// A running progress page process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressServerHandle {
    pub pid: u32,
}

impl ProgressServerHandle {
    /// Flags forwarded to the downstream installer.
    pub fn handoff_flags(&self) -> Vec<String> {
        vec![SERVER_PID_FLAG.to_string(), self.pid.to_string()]
    }
}

/// Starts the progress page.
pub trait ProgressLauncher {
    /// Start serving `log_file`. Fails if the page could not be bound.
    fn launch(&self, log_file: &Path) -> Result<ProgressServerHandle>;
}

/// Launches the server as a child process of the bootstrap.
#[derive(Debug, Clone)]
pub struct ProcessLauncher {
    program: Option<PathBuf>,
    port: u16,
}

impl Default for ProcessLauncher {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessLauncher {
    /// Re-execute the running binary on the default port.
    pub fn new() -> Self {
        Self {
            program: None,
            port: PROGRESS_PAGE_PORT,
        }
    }

    /// Run `program` instead of the current executable.
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = Some(program.into());
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }
}

impl ProgressLauncher for ProcessLauncher {
    fn launch(&self, log_file: &Path) -> Result<ProgressServerHandle> {
        let program = match &self.program {
            Some(program) => program.clone(),
            None => std::env::current_exe()?,
        };

        let mut child = Command::new(&program)
            .arg(SERVER_SUBCOMMAND)
            .arg("--log-file")
            .arg(log_file)
            .arg("--port")
            .arg(self.port.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| BootstrapError::Spawn {
                command: format!("{} {}", program.display(), SERVER_SUBCOMMAND),
                source,
            })?;

        let mut line = String::new();
        if let Some(stdout) = child.stdout.take() {
            BufReader::new(stdout).read_line(&mut line)?;
        }

        if line.trim() == READY_MESSAGE {
            let handle = ProgressServerHandle { pid: child.id() };
            debug!("Progress page running as pid {}", handle.pid);
            return Ok(handle);
        }

        let status = child.wait()?;
        Err(BootstrapError::ProgressServer {
            message: format!("server exited ({status}) before listening on port {}", self.port),
        })
    }
}

//! External command execution.
//!
//! Every provisioning step goes through [`CommandRunner::run`], which merges
//! stderr into stdout, waits for the process, and logs the command line,
//! exit code and full output. Failures carry the captured output so the
//! install log is enough for post-mortem diagnosis.

use crate::error::{BootstrapError, Result};
use std::collections::HashMap;
use std::io::Read;
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus};
use std::time::{Duration, Instant};
use tracing::{debug, error};

/// Result of executing an external command.
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Exit code (None if killed by signal).
    pub exit_code: Option<i32>,

    /// Standard output and standard error, interleaved as written.
    pub output: String,

    /// Execution duration.
    pub duration: Duration,

    /// Whether command succeeded (exit code 0).
    pub success: bool,
}

/// Options for command execution.
#[derive(Debug, Clone, Default)]
pub struct CommandOptions {
    /// Working directory.
    pub cwd: Option<PathBuf>,

    /// Environment variables (merged over the inherited environment).
    pub env: HashMap<String, String>,
}

impl CommandOptions {
    /// Add an environment override.
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }
}

/// Runs external commands on behalf of the bootstrap.
///
/// Implementations return the captured output on success and
/// [`BootstrapError::CommandFailed`] for any non-zero exit.
pub trait CommandRunner {
    fn run(&self, argv: &[String], options: &CommandOptions) -> Result<String>;
}

/// Runs commands on the host.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, argv: &[String], options: &CommandOptions) -> Result<String> {
        run_logged(argv, options)
    }
}

/// Build an argument vector from anything string-like.
pub fn argv<I, S>(parts: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    parts.into_iter().map(Into::into).collect()
}

/// Join an argument vector for display.
pub fn printable_command(argv: &[String]) -> String {
    argv.join(" ")
}

/// Execute a command with stderr merged into stdout.
///
/// A non-zero exit is not an error here; see [`run_logged`].
pub fn execute(argv: &[String], options: &CommandOptions) -> Result<CommandResult> {
    let start = Instant::now();
    let command = printable_command(argv);

    let spawn_error = |source: std::io::Error| BootstrapError::Spawn {
        command: command.clone(),
        source,
    };

    let (program, args) = argv.split_first().ok_or_else(|| {
        spawn_error(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "empty command line",
        ))
    })?;

    let (mut reader, writer) = std::io::pipe().map_err(spawn_error)?;

    let mut cmd = Command::new(program);
    cmd.args(args);

    if let Some(cwd) = &options.cwd {
        cmd.current_dir(cwd);
    }

    for (key, value) in &options.env {
        cmd.env(key, value);
    }

    cmd.stdout(writer.try_clone().map_err(spawn_error)?);
    cmd.stderr(writer);

    let mut child = cmd.spawn().map_err(spawn_error)?;

    // The write ends held by `cmd` must be closed or the read never hits EOF.
    drop(cmd);

    let (raw, status) = collect_output(reader, &mut child)?;

    Ok(CommandResult {
        exit_code: status.code(),
        output: String::from_utf8_lossy(&raw).into_owned(),
        duration: start.elapsed(),
        success: status.success(),
    })
}

/// Drain the merged output, then reap the child even if reading failed.
fn collect_output(mut reader: impl Read, child: &mut Child) -> Result<(Vec<u8>, ExitStatus)> {
    let mut raw = Vec::new();
    let read = reader.read_to_end(&mut raw);
    let status = child.wait()?;
    read?;
    Ok((raw, status))
}

/// Execute a command, log it, and fail on a non-zero exit.
///
/// Successful runs are logged at debug level, failures at error level; in
/// both cases the full output is logged after the command line.
pub fn run_logged(argv: &[String], options: &CommandOptions) -> Result<String> {
    let command = printable_command(argv);

    let result = match execute(argv, options) {
        Ok(result) => result,
        Err(err) => {
            error!("Could not run {}: {}", command, err);
            return Err(err);
        }
    };

    let code = describe_exit(result.exit_code);
    if result.success {
        debug!("Ran {} with exit code {} in {:?}", command, code, result.duration);
        debug!("{}", result.output);
        Ok(result.output)
    } else {
        error!("Ran {} with exit code {}", command, code);
        error!("{}", result.output);
        Err(BootstrapError::CommandFailed {
            argv: argv.to_vec(),
            command,
            exit_code: result.exit_code,
            output: result.output,
        })
    }
}

fn describe_exit(code: Option<i32>) -> String {
    code.map_or_else(|| "none (terminated by signal)".to_string(), |c| c.to_string())
}

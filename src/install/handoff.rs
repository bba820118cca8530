//! Transfer of control to the TLJH installer.

use std::path::PathBuf;
use std::process::{Command, ExitCode};

use tracing::debug;

use crate::error::{BootstrapError, Result};

/// The downstream installer invocation: `<interpreter> -m <module> <flags...>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Handoff {
    pub interpreter: PathBuf,
    pub module: String,
    pub flags: Vec<String>,
}

impl Handoff {
    pub fn new(interpreter: impl Into<PathBuf>, module: impl Into<String>, flags: Vec<String>) -> Self {
        Self {
            interpreter: interpreter.into(),
            module: module.into(),
            flags,
        }
    }

    /// Arguments after the interpreter.
    pub fn args(&self) -> Vec<String> {
        let mut args = vec!["-m".to_string(), self.module.clone()];
        args.extend(self.flags.iter().cloned());
        args
    }

    /// The command line joined for display.
    pub fn printable(&self) -> String {
        let mut parts = vec![self.interpreter.display().to_string()];
        parts.extend(self.args());
        parts.join(" ")
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.interpreter);
        cmd.args(self.args());
        cmd
    }

    /// Replace the current process with the installer.
    ///
    /// Only returns if the exec itself failed.
    #[cfg(unix)]
    pub fn exec(self) -> Result<ExitCode> {
        use std::os::unix::process::CommandExt;

        debug!("Replacing process with {}", self.printable());
        let source = self.command().exec();
        Err(BootstrapError::Spawn {
            command: self.printable(),
            source,
        })
    }

    /// Run the installer as a child and propagate its exit code.
    ///
    /// The installer gets a new process id here, unlike on Unix.
    #[cfg(not(unix))]
    pub fn exec(self) -> Result<ExitCode> {
        debug!("Running {}", self.printable());
        let status = self
            .command()
            .status()
            .map_err(|source| BootstrapError::Spawn {
                command: self.printable(),
                source,
            })?;
        let code = status.code().unwrap_or(1);
        Ok(ExitCode::from(u8::try_from(code).unwrap_or(1)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_run_module_with_flags() {
        let handoff = Handoff::new(
            "/opt/tljh/hub/bin/python3",
            "tljh.installer",
            vec!["--admin".into(), "alice".into()],
        );

        assert_eq!(handoff.args(), vec!["-m", "tljh.installer", "--admin", "alice"]);
        assert_eq!(
            handoff.printable(),
            "/opt/tljh/hub/bin/python3 -m tljh.installer --admin alice"
        );
    }

    #[cfg(unix)]
    #[test]
    fn exec_failure_is_reported() {
        let handoff = Handoff::new("/nonexistent/python3", "tljh.installer", Vec::new());

        let err = handoff.exec().unwrap_err();

        assert!(matches!(err, BootstrapError::Spawn { .. }));
    }
}

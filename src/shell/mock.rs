//! Mock command runner for testing.
//!
//! `MockRunner` implements [`CommandRunner`] and records every invocation
//! for later assertion. Output, failures and side effects can be scripted
//! per command prefix.
//!
//! # Example
//!
//! ```
//! use tljh_bootstrap::shell::{argv, CommandOptions, CommandRunner, MockRunner};
//!
//! let mut runner = MockRunner::new();
//! runner.set_output("git ls-remote", "abc123\trefs/tags/1.0.0\n");
//!
//! let out = runner
//!     .run(&argv(["git", "ls-remote", "--tags"]), &CommandOptions::default())
//!     .unwrap();
//! assert!(out.contains("1.0.0"));
//! assert!(runner.was_called("git ls-remote"));
//! ```

use std::cell::RefCell;
use std::collections::HashMap;

use crate::error::{BootstrapError, Result};

use super::command::{printable_command, CommandOptions, CommandRunner};

/// A command seen by [`MockRunner`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub argv: Vec<String>,
    pub env: HashMap<String, String>,
}

impl RecordedCall {
    /// The command line joined with spaces.
    pub fn command(&self) -> String {
        printable_command(&self.argv)
    }
}

type Hook = Box<dyn Fn(&[String])>;

/// Recording command runner.
///
/// Scripted entries match when the joined command line starts with the
/// configured prefix; the first matching entry wins. Unscripted commands
/// succeed with empty output.
#[derive(Default)]
pub struct MockRunner {
    calls: RefCell<Vec<RecordedCall>>,
    outputs: Vec<(String, String)>,
    failures: Vec<(String, i32, String)>,
    hooks: Vec<(String, Hook)>,
}

impl MockRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return `output` for commands starting with `prefix`.
    pub fn set_output(&mut self, prefix: &str, output: &str) {
        self.outputs.push((prefix.to_string(), output.to_string()));
    }

    /// Fail commands starting with `prefix` with the given exit code.
    pub fn set_failure(&mut self, prefix: &str, exit_code: i32, output: &str) {
        self.failures
            .push((prefix.to_string(), exit_code, output.to_string()));
    }

    /// Run `hook` whenever a command starting with `prefix` succeeds.
    pub fn on_command(&mut self, prefix: &str, hook: impl Fn(&[String]) + 'static) {
        self.hooks.push((prefix.to_string(), Box::new(hook)));
    }

    /// All recorded calls, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.borrow().clone()
    }

    /// All recorded command lines, in order.
    pub fn commands(&self) -> Vec<String> {
        self.calls.borrow().iter().map(RecordedCall::command).collect()
    }

    /// Whether any recorded command starts with `prefix`.
    pub fn was_called(&self, prefix: &str) -> bool {
        self.commands().iter().any(|c| c.starts_with(prefix))
    }
}

impl CommandRunner for MockRunner {
    fn run(&self, argv: &[String], options: &CommandOptions) -> Result<String> {
        let command = printable_command(argv);
        self.calls.borrow_mut().push(RecordedCall {
            argv: argv.to_vec(),
            env: options.env.clone(),
        });

        if let Some((_, code, output)) = self
            .failures
            .iter()
            .find(|(prefix, _, _)| command.starts_with(prefix.as_str()))
        {
            return Err(BootstrapError::CommandFailed {
                argv: argv.to_vec(),
                command,
                exit_code: Some(*code),
                output: output.clone(),
            });
        }

        for (prefix, hook) in &self.hooks {
            if command.starts_with(prefix.as_str()) {
                hook(argv);
            }
        }

        Ok(self
            .outputs
            .iter()
            .find(|(prefix, _)| command.starts_with(prefix.as_str()))
            .map(|(_, output)| output.clone())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::argv;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn records_calls_with_env() {
        let runner = MockRunner::new();
        let options = CommandOptions::default().with_env("DEBIAN_FRONTEND", "noninteractive");

        runner.run(&argv(["apt-get", "update"]), &options).unwrap();

        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].command(), "apt-get update");
        assert_eq!(calls[0].env["DEBIAN_FRONTEND"], "noninteractive");
    }

    #[test]
    fn scripted_failure_carries_exit_code() {
        let mut runner = MockRunner::new();
        runner.set_failure("apt-get", 100, "E: Unable to locate package");

        let err = runner
            .run(&argv(["apt-get", "install", "foo"]), &CommandOptions::default())
            .unwrap_err();

        match err {
            BootstrapError::CommandFailed {
                argv, exit_code, ..
            } => {
                assert_eq!(exit_code, Some(100));
                assert_eq!(argv, ["apt-get", "install", "foo"]);
            }
            other => panic!("Expected CommandFailed, got {other:?}"),
        }
    }

    #[test]
    fn hooks_run_on_success() {
        let seen = Rc::new(Cell::new(0));
        let counter = Rc::clone(&seen);
        let mut runner = MockRunner::new();
        runner.on_command("python3 -m venv", move |_| counter.set(counter.get() + 1));

        runner
            .run(&argv(["python3", "-m", "venv", "/opt/tljh/hub"]), &CommandOptions::default())
            .unwrap();
        runner
            .run(&argv(["git", "--version"]), &CommandOptions::default())
            .unwrap();

        assert_eq!(seen.get(), 1);
    }

    #[test]
    fn unscripted_commands_succeed_empty() {
        let runner = MockRunner::new();
        let out = runner
            .run(&argv(["true"]), &CommandOptions::default())
            .unwrap();
        assert!(out.is_empty());
    }
}

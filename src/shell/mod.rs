//! External command execution and host platform queries.

pub mod command;
pub mod mock;
pub mod platform;

pub use command::{
    argv, execute, printable_command, run_logged, CommandOptions, CommandResult, CommandRunner,
    SystemRunner,
};
pub use mock::{MockRunner, RecordedCall};
pub use platform::{is_elevated, is_executable, parse_system_path, resolve_tool_path};

//! Command-line interface for the bootstrap.
//!
//! - [`args`] - Argument definitions using clap derive macros and the split
//!   between bootstrap flags and installer flags

pub mod args;

pub use args::{split_known_args, Cli, Commands, ProgressServerArgs};

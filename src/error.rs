//! Error types for bootstrap operations.
//!
//! This module defines [`BootstrapError`], the primary error type used
//! throughout the bootstrap, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Host gate failures carry an [`IncompatibleHost`] and end the run with
//!   exit code 1 and a one-line message on stdout
//! - Everything else propagates to `main`, gets logged, and aborts the run
//! - A failed progress page is the only error the bootstrap discards

use thiserror::Error;

use crate::host::IncompatibleHost;
use crate::version::ResolutionError;

/// Core error type for bootstrap operations.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// The host cannot run TLJH.
    #[error(transparent)]
    IncompatibleHost(#[from] IncompatibleHost),

    /// An external command exited unsuccessfully.
    #[error("Command failed with exit code {exit_code:?}: {command}")]
    CommandFailed {
        /// The argument vector as run.
        argv: Vec<String>,
        /// `argv` joined for display.
        command: String,
        exit_code: Option<i32>,
        output: String,
    },

    /// An external command could not be started at all.
    #[error("Failed to run {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The requested version could not be pinned to a git reference.
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    /// The progress page server did not come up.
    #[error("Progress page server unavailable: {message}")]
    ProgressServer { message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for bootstrap operations.
pub type Result<T> = std::result::Result<T, BootstrapError>;

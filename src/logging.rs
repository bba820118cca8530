//! Install log setup.
//!
//! The bootstrap logs to two sinks: the durable `installer.log` under the
//! install prefix (debug and above, timestamped) and stderr (info and above,
//! message only). The subscriber is installed once, after the host gate
//! passed; before that nothing is logged.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::InstallConfig;
use crate::error::Result;

/// Permission bits applied to the log file after creation.
pub const LOG_FILE_MODE: u32 = 0o500;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";

/// Handle to the installer log.
#[derive(Debug)]
pub struct InstallLog {
    path: PathBuf,
}

impl InstallLog {
    /// Create the install prefix and open the log for appending.
    ///
    /// The file is restricted to [`LOG_FILE_MODE`] once opened; the returned
    /// handle stays writable.
    pub fn open(config: &InstallConfig) -> Result<(Self, File)> {
        fs::create_dir_all(config.install_prefix())?;
        let path = config.log_path();

        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        restrict_permissions(&path)?;

        Ok((Self { path }, file))
    }

    /// Open the log and install the process-wide subscriber.
    ///
    /// Stderr verbosity follows `RUST_LOG` when set.
    pub fn init(config: &InstallConfig) -> Result<Self> {
        Self::init_with_console(config, std::io::stderr)
    }

    /// Like [`InstallLog::init`] with `console` in place of stderr.
    pub fn init_with_console<W>(config: &InstallConfig, console: W) -> Result<Self>
    where
        W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    {
        let (log, file) = Self::open(config)?;

        let file_layer = fmt::layer()
            .with_writer(Arc::new(file))
            .with_ansi(false)
            .with_target(false)
            .with_level(false)
            .with_timer(ChronoLocal::new(TIMESTAMP_FORMAT.to_string()))
            .with_filter(EnvFilter::new("tljh_bootstrap=debug"));

        let stderr_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("tljh_bootstrap=info"));
        let stderr_layer = fmt::layer()
            .with_writer(console)
            .without_time()
            .with_target(false)
            .with_level(false)
            .with_filter(stderr_filter);

        tracing_subscriber::registry()
            .with(file_layer)
            .with(stderr_layer)
            .try_init()
            .map_err(anyhow::Error::from)?;

        Ok(log)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(LOG_FILE_MODE))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}

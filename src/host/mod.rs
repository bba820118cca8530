//! Host compatibility checks.
//!
//! The bootstrap only runs on Ubuntu 20.04+ and Debian 11+ hosts with
//! systemd available. [`HostGate::check`] verifies this before anything is
//! written to disk.

pub mod gate;

use std::fmt;
use thiserror::Error;

pub use gate::HostGate;

/// Identity of the host distribution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostProfile {
    /// os-release `ID`, e.g. `ubuntu`.
    pub distro_id: String,
    /// os-release `VERSION_ID` as numbers, e.g. `[22, 4]`.
    pub distro_version: Vec<u32>,
}

impl HostProfile {
    pub fn is_ubuntu(&self) -> bool {
        self.distro_id == "ubuntu"
    }
}

impl fmt::Display for HostProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let version: Vec<String> = self.distro_version.iter().map(u32::to_string).collect();
        write!(f, "{} {}", self.distro_id, version.join("."))
    }
}

/// Reasons a host cannot run TLJH.
///
/// The `Display` output is the one-line message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IncompatibleHost {
    #[error("The Littlest JupyterHub currently supports Ubuntu or Debian Linux only")]
    UnsupportedDistro { distro_id: String },

    #[error("The Littlest JupyterHub requires Ubuntu 20.04 or higher")]
    UbuntuTooOld { version: String },

    #[error("The Littlest JupyterHub requires Debian 11 or higher")]
    DebianTooOld { version: String },

    #[error("Could not determine the host distribution: {reason}")]
    UnknownRelease { reason: String },

    #[error("The bootstrap requires at least Python 3.8 on the host, found {found}")]
    InterpreterTooOld { found: String },

    #[error("Systemd is required to run TLJH")]
    MissingSystemd { in_container: bool },
}

impl IncompatibleHost {
    /// Extra lines printed after the message.
    pub fn hints(&self) -> &'static [&'static str] {
        match self {
            Self::MissingSystemd { in_container: true } => &[
                "Running inside a docker container without systemd isn't supported",
                "We recommend against running a production TLJH instance inside a docker container",
                "For local development, see http://tljh.jupyter.org/en/latest/contributing/dev-setup.html",
            ],
            _ => &[],
        }
    }

    /// Print the message and hints to standard output.
    pub fn report(&self) {
        println!("{self}");
        for hint in self.hints() {
            println!("{hint}");
        }
    }
}

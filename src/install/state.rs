//! Install state detection and orchestrator phases.

use std::fmt;

use crate::config::InstallConfig;

/// Whether this run installs TLJH from scratch or upgrades it.
///
/// Derived from the presence of the hub interpreter; nothing else records
/// a previous install.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallState {
    FreshInstall,
    Upgrade,
}

impl InstallState {
    /// Probe the install prefix.
    pub fn detect(config: &InstallConfig) -> Self {
        if config.hub_python().exists() {
            Self::Upgrade
        } else {
            Self::FreshInstall
        }
    }
}

/// Phases of a bootstrap run, in order.
///
/// Upgrades skip [`Phase::Provisioning`]. There is no final phase: a
/// successful run ends by replacing the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Gating,
    DetectingState,
    Provisioning,
    Installing,
    HandingOff,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Gating => "gating",
            Self::DetectingState => "detecting state",
            Self::Provisioning => "provisioning",
            Self::Installing => "installing",
            Self::HandingOff => "handing off",
        };
        f.write_str(name)
    }
}

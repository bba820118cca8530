//! The bootstrap state machine.
//!
//! A run moves through [`Phase`]s strictly in order: gate the host, detect
//! whether TLJH is already installed, provision the hub environment on a
//! fresh host, install or upgrade the TLJH installer into it, and hand off.
//! Every external command runs to completion before the next starts, since
//! package manager operations cannot share the system safely.

use std::cell::RefCell;
use std::fs;

use tracing::{debug, info, warn};

use crate::config::{InstallConfig, INSTALLER_MODULE};
use crate::error::Result;
use crate::host::{HostGate, HostProfile};
use crate::progress::{ProgressLauncher, ProgressServerHandle};
use crate::shell::{argv, is_elevated, CommandOptions, CommandRunner};
use crate::version::{VersionReference, VersionResolver, LATEST};

use super::handoff::Handoff;
use super::state::{InstallState, Phase};

/// Packages the hub environment needs from the system package manager.
const BASE_PACKAGES: &[&str] = &["python3", "python3-venv", "python3-pip", "git", "sudo"];

/// What the user asked for on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BootstrapRequest {
    /// Start the progress page.
    pub show_progress_page: bool,
    /// Explicit version or git reference.
    pub version: Option<String>,
    /// Flags for the TLJH installer.
    pub forwarded: Vec<String>,
}

/// The package installed into the hub environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageLocator {
    pub spec: String,
    pub editable: bool,
}

impl PackageLocator {
    fn install_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if self.editable {
            args.push("--editable".to_string());
        }
        args.push(self.spec.clone());
        args
    }
}

/// Drives a bootstrap run from host gate to handoff.
///
/// # Example
///
/// ```no_run
/// use tljh_bootstrap::config::InstallConfig;
/// use tljh_bootstrap::install::{BootstrapRequest, Orchestrator};
/// use tljh_bootstrap::progress::ProcessLauncher;
/// use tljh_bootstrap::shell::SystemRunner;
///
/// let config = InstallConfig::from_env();
/// let launcher = ProcessLauncher::new();
/// let orchestrator = Orchestrator::new(&config, &SystemRunner, &launcher);
/// let handoff = orchestrator
///     .run(&BootstrapRequest::default(), |_| Ok(()))
///     .unwrap();
/// println!("{}", handoff.printable());
/// ```
pub struct Orchestrator<'a> {
    config: &'a InstallConfig,
    gate: HostGate,
    runner: &'a dyn CommandRunner,
    launcher: &'a dyn ProgressLauncher,
    phases: RefCell<Vec<Phase>>,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        config: &'a InstallConfig,
        runner: &'a dyn CommandRunner,
        launcher: &'a dyn ProgressLauncher,
    ) -> Self {
        Self {
            config,
            gate: HostGate::new(),
            runner,
            launcher,
            phases: RefCell::new(Vec::new()),
        }
    }

    /// Use a custom host gate.
    pub fn with_gate(mut self, gate: HostGate) -> Self {
        self.gate = gate;
        self
    }

    /// Phases entered so far, in order.
    pub fn phases(&self) -> Vec<Phase> {
        self.phases.borrow().clone()
    }

    /// Run the bootstrap up to the point of handoff.
    ///
    /// `prepare_log` runs once the host gate passed and before any state is
    /// probed; `main` uses it to open the installer log.
    pub fn run<F>(&self, request: &BootstrapRequest, prepare_log: F) -> Result<Handoff>
    where
        F: FnOnce(&InstallConfig) -> Result<()>,
    {
        self.enter(Phase::Gating);
        let profile = self.gate.check()?;

        let progress = if request.show_progress_page {
            self.start_progress_page()
        } else {
            None
        };

        prepare_log(self.config)?;
        debug!("Host is {}", profile);
        if !is_elevated() {
            warn!("Not running as root; package installation will likely fail");
        }

        self.enter(Phase::DetectingState);
        let state = InstallState::detect(self.config);

        match state {
            InstallState::Upgrade => info!("Existing TLJH installation detected, upgrading..."),
            InstallState::FreshInstall => {
                info!("Existing TLJH installation not detected, installing...");
                self.enter(Phase::Provisioning);
                self.provision(&profile)?;
            }
        }

        self.enter(Phase::Installing);
        self.install(state, request.version.as_deref())?;

        self.enter(Phase::HandingOff);
        Ok(self.handoff(&request.forwarded, progress))
    }

    fn enter(&self, phase: Phase) {
        debug!("Entering phase: {}", phase);
        self.phases.borrow_mut().push(phase);
    }

    fn start_progress_page(&self) -> Option<ProgressServerHandle> {
        match self.launcher.launch(&self.config.log_path()) {
            Ok(handle) => Some(handle),
            // The page is optional; a taken port must not stop the install.
            Err(_unavailable) => None,
        }
    }

    /// Install system packages and create the hub environment.
    fn provision(&self, profile: &HostProfile) -> Result<()> {
        info!("Setting up hub environment...");
        info!("Installing Python, venv, pip, and git via apt-get...");

        let plain = CommandOptions::default();
        let noninteractive =
            CommandOptions::default().with_env("DEBIAN_FRONTEND", "noninteractive");

        self.runner.run(&argv(["apt-get", "update"]), &plain)?;
        self.runner.run(
            &argv(["apt-get", "install", "--yes", "software-properties-common"]),
            &noninteractive,
        )?;
        if profile.is_ubuntu() {
            self.runner
                .run(&argv(["add-apt-repository", "universe", "--yes"]), &plain)?;
        }
        self.runner.run(&argv(["apt-get", "update"]), &plain)?;

        let mut install = argv(["apt-get", "install", "--yes"]);
        install.extend(argv(BASE_PACKAGES.iter().copied()));
        self.runner.run(&install, &noninteractive)?;

        let hub_env = self.config.hub_env();
        info!("Setting up virtual environment at {}", hub_env.display());
        fs::create_dir_all(&hub_env)?;
        let target = hub_env.display().to_string();
        self.runner
            .run(&argv(["python3", "-m", "venv", target.as_str()]), &plain)?;

        Ok(())
    }

    /// Upgrade pip, pick the TLJH package, and install it.
    fn install(&self, state: InstallState, requested_version: Option<&str>) -> Result<()> {
        let plain = CommandOptions::default();
        let pip = self.config.hub_pip().display().to_string();

        info!("Upgrading pip...");
        self.runner
            .run(&argv([pip.as_str(), "install", "--upgrade", "pip"]), &plain)?;

        let locator = self.package_locator(requested_version)?;
        let mut install = argv([pip.as_str(), "install", "--upgrade"]);
        install.extend(locator.install_args());

        match state {
            InstallState::FreshInstall => info!("Installing TLJH installer..."),
            InstallState::Upgrade => info!("Upgrading TLJH installer..."),
        }
        self.runner.run(&install, &plain)?;

        Ok(())
    }

    /// Choose between a resolved git reference and the pinned locator.
    ///
    /// An explicit version always wins over the pinned locator; editable
    /// mode only applies to the pinned locator.
    pub fn package_locator(&self, requested_version: Option<&str>) -> Result<PackageLocator> {
        let requested_version = requested_version.filter(|version| !version.is_empty());

        if let (Some(spec), None) = (&self.config.pip_spec, requested_version) {
            if self.config.dev_mode {
                info!("Selected TLJH_BOOTSTRAP_DEV=yes...");
            }
            return Ok(PackageLocator {
                spec: spec.clone(),
                editable: self.config.dev_mode,
            });
        }

        let reference = VersionReference::classify(requested_version.unwrap_or(LATEST));
        let resolved =
            VersionResolver::new(self.runner, self.config.repository.as_str()).resolve(&reference)?;

        Ok(PackageLocator {
            spec: self.config.git_pip_spec(&resolved),
            editable: false,
        })
    }

    fn handoff(&self, forwarded: &[String], progress: Option<ProgressServerHandle>) -> Handoff {
        let mut flags = forwarded.to_vec();
        if let Some(handle) = progress {
            flags.extend(handle.handoff_flags());
        }

        info!("Running TLJH installer...");
        Handoff::new(self.config.hub_python(), INSTALLER_MODULE, flags)
    }
}

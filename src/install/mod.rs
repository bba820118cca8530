//! Installation orchestration.
//!
//! - [`orchestrator`] - The phase state machine driving a bootstrap run
//! - [`state`] - Fresh install versus upgrade detection
//! - [`handoff`] - Replacing the process with the TLJH installer

pub mod handoff;
pub mod orchestrator;
pub mod state;

pub use handoff::Handoff;
pub use orchestrator::{BootstrapRequest, Orchestrator, PackageLocator};
pub use state::{InstallState, Phase};

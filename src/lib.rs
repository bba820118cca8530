//! tljh-bootstrap - Bootstrap an installation of The Littlest JupyterHub.
//!
//! The bootstrap runs on a bare Ubuntu or Debian host. It checks that the
//! host can run TLJH, installs Python through the system package manager,
//! creates the hub virtual environment, installs the TLJH installer into
//! it, and then hands the process over to that installer.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument splitting
//! - [`config`] - Environment-driven install configuration
//! - [`error`] - Error types and result aliases
//! - [`host`] - Host compatibility gate
//! - [`install`] - Orchestration from gate to handoff
//! - [`logging`] - Installer log and tracing setup
//! - [`parse`] - Text parsers for os-release, versions and git output
//! - [`progress`] - Optional web page showing the installer log
//! - [`shell`] - External command execution
//! - [`version`] - Release tag resolution
//!
//! # Example
//!
//! ```
//! use tljh_bootstrap::version::{resolve_from_listing, VersionReference};
//!
//! let listing = "a1\trefs/tags/1.0.0\nb2\trefs/tags/1.1.0\nc3\trefs/tags/2.0.0\n";
//! let resolved = resolve_from_listing(&VersionReference::classify("1"), listing).unwrap();
//! assert_eq!(resolved, "1.1.0");
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod host;
pub mod install;
pub mod logging;
pub mod parse;
pub mod progress;
pub mod shell;
pub mod version;

pub use error::{BootstrapError, Result};

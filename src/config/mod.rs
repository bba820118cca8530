//! Bootstrap configuration.
//!
//! The bootstrap is configured through a handful of environment variables;
//! see [`InstallConfig`].

pub mod install;

pub use install::{
    InstallConfig, DEFAULT_PREFIX, DEV_ENV, INSTALLER_MODULE, PIP_SPEC_ENV, PREFIX_ENV,
    REPOSITORY_URL,
};

//! Install configuration from the environment.

use std::path::{Path, PathBuf};

/// Location of the TLJH installation root.
pub const PREFIX_ENV: &str = "TLJH_INSTALL_PREFIX";

/// Package locator installed instead of a resolved git reference.
pub const PIP_SPEC_ENV: &str = "TLJH_BOOTSTRAP_PIP_SPEC";

/// `yes` installs the pinned locator in editable mode.
pub const DEV_ENV: &str = "TLJH_BOOTSTRAP_DEV";

/// Default installation root.
pub const DEFAULT_PREFIX: &str = "/opt/tljh";

/// Repository whose tags define the installable versions.
pub const REPOSITORY_URL: &str = "https://github.com/jupyterhub/the-littlest-jupyterhub.git";

/// Module run by the hub interpreter at handoff.
pub const INSTALLER_MODULE: &str = "tljh.installer";

/// Settings that shape an install run.
///
/// # Example
///
/// ```
/// use tljh_bootstrap::config::InstallConfig;
///
/// let config = InstallConfig::from_env_with(|key| match key {
///     "TLJH_INSTALL_PREFIX" => Ok("/srv/tljh".to_string()),
///     _ => Err(std::env::VarError::NotPresent),
/// });
/// assert_eq!(config.hub_python().to_str(), Some("/srv/tljh/hub/bin/python3"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallConfig {
    /// Root of the installation.
    pub install_prefix: PathBuf,
    /// Pinned package locator; `None` means resolve a git reference.
    pub pip_spec: Option<String>,
    /// Install the pinned locator with `--editable`.
    pub dev_mode: bool,
    /// Repository for tag lookup and git locators.
    pub repository: String,
}

impl Default for InstallConfig {
    fn default() -> Self {
        Self {
            install_prefix: PathBuf::from(DEFAULT_PREFIX),
            pip_spec: None,
            dev_mode: false,
            repository: REPOSITORY_URL.to_string(),
        }
    }
}

impl InstallConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_env_with(|key| std::env::var(key))
    }

    /// Read the configuration with a custom env var lookup (for testing).
    ///
    /// Empty values count as unset.
    pub fn from_env_with<F>(env_fn: F) -> Self
    where
        F: Fn(&str) -> Result<String, std::env::VarError>,
    {
        let lookup = |key: &str| env_fn(key).ok().filter(|value| !value.is_empty());

        Self {
            install_prefix: lookup(PREFIX_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_PREFIX)),
            pip_spec: lookup(PIP_SPEC_ENV),
            dev_mode: lookup(DEV_ENV).as_deref() == Some("yes"),
            ..Default::default()
        }
    }

    pub fn install_prefix(&self) -> &Path {
        &self.install_prefix
    }

    /// The isolated environment holding the TLJH installer.
    pub fn hub_env(&self) -> PathBuf {
        self.install_prefix.join("hub")
    }

    /// Interpreter of the hub environment; its presence marks an existing install.
    pub fn hub_python(&self) -> PathBuf {
        self.hub_env().join("bin").join("python3")
    }

    /// Package installer of the hub environment.
    pub fn hub_pip(&self) -> PathBuf {
        self.hub_env().join("bin").join("pip")
    }

    /// Append-only installer log.
    pub fn log_path(&self) -> PathBuf {
        self.install_prefix.join("installer.log")
    }

    /// Package locator for a git reference of the repository.
    pub fn git_pip_spec(&self, reference: &str) -> String {
        format!("git+{}@{}", self.repository, reference)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> InstallConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        InstallConfig::from_env_with(|key| vars.get(key).cloned().ok_or(std::env::VarError::NotPresent))
    }

    #[test]
    fn defaults_without_env() {
        let config = config_from(&[]);
        assert_eq!(config, InstallConfig::default());
        assert_eq!(config.install_prefix(), Path::new("/opt/tljh"));
    }

    #[test]
    fn derived_paths() {
        let config = config_from(&[]);
        assert_eq!(config.hub_env(), PathBuf::from("/opt/tljh/hub"));
        assert_eq!(config.hub_python(), PathBuf::from("/opt/tljh/hub/bin/python3"));
        assert_eq!(config.hub_pip(), PathBuf::from("/opt/tljh/hub/bin/pip"));
        assert_eq!(config.log_path(), PathBuf::from("/opt/tljh/installer.log"));
    }

    #[test]
    fn prefix_override() {
        let config = config_from(&[(PREFIX_ENV, "/srv/tljh")]);
        assert_eq!(config.hub_env(), PathBuf::from("/srv/tljh/hub"));
    }

    #[test]
    fn pip_spec_and_dev_mode() {
        let config = config_from(&[(PIP_SPEC_ENV, "/srv/src/tljh"), (DEV_ENV, "yes")]);
        assert_eq!(config.pip_spec.as_deref(), Some("/srv/src/tljh"));
        assert!(config.dev_mode);
    }

    #[test]
    fn dev_mode_requires_literal_yes() {
        for value in ["no", "YES", "true", "1", ""] {
            assert!(!config_from(&[(DEV_ENV, value)]).dev_mode, "{value}");
        }
    }

    #[test]
    fn empty_values_are_unset() {
        let config = config_from(&[(PREFIX_ENV, ""), (PIP_SPEC_ENV, "")]);
        assert_eq!(config.install_prefix(), Path::new(DEFAULT_PREFIX));
        assert!(config.pip_spec.is_none());
    }

    #[test]
    fn git_pip_spec_points_at_repository() {
        let config = config_from(&[]);
        assert_eq!(
            config.git_pip_spec("1.0.0"),
            "git+https://github.com/jupyterhub/the-littlest-jupyterhub.git@1.0.0"
        );
    }
}

//! The host compatibility gate.

use std::fs;
use std::path::PathBuf;
use std::process::Command;

use crate::parse::{parse_dotted_version, parse_os_release, parse_python_version};
use crate::shell::{parse_system_path, resolve_tool_path};

use super::{HostProfile, IncompatibleHost};

/// Standard location of the distribution metadata.
pub const OS_RELEASE_PATH: &str = "/etc/os-release";

/// File present inside docker containers.
pub const CONTAINER_MARKER: &str = "/.dockerenv";

const MINIMUM_UBUNTU: &[u32] = &[20, 4];
const MINIMUM_DEBIAN: &[u32] = &[11];
const MINIMUM_PYTHON: &[u32] = &[3, 8];

/// Service manager and its control CLI.
const SUPERVISION_TOOLS: &[&str] = &["systemd", "systemctl"];

/// Checks that the host can run TLJH.
///
/// Paths are overridable so the gate can be pointed at fixtures.
///
/// # Example
///
/// ```no_run
/// use tljh_bootstrap::host::HostGate;
///
/// match HostGate::new().check() {
///     Ok(profile) => println!("Installing on {profile}"),
///     Err(reason) => reason.report(),
/// }
/// ```
#[derive(Debug, Clone)]
pub struct HostGate {
    os_release_path: PathBuf,
    search_path: Vec<PathBuf>,
    container_marker: PathBuf,
}

impl Default for HostGate {
    fn default() -> Self {
        Self::new()
    }
}

impl HostGate {
    /// Gate the real host.
    pub fn new() -> Self {
        Self {
            os_release_path: PathBuf::from(OS_RELEASE_PATH),
            search_path: parse_system_path(),
            container_marker: PathBuf::from(CONTAINER_MARKER),
        }
    }

    pub fn with_os_release(mut self, path: impl Into<PathBuf>) -> Self {
        self.os_release_path = path.into();
        self
    }

    pub fn with_search_path(mut self, search_path: Vec<PathBuf>) -> Self {
        self.search_path = search_path;
        self
    }

    pub fn with_container_marker(mut self, path: impl Into<PathBuf>) -> Self {
        self.container_marker = path.into();
        self
    }

    /// Run every check, returning the host identity on success.
    pub fn check(&self) -> Result<HostProfile, IncompatibleHost> {
        let profile = self.read_profile()?;
        self.check_interpreter()?;
        self.check_supervision()?;
        Ok(profile)
    }

    fn read_profile(&self) -> Result<HostProfile, IncompatibleHost> {
        let content = fs::read_to_string(&self.os_release_path).map_err(|err| {
            IncompatibleHost::UnknownRelease {
                reason: format!("cannot read {}: {}", self.os_release_path.display(), err),
            }
        })?;
        let fields = parse_os_release(&content);

        let distro_id = fields
            .get("ID")
            .ok_or_else(|| IncompatibleHost::UnknownRelease {
                reason: format!("no ID in {}", self.os_release_path.display()),
            })?;
        let version_id = fields.get("VERSION_ID").map(String::as_str).unwrap_or("");

        check_distro(distro_id, version_id)
    }

    fn check_interpreter(&self) -> Result<(), IncompatibleHost> {
        // Provisioning installs python3 when it is missing.
        let Some(python) = resolve_tool_path("python3", &self.search_path) else {
            return Ok(());
        };
        let Ok(output) = Command::new(&python).arg("--version").output() else {
            return Ok(());
        };

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));
        check_python_version(&text)
    }

    fn check_supervision(&self) -> Result<(), IncompatibleHost> {
        let missing = SUPERVISION_TOOLS
            .iter()
            .any(|tool| resolve_tool_path(tool, &self.search_path).is_none());

        if missing {
            return Err(IncompatibleHost::MissingSystemd {
                in_container: self.container_marker.exists(),
            });
        }
        Ok(())
    }
}

/// Check the distribution id and `VERSION_ID` against the supported set.
pub fn check_distro(distro_id: &str, version_id: &str) -> Result<HostProfile, IncompatibleHost> {
    let minimum = match distro_id {
        "ubuntu" => MINIMUM_UBUNTU,
        "debian" => MINIMUM_DEBIAN,
        _ => {
            return Err(IncompatibleHost::UnsupportedDistro {
                distro_id: distro_id.to_string(),
            })
        }
    };

    let distro_version =
        parse_dotted_version(version_id).ok_or_else(|| IncompatibleHost::UnknownRelease {
            reason: format!("unrecognized {distro_id} version '{version_id}'"),
        })?;

    if distro_version.as_slice() < minimum {
        let version = version_id.to_string();
        return Err(if distro_id == "ubuntu" {
            IncompatibleHost::UbuntuTooOld { version }
        } else {
            IncompatibleHost::DebianTooOld { version }
        });
    }

    Ok(HostProfile {
        distro_id: distro_id.to_string(),
        distro_version,
    })
}

/// Check `python3 --version` output against the minimum interpreter.
///
/// Output without a recognizable version passes.
pub fn check_python_version(output: &str) -> Result<(), IncompatibleHost> {
    match parse_python_version(output) {
        Some(version) if version.as_slice() < MINIMUM_PYTHON => {
            let found: Vec<String> = version.iter().map(u32::to_string).collect();
            Err(IncompatibleHost::InterpreterTooOld {
                found: found.join("."),
            })
        }
        _ => Ok(()),
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ubuntu_versions() {
        assert!(check_distro("ubuntu", "20.04").is_ok());
        assert!(check_distro("ubuntu", "22.04").is_ok());
        assert!(check_distro("ubuntu", "24.10").is_ok());
        assert_eq!(
            check_distro("ubuntu", "18.04").unwrap_err(),
            IncompatibleHost::UbuntuTooOld {
                version: "18.04".into()
            }
        );
        assert!(check_distro("ubuntu", "20.03").is_err());
    }

    #[test]
    fn debian_versions() {
        assert!(check_distro("debian", "11").is_ok());
        assert!(check_distro("debian", "12").is_ok());
        assert_eq!(
            check_distro("debian", "10").unwrap_err(),
            IncompatibleHost::DebianTooOld {
                version: "10".into()
            }
        );
    }

    #[test]
    fn other_distros_always_fail() {
        for (id, version) in [("fedora", "40"), ("centos", "9"), ("arch", ""), ("", "22.04")] {
            assert!(matches!(
                check_distro(id, version),
                Err(IncompatibleHost::UnsupportedDistro { .. })
            ));
        }
    }

    #[test]
    fn unparsable_version_fails() {
        assert!(matches!(
            check_distro("debian", ""),
            Err(IncompatibleHost::UnknownRelease { .. })
        ));
        assert!(matches!(
            check_distro("ubuntu", "jammy"),
            Err(IncompatibleHost::UnknownRelease { .. })
        ));
    }

    #[test]
    fn profile_carries_parsed_version() {
        let profile = check_distro("ubuntu", "22.04").unwrap();
        assert_eq!(profile.distro_id, "ubuntu");
        assert_eq!(profile.distro_version, vec![22, 4]);
    }

    #[test]
    fn python_versions() {
        assert!(check_python_version("Python 3.8.10").is_ok());
        assert!(check_python_version("Python 3.12.3\n").is_ok());
        assert_eq!(
            check_python_version("Python 3.6.9").unwrap_err(),
            IncompatibleHost::InterpreterTooOld {
                found: "3.6.9".into()
            }
        );
        assert!(check_python_version("Python 2.7.18").is_err());
        assert!(check_python_version("").is_ok());
    }

    #[cfg(unix)]
    mod with_fixtures {
        use super::super::fixtures::{gate_for, passing_gate};
        use super::*;

        #[test]
        fn passing_host() {
            let temp = tempfile::TempDir::new().unwrap();
            let profile = passing_gate(temp.path()).check().unwrap();
            assert!(profile.is_ubuntu());
        }

        #[test]
        fn missing_os_release() {
            let temp = tempfile::TempDir::new().unwrap();
            let gate = passing_gate(temp.path()).with_os_release(temp.path().join("absent"));
            assert!(matches!(
                gate.check(),
                Err(IncompatibleHost::UnknownRelease { .. })
            ));
        }

        #[test]
        fn missing_systemctl() {
            let temp = tempfile::TempDir::new().unwrap();
            let gate = gate_for(temp.path(), "ID=debian\nVERSION_ID=\"12\"\n", &["systemd"]);
            assert_eq!(
                gate.check().unwrap_err(),
                IncompatibleHost::MissingSystemd {
                    in_container: false
                }
            );
        }

        #[test]
        fn missing_systemd_in_container() {
            let temp = tempfile::TempDir::new().unwrap();
            let gate = gate_for(temp.path(), "ID=debian\nVERSION_ID=\"12\"\n", &[]);
            fs::write(temp.path().join("dockerenv"), "").unwrap();

            let err = gate.check().unwrap_err();
            assert_eq!(err, IncompatibleHost::MissingSystemd { in_container: true });
            assert!(!err.hints().is_empty());
        }

        #[test]
        fn distro_checked_before_systemd() {
            let temp = tempfile::TempDir::new().unwrap();
            let gate = gate_for(temp.path(), "ID=ubuntu\nVERSION_ID=\"18.04\"\n", &[]);
            assert!(matches!(
                gate.check(),
                Err(IncompatibleHost::UbuntuTooOld { .. })
            ));
        }

        #[test]
        fn old_host_python_fails() {
            let temp = tempfile::TempDir::new().unwrap();
            let gate = gate_for(
                temp.path(),
                "ID=ubuntu\nVERSION_ID=\"20.04\"\n",
                &["systemd", "systemctl"],
            );
            let python = temp.path().join("bin").join("python3");
            fs::write(&python, "#!/bin/sh\necho 'Python 3.6.9'\n").unwrap();
            {
                use std::os::unix::fs::PermissionsExt;
                fs::set_permissions(&python, fs::Permissions::from_mode(0o755)).unwrap();
            }

            assert_eq!(
                gate.check().unwrap_err(),
                IncompatibleHost::InterpreterTooOld {
                    found: "3.6.9".into()
                }
            );
        }
    }
}

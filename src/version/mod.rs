//! Version references and their resolution against the remote tag catalog.
//!
//! A user asks for `latest`, a partial version (`1`, `1.0`, `1.0.3`), or an
//! arbitrary git reference (`main`, a commit hash). The first two are
//! resolved against the repository's release tags; anything else is passed
//! through to the package installer untouched.

pub mod resolver;

use std::fmt;
use thiserror::Error;

use crate::parse::parse_version_prefix;

pub use resolver::{resolve_from_listing, TagCatalog, VersionResolver};

/// Symbolic reference for the newest release.
pub const LATEST: &str = "latest";

/// A concrete release version, `MAJOR.MINOR.PATCH`.
///
/// Ordering is numeric on major, then minor, then patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl Version {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Whether the leading components of this version equal `prefix`.
    ///
    /// A prefix longer than three components never matches.
    pub fn matches_prefix(&self, prefix: &[u64]) -> bool {
        let components = [self.major, self.minor, self.patch];
        prefix.len() <= components.len() && components[..prefix.len()] == *prefix
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// A classified version request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionReference {
    /// The newest release.
    Latest,
    /// One to three leading version components.
    Prefix { text: String, components: Vec<u64> },
    /// A branch name, commit hash, or other git reference.
    PassThrough(String),
}

impl VersionReference {
    /// Classify a requested version string.
    pub fn classify(requested: &str) -> Self {
        if requested == LATEST {
            return Self::Latest;
        }
        match parse_version_prefix(requested) {
            Some(components) => Self::Prefix {
                text: requested.to_string(),
                components,
            },
            None => Self::PassThrough(requested.to_string()),
        }
    }

    /// The text the user supplied.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Latest => LATEST,
            Self::Prefix { text, .. } => text,
            Self::PassThrough(text) => text,
        }
    }

    /// Whether this reference needs the remote tag catalog.
    pub fn is_resolvable(&self) -> bool {
        !matches!(self, Self::PassThrough(_))
    }
}

impl fmt::Display for VersionReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure to pin a version reference to a release.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    /// A line of the remote tag listing could not be parsed.
    #[error("Unexpected git ls-remote output: {line}")]
    UnexpectedTagFormat { line: String },

    /// The remote has no `MAJOR.MINOR.PATCH` tags at all.
    #[error("No MAJOR.MINOR.PATCH git tags found")]
    NoVersionsFound,

    /// No release starts with the requested components.
    #[error("No version matching {requested} found in [{}]", join_versions(.available))]
    NoMatchingVersion {
        requested: String,
        /// Every known release, ascending.
        available: Vec<Version>,
    },
}

fn join_versions(versions: &[Version]) -> String {
    versions
        .iter()
        .map(Version::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

//! Resolution of version references against the remote tag listing.

use std::collections::BTreeSet;
use tracing::{debug, info};

use crate::error::Result;
use crate::parse::{parse_release_tag, parse_tag_line};
use crate::shell::{argv, CommandOptions, CommandRunner};

use super::{ResolutionError, Version, VersionReference};

/// The set of `MAJOR.MINOR.PATCH` releases found on the remote.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagCatalog {
    versions: BTreeSet<Version>,
}

impl TagCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, version: Version) {
        self.versions.insert(version);
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    /// The highest release.
    pub fn latest(&self) -> Option<Version> {
        self.versions.last().copied()
    }

    /// The highest release whose leading components equal `prefix`.
    pub fn highest_matching(&self, prefix: &[u64]) -> Option<Version> {
        self.versions
            .iter()
            .rev()
            .find(|version| version.matches_prefix(prefix))
            .copied()
    }

    /// Every release, ascending.
    pub fn sorted(&self) -> Vec<Version> {
        self.versions.iter().copied().collect()
    }
}

impl FromIterator<Version> for TagCatalog {
    fn from_iter<I: IntoIterator<Item = Version>>(iter: I) -> Self {
        Self {
            versions: iter.into_iter().collect(),
        }
    }
}

/// Resolve `requested` against the output of `git ls-remote --tags --refs`.
///
/// A tag equal to the requested text wins immediately and is returned
/// verbatim. Otherwise the result is the highest release matching the
/// request, rendered as `MAJOR.MINOR.PATCH`.
pub fn resolve_from_listing(
    requested: &VersionReference,
    listing: &str,
) -> std::result::Result<String, ResolutionError> {
    let components = match requested {
        VersionReference::PassThrough(reference) => return Ok(reference.clone()),
        VersionReference::Latest => None,
        VersionReference::Prefix { components, .. } => Some(components.as_slice()),
    };

    let mut catalog = TagCatalog::new();
    for line in listing.lines() {
        let tag = parse_tag_line(line)?;
        if tag == requested.as_str() {
            return Ok(tag.to_string());
        }
        if let Some(version) = parse_release_tag(tag) {
            catalog.insert(version);
        }
    }

    if catalog.is_empty() {
        return Err(ResolutionError::NoVersionsFound);
    }

    let found = match components {
        None => catalog.latest(),
        Some(prefix) => catalog.highest_matching(prefix),
    };

    found
        .map(|version| version.to_string())
        .ok_or_else(|| ResolutionError::NoMatchingVersion {
            requested: requested.as_str().to_string(),
            available: catalog.sorted(),
        })
}

/// Pins version references to git references of a repository.
pub struct VersionResolver<'a> {
    runner: &'a dyn CommandRunner,
    repository: String,
}

impl<'a> VersionResolver<'a> {
    pub fn new(runner: &'a dyn CommandRunner, repository: impl Into<String>) -> Self {
        Self {
            runner,
            repository: repository.into(),
        }
    }

    /// Resolve a classified reference.
    ///
    /// Pass-through references return unchanged without touching the
    /// network; everything else costs one `git ls-remote`.
    pub fn resolve(&self, requested: &VersionReference) -> Result<String> {
        if !requested.is_resolvable() {
            debug!("Using git reference {} as given", requested);
            return Ok(requested.as_str().to_string());
        }

        let listing = self.fetch_tags()?;
        let resolved = resolve_from_listing(requested, &listing)?;
        info!("Resolved version {} to {}", requested, resolved);
        Ok(resolved)
    }

    fn fetch_tags(&self) -> Result<String> {
        let command = argv(["git", "ls-remote", "--tags", "--refs", &self.repository]);
        self.runner.run(&command, &CommandOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BootstrapError;
    use crate::shell::MockRunner;

    const REPO: &str = "https://github.com/jupyterhub/the-littlest-jupyterhub.git";

    fn listing(tags: &[&str]) -> String {
        tags.iter()
            .enumerate()
            .map(|(i, tag)| format!("{:040x}\trefs/tags/{}\n", i + 1, tag))
            .collect()
    }

    fn resolve(requested: &str, tags: &[&str]) -> std::result::Result<String, ResolutionError> {
        resolve_from_listing(&VersionReference::classify(requested), &listing(tags))
    }

    #[test]
    fn major_prefix_picks_highest_match() {
        assert_eq!(resolve("1", &["1.0.0", "1.2.0", "2.0.0"]).unwrap(), "1.2.0");
    }

    #[test]
    fn minor_prefix_picks_highest_patch() {
        let tags = ["0.1.0", "1.0.0", "1.0.1", "1.0.10", "1.1.0"];
        assert_eq!(resolve("1.0", &tags).unwrap(), "1.0.10");
    }

    #[test]
    fn full_version_matches_itself() {
        let tags = ["1.0.0", "1.0.1", "1.1.0"];
        assert_eq!(resolve("1.0.1", &tags).unwrap(), "1.0.1");
    }

    #[test]
    fn latest_picks_maximum() {
        let tags = ["0.9.9", "1.10.0", "1.9.0", "1.2.3b1", "v3.0.0"];
        assert_eq!(resolve("latest", &tags).unwrap(), "1.10.0");
    }

    #[test]
    fn latest_is_numeric_not_lexical() {
        assert_eq!(resolve("latest", &["9.0.0", "10.0.0"]).unwrap(), "10.0.0");
    }

    #[test]
    fn no_matching_version_lists_sorted_catalog() {
        let err = resolve("2", &["1.0.0"]).unwrap_err();
        assert_eq!(
            err,
            ResolutionError::NoMatchingVersion {
                requested: "2".into(),
                available: vec![Version::new(1, 0, 0)],
            }
        );
    }

    #[test]
    fn no_matching_version_catalog_is_ascending() {
        let err = resolve("3", &["2.0.0", "0.1.0", "1.0.0"]).unwrap_err();
        match err {
            ResolutionError::NoMatchingVersion { available, .. } => assert_eq!(
                available,
                vec![
                    Version::new(0, 1, 0),
                    Version::new(1, 0, 0),
                    Version::new(2, 0, 0)
                ]
            ),
            other => panic!("Expected NoMatchingVersion, got {other:?}"),
        }
    }

    #[test]
    fn empty_catalog_fails() {
        assert_eq!(
            resolve("latest", &["v1", "nightly"]).unwrap_err(),
            ResolutionError::NoVersionsFound
        );
        assert_eq!(resolve("1", &[]).unwrap_err(), ResolutionError::NoVersionsFound);
    }

    #[test]
    fn exact_tag_match_short_circuits() {
        assert_eq!(resolve("latest", &["1.0.0", "latest"]).unwrap(), "latest");
        assert_eq!(resolve("1.0", &["1.0", "1.0.5"]).unwrap(), "1.0");
    }

    #[test]
    fn exact_match_wins_before_later_malformed_lines() {
        let output = format!("{}garbage line\n", listing(&["1.0.0"]));
        let requested = VersionReference::classify("1.0.0");
        assert_eq!(resolve_from_listing(&requested, &output).unwrap(), "1.0.0");
    }

    #[test]
    fn malformed_line_is_reported() {
        let output = format!("{}garbage line\n", listing(&["1.0.0"]));
        let err = resolve_from_listing(&VersionReference::Latest, &output).unwrap_err();
        assert_eq!(
            err,
            ResolutionError::UnexpectedTagFormat {
                line: "garbage line".into()
            }
        );
    }

    #[test]
    fn duplicate_tags_collapse() {
        let catalog: TagCatalog = [Version::new(1, 0, 0), Version::new(1, 0, 0)]
            .into_iter()
            .collect();
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn highest_matching_agrees_with_brute_force() {
        let catalog: TagCatalog = [
            Version::new(0, 1, 0),
            Version::new(0, 1, 5),
            Version::new(1, 0, 0),
            Version::new(1, 0, 3),
            Version::new(1, 4, 0),
            Version::new(2, 0, 0),
        ]
        .into_iter()
        .collect();

        let prefixes: Vec<Vec<u64>> = vec![
            vec![0],
            vec![1],
            vec![2],
            vec![3],
            vec![0, 1],
            vec![1, 0],
            vec![1, 4],
            vec![1, 2],
            vec![1, 0, 3],
            vec![1, 0, 4],
        ];
        for prefix in prefixes {
            let expected = catalog
                .sorted()
                .into_iter()
                .filter(|v| v.matches_prefix(&prefix))
                .max();
            assert_eq!(catalog.highest_matching(&prefix), expected, "{prefix:?}");
        }
    }

    #[test]
    fn pass_through_makes_no_calls() {
        let runner = MockRunner::new();
        let resolver = VersionResolver::new(&runner, REPO);

        let resolved = resolver
            .resolve(&VersionReference::classify("main"))
            .unwrap();

        assert_eq!(resolved, "main");
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn resolver_queries_remote_tags_once() {
        let mut runner = MockRunner::new();
        runner.set_output("git ls-remote", &listing(&["1.0.0", "1.2.0", "2.0.0"]));
        let resolver = VersionResolver::new(&runner, REPO);

        let resolved = resolver.resolve(&VersionReference::classify("1")).unwrap();

        assert_eq!(resolved, "1.2.0");
        assert_eq!(
            runner.commands(),
            vec![format!("git ls-remote --tags --refs {REPO}")]
        );
    }

    #[test]
    fn resolver_propagates_git_failure() {
        let mut runner = MockRunner::new();
        runner.set_failure("git ls-remote", 128, "fatal: unable to access");
        let resolver = VersionResolver::new(&runner, REPO);

        let err = resolver.resolve(&VersionReference::Latest).unwrap_err();

        assert!(matches!(
            err,
            BootstrapError::CommandFailed {
                exit_code: Some(128),
                ..
            }
        ));
    }

    #[test]
    fn resolver_wraps_resolution_errors() {
        let mut runner = MockRunner::new();
        runner.set_output("git ls-remote", &listing(&["1.0.0"]));
        let resolver = VersionResolver::new(&runner, REPO);

        let err = resolver
            .resolve(&VersionReference::classify("2"))
            .unwrap_err();

        assert!(matches!(
            err,
            BootstrapError::Resolution(ResolutionError::NoMatchingVersion { .. })
        ));
    }
}

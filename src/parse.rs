//! Parsing of loosely structured text from the host and the remote.
//!
//! Every piece of external text the bootstrap reads (os-release metadata,
//! `python3 --version` output, `git ls-remote` listings, user supplied
//! version strings) is turned into typed values here. Parsers return
//! `Option` or `Result` per input so callers can report the exact line
//! that failed.

use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

use crate::version::{ResolutionError, Version};

/// `<sha> refs/tags/<tag>` as printed by `git ls-remote --tags --refs`.
static TAG_LINE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<sha>[a-f0-9]+)\s+refs/tags/(?P<tag>\S+)$")
        .expect("TAG_LINE_REGEX must compile")
});

/// Strict `MAJOR.MINOR.PATCH` release tag.
static RELEASE_TAG_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<major>[0-9]+)\.(?P<minor>[0-9]+)\.(?P<patch>[0-9]+)$")
        .expect("RELEASE_TAG_REGEX must compile")
});

/// One to three dot separated numbers, e.g. `1`, `1.0` or `1.0.3`.
static VERSION_PREFIX_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]+(\.[0-9]+)?(\.[0-9]+)?$").expect("VERSION_PREFIX_REGEX must compile")
});

/// Version number in `python3 --version` output.
static PYTHON_VERSION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Python\s+(?P<version>[0-9]+(?:\.[0-9]+)*)")
        .expect("PYTHON_VERSION_REGEX must compile")
});

/// Parse the `KEY=VALUE` lines of an os-release file.
///
/// Values may be wrapped in single or double quotes. Comments, blank lines
/// and lines without `=` are skipped.
pub fn parse_os_release(content: &str) -> HashMap<String, String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| (key.trim().to_string(), unquote(value.trim())))
        .collect()
}

fn unquote(value: &str) -> String {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner.replace("\\\"", "\"").replace("\\\\", "\\");
        }
    }
    value.to_string()
}

/// Parse a dotted numeric version such as `20.04` into `[20, 4]`.
///
/// Returns `None` if any component is not a number.
pub fn parse_dotted_version(value: &str) -> Option<Vec<u32>> {
    if value.is_empty() {
        return None;
    }
    value.split('.').map(|part| part.parse().ok()).collect()
}

/// Extract the version from `python3 --version` output.
pub fn parse_python_version(output: &str) -> Option<Vec<u32>> {
    let caps = PYTHON_VERSION_REGEX.captures(output)?;
    parse_dotted_version(&caps["version"])
}

/// Parse a requested version prefix (`1`, `1.0`, `1.0.3`).
///
/// Returns `None` for anything that is not one to three numbers, including
/// numbers too large to represent.
pub fn parse_version_prefix(value: &str) -> Option<Vec<u64>> {
    if !VERSION_PREFIX_REGEX.is_match(value) {
        return None;
    }
    value.split('.').map(|part| part.parse().ok()).collect()
}

/// Extract the tag name from one line of `git ls-remote --tags --refs`.
pub fn parse_tag_line(line: &str) -> std::result::Result<&str, ResolutionError> {
    TAG_LINE_REGEX
        .captures(line)
        .and_then(|caps| caps.name("tag"))
        .map(|tag| tag.as_str())
        .ok_or_else(|| ResolutionError::UnexpectedTagFormat {
            line: line.to_string(),
        })
}

/// Parse a strict `MAJOR.MINOR.PATCH` tag. Other tags yield `None`.
pub fn parse_release_tag(tag: &str) -> Option<Version> {
    let caps = RELEASE_TAG_REGEX.captures(tag)?;
    Some(Version::new(
        caps["major"].parse().ok()?,
        caps["minor"].parse().ok()?,
        caps["patch"].parse().ok()?,
    ))
}

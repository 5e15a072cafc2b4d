use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

/// SemVer grammar: optional leading `v`, three numeric components without
/// leading zeros, optional pre-release and build metadata segments.
static SEMVER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:v)?(?P<maj>0|[1-9]\d*)\.(?P<min>0|[1-9]\d*)\.(?P<pat>0|[1-9]\d*)(?:-(?P<pre>[0-9A-Za-z-]+(?:\.[0-9A-Za-z-]+)*))?(?:\+(?P<build>[0-9A-Za-z-]+(?:\.[0-9A-Za-z-]+)*))?$",
    )
    .expect("semver pattern is valid")
});

/// Semantic version: `major.minor.patch[-pre][+build]`
///
/// `pre_release` holds the dot-separated identifiers (e.g. "rc.1", "beta4"),
/// `build_meta` the opaque metadata (e.g. "gabc123"); both are empty strings
/// when absent. Equality compares all fields; precedence (which ignores build
/// metadata) goes through [`Version::cmp_precedence`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub pre_release: String,
    pub build_meta: String,
}

#[derive(Error, Debug)]
pub enum VersionError {
    #[error("invalid version: {0}")]
    InvalidFormat(String),
}

impl Version {
    /// Version with empty pre-release and build metadata
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            pre_release: String::new(),
            build_meta: String::new(),
        }
    }

    /// Parse a version string like "1.2.3", "v1.2.3" or "1.2.3-rc.1+gabc123"
    ///
    /// The leading `v` is accepted and dropped; rendering never re-adds it.
    pub fn parse(text: &str) -> Result<Self, VersionError> {
        let caps = SEMVER_RE
            .captures(text)
            .ok_or_else(|| VersionError::InvalidFormat(text.to_string()))?;

        let number = |name: &str| -> Result<u64, VersionError> {
            caps.name(name)
                .and_then(|m| m.as_str().parse().ok())
                .ok_or_else(|| VersionError::InvalidFormat(text.to_string()))
        };

        Ok(Self {
            major: number("maj")?,
            minor: number("min")?,
            patch: number("pat")?,
            pre_release: caps
                .name("pre")
                .map(|m| m.as_str().to_string())
                .unwrap_or_default(),
            build_meta: caps
                .name("build")
                .map(|m| m.as_str().to_string())
                .unwrap_or_default(),
        })
    }

    /// SemVer precedence ordering
    ///
    /// Compares major, minor, patch numerically, then pre-release: a version
    /// without pre-release outranks one with, identifier sequences compare
    /// position by position (numeric pairs numerically, numeric below
    /// alphanumeric, otherwise byte-wise), and a strict prefix sorts lower.
    /// Build metadata never participates, so versions differing only there
    /// compare `Equal` while still being `!=`.
    pub fn cmp_precedence(&self, other: &Self) -> Ordering {
        let core = (self.major, self.minor, self.patch).cmp(&(
            other.major,
            other.minor,
            other.patch,
        ));
        if core != Ordering::Equal {
            return core;
        }

        match (self.pre_release.is_empty(), other.pre_release.is_empty()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => cmp_pre_release(&self.pre_release, &other.pre_release),
        }
    }
}

fn cmp_pre_release(a: &str, b: &str) -> Ordering {
    let left: Vec<&str> = a.split('.').collect();
    let right: Vec<&str> = b.split('.').collect();

    for (x, y) in left.iter().zip(right.iter()) {
        let ord = cmp_identifier(x, y);
        if ord != Ordering::Equal {
            return ord;
        }
    }
    left.len().cmp(&right.len())
}

fn cmp_identifier(a: &str, b: &str) -> Ordering {
    match (numeric_id(a), numeric_id(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

/// Digits-only identifiers compare numerically; anything else is opaque text.
/// Identifiers too large for u64 fall back to the text class.
fn numeric_id(s: &str) -> Option<u64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if !self.pre_release.is_empty() {
            write!(f, "-{}", self.pre_release)?;
        }
        if !self.build_meta.is_empty() {
            write!(f, "+{}", self.build_meta)?;
        }
        Ok(())
    }
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::context::GitContext;
use crate::version::Version;

/// Release branch grammar: `release/<major>.<minor>.0`, nothing else.
/// Shared by the release strategy and the remote release-branch scan.
static RELEASE_BRANCH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^release/(\d+)\.(\d+)\.0$").expect("release pattern is valid"));

/// Extract (major, minor) from a branch named `release/<major>.<minor>.0`
pub fn parse_release_branch(name: &str) -> Option<(u64, u64)> {
    let caps = RELEASE_BRANCH_RE.captures(name)?;
    let major = caps.get(1)?.as_str().parse().ok()?;
    let minor = caps.get(2)?.as_str().parse().ok()?;
    Some((major, minor))
}

/// Closed set of per-branch-class derivation rules
///
/// Each variant is a pure function from (base version, git context) to the
/// next version. `main` and `master` branches share the `Master` variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Master,
    Release,
    Develop,
    Feature,
    Hotfix,
}

#[derive(Error, Debug)]
pub enum StrategyError {
    #[error("invalid release branch name: {0}")]
    InvalidReleaseBranch(String),
}

impl Strategy {
    /// Resolve a configuration strategy name; `main` aliases `master`
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "master" | "main" => Some(Self::Master),
            "release" => Some(Self::Release),
            "develop" => Some(Self::Develop),
            "feature" => Some(Self::Feature),
            "hotfix" => Some(Self::Hotfix),
            _ => None,
        }
    }

    /// Canonical lowercase name, for diagnostics
    pub fn name(&self) -> &'static str {
        match self {
            Self::Master => "master",
            Self::Release => "release",
            Self::Develop => "develop",
            Self::Feature => "feature",
            Self::Hotfix => "hotfix",
        }
    }

    /// Derive the next version for this branch class
    ///
    /// Deterministic and side-effect-free: everything needed comes in via
    /// `base` and `ctx`.
    pub fn next_version(
        &self,
        base: &Version,
        ctx: &GitContext,
    ) -> Result<Version, StrategyError> {
        match self {
            Self::Develop => Ok(integration_line(base, ctx, "beta")),
            Self::Feature => Ok(integration_line(base, ctx, "alpha")),
            Self::Release => release_line(ctx),
            Self::Hotfix => {
                let mut v = base.clone();
                v.patch += 1;
                v.pre_release = String::new();
                v.build_meta = format!("g{}", ctx.short_sha);
                Ok(v)
            }
            Self::Master => {
                let mut v = base.clone();
                v.patch += 1;
                v.pre_release = String::new();
                v.build_meta = String::new();
                Ok(v)
            }
        }
    }
}

/// Develop and feature branches both track the next minor line: the highest
/// known release branch plus one minor when present, otherwise the base
/// version plus one minor. They differ only in the pre-release channel.
fn integration_line(base: &Version, ctx: &GitContext, channel: &str) -> Version {
    let (major, minor) = match ctx.release {
        Some((release_major, release_minor)) => (release_major, release_minor + 1),
        None => (base.major, base.minor + 1),
    };

    Version {
        major,
        minor,
        patch: 0,
        pre_release: format!("{}{}", channel, ctx.commit_distance),
        build_meta: ctx.short_sha.clone(),
    }
}

/// Release branches carry their own version in the branch name. The rc
/// pre-release only appears once commits have landed past the tag.
fn release_line(ctx: &GitContext) -> Result<Version, StrategyError> {
    let (major, minor) = parse_release_branch(&ctx.branch)
        .ok_or_else(|| StrategyError::InvalidReleaseBranch(ctx.branch.clone()))?;

    let mut v = Version::new(major, minor, 0);
    v.build_meta = format!("g{}", ctx.short_sha);
    if ctx.commit_distance > 0 {
        v.pre_release = format!("rc{}", ctx.commit_distance);
    }
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(branch: &str, distance: u64) -> GitContext {
        GitContext {
            branch: branch.to_string(),
            short_sha: "abc1234".to_string(),
            commit_distance: distance,
            ..Default::default()
        }
    }

    #[test]
    fn test_from_name() {
        assert_eq!(Strategy::from_name("master"), Some(Strategy::Master));
        assert_eq!(Strategy::from_name("main"), Some(Strategy::Master));
        assert_eq!(Strategy::from_name("release"), Some(Strategy::Release));
        assert_eq!(Strategy::from_name("develop"), Some(Strategy::Develop));
        assert_eq!(Strategy::from_name("feature"), Some(Strategy::Feature));
        assert_eq!(Strategy::from_name("hotfix"), Some(Strategy::Hotfix));
        assert_eq!(Strategy::from_name("trunk"), None);
        assert_eq!(Strategy::from_name("Master"), None);
    }

    #[test]
    fn test_develop_without_release_branch() {
        let base = Version::new(0, 1, 0);
        let next = Strategy::Develop
            .next_version(&base, &ctx("develop", 3))
            .unwrap();
        assert_eq!(next.to_string(), "0.2.0-beta3+abc1234");
    }

    #[test]
    fn test_develop_tracks_highest_release_branch() {
        let base = Version::new(0, 1, 0);
        let mut c = ctx("develop", 3);
        c.release = Some((2, 4));
        let next = Strategy::Develop.next_version(&base, &c).unwrap();
        assert_eq!(next.to_string(), "2.5.0-beta3+abc1234");
    }

    #[test]
    fn test_feature_without_release_branch() {
        let base = Version::new(0, 1, 0);
        let next = Strategy::Feature
            .next_version(&base, &ctx("feature/login", 5))
            .unwrap();
        assert_eq!(next.to_string(), "0.2.0-alpha5+abc1234");
    }

    #[test]
    fn test_feature_tracks_highest_release_branch() {
        let base = Version::new(1, 9, 2);
        let mut c = ctx("feature/login", 1);
        c.release = Some((3, 0));
        let next = Strategy::Feature.next_version(&base, &c).unwrap();
        assert_eq!(next.to_string(), "3.1.0-alpha1+abc1234");
    }

    #[test]
    fn test_release_at_tag() {
        let base = Version::new(0, 1, 0);
        let next = Strategy::Release
            .next_version(&base, &ctx("release/2.3.0", 0))
            .unwrap();
        // no rc identifier when the branch sits exactly on the tag
        assert_eq!(next.to_string(), "2.3.0+gabc1234");
    }

    #[test]
    fn test_release_with_distance() {
        let base = Version::new(0, 1, 0);
        let next = Strategy::Release
            .next_version(&base, &ctx("release/2.3.0", 4))
            .unwrap();
        assert_eq!(next.to_string(), "2.3.0-rc4+gabc1234");
    }

    #[test]
    fn test_release_rejects_malformed_branch() {
        let base = Version::new(0, 1, 0);
        for branch in [
            "release/2.3.1",
            "release/2.3",
            "release/x.y.0",
            "releases/2.3.0",
            "release/2.3.0-beta",
            "feature/release/2.3.0",
            "main",
        ] {
            let err = Strategy::Release
                .next_version(&base, &ctx(branch, 0))
                .unwrap_err();
            assert!(
                matches!(err, StrategyError::InvalidReleaseBranch(_)),
                "branch {:?} should be rejected",
                branch
            );
        }
    }

    #[test]
    fn test_hotfix_bumps_patch_and_keeps_hash() {
        let base = Version::parse("1.4.2-rc1+old").unwrap();
        let next = Strategy::Hotfix
            .next_version(&base, &ctx("hotfix/urgent-fix", 2))
            .unwrap();
        // pre-release from the base is cleared, metadata replaced
        assert_eq!(next.to_string(), "1.4.3+gabc1234");
    }

    #[test]
    fn test_master_bumps_patch_and_clears_everything() {
        let base = Version::parse("1.4.2-rc1+old").unwrap();
        let next = Strategy::Master
            .next_version(&base, &ctx("main", 0))
            .unwrap();
        assert_eq!(next.to_string(), "1.4.3");
    }

    #[test]
    fn test_strategies_are_deterministic() {
        let base = Version::new(1, 2, 3);
        let c = ctx("feature/x", 7);
        let a = Strategy::Feature.next_version(&base, &c).unwrap();
        let b = Strategy::Feature.next_version(&base, &c).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_parse_release_branch() {
        assert_eq!(parse_release_branch("release/2.3.0"), Some((2, 3)));
        assert_eq!(parse_release_branch("release/10.0.0"), Some((10, 0)));
        assert_eq!(parse_release_branch("release/2.3.1"), None);
        assert_eq!(parse_release_branch("origin/release/2.3.0"), None);
        assert_eq!(parse_release_branch("release/2.3.0x"), None);
    }
}

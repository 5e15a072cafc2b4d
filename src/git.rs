use anyhow::{Context, Result};
use git2::{BranchType, DescribeFormatOptions, DescribeOptions, ObjectType, Repository};

use crate::strategy;
use crate::version::Version;

/// Name of the branch HEAD points to
pub fn current_branch(repo: &Repository) -> Result<String> {
    let head = repo.head().context("failed to read HEAD")?;
    let name = head.shorthand().context("branch name is not valid UTF-8")?;
    Ok(name.to_string())
}

/// Abbreviated hash of the current HEAD commit
///
/// Uses the object database's uniqueness-aware abbreviation, the same length
/// `git rev-parse --short HEAD` would pick.
pub fn short_sha(repo: &Repository) -> Result<String> {
    let object = repo
        .revparse_single("HEAD")
        .context("failed to resolve HEAD")?;
    let short = object
        .short_id()
        .context("failed to abbreviate HEAD commit")?;
    let text = short
        .as_str()
        .context("abbreviated hash is not valid UTF-8")?;
    Ok(text.to_string())
}

/// Find the version tag to base derivation on
///
/// The nearest reachable tag wins when it parses as a version (describe).
/// Otherwise every tag in the repository is scanned and the highest
/// version-shaped name is taken, reachable or not. `None` means no usable
/// tag exists; the caller starts from 0.1.0.
pub fn latest_tag(repo: &Repository) -> Option<(String, Version)> {
    if let Some(found) = describe_tag(repo) {
        return Some(found);
    }
    scan_tags(repo)
}

fn describe_tag(repo: &Repository) -> Option<(String, Version)> {
    let mut opts = DescribeOptions::new();
    opts.describe_tags();
    let describe = repo.describe(&opts).ok()?;

    // abbreviation size 0 drops the -<n>-g<hash> suffix, leaving the tag name
    let mut format = DescribeFormatOptions::new();
    format.abbreviated_size(0);
    let name = describe.format(Some(&format)).ok()?;

    let version = Version::parse(&name).ok()?;
    Some((name, version))
}

fn scan_tags(repo: &Repository) -> Option<(String, Version)> {
    let names = repo.tag_names(None).ok()?;
    names
        .iter()
        .flatten()
        .filter_map(|name| {
            Version::parse(name)
                .ok()
                .map(|version| (name.to_string(), version))
        })
        .max_by(|(_, a), (_, b)| a.cmp_precedence(b))
}

/// Commits on HEAD since the given tag, or since the root without one
pub fn commit_distance(repo: &Repository, tag: Option<&str>) -> Result<u64> {
    let mut walk = repo.revwalk().context("failed to start revision walk")?;
    walk.push_head().context("failed to push HEAD")?;

    if let Some(tag) = tag {
        let object = repo
            .revparse_single(tag)
            .with_context(|| format!("failed to resolve tag {}", tag))?;
        let commit = object
            .peel(ObjectType::Commit)
            .with_context(|| format!("failed to peel tag {} to a commit", tag))?;
        walk.hide(commit.id())
            .with_context(|| format!("failed to exclude history of {}", tag))?;
    }

    let mut count: u64 = 0;
    for oid in walk {
        oid.context("failed to walk history")?;
        count += 1;
    }
    Ok(count)
}

/// Highest release branch among the remote-tracking branches
///
/// Remote names come through as `origin/release/<major>.<minor>.0`; the
/// `origin/` prefix is stripped before matching against the release grammar.
/// `None` when nothing matches.
pub fn highest_release_branch(repo: &Repository) -> Result<Option<(u64, u64)>> {
    let mut highest: Option<(u64, u64)> = None;

    for entry in repo
        .branches(Some(BranchType::Remote))
        .context("failed to list remote branches")?
    {
        let (branch, _) = entry.context("failed to read remote branch")?;
        let Some(name) = branch.name().context("failed to read branch name")? else {
            continue;
        };
        let name = name.strip_prefix("origin/").unwrap_or(name);
        let Some(pair) = strategy::parse_release_branch(name) else {
            continue;
        };
        if highest.is_none_or(|h| pair > h) {
            highest = Some(pair);
        }
    }

    Ok(highest)
}

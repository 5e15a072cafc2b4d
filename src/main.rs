use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use git2::Repository;

use versioner::config::{self, CONFIG_ENV, DEFAULT_CONFIG_PATH};
use versioner::context::{GitContext, MERGE_ENV};
use versioner::git;
use versioner::output::{Output, print_error};
use versioner::resolve;
use versioner::rules::CompiledConfig;
use versioner::version::Version;

#[derive(Parser)]
#[command(name = "versioner")]
#[command(about = "Deterministic SemVer strings for CI: branch, latest tag, and commit distance in, one version line out")]
#[command(version = env!("VERSIONER_VERSION"))]
struct Cli {
    /// Config file path (overrides VERSIONER_CONFIG and the default)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let out = Output::new(cli.verbose);

    match run(&cli, &out) {
        Ok(version) => {
            println!("{}", version);
            ExitCode::SUCCESS
        }
        Err(e) => {
            print_error(&e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli, out: &Output) -> anyhow::Result<String> {
    let repo = Repository::discover(".").context("failed to find a git repository")?;

    let (tag_name, base) = match git::latest_tag(&repo) {
        Some((name, version)) => {
            out.verbose(&format!("latest version tag: {} ({})", name, version));
            (Some(name), version)
        }
        None => {
            out.verbose("no version tag found, starting from 0.1.0");
            (None, Version::new(0, 1, 0))
        }
    };

    let ctx = collect_context(&repo, tag_name.as_deref(), out)?;
    let compiled = load_config(cli, out)?;

    resolve::resolve_version(&ctx, &base, compiled.as_ref(), out)
}

/// Gather the repository snapshot the strategies run on
///
/// Branch and hash failures are fatal; distance and release-scan failures
/// degrade to defaults with a warning so the run can still produce a line.
fn collect_context(
    repo: &Repository,
    tag_name: Option<&str>,
    out: &Output,
) -> anyhow::Result<GitContext> {
    let branch = git::current_branch(repo)?;
    let short_sha = git::short_sha(repo)?;

    let commit_distance = match git::commit_distance(repo, tag_name) {
        Ok(distance) => distance,
        Err(e) => {
            out.warn(&format!("cannot compute commit distance: {:#}", e));
            0
        }
    };

    let release = match git::highest_release_branch(repo) {
        Ok(release) => release,
        Err(e) => {
            out.warn(&format!("cannot scan release branches: {:#}", e));
            None
        }
    };

    Ok(GitContext {
        branch,
        short_sha,
        commit_distance,
        release,
        merge_flag: env::var(MERGE_ENV).is_ok_and(|v| v == "true"),
    })
}

/// Load and compile the rule configuration, if a usable one exists
///
/// Path precedence: --config flag, then VERSIONER_CONFIG, then the default
/// file in the working directory. An absent file, an unreadable file, or a
/// config without rules all route to the fallback table; malformed JSON and
/// validation or pattern errors abort the run.
fn load_config(cli: &Cli, out: &Output) -> anyhow::Result<Option<CompiledConfig>> {
    let path = cli
        .config
        .clone()
        .or_else(|| {
            env::var(CONFIG_ENV)
                .ok()
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
        })
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

    let raw = match config::load(&path) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            out.verbose(&format!(
                "no config at {}, using fallback table",
                path.display()
            ));
            return Ok(None);
        }
        Err(config::ConfigError::Read(path, source)) => {
            out.warn(&format!("cannot read config {}: {}", path, source));
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };

    if raw.rules.is_empty() {
        out.verbose("config has no rules, using fallback table");
        return Ok(None);
    }

    let compiled = raw.compile()?;
    out.verbose(&format!(
        "loaded {} rules from {}",
        compiled.rules.len(),
        path.display()
    ));
    Ok(Some(compiled))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unreadable_config_falls_back() {
        // point the flag at a directory: the path exists but reading fails,
        // which must warn and route to the fallback table, not abort
        let dir = tempfile::tempdir().unwrap();
        let cli = Cli {
            config: Some(dir.path().to_path_buf()),
            verbose: false,
        };

        let compiled = load_config(&cli, &Output::default()).unwrap();
        assert!(compiled.is_none());
    }
}

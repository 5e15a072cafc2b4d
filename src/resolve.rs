use anyhow::{Context, Result};

use crate::context::GitContext;
use crate::fallback::FallbackEngine;
use crate::output::Output;
use crate::render;
use crate::rules::{self, CompiledConfig};
use crate::version::Version;

/// Compute the output line for one invocation
///
/// The configuration path runs when a compiled config is present and one of
/// its rules matches the branch: the rule's strategy derives the next
/// version and the rule's templates wrap it. Everything else, including a
/// config whose rules all miss, goes through the built-in fallback table and
/// prints the bare canonical version.
pub fn resolve_version(
    ctx: &GitContext,
    base: &Version,
    config: Option<&CompiledConfig>,
    out: &Output,
) -> Result<String> {
    if let Some(config) = config {
        if let Some(rule) = rules::match_rule(&config.rules, &ctx.branch, config.matching) {
            out.verbose(&format!(
                "rule '{}' matched branch '{}', using {} strategy",
                rule.pattern.as_str(),
                ctx.branch,
                rule.strategy.name()
            ));
            let next = rule
                .strategy
                .next_version(base, ctx)
                .context("version generation failed")?;
            return Ok(render::render(&next, ctx, rule, base));
        }
        out.verbose(&format!(
            "no rule matched branch '{}', using fallback table",
            ctx.branch
        ));
    }

    let engine = FallbackEngine::with_defaults();
    let strategy = engine
        .resolve(&ctx.branch)
        .context("version generation failed")?;
    let next = strategy
        .next_version(base, ctx)
        .context("version generation failed")?;
    Ok(next.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn ctx(branch: &str, distance: u64) -> GitContext {
        GitContext {
            branch: branch.to_string(),
            short_sha: "abc1234".to_string(),
            commit_distance: distance,
            ..Default::default()
        }
    }

    fn compiled(json: &str) -> CompiledConfig {
        let config: Config = serde_json::from_str(json).unwrap();
        config.compile().unwrap()
    }

    fn quiet() -> Output {
        Output::default()
    }

    #[test]
    fn test_feature_branch_without_config() {
        let out = resolve_version(
            &ctx("feature/login", 5),
            &Version::new(0, 1, 0),
            None,
            &quiet(),
        )
        .unwrap();
        assert_eq!(out, "0.2.0-alpha5+abc1234");
    }

    #[test]
    fn test_release_branch_at_tag() {
        let out = resolve_version(
            &ctx("release/2.3.0", 0),
            &Version::new(0, 1, 0),
            None,
            &quiet(),
        )
        .unwrap();
        assert_eq!(out, "2.3.0+gabc1234");
    }

    #[test]
    fn test_release_branch_with_distance() {
        let out = resolve_version(
            &ctx("release/2.3.0", 4),
            &Version::new(0, 1, 0),
            None,
            &quiet(),
        )
        .unwrap();
        assert_eq!(out, "2.3.0-rc4+gabc1234");
    }

    #[test]
    fn test_main_branch_bumps_patch() {
        let out = resolve_version(&ctx("main", 2), &Version::new(1, 4, 2), None, &quiet())
            .unwrap();
        assert_eq!(out, "1.4.3");
    }

    #[test]
    fn test_rule_match_applies_template() {
        let config = compiled(
            r#"{ "rules": [
                { "pattern": "^hotfix/", "strategy": "hotfix", "suffix": "-{slug}" }
            ] }"#,
        );
        let out = resolve_version(
            &ctx("hotfix/urgent-fix", 1),
            &Version::new(1, 4, 2),
            Some(&config),
            &quiet(),
        )
        .unwrap();
        assert_eq!(out, "1.4.3-hotfix-urgent-fi");
    }

    #[test]
    fn test_unmatched_rules_fall_back_untemplated() {
        let config = compiled(
            r#"{ "rules": [
                { "pattern": "^hotfix/", "strategy": "hotfix", "prefix": "v" }
            ] }"#,
        );
        let out = resolve_version(
            &ctx("feature/login", 5),
            &Version::new(0, 1, 0),
            Some(&config),
            &quiet(),
        )
        .unwrap();
        assert_eq!(out, "0.2.0-alpha5+abc1234");
    }

    #[test]
    fn test_rule_can_reroute_a_branch_class() {
        // config may send main through any strategy it likes
        let config = compiled(
            r#"{ "rules": [
                { "pattern": "^main$", "strategy": "develop" }
            ] }"#,
        );
        let out = resolve_version(&ctx("main", 3), &Version::new(1, 4, 2), Some(&config), &quiet())
            .unwrap();
        assert_eq!(out, "1.5.0-beta3+abc1234");
    }

    #[test]
    fn test_longest_mode_selects_more_specific_rule() {
        let config = compiled(
            r#"{ "matching": "longest", "rules": [
                { "pattern": "feature/", "strategy": "feature" },
                { "pattern": "feature/login", "strategy": "hotfix", "suffix": "!" }
            ] }"#,
        );
        let out = resolve_version(
            &ctx("feature/login", 0),
            &Version::new(1, 0, 0),
            Some(&config),
            &quiet(),
        )
        .unwrap();
        assert_eq!(out, "1.0.1!");
    }

    #[test]
    fn test_unknown_branch_is_fatal() {
        let err = resolve_version(&ctx("bugfix/x", 0), &Version::new(0, 1, 0), None, &quiet())
            .unwrap_err();
        assert!(err.to_string().contains("version generation failed"));
    }

    #[test]
    fn test_invalid_release_branch_is_fatal_through_rules() {
        let config = compiled(
            r#"{ "rules": [
                { "pattern": "deploy", "strategy": "release" }
            ] }"#,
        );
        let err = resolve_version(
            &ctx("deploy/now", 0),
            &Version::new(0, 1, 0),
            Some(&config),
            &quiet(),
        )
        .unwrap_err();
        let chain = format!("{:#}", err);
        assert!(chain.contains("invalid release branch name"));
    }

    #[test]
    fn test_develop_uses_release_context() {
        let mut c = ctx("develop", 7);
        c.release = Some((2, 4));
        let out = resolve_version(&c, &Version::new(0, 1, 0), None, &quiet()).unwrap();
        assert_eq!(out, "2.5.0-beta7+abc1234");
    }
}

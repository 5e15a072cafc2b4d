//! Output templating: prefix/suffix expansion around the canonical version.
//!
//! Rules may wrap the version in templates like `v{version}` or `-{slug}`.
//! Placeholders are expanded in a single pass; substituted text is never
//! rescanned, so branch names containing `{...}` cannot corrupt the output.

use crate::context::GitContext;
use crate::rules::CompiledRule;
use crate::version::Version;

/// Render the final output line for a rule-matched resolution
///
/// When the rule carries a suffix template, even an empty one, the canonical
/// core is rendered without build metadata: the template owns that slot and
/// can reintroduce the value via `{buildMeta}`. Placeholders always see the
/// produced version's original fields.
pub fn render(
    version: &Version,
    ctx: &GitContext,
    rule: &CompiledRule,
    latest_tag: &Version,
) -> String {
    let canonical = if rule.suffix.is_some() {
        let mut stripped = version.clone();
        stripped.build_meta = String::new();
        stripped.to_string()
    } else {
        version.to_string()
    };

    let resolve = |name: &str| -> Option<String> {
        Some(match name {
            "sha" => ctx.short_sha.clone(),
            "branch" => ctx.branch.clone(),
            "slug" => slug(&ctx.branch),
            "N" => ctx.commit_distance.to_string(),
            "major" => version.major.to_string(),
            "minor" => version.minor.to_string(),
            "patch" => version.patch.to_string(),
            "tag" => latest_tag.to_string(),
            "pre" => version.pre_release.clone(),
            "buildMeta" => version.build_meta.clone(),
            "version" => canonical.clone(),
            _ => return None,
        })
    };

    let prefix = expand(rule.prefix.as_deref().unwrap_or(""), &resolve);
    let suffix = expand(rule.suffix.as_deref().unwrap_or(""), &resolve);
    format!("{}{}{}", prefix, canonical, suffix)
}

/// Expand `{name}` placeholders in one left-to-right pass
///
/// A placeholder is `{`, one or more ASCII letters, `}`. Known names
/// substitute, unknown names expand to nothing. Every other brace sequence
/// (empty braces, digits inside, unterminated) passes through literally.
fn expand(template: &str, resolve: &impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let letters = after
            .bytes()
            .take_while(|b| b.is_ascii_alphabetic())
            .count();
        if letters > 0 && after.as_bytes().get(letters) == Some(&b'}') {
            if let Some(value) = resolve(&after[..letters]) {
                out.push_str(&value);
            }
            rest = &after[letters + 1..];
        } else {
            out.push('{');
            rest = after;
        }
    }
    out.push_str(rest);
    out
}

/// Sanitize a branch name for use inside a version identifier
///
/// Lowercased; every character outside `[a-z0-9-]` maps to `-`; runs of `-`
/// collapse to one; leading/trailing `-` are trimmed; the result is capped
/// at 16 characters. The cap applies after trimming, so a cut can still end
/// in `-`.
pub fn slug(branch: &str) -> String {
    let mut out = String::with_capacity(branch.len());
    for ch in branch.chars() {
        let ch = ch.to_ascii_lowercase();
        let mapped = if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            ch
        } else {
            '-'
        };
        if mapped == '-' && out.ends_with('-') {
            continue;
        }
        out.push(mapped);
    }

    let mut s = out.trim_matches('-').to_string();
    s.truncate(16); // pure ASCII by construction
    s
}

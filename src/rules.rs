use regex::Regex;

use crate::strategy::Strategy;

/// How a branch is matched against the rule list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    /// First rule whose pattern matches anywhere in the branch wins
    #[default]
    First,
    /// Rule with the longest matched substring wins; ties keep the
    /// earliest rule
    Longest,
}

/// A configuration rule with its pattern compiled
#[derive(Debug)]
pub struct CompiledRule {
    pub pattern: Regex,
    pub strategy: Strategy,
    pub prefix: Option<String>,
    pub suffix: Option<String>,
}

/// The immutable rule table built once at startup
#[derive(Debug)]
pub struct CompiledConfig {
    pub matching: MatchMode,
    pub rules: Vec<CompiledRule>,
}

/// Select the rule for a branch, or `None` when nothing matches
///
/// Under `Longest`, promotion requires a strictly longer match, so equal
/// lengths keep the earliest rule. A zero-length match still beats no match.
pub fn match_rule<'a>(
    rules: &'a [CompiledRule],
    branch: &str,
    mode: MatchMode,
) -> Option<&'a CompiledRule> {
    match mode {
        MatchMode::First => rules.iter().find(|r| r.pattern.is_match(branch)),
        MatchMode::Longest => {
            let mut best: Option<&CompiledRule> = None;
            let mut best_len: Option<usize> = None;
            for rule in rules {
                let Some(m) = rule.pattern.find(branch) else {
                    continue;
                };
                let len = m.end() - m.start();
                if best_len.is_none_or(|b| len > b) {
                    best = Some(rule);
                    best_len = Some(len);
                }
            }
            best
        }
    }
}

use std::collections::HashMap;

use thiserror::Error;

use crate::strategy::Strategy;

/// Strategy table used when no usable rule configuration exists
///
/// Keys ending in `/` register as prefix entries, everything else as exact
/// entries. An exact match on the full branch name takes precedence; prefix
/// entries are tried in registration order and the first match wins, so
/// overlapping prefixes resolve deterministically.
#[derive(Default)]
pub struct FallbackEngine {
    exact: HashMap<String, Strategy>,
    prefixes: Vec<(String, Strategy)>,
}

#[derive(Error, Debug)]
pub enum FallbackError {
    #[error("no strategy found for branch: {0}")]
    NoStrategyFound(String),
}

impl FallbackEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in registration table
    pub fn with_defaults() -> Self {
        let mut engine = Self::new();
        engine.register("feature/", Strategy::Feature);
        engine.register("develop", Strategy::Develop);
        engine.register("release/", Strategy::Release);
        engine.register("hotfix/", Strategy::Hotfix);
        engine.register("master", Strategy::Master);
        engine.register("main", Strategy::Master);
        engine
    }

    pub fn register(&mut self, key: &str, strategy: Strategy) {
        if key.ends_with('/') {
            self.prefixes.push((key.to_string(), strategy));
        } else {
            self.exact.insert(key.to_string(), strategy);
        }
    }

    /// Look up the strategy for a branch name
    pub fn resolve(&self, branch: &str) -> Result<Strategy, FallbackError> {
        if let Some(strategy) = self.exact.get(branch) {
            return Ok(*strategy);
        }
        for (prefix, strategy) in &self.prefixes {
            if branch.starts_with(prefix.as_str()) {
                return Ok(*strategy);
            }
        }
        Err(FallbackError::NoStrategyFound(branch.to_string()))
    }
}

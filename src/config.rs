use std::fs;
use std::path::Path;

use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

use crate::rules::{CompiledConfig, CompiledRule, MatchMode};
use crate::strategy::Strategy;

/// Configuration path used when neither the flag nor the environment sets one
pub const DEFAULT_CONFIG_PATH: &str = "versioner.config.json";

/// Environment variable overriding the configuration path
pub const CONFIG_ENV: &str = "VERSIONER_CONFIG";

/// A rule as written in the configuration file
#[derive(Debug, Clone, Deserialize)]
pub struct Rule {
    #[serde(default)]
    pub pattern: String,
    #[serde(default)]
    pub strategy: String,
    #[serde(default)]
    pub prefix: Option<String>,
    #[serde(default)]
    pub suffix: Option<String>,
}

/// Rule configuration (versioner.config.json)
///
/// `strategy` and `matching` stay raw strings here so that unknown values
/// surface as validation errors during `compile`, not as parse errors.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Schema marker, carried but not interpreted yet
    #[serde(default, rename = "configVersion")]
    pub config_version: i64,
    /// "first" or "longest"; empty means "first"
    #[serde(default)]
    pub matching: String,
    #[serde(default)]
    pub rules: Vec<Rule>,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {0}")]
    Read(String, #[source] std::io::Error),
    #[error("failed to parse config {0}")]
    Parse(String, #[source] serde_json::Error),
    #[error("rule[{0}]: empty pattern")]
    EmptyPattern(usize),
    #[error("rule[{0}]: unknown strategy '{1}'")]
    UnknownStrategy(usize, String),
    #[error("invalid matching mode: {0}")]
    InvalidMatching(String),
    #[error("rule[{0}]: invalid pattern '{1}'")]
    Compile(usize, String, #[source] regex::Error),
}

/// Load the raw configuration, if the file exists
///
/// An absent file is not an error: the run simply uses the built-in fallback
/// table. A present but unreadable file is reported as `ConfigError::Read` so
/// the driver can warn and fall back; malformed JSON is `ConfigError::Parse`
/// and fatal at the call site.
pub fn load(path: &Path) -> Result<Option<Config>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)
        .map_err(|e| ConfigError::Read(path.display().to_string(), e))?;
    let config: Config = serde_json::from_str(&content)
        .map_err(|e| ConfigError::Parse(path.display().to_string(), e))?;
    Ok(Some(config))
}

impl Config {
    /// Validate and compile into the immutable rule table
    ///
    /// One-shot at startup; every error here is fatal. The caller only
    /// compiles configs with at least one rule.
    pub fn compile(&self) -> Result<CompiledConfig, ConfigError> {
        let matching = match self.matching.as_str() {
            "" | "first" => MatchMode::First,
            "longest" => MatchMode::Longest,
            other => return Err(ConfigError::InvalidMatching(other.to_string())),
        };

        let mut rules = Vec::with_capacity(self.rules.len());
        for (index, rule) in self.rules.iter().enumerate() {
            if rule.pattern.is_empty() {
                return Err(ConfigError::EmptyPattern(index));
            }
            let strategy = Strategy::from_name(&rule.strategy)
                .ok_or_else(|| ConfigError::UnknownStrategy(index, rule.strategy.clone()))?;
            let pattern = Regex::new(&rule.pattern)
                .map_err(|e| ConfigError::Compile(index, rule.pattern.clone(), e))?;

            rules.push(CompiledRule {
                pattern,
                strategy,
                prefix: rule.prefix.clone(),
                suffix: rule.suffix.clone(),
            });
        }

        Ok(CompiledConfig { matching, rules })
    }
}

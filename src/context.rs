/// Environment variable that sets [`GitContext::merge_flag`]
pub const MERGE_ENV: &str = "VERSIONER_MERGE";

/// Repository facts a derivation runs on, collected once at startup
#[derive(Debug, Clone, Default)]
pub struct GitContext {
    /// Current branch name, e.g. "feature/login-form"
    pub branch: String,
    /// Abbreviated commit hash of HEAD
    pub short_sha: String,
    /// Commits since the latest version tag, or since root without one
    pub commit_distance: u64,
    /// Highest `release/<major>.<minor>.0` pair among remote branches
    pub release: Option<(u64, u64)>,
    /// Set by `VERSIONER_MERGE=true`; reserved for merge-aware strategies
    pub merge_flag: bool,
}

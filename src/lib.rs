//! Deterministic SemVer strings for CI pipelines.
//!
//! One invocation inspects the repository (current branch, latest version
//! tag, commit distance, remote release branches), derives the next version
//! for the branch class, and prints a single line to stdout.

pub mod config;
pub mod context;
pub mod fallback;
pub mod git;
pub mod output;
pub mod render;
pub mod resolve;
pub mod rules;
pub mod strategy;
pub mod version;

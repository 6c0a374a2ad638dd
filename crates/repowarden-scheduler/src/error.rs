//! Fatal scheduler errors (SPEC_FULL.md §7 `FatalSchedulerError`-shaped).
//! Structural violations surfaced on the errors stream; per-repo fetch
//! failures are not errors of this kind — they travel inside
//! `RepoExecutionResult::errors` instead.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("invalid scheduler input: {0}")]
    InvalidPlan(String),

    #[error("the ambient cancellation signal fired before the scan completed")]
    Cancelled,
}

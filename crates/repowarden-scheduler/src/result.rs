//! `RepoExecutionResult` — the scheduler's one-per-repo completion record
//! (SPEC_FULL.md §3).

use repowarden_fetch::FetchError;
use repowarden_core::DependencyKey;
use std::collections::HashMap;

/// Everything a repo-worker learned about one repo: the dependency keys it
/// fetched successfully, and the ones that failed, keyed by
/// `DependencyKey`. A key appears in exactly one of the two maps.
#[derive(Debug, Clone, Default)]
pub struct RepoExecutionResult {
    pub repo_id: u64,
    pub data: HashMap<DependencyKey, serde_json::Value>,
    pub errors: HashMap<DependencyKey, FetchError>,
}

impl RepoExecutionResult {
    pub fn new(repo_id: u64) -> Self {
        Self {
            repo_id,
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }
}

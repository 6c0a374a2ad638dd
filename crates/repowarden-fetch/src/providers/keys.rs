//! The named `DependencyKey` constants this crate can provide.

use repowarden_core::DependencyKey;

pub const REPO_METADATA: DependencyKey = DependencyKey::new("repo.metadata");
pub const REPO_DEFAULT_BRANCH_PROTECTION: DependencyKey =
    DependencyKey::new("repo.default_branch_protection");
pub const REPO_DEFAULT_BRANCH_RULES: DependencyKey = DependencyKey::new("repo.default_branch_rules");
pub const REPO_ALL_RULESETS: DependencyKey = DependencyKey::new("repo.all_rulesets");
pub const ORG_MERGE_BASELINE: DependencyKey = DependencyKey::new("org.merge_baseline");
/// Cross-dep injection target (SPEC_FULL.md §4.4): the set of repos
/// discovered for this scan, seeded directly into the cache before
/// execution so org-scoped providers that need "every repo in the scan"
/// read from cache without an extra API call.
pub const ORG_REPOS_IN_SCAN: DependencyKey = DependencyKey::new("org.repos_in_scan");

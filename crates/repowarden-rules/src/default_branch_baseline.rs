//! `default-branch-matches-org-baseline` — a repo-scoped and an org-scoped
//! dependency together: the repo's default branch name must match the
//! org-wide merge baseline.

use repowarden_core::{DataContext, DependencyKey, RepositoryRef, Rule, RuleResult, RuleStatus};
use repowarden_fetch::providers::keys;

#[derive(Default)]
pub struct DefaultBranchMatchesOrgBaseline;

impl Rule for DefaultBranchMatchesOrgBaseline {
    fn id(&self) -> &str {
        "default-branch-matches-org-baseline"
    }

    fn title(&self) -> &str {
        "Default branch matches the org merge baseline"
    }

    fn description(&self) -> &str {
        "Fails when the repository's default branch name differs from the owning org's configured merge baseline."
    }

    fn dependencies(&self, _repo: &RepositoryRef) -> anyhow::Result<Vec<DependencyKey>> {
        Ok(vec![keys::REPO_METADATA, keys::ORG_MERGE_BASELINE])
    }

    fn evaluate(&self, repo: &RepositoryRef, ctx: &dyn DataContext) -> anyhow::Result<RuleResult> {
        let default_branch = ctx
            .get(keys::REPO_METADATA)
            .and_then(|v| v.get("default_branch"))
            .and_then(|v| v.as_str())
            .unwrap_or("");
        let baseline = ctx.get(keys::ORG_MERGE_BASELINE).and_then(|v| v.as_str()).unwrap_or("");

        if default_branch == baseline {
            Ok(RuleResult::pass(self.id(), repo.full_name()))
        } else {
            Ok(RuleResult::fail(
                self.id(),
                repo.full_name(),
                format!("default branch {default_branch:?} does not match org baseline {baseline:?}"),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedCtx {
        metadata: serde_json::Value,
        baseline: serde_json::Value,
    }
    impl DataContext for FixedCtx {
        fn get(&self, key: DependencyKey) -> Option<&serde_json::Value> {
            if key == keys::REPO_METADATA {
                Some(&self.metadata)
            } else if key == keys::ORG_MERGE_BASELINE {
                Some(&self.baseline)
            } else {
                None
            }
        }
    }

    fn repo() -> RepositoryRef {
        RepositoryRef::new("acme", "a", 1)
    }

    #[test]
    fn matching_branch_passes() {
        let ctx = FixedCtx {
            metadata: serde_json::json!({"default_branch": "main"}),
            baseline: serde_json::json!("main"),
        };
        let result = DefaultBranchMatchesOrgBaseline.evaluate(&repo(), &ctx).unwrap();
        assert_eq!(result.status, RuleStatus::Pass);
    }

    #[test]
    fn mismatched_branch_fails() {
        let ctx = FixedCtx {
            metadata: serde_json::json!({"default_branch": "master"}),
            baseline: serde_json::json!("main"),
        };
        let result = DefaultBranchMatchesOrgBaseline.evaluate(&repo(), &ctx).unwrap();
        assert_eq!(result.status, RuleStatus::Fail);
        assert!(result.message.unwrap().contains("master"));
    }
}

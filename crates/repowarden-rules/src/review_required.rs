//! `review-required` — the default branch's rule list must require at
//! least one pull-request review before merge.

use repowarden_core::{DataContext, DependencyKey, RepositoryRef, Rule, RuleResult, RuleStatus};
use repowarden_fetch::providers::keys;

#[derive(Default)]
pub struct ReviewRequired;

impl Rule for ReviewRequired {
    fn id(&self) -> &str {
        "review-required"
    }

    fn title(&self) -> &str {
        "Default branch requires pull-request review"
    }

    fn description(&self) -> &str {
        "Fails when none of the default branch's rules require a pull-request review with at least one approval."
    }

    fn dependencies(&self, _repo: &RepositoryRef) -> anyhow::Result<Vec<DependencyKey>> {
        Ok(vec![keys::REPO_DEFAULT_BRANCH_RULES])
    }

    fn evaluate(&self, repo: &RepositoryRef, ctx: &dyn DataContext) -> anyhow::Result<RuleResult> {
        let rules = ctx
            .get(keys::REPO_DEFAULT_BRANCH_RULES)
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap_or_default();

        let satisfied = rules.iter().any(|rule| {
            rule.get("type").and_then(|v| v.as_str()) == Some("pull_request")
                && rule
                    .get("parameters")
                    .and_then(|p| p.get("required_approving_review_count"))
                    .and_then(|v| v.as_u64())
                    .unwrap_or(0)
                    >= 1
        });

        if satisfied {
            Ok(RuleResult::pass(self.id(), repo.full_name()))
        } else {
            Ok(RuleResult::fail(
                self.id(),
                repo.full_name(),
                "no default-branch rule requires at least one approving review",
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedCtx(serde_json::Value);
    impl DataContext for FixedCtx {
        fn get(&self, key: DependencyKey) -> Option<&serde_json::Value> {
            if key == keys::REPO_DEFAULT_BRANCH_RULES {
                Some(&self.0)
            } else {
                None
            }
        }
    }

    fn repo() -> RepositoryRef {
        RepositoryRef::new("acme", "a", 1)
    }

    #[test]
    fn no_rules_fails() {
        let ctx = FixedCtx(serde_json::json!([]));
        let result = ReviewRequired.evaluate(&repo(), &ctx).unwrap();
        assert_eq!(result.status, RuleStatus::Fail);
    }

    #[test]
    fn review_rule_with_zero_required_approvals_fails() {
        let ctx = FixedCtx(serde_json::json!([
            {"type": "pull_request", "parameters": {"required_approving_review_count": 0}}
        ]));
        let result = ReviewRequired.evaluate(&repo(), &ctx).unwrap();
        assert_eq!(result.status, RuleStatus::Fail);
    }

    #[test]
    fn review_rule_with_one_required_approval_passes() {
        let ctx = FixedCtx(serde_json::json!([
            {"type": "deletion"},
            {"type": "pull_request", "parameters": {"required_approving_review_count": 1}}
        ]));
        let result = ReviewRequired.evaluate(&repo(), &ctx).unwrap();
        assert_eq!(result.status, RuleStatus::Pass);
    }
}

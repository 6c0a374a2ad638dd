//! `rulesets-required` — at least one active ruleset must exist on the repo.

use repowarden_core::{DataContext, DependencyKey, RepositoryRef, Rule, RuleResult, RuleStatus};
use repowarden_fetch::providers::keys;

#[derive(Default)]
pub struct RulesetsRequired;

impl Rule for RulesetsRequired {
    fn id(&self) -> &str {
        "rulesets-required"
    }

    fn title(&self) -> &str {
        "At least one active ruleset required"
    }

    fn description(&self) -> &str {
        "Fails when the repository has no ruleset in the \"active\" state."
    }

    fn dependencies(&self, _repo: &RepositoryRef) -> anyhow::Result<Vec<DependencyKey>> {
        Ok(vec![keys::REPO_ALL_RULESETS])
    }

    fn evaluate(&self, repo: &RepositoryRef, ctx: &dyn DataContext) -> anyhow::Result<RuleResult> {
        let rulesets = ctx
            .get(keys::REPO_ALL_RULESETS)
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap_or_default();

        let active = rulesets
            .iter()
            .any(|r| r.get("enforcement").and_then(|v| v.as_str()) == Some("active"));

        if active {
            Ok(RuleResult::pass(self.id(), repo.full_name()))
        } else {
            Ok(RuleResult::fail(self.id(), repo.full_name(), "no ruleset is in the active enforcement state"))
        }
    }
}

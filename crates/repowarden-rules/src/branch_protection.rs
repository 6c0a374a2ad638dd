//! `branch-protection-required` — the default branch must carry branch
//! protection, and (when configured) a minimum set of required status
//! checks.

use repowarden_core::{ConfigurableRule, DataContext, DependencyKey, Rule, RuleOption, RuleResult, RuleStatus};
use repowarden_fetch::providers::keys;
use std::collections::HashMap;
use std::sync::RwLock;

const OPT_REQUIRED_CHECKS: &str = "required_checks";

#[derive(Default)]
struct Config {
    required_checks: Vec<String>,
}

pub struct BranchProtectionRequired {
    config: RwLock<Config>,
}

impl Default for BranchProtectionRequired {
    fn default() -> Self {
        Self { config: RwLock::new(Config::default()) }
    }
}

impl Rule for BranchProtectionRequired {
    fn id(&self) -> &str {
        "branch-protection-required"
    }

    fn title(&self) -> &str {
        "Default branch must be protected"
    }

    fn description(&self) -> &str {
        "Fails when the default branch has no branch protection configured, or is missing a configured required status check."
    }

    fn dependencies(&self, _repo: &repowarden_core::RepositoryRef) -> anyhow::Result<Vec<DependencyKey>> {
        Ok(vec![keys::REPO_DEFAULT_BRANCH_PROTECTION])
    }

    fn evaluate(&self, repo: &repowarden_core::RepositoryRef, ctx: &dyn DataContext) -> anyhow::Result<RuleResult> {
        let protection = ctx.get(keys::REPO_DEFAULT_BRANCH_PROTECTION);
        let Some(protection) = protection else {
            return Ok(RuleResult::fail(self.id(), repo.full_name(), "default branch has no protection configured"));
        };

        let enabled = protection.get("enabled").and_then(|v| v.as_bool()).unwrap_or(false);
        if !enabled {
            return Ok(RuleResult::fail(self.id(), repo.full_name(), "branch protection is disabled"));
        }

        let required = self.config.read().expect("config lock poisoned").required_checks.clone();
        if required.is_empty() {
            return Ok(RuleResult::pass(self.id(), repo.full_name()));
        }

        let configured: Vec<&str> = protection
            .get("required_status_checks")
            .and_then(|v| v.as_array())
            .map(|arr| arr.iter().filter_map(|v| v.as_str()).collect())
            .unwrap_or_default();

        let missing: Vec<&String> = required.iter().filter(|c| !configured.contains(&c.as_str())).collect();
        if !missing.is_empty() {
            let names: Vec<&str> = missing.iter().map(|s| s.as_str()).collect();
            return Ok(RuleResult::fail(
                self.id(),
                repo.full_name(),
                format!("missing required status checks: [{}]", names.join(", ")),
            ));
        }

        Ok(RuleResult::pass(self.id(), repo.full_name()))
    }

    fn as_configurable(&self) -> Option<&dyn ConfigurableRule> {
        Some(self)
    }
}

impl ConfigurableRule for BranchProtectionRequired {
    fn options(&self) -> Vec<RuleOption> {
        vec![RuleOption::new(
            OPT_REQUIRED_CHECKS,
            "Comma-separated status check contexts that must be required",
            "",
        )]
    }

    fn configure(&self, values: &HashMap<String, String>) -> anyhow::Result<()> {
        if let Some(v) = values.get(OPT_REQUIRED_CHECKS) {
            let checks = v.split(',').map(str::trim).filter(|s| !s.is_empty()).map(str::to_string).collect();
            self.config.write().expect("config lock poisoned").required_checks = checks;
        }
        Ok(())
    }
}

//! The rule contract: `Rule`, its optional `ConfigurableRule` capability,
//! and the `RuleResult`/`RuleStatus` types rules produce.

use super::context::DataContext;
use super::key::DependencyKey;
use super::repo::RepositoryRef;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Outcome status of a single rule evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RuleStatus {
    Pass,
    Fail,
    Error,
    Skipped,
}

impl RuleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleStatus::Pass => "PASS",
            RuleStatus::Fail => "FAIL",
            RuleStatus::Error => "ERROR",
            RuleStatus::Skipped => "SKIPPED",
        }
    }
}

/// The result of evaluating one rule against one repository.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RuleResult {
    pub rule_id: String,
    pub repo: String,
    pub status: RuleStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evidence: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl RuleResult {
    pub fn new(rule_id: impl Into<String>, repo: impl Into<String>, status: RuleStatus) -> Self {
        Self {
            rule_id: rule_id.into(),
            repo: repo.into(),
            status,
            message: None,
            evidence: None,
            metadata: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_evidence(mut self, evidence: serde_json::Value) -> Self {
        self.evidence = Some(evidence);
        self
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn pass(rule_id: impl Into<String>, repo: impl Into<String>) -> Self {
        Self::new(rule_id, repo, RuleStatus::Pass)
    }

    pub fn fail(rule_id: impl Into<String>, repo: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(rule_id, repo, RuleStatus::Fail).with_message(message)
    }

    pub fn error(rule_id: impl Into<String>, repo: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(rule_id, repo, RuleStatus::Error).with_message(message)
    }

    pub fn skipped(rule_id: impl Into<String>, repo: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(rule_id, repo, RuleStatus::Skipped).with_message(message)
    }

    /// Fills in `rule_id`/`repo` when a rule left them blank, per
    /// SPEC_FULL.md §4.6 step f ("backfill the rule's result with repo and
    /// rule_id if absent").
    pub fn backfill(mut self, rule_id: &str, repo: &str) -> Self {
        if self.rule_id.is_empty() {
            self.rule_id = rule_id.to_string();
        }
        if self.repo.is_empty() {
            self.repo = repo.to_string();
        }
        self
    }
}

/// A single configuration option a rule exposes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RuleOption {
    pub name: String,
    pub description: String,
    pub default: String,
}

impl RuleOption {
    pub fn new(name: impl Into<String>, description: impl Into<String>, default: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            default: default.into(),
        }
    }
}

/// The base rule capability: stable identity plus pure dependency
/// declaration and evaluation against a fetched `DataContext`.
///
/// Rules must be pure over the supplied `DataContext` and must not perform
/// I/O — all data they need flows in through `dependencies`/`evaluate`.
///
/// Implementations are expected to be `Send + Sync` so a single `Arc<dyn
/// Rule>` can be shared across concurrent repo-plan construction; evaluation
/// itself is single-threaded (the evaluator is a single consumer, SPEC_FULL
/// §5), so `Rule` does not require `evaluate` itself to be reentrant.
pub trait Rule: Send + Sync {
    /// Stable identifier, lowercase-kebab-case (e.g. `"branch-protection-required"`).
    fn id(&self) -> &str;

    fn title(&self) -> &str;

    fn description(&self) -> &str;

    /// The dependencies this rule needs for `repo`. May branch on repo
    /// attributes (e.g. skip an org-only check for forks) but must not
    /// perform I/O.
    fn dependencies(&self, repo: &RepositoryRef) -> anyhow::Result<Vec<DependencyKey>>;

    /// Evaluate the rule against `repo` using `ctx`. The evaluator enforces
    /// that every key read here was also returned from `dependencies`.
    fn evaluate(&self, repo: &RepositoryRef, ctx: &dyn DataContext) -> anyhow::Result<RuleResult>;

    /// Capability-detection hook: `Some` when this rule also implements
    /// `ConfigurableRule`. The default returns `None` (the base capability
    /// set); configurable rules override this to return `Some(self)`.
    fn as_configurable(&self) -> Option<&dyn ConfigurableRule> {
        None
    }
}

/// The additional "configurable" capability: rules that expose options and
/// accept a name→value configuration map.
pub trait ConfigurableRule: Rule {
    fn options(&self) -> Vec<RuleOption>;

    /// Apply a name→value assignment map. Value parsing/validation is the
    /// rule's own responsibility; unknown option names are a setup error
    /// the caller (the registry's option-assignment validation) should have
    /// already rejected before this is called.
    fn configure(&self, values: &HashMap<String, String>) -> anyhow::Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backfill_only_fills_blank_fields() {
        let result = RuleResult::new("", "", RuleStatus::Pass).backfill("always-pass", "acme/a");
        assert_eq!(result.rule_id, "always-pass");
        assert_eq!(result.repo, "acme/a");

        let result = RuleResult::new("explicit-id", "acme/b", RuleStatus::Pass)
            .backfill("always-pass", "acme/a");
        assert_eq!(result.rule_id, "explicit-id");
        assert_eq!(result.repo, "acme/b");
    }

    #[test]
    fn status_serializes_uppercase() {
        let json = serde_json::to_string(&RuleStatus::Pass).unwrap();
        assert_eq!(json, "\"PASS\"");
    }

    #[test]
    fn result_omits_absent_optional_fields() {
        let result = RuleResult::pass("always-pass", "acme/a");
        let json = serde_json::to_value(&result).unwrap();
        let obj = json.as_object().unwrap();
        assert!(!obj.contains_key("message"));
        assert!(!obj.contains_key("evidence"));
        assert!(!obj.contains_key("metadata"));
    }
}

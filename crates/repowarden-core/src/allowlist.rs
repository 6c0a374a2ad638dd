//! The AllowList decorator (SPEC_FULL.md §4.2) — a uniform policy wrapper
//! applied to every rule the registry exposes.
//!
//! `RuleRegistry::register` always stores `AllowListRule::wrap(rule)`, so
//! callers can never obtain a bare rule back out of `list`/`resolve`.

use crate::domain::context::DataContext;
use crate::domain::repo::RepositoryRef;
use crate::domain::rule::{ConfigurableRule, Rule, RuleOption, RuleResult, RuleStatus};
use glob::Pattern;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

const OPT_REPOS: &str = "allow_repos";
const OPT_PATTERNS: &str = "allow_patterns";
const OPT_TOPICS: &str = "allow_topics";

#[derive(Debug, Default)]
struct AllowListConfig {
    repos: Vec<String>,
    patterns: Vec<String>,
    topics: Vec<String>,
}

/// Wraps any `Rule` and rewrites a `FAIL` verdict to `PASS` when the target
/// repository matches an allow-list clause: an explicit `owner/repo` name, a
/// glob pattern (path-style — a pattern containing `/` matches the full
/// name, otherwise just the repo name), or a topic.
pub struct AllowListRule {
    inner: Arc<dyn Rule>,
    config: RwLock<AllowListConfig>,
}

impl AllowListRule {
    pub fn wrap(inner: Arc<dyn Rule>) -> Self {
        Self {
            inner,
            config: RwLock::new(AllowListConfig::default()),
        }
    }

    /// The clause that matched, for the rewritten result's message, or
    /// `None` if nothing in the repo matches the allow list.
    fn matching_clause(&self, repo: &RepositoryRef) -> Option<String> {
        let config = self.config.read().expect("allowlist lock poisoned");
        let full_name = repo.full_name();

        if config.repos.iter().any(|r| r == &full_name) {
            return Some(format!("repo {full_name:?} is explicitly allow-listed"));
        }

        for pattern in &config.patterns {
            let target = if pattern.contains('/') {
                full_name.as_str()
            } else {
                repo.name.as_str()
            };
            if Pattern::new(pattern)
                .map(|p| p.matches(target))
                .unwrap_or(false)
            {
                return Some(format!("repo {full_name:?} matches allow pattern {pattern:?}"));
            }
        }

        let repo_topics = repo
            .metadata
            .get("topics")
            .and_then(|v| v.as_array())
            .map(|arr| {
                arr.iter()
                    .filter_map(|t| t.as_str())
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();
        for topic in &config.topics {
            if repo_topics.contains(&topic.as_str()) {
                return Some(format!("repo {full_name:?} carries allow-listed topic {topic:?}"));
            }
        }

        None
    }
}

impl Rule for AllowListRule {
    fn id(&self) -> &str {
        self.inner.id()
    }

    fn title(&self) -> &str {
        self.inner.title()
    }

    fn description(&self) -> &str {
        self.inner.description()
    }

    fn dependencies(&self, repo: &RepositoryRef) -> anyhow::Result<Vec<crate::domain::key::DependencyKey>> {
        self.inner.dependencies(repo)
    }

    fn evaluate(&self, repo: &RepositoryRef, ctx: &dyn DataContext) -> anyhow::Result<RuleResult> {
        let result = self.inner.evaluate(repo, ctx)?;
        if result.status != RuleStatus::Fail {
            return Ok(result);
        }
        match self.matching_clause(repo) {
            Some(clause) => Ok(RuleResult::new(result.rule_id, result.repo, RuleStatus::Pass)
                .with_message(format!("allow-listed: {clause}"))),
            None => Ok(result),
        }
    }

    fn as_configurable(&self) -> Option<&dyn ConfigurableRule> {
        Some(self)
    }
}

impl ConfigurableRule for AllowListRule {
    fn options(&self) -> Vec<RuleOption> {
        let mut options = vec![
            RuleOption::new(OPT_REPOS, "Comma-separated owner/repo names to always allow", ""),
            RuleOption::new(OPT_PATTERNS, "Comma-separated glob patterns to always allow", ""),
            RuleOption::new(OPT_TOPICS, "Comma-separated repo topics to always allow", ""),
        ];
        if let Some(inner) = self.inner.as_configurable() {
            options.extend(inner.options());
        }
        options
    }

    fn configure(&self, values: &HashMap<String, String>) -> anyhow::Result<()> {
        let mut config = self.config.write().expect("allowlist lock poisoned");
        if let Some(v) = values.get(OPT_REPOS) {
            config.repos = split_csv(v);
        }
        if let Some(v) = values.get(OPT_PATTERNS) {
            config.patterns = split_csv(v);
        }
        if let Some(v) = values.get(OPT_TOPICS) {
            config.topics = split_csv(v);
        }
        if let Some(inner) = self.inner.as_configurable() {
            inner.configure(values)?;
        }
        Ok(())
    }
}

fn split_csv(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

//! Rule Registry — the process-wide catalogue of registered rules.
//!
//! Every rule exposed by the registry is wrapped by the [`AllowListRule`]
//! decorator (SPEC_FULL.md §4.2) at registration time; callers structurally
//! cannot obtain a bare rule back out of `list`/`resolve`.

use crate::allowlist::AllowListRule;
use crate::domain::error::{CoreError, Result};
use crate::domain::rule::Rule;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

/// A process-wide collection mapping rule ID to rule.
///
/// Rust has no implicit static initializers that run before `main`, so
/// unlike a registry populated by package-level `init()` hooks, registration
/// here is an explicit call the binary entry point makes at startup (see
/// `repowarden-rules::register_all`) — SPEC_FULL.md §4.1/§9.
pub struct RuleRegistry {
    rules: RwLock<BTreeMap<String, Arc<dyn Rule>>>,
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self {
            rules: RwLock::new(BTreeMap::new()),
        }
    }

    /// Register a rule, wrapping it in the allow-list decorator. Fails with
    /// `DuplicateRule` if the ID already exists — a programmer error that
    /// fails loudly at load rather than silently overwriting.
    pub fn register(&self, rule: Arc<dyn Rule>) -> Result<()> {
        let id = rule.id().to_string();
        let mut rules = self.rules.write().expect("rule registry lock poisoned");
        if rules.contains_key(&id) {
            return Err(CoreError::DuplicateRule(id));
        }
        rules.insert(id, Arc::new(AllowListRule::wrap(rule)));
        Ok(())
    }

    /// All registered rules, in ID order.
    pub fn list(&self) -> Vec<Arc<dyn Rule>> {
        self.rules
            .read()
            .expect("rule registry lock poisoned")
            .values()
            .cloned()
            .collect()
    }

    /// Resolve a selector: empty returns all rules (ID order); otherwise the
    /// selector is a comma-separated list of IDs, returned in the order
    /// listed, failing on the first unknown ID.
    ///
    /// Future selector languages (groups, negation) are an explicit
    /// extension point the core does not implement (SPEC_FULL.md §4.1).
    pub fn resolve(&self, selector: &str) -> Result<Vec<Arc<dyn Rule>>> {
        if selector.trim().is_empty() {
            return Ok(self.list());
        }
        let rules = self.rules.read().expect("rule registry lock poisoned");
        selector
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(|id| {
                rules
                    .get(id)
                    .cloned()
                    .ok_or_else(|| CoreError::UnknownRule(id.to_string()))
            })
            .collect()
    }
}

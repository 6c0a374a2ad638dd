//! Scan Planner (SPEC_FULL.md §4.3) — unions the declared dependencies of
//! every selected rule into a deduplicated, per-repo fetch plan.

use crate::domain::error::{CoreError, Result};
use crate::domain::key::{DependencyKey, Priority};
use crate::domain::repo::RepositoryRef;
use crate::domain::rule::Rule;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

/// A priority lookup the planner consults to produce
/// `RepoPlan::sorted_dependencies` without storing priority a second time on
/// `ScanPlan` itself (SPEC_FULL.md §4.3 — "keeping `ScanPlan` free of a
/// second source of truth for priority"). Implemented by `repowarden-fetch`'s
/// provider table.
pub trait PriorityLookup {
    /// Priority for `key`, or `Priority::Extra` if the key is unknown to this
    /// lookup (unregistered keys sort last, never block planning).
    fn priority_of(&self, key: DependencyKey) -> Priority;
}

/// The fetch+rule work unit for one repository.
#[derive(Clone)]
pub struct RepoPlan {
    pub repo: RepositoryRef,
    pub dependencies: HashSet<DependencyKey>,
    pub rules: Vec<Arc<dyn Rule>>,
}

impl RepoPlan {
    /// Dependency keys sorted by `(priority ascending, key lexicographic)` —
    /// a stable order the scheduler uses to bias fetch interleaving toward
    /// critical data first.
    pub fn sorted_dependencies(&self, priorities: &dyn PriorityLookup) -> Vec<DependencyKey> {
        let mut keys: Vec<DependencyKey> = self.dependencies.iter().copied().collect();
        keys.sort_by_key(|k| (priorities.priority_of(*k), k.as_str()));
        keys
    }
}

/// Mapping from stable repo ID to `RepoPlan`. A `BTreeMap` gives the
/// ascending-ID iteration the scheduler needs (SPEC_FULL.md §4.5 step 4)
/// without a separate sort step.
pub type ScanPlan = BTreeMap<u64, RepoPlan>;

/// Builds a `ScanPlan` from a target set and a selected rule list.
pub struct ScanPlanner;

impl ScanPlanner {
    /// For each repo, unions the declared dependencies of every rule into a
    /// deduplicated set (parameter merging is explicitly not performed —
    /// SPEC_FULL.md §9 open question 1) and records the rules in the order
    /// supplied.
    ///
    /// Fails fast if any rule's `dependencies(repo)` call errors.
    ///
    /// Repo identity for the plan's key is the repo's numeric ID when
    /// non-zero; repos with no assigned ID (falling back to owner/name
    /// identity) cannot be represented in an ID-keyed `ScanPlan` and are
    /// rejected rather than silently colliding on key `0`.
    pub fn plan(repos: &[RepositoryRef], rules: &[Arc<dyn Rule>]) -> Result<ScanPlan> {
        let mut plan = ScanPlan::new();
        for repo in repos {
            if repo.id == 0 {
                return Err(CoreError::RuleDependencyError {
                    rule_id: "<planner>".to_string(),
                    message: format!(
                        "repo {:?} has no stable numeric id; ScanPlan requires one",
                        repo.full_name()
                    ),
                });
            }
            if plan.contains_key(&repo.id) {
                continue; // discovery is expected to have deduplicated already
            }

            let mut dependencies = HashSet::new();
            for rule in rules {
                let keys = rule.dependencies(repo).map_err(|e| CoreError::RuleDependencyError {
                    rule_id: rule.id().to_string(),
                    message: e.to_string(),
                })?;
                dependencies.extend(keys);
            }

            plan.insert(
                repo.id,
                RepoPlan {
                    repo: repo.clone(),
                    dependencies,
                    rules: rules.to_vec(),
                },
            );
        }
        Ok(plan)
    }
}

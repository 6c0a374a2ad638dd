//! `DataContext` — the read-only view of fetched dependencies rules evaluate
//! against, and its tracking wrapper used to enforce the declaration
//! invariant.

use super::key::DependencyKey;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

/// A read-only mapping from `DependencyKey` to the value a provider fetched.
///
/// Invariant (SPEC_FULL.md §3): a key is present iff its fetch succeeded.
/// Lookups are pure and idempotent — repeated calls with the same key must
/// return the same value for the lifetime of the context.
pub trait DataContext {
    fn get(&self, key: DependencyKey) -> Option<&serde_json::Value>;
    fn contains(&self, key: DependencyKey) -> bool {
        self.get(key).is_some()
    }
}

/// The plain map-backed `DataContext` implementation built by the evaluator
/// from a `RepoExecutionResult`'s successfully-fetched values.
#[derive(Debug, Clone, Default)]
pub struct MapDataContext {
    values: HashMap<DependencyKey, serde_json::Value>,
}

impl MapDataContext {
    pub fn new(values: HashMap<DependencyKey, serde_json::Value>) -> Self {
        Self { values }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}

impl DataContext for MapDataContext {
    fn get(&self, key: DependencyKey) -> Option<&serde_json::Value> {
        self.values.get(&key)
    }
}

/// Wraps a `DataContext` and records every key read through it.
///
/// The evaluator wraps a fresh `TrackingDataContext` around each rule's
/// data context before calling `Rule::evaluate`, then compares the recorded
/// reads against the rule's declared dependencies to enforce "no undeclared
/// dependency reads" (SPEC_FULL.md §4.6 step d).
///
/// `Rule::evaluate` takes `&self` and `&dyn DataContext`, so recording reads
/// needs interior mutability — a `RefCell` is sufficient since evaluation is
/// single-threaded per rule (the evaluator is a single consumer, §5).
pub struct TrackingDataContext<'a> {
    inner: &'a dyn DataContext,
    reads: RefCell<HashSet<DependencyKey>>,
}

impl<'a> TrackingDataContext<'a> {
    pub fn new(inner: &'a dyn DataContext) -> Self {
        Self {
            inner,
            reads: RefCell::new(HashSet::new()),
        }
    }

    /// The set of keys actually read so far, for comparison against the
    /// rule's declared dependency set.
    pub fn accessed_keys(&self) -> HashSet<DependencyKey> {
        self.reads.borrow().clone()
    }
}

impl<'a> DataContext for TrackingDataContext<'a> {
    fn get(&self, key: DependencyKey) -> Option<&serde_json::Value> {
        self.reads.borrow_mut().insert(key);
        self.inner.get(key)
    }
}

//! Per-key error disposition (SPEC_FULL.md §7): classifies a
//! `DependencyFetchError` as `Hard` (always an ERROR result for every rule
//! that declared the key) or `Skip` (a SKIPPED result, but only when *every*
//! declared dep failing for a given rule is also `Skip` — one `Hard` failure
//! among several deps always wins).

use repowarden_core::DependencyKey;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Hard,
    Skip,
}

/// A per-key disposition policy. Built once alongside the provider table;
/// keys with no explicit entry default to `Hard` (the conservative choice —
/// an unclassified failure should surface loudly, not be silently skipped).
#[derive(Debug, Clone, Default)]
pub struct DispositionTable {
    overrides: HashMap<DependencyKey, Disposition>,
}

impl DispositionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: DependencyKey, disposition: Disposition) -> &mut Self {
        self.overrides.insert(key, disposition);
        self
    }

    pub fn disposition_of(&self, key: DependencyKey) -> Disposition {
        self.overrides.get(&key).copied().unwrap_or(Disposition::Hard)
    }
}

//! `DependencyKey` — an interned name for a piece of derivable forge data.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which instance a dependency is cached against: once per repo, or once per
/// owning organization across every repo in the scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    Repo,
    Org,
}

/// Fetch ordering class. Lower numbers are fetched first within a repo
/// worker so the cheapest, most load-bearing data lands before the rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum Priority {
    /// Critical base metadata (e.g. `repo.metadata`).
    Critical = 0,
    /// Governance configuration (e.g. branch protection, rulesets).
    Governance = 1,
    /// Everything else.
    Extra = 2,
}

/// A named, interned dependency. Keys are not arbitrary runtime strings —
/// they are declared once by the provider that can fetch them (see
/// `repowarden-fetch`) and referenced everywhere else by this newtype.
///
/// Two `DependencyKey`s are equal iff they name the same interned string;
/// equality does not consider scope or priority (those are provider-table
/// lookups, not part of the key's identity).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DependencyKey(&'static str);

impl DependencyKey {
    /// Construct a key from a `&'static str` constant. Provider modules are
    /// expected to expose `pub const` `DependencyKey`s built this way
    /// (e.g. `pub const REPO_METADATA: DependencyKey = DependencyKey::new("repo.metadata");`)
    /// rather than building keys dynamically at call sites.
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for DependencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl AsRef<str> for DependencyKey {
    fn as_ref(&self) -> &str {
        self.0
    }
}

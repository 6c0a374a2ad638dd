//! `RepositoryRef` — a stable handle for a scan target.

use serde::{Deserialize, Serialize};

/// A repository hosted by the forge, as discovered upstream of the core.
///
/// Constructed by discovery (out of scope per SPEC_FULL.md §1) and read-only
/// from here on. Identity for deduplication is `id` when non-zero, otherwise
/// `"owner/name"`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RepositoryRef {
    pub owner: String,
    pub name: String,
    /// Stable forge-assigned numeric ID. Zero means "unknown" — callers fall
    /// back to the owner/name pair for identity in that case.
    pub id: u64,
    /// Opaque, provider-defined metadata snapshot (default branch, topics,
    /// visibility, ...). Rules never read this directly — they declare and
    /// fetch a `DependencyKey` instead; this snapshot exists so
    /// `Rule::dependencies` can branch on repo attributes without a fetch.
    #[serde(default)]
    pub metadata: serde_json::Value,
}

impl RepositoryRef {
    pub fn new(owner: impl Into<String>, name: impl Into<String>, id: u64) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
            id,
            metadata: serde_json::Value::Null,
        }
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }

    /// `"owner/name"`, used as the identity fallback and as the `repo` field
    /// on every emitted event and result.
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }

    /// The identity used for deduplication: the numeric ID when known,
    /// otherwise the owner/name pair.
    pub fn identity(&self) -> RepoIdentity {
        if self.id != 0 {
            RepoIdentity::Id(self.id)
        } else {
            RepoIdentity::FullName(self.full_name())
        }
    }
}

/// Deduplication identity for a `RepositoryRef`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RepoIdentity {
    Id(u64),
    FullName(String),
}

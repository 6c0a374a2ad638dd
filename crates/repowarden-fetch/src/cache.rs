//! Fetch cache with single-flight collapsing (SPEC_FULL.md §4.4).
//!
//! Keyed by `(scope, scope-id, DependencyKey, canonicalized params)`.
//! Concurrent calls with the same key share one `tokio::sync::OnceCell` —
//! exactly one provider invocation occurs per key per scope instance, and
//! every other caller awaits the same cell. Cancelling one caller does not
//! cancel the shared work unless every caller has cancelled (dropping an
//! `OnceCell::get_or_init` future does not cancel cells still awaited by
//! other callers).

use crate::error::FetchError;
use repowarden_core::{DependencyKey, Scope};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub scope: Scope,
    pub scope_id: String,
    pub key: DependencyKey,
    pub params: String,
}

impl CacheKey {
    pub fn new(scope: Scope, scope_id: impl Into<String>, key: DependencyKey, params: &HashMap<String, String>) -> Self {
        Self {
            scope,
            scope_id: scope_id.into(),
            key,
            params: canonicalize_params(params),
        }
    }
}

/// Canonical string form of a params map: sorted `key=value` pairs joined
/// with `&`, so equivalent maps produce the same cache key regardless of
/// insertion order.
fn canonicalize_params(params: &HashMap<String, String>) -> String {
    let sorted: BTreeMap<&String, &String> = params.iter().collect();
    sorted
        .into_iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

type Slot = Arc<OnceCell<Result<serde_json::Value, FetchError>>>;

/// Single-flight cache: a plain mutex-guarded map of cache key to a shared
/// `OnceCell` slot. SPEC_FULL.md §4.4 notes a sharded map is unnecessary at
/// this scale — a scan's dependency key space is small and fetches are
/// I/O-bound, so a single mutex guarding slot lookup (never the provider
/// call itself) is sufficient.
#[derive(Default)]
pub struct Cache {
    slots: Mutex<HashMap<CacheKey, Slot>>,
}

impl Cache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the shared slot for `key`, creating it if absent. The caller
    /// then calls `.get_or_try_init` on the returned slot outside the map
    /// lock, so concurrent callers for different keys never block each
    /// other, and concurrent callers for the *same* key collapse onto one
    /// `OnceCell`.
    pub async fn slot_for(&self, key: CacheKey) -> Slot {
        let mut slots = self.slots.lock().await;
        slots.entry(key).or_insert_with(|| Arc::new(OnceCell::new())).clone()
    }

    /// Seed a value directly into the cache before scheduling (cross-dep
    /// injection, SPEC_FULL.md §4.4) so providers that depend on it read
    /// from cache without an additional API call. A no-op if the slot is
    /// already initialized.
    pub async fn seed(&self, key: CacheKey, value: serde_json::Value) {
        let slot = self.slot_for(key).await;
        let _ = slot.set(Ok(value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn canonicalization_is_order_independent() {
        let mut a = HashMap::new();
        a.insert("b".to_string(), "2".to_string());
        a.insert("a".to_string(), "1".to_string());
        let mut b = HashMap::new();
        b.insert("a".to_string(), "1".to_string());
        b.insert("b".to_string(), "2".to_string());
        assert_eq!(canonicalize_params(&a), canonicalize_params(&b));
    }

    #[tokio::test]
    async fn concurrent_calls_for_same_key_collapse_to_one_provider_invocation() {
        let cache = Arc::new(Cache::new());
        let calls = Arc::new(AtomicU32::new(0));
        let key = CacheKey::new(Scope::Repo, "1", DependencyKey::new("repo.metadata"), &HashMap::new());

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = cache.clone();
            let calls = calls.clone();
            let key = key.clone();
            handles.push(tokio::spawn(async move {
                let slot = cache.slot_for(key).await;
                slot.get_or_try_init(|| async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
                    Ok::<_, FetchError>(serde_json::json!({"ok": true}))
                })
                .await
                .unwrap()
                .clone()
            }));
        }

        for h in handles {
            h.await.unwrap().unwrap();
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn seeded_value_is_returned_without_a_provider_call() {
        let cache = Cache::new();
        let key = CacheKey::new(Scope::Org, "acme", DependencyKey::new("org.repos_in_scan"), &HashMap::new());
        cache.seed(key.clone(), serde_json::json!(["a", "b"])).await;

        let slot = cache.slot_for(key).await;
        let value = slot
            .get_or_try_init(|| async { panic!("provider should not be called") })
            .await
            .unwrap();
        assert_eq!(value.as_ref().unwrap(), &serde_json::json!(["a", "b"]));
    }
}

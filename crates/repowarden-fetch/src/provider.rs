//! Provider table + the `Fetcher` facade: `fetch(repo, key, params) -> (value, error)`
//! (SPEC_FULL.md §4.4).

use crate::cache::{Cache, CacheKey};
use crate::client::{ForgeClient, ResponseMeta};
use crate::disposition::{Disposition, DispositionTable};
use crate::error::FetchError;
use crate::budget::{BudgetSnapshot, RequestBudget};
use futures::future::BoxFuture;
use repowarden_core::metrics::METRICS;
use repowarden_core::{DependencyKey, Priority, RepositoryRef, Scope};
use std::collections::HashMap;
use std::sync::Arc;

/// What a fetch is being performed on behalf of: a specific repo, or an
/// owning organization (for org-scoped keys, cached once across every repo
/// in the scan).
#[derive(Debug, Clone)]
pub enum FetchSubject {
    Repo(RepositoryRef),
    Org(String),
}

impl FetchSubject {
    pub fn scope_id(&self) -> String {
        match self {
            FetchSubject::Repo(repo) => repo.id.to_string(),
            FetchSubject::Org(owner) => owner.clone(),
        }
    }
}

/// The bundle a provider function receives: the forge client, the subject
/// being fetched for, and the opaque params map — matching the
/// `(ctx, client, subject, params) -> (any, error)` contract of SPEC_FULL.md
/// §6 verbatim (`ctx` is implicit here: the provider closure itself carries
/// whatever fixed context it needs via capture).
pub struct FetchCtx {
    pub client: Arc<dyn ForgeClient>,
    pub subject: FetchSubject,
    pub params: HashMap<String, String>,
}

/// Providers hand back their response's `ResponseMeta` alongside the value
/// so `Fetcher::fetch` can record rate-limit budget from it after every live
/// invocation (SPEC_FULL.md §4.4) — the value itself is what gets cached.
pub type ProviderFn = Arc<
    dyn Fn(FetchCtx) -> BoxFuture<'static, Result<(serde_json::Value, ResponseMeta), FetchError>> + Send + Sync,
>;

struct ProviderEntry {
    scope: Scope,
    priority: Priority,
    provider: ProviderFn,
}

/// Builds a frozen `Fetcher` from a set of provider registrations. Duplicate
/// registration against the same `DependencyKey` is a construction-time
/// failure (`FetchError::DuplicateProvider`), not a panic, so the CLI can
/// report it as a fatal setup error.
pub struct FetcherBuilder {
    client: Arc<dyn ForgeClient>,
    providers: HashMap<DependencyKey, ProviderEntry>,
    disposition: DispositionTable,
}

impl FetcherBuilder {
    pub fn new(client: Arc<dyn ForgeClient>) -> Self {
        Self {
            client,
            providers: HashMap::new(),
            disposition: DispositionTable::new(),
        }
    }

    pub fn register_provider(
        &mut self,
        key: DependencyKey,
        scope: Scope,
        priority: Priority,
        disposition: Disposition,
        provider: ProviderFn,
    ) -> Result<&mut Self, FetchError> {
        if self.providers.contains_key(&key) {
            return Err(FetchError::DuplicateProvider(key.as_str().to_string()));
        }
        self.providers.insert(key, ProviderEntry { scope, priority, provider });
        self.disposition.set(key, disposition);
        Ok(self)
    }

    pub fn build(self) -> Fetcher {
        Fetcher {
            client: self.client,
            providers: self.providers,
            disposition: self.disposition,
            cache: Cache::new(),
            budget: RequestBudget::new(),
        }
    }
}

/// Dispatches typed dependency requests to provider functions, caching by
/// key+scope with single-flight collapsing.
pub struct Fetcher {
    client: Arc<dyn ForgeClient>,
    providers: HashMap<DependencyKey, ProviderEntry>,
    disposition: DispositionTable,
    cache: Cache,
    budget: RequestBudget,
}

impl Fetcher {
    pub fn builder(client: Arc<dyn ForgeClient>) -> FetcherBuilder {
        FetcherBuilder::new(client)
    }

    pub fn scope_of(&self, key: DependencyKey) -> Option<Scope> {
        self.providers.get(&key).map(|e| e.scope)
    }

    pub fn priority_of(&self, key: DependencyKey) -> Priority {
        self.providers.get(&key).map(|e| e.priority).unwrap_or(Priority::Extra)
    }

    pub fn disposition_of(&self, key: DependencyKey) -> Disposition {
        self.disposition.disposition_of(key)
    }

    pub fn budget(&self) -> BudgetSnapshot {
        self.budget.snapshot()
    }

    /// Insert a value directly into the cache before scheduling, so
    /// providers depending on it read from cache without an extra call.
    pub async fn seed(&self, key: DependencyKey, scope: Scope, scope_id: impl Into<String>, value: serde_json::Value) {
        let cache_key = CacheKey::new(scope, scope_id, key, &HashMap::new());
        self.cache.seed(cache_key, value).await;
    }

    /// Fetch `key` for `subject`. Concurrent calls with the same
    /// `(scope, scope-id, key, params)` collapse to one provider invocation.
    pub async fn fetch(
        &self,
        subject: FetchSubject,
        key: DependencyKey,
        params: HashMap<String, String>,
    ) -> Result<serde_json::Value, FetchError> {
        let entry = self
            .providers
            .get(&key)
            .ok_or_else(|| FetchError::UnknownKey(key.as_str().to_string()))?;

        let cache_key = CacheKey::new(entry.scope, subject.scope_id(), key, &params);
        let slot = self.cache.slot_for(cache_key).await;

        let already_cached = slot.initialized();
        if already_cached {
            METRICS.inc_cache_hit();
        } else {
            METRICS.inc_cache_miss();
        }

        let provider = entry.provider.clone();
        let client = self.client.clone();
        let budget = &self.budget;
        let result = slot
            .get_or_init(|| async move {
                METRICS.inc_fetch_issued();
                let ctx = FetchCtx { client, subject, params };
                match provider(ctx).await {
                    Ok((value, meta)) => {
                        budget.record(meta.rate_limit_remaining.unwrap_or(-1), meta.rate_limit_reset.unwrap_or(0));
                        Ok(value)
                    }
                    Err(err) => Err(err),
                }
            })
            .await;

        result.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{ClientError, ResponseMeta};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct NullClient;

    #[async_trait]
    impl ForgeClient for NullClient {
        async fn get_json(&self, _path: &str) -> Result<(serde_json::Value, ResponseMeta), ClientError> {
            Ok((serde_json::Value::Null, ResponseMeta::default()))
        }
    }

    fn repo() -> RepositoryRef {
        RepositoryRef::new("acme", "a", 1)
    }

    #[tokio::test]
    async fn duplicate_provider_registration_is_rejected() {
        let mut builder = FetcherBuilder::new(Arc::new(NullClient));
        let key = DependencyKey::new("repo.metadata");
        builder
            .register_provider(key, Scope::Repo, Priority::Critical, Disposition::Hard, Arc::new(|_ctx| {
                Box::pin(async { Ok((serde_json::json!({}), ResponseMeta::default())) })
            }))
            .unwrap();
        let err = builder
            .register_provider(key, Scope::Repo, Priority::Critical, Disposition::Hard, Arc::new(|_ctx| {
                Box::pin(async { Ok((serde_json::json!({}), ResponseMeta::default())) })
            }))
            .unwrap_err();
        assert!(matches!(err, FetchError::DuplicateProvider(_)));
    }

    #[tokio::test]
    async fn fetching_an_unknown_key_is_an_error() {
        let fetcher = FetcherBuilder::new(Arc::new(NullClient)).build();
        let err = fetcher
            .fetch(FetchSubject::Repo(repo()), DependencyKey::new("nope"), HashMap::new())
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::UnknownKey(_)));
    }

    #[tokio::test]
    async fn concurrent_fetches_of_same_key_call_provider_once() {
        let calls = Arc::new(AtomicU32::new(0));
        let mut builder = FetcherBuilder::new(Arc::new(NullClient));
        let calls_clone = calls.clone();
        builder
            .register_provider(
                DependencyKey::new("repo.metadata"),
                Scope::Repo,
                Priority::Critical,
                Disposition::Hard,
                Arc::new(move |_ctx| {
                    let calls = calls_clone.clone();
                    Box::pin(async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
                        Ok((serde_json::json!({"default_branch": "main"}), ResponseMeta::default()))
                    })
                }),
            )
            .unwrap();
        let fetcher = Arc::new(builder.build());

        let mut handles = Vec::new();
        for _ in 0..6 {
            let fetcher = fetcher.clone();
            let r = repo();
            handles.push(tokio::spawn(async move {
                fetcher
                    .fetch(FetchSubject::Repo(r), DependencyKey::new("repo.metadata"), HashMap::new())
                    .await
            }));
        }
        for h in handles {
            h.await.unwrap().unwrap();
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn seeded_value_short_circuits_the_provider() {
        let mut builder = FetcherBuilder::new(Arc::new(NullClient));
        builder
            .register_provider(
                DependencyKey::new("org.merge_baseline"),
                Scope::Org,
                Priority::Governance,
                Disposition::Hard,
                Arc::new(|_ctx| Box::pin(async { panic!("provider should not run") })),
            )
            .unwrap();
        let fetcher = builder.build();
        fetcher
            .seed(DependencyKey::new("org.merge_baseline"), Scope::Org, "acme", serde_json::json!("main"))
            .await;

        let value = fetcher
            .fetch(FetchSubject::Org("acme".to_string()), DependencyKey::new("org.merge_baseline"), HashMap::new())
            .await
            .unwrap();
        assert_eq!(value, serde_json::json!("main"));
    }

    #[tokio::test]
    async fn a_live_fetch_records_the_response_meta_into_the_budget() {
        let mut builder = FetcherBuilder::new(Arc::new(NullClient));
        builder
            .register_provider(
                DependencyKey::new("repo.metadata"),
                Scope::Repo,
                Priority::Critical,
                Disposition::Hard,
                Arc::new(|_ctx| {
                    Box::pin(async {
                        Ok((
                            serde_json::json!({}),
                            ResponseMeta { status: 200, rate_limit_remaining: Some(4999), rate_limit_reset: Some(1_700_000_000) },
                        ))
                    })
                }),
            )
            .unwrap();
        let fetcher = builder.build();

        assert_eq!(fetcher.budget().remaining, -1);
        fetcher
            .fetch(FetchSubject::Repo(repo()), DependencyKey::new("repo.metadata"), HashMap::new())
            .await
            .unwrap();

        let snapshot = fetcher.budget();
        assert_eq!(snapshot.remaining, 4999);
        assert_eq!(snapshot.reset_at_epoch_secs, 1_700_000_000);
    }

    #[tokio::test]
    async fn a_cache_hit_does_not_re_invoke_the_provider_or_re_record_budget() {
        let mut builder = FetcherBuilder::new(Arc::new(NullClient));
        builder
            .register_provider(
                DependencyKey::new("repo.metadata"),
                Scope::Repo,
                Priority::Critical,
                Disposition::Hard,
                Arc::new(|_ctx| {
                    Box::pin(async {
                        Ok((
                            serde_json::json!({}),
                            ResponseMeta { status: 200, rate_limit_remaining: Some(10), rate_limit_reset: Some(1) },
                        ))
                    })
                }),
            )
            .unwrap();
        let fetcher = builder.build();

        fetcher
            .fetch(FetchSubject::Repo(repo()), DependencyKey::new("repo.metadata"), HashMap::new())
            .await
            .unwrap();
        fetcher
            .fetch(FetchSubject::Repo(repo()), DependencyKey::new("repo.metadata"), HashMap::new())
            .await
            .unwrap();

        assert_eq!(fetcher.budget().remaining, 10);
    }
}

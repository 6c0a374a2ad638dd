//! Full pipeline integration tests: real `ScanPlanner` + `Fetcher` +
//! `Scheduler` + `Evaluator` wiring against an in-memory sink, covering
//! spec.md §8's concrete end-to-end scenarios and boundary behaviors.

use async_trait::async_trait;
use repowarden_core::{DataContext, DependencyKey, Priority, RepositoryRef, Rule, RuleResult, RuleStatus, ScanPlanner, Scope};
use repowarden_eval::Evaluator;
use repowarden_fetch::{ClientError, Disposition, Fetcher, FetcherBuilder, ForgeClient, ResponseMeta};
use repowarden_output::{Event, OutputManager, OutputValue, Sink, SinkError};
use repowarden_scheduler::Scheduler;
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

struct RecordingSink {
    values: Mutex<Vec<OutputValue>>,
}

impl RecordingSink {
    fn new() -> Arc<Self> {
        Arc::new(Self { values: Mutex::new(Vec::new()) })
    }

    fn events(&self) -> Vec<OutputValue> {
        self.values.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sink for RecordingSink {
    async fn write(&self, value: &OutputValue) -> Result<(), SinkError> {
        self.values.lock().unwrap().push(value.clone());
        Ok(())
    }
    async fn close(&self) -> Result<(), SinkError> {
        Ok(())
    }
}

struct RecordingSinkHandle(Arc<RecordingSink>);

#[async_trait]
impl Sink for RecordingSinkHandle {
    async fn write(&self, value: &OutputValue) -> Result<(), SinkError> {
        self.0.write(value).await
    }
    async fn close(&self) -> Result<(), SinkError> {
        self.0.close().await
    }
}

struct FixedClient {
    response: serde_json::Value,
    status: u16,
}

#[async_trait]
impl ForgeClient for FixedClient {
    async fn get_json(&self, _path: &str) -> Result<(serde_json::Value, ResponseMeta), ClientError> {
        if self.status >= 400 {
            return Err(ClientError::Status { status: self.status, message: "server exploded".to_string() });
        }
        Ok((self.response.clone(), ResponseMeta { status: self.status, ..Default::default() }))
    }
}

const BRANCH_PROTECTION: DependencyKey = DependencyKey::new("repo.default_branch_protection");
const ALL_RULESETS: DependencyKey = DependencyKey::new("repo.all_rulesets");
const METADATA: DependencyKey = DependencyKey::new("repo.metadata");

fn fetcher_with(key: DependencyKey, disposition: Disposition, client: Arc<dyn ForgeClient>) -> Arc<Fetcher> {
    let mut builder = FetcherBuilder::new(client);
    builder
        .register_provider(
            key,
            Scope::Repo,
            Priority::Governance,
            disposition,
            Arc::new(move |ctx| {
                Box::pin(async move {
                    let (value, meta) = ctx
                        .client
                        .get_json("x")
                        .await
                        .map_err(|e| repowarden_fetch::FetchError::provider(key, e.to_string(), status_of(&e)))?;
                    Ok((value, meta))
                })
            }),
        )
        .unwrap();
    Arc::new(builder.build())
}

fn status_of(err: &ClientError) -> Option<u16> {
    match err {
        ClientError::Status { status, .. } => Some(*status),
        ClientError::Transport { .. } => None,
    }
}

async fn run_pipeline(
    repos: Vec<RepositoryRef>,
    rules: Vec<Arc<dyn Rule>>,
    fetcher: Arc<Fetcher>,
) -> (repowarden_eval::EvalOutcome, Vec<OutputValue>) {
    let plan = ScanPlanner::plan(&repos, &rules).unwrap();
    let recorder = RecordingSink::new();
    let manager = OutputManager::new(vec![Box::new(RecordingSinkHandle(recorder.clone()))]);

    let cancel = CancellationToken::new();
    let (results_rx, errors_rx) = Scheduler::run(plan.clone(), 4, cancel, fetcher.clone());
    let outcome = Evaluator::run(results_rx, errors_rx, &plan, &manager, fetcher.as_ref(), false).await;

    let events = recorder.events();
    (outcome, events)
}

struct AlwaysPass;
impl Rule for AlwaysPass {
    fn id(&self) -> &str {
        "always-pass"
    }
    fn title(&self) -> &str {
        "always pass"
    }
    fn description(&self) -> &str {
        "no deps, never fails"
    }
    fn dependencies(&self, _repo: &RepositoryRef) -> anyhow::Result<Vec<DependencyKey>> {
        Ok(vec![])
    }
    fn evaluate(&self, repo: &RepositoryRef, _ctx: &dyn DataContext) -> anyhow::Result<RuleResult> {
        Ok(RuleResult::pass("always-pass", repo.full_name()))
    }
}

struct AlwaysFail;
impl Rule for AlwaysFail {
    fn id(&self) -> &str {
        "x"
    }
    fn title(&self) -> &str {
        "always fail"
    }
    fn description(&self) -> &str {
        "no deps, always fails"
    }
    fn dependencies(&self, _repo: &RepositoryRef) -> anyhow::Result<Vec<DependencyKey>> {
        Ok(vec![])
    }
    fn evaluate(&self, repo: &RepositoryRef, _ctx: &dyn DataContext) -> anyhow::Result<RuleResult> {
        Ok(RuleResult::fail("x", repo.full_name(), "nope"))
    }
}

struct NeedsBranchProtection;
impl Rule for NeedsBranchProtection {
    fn id(&self) -> &str {
        "needs-branch-protection"
    }
    fn title(&self) -> &str {
        "needs branch protection"
    }
    fn description(&self) -> &str {
        "declares repo.default_branch_protection"
    }
    fn dependencies(&self, _repo: &RepositoryRef) -> anyhow::Result<Vec<DependencyKey>> {
        Ok(vec![BRANCH_PROTECTION])
    }
    fn evaluate(&self, repo: &RepositoryRef, ctx: &dyn DataContext) -> anyhow::Result<RuleResult> {
        let _ = ctx.get(BRANCH_PROTECTION);
        Ok(RuleResult::pass("needs-branch-protection", repo.full_name()))
    }
}

struct ReadsUndeclaredRulesets;
impl Rule for ReadsUndeclaredRulesets {
    fn id(&self) -> &str {
        "reads-undeclared-rulesets"
    }
    fn title(&self) -> &str {
        "declares metadata, reads rulesets too"
    }
    fn description(&self) -> &str {
        "declares repo.metadata, reads repo.all_rulesets without declaring it"
    }
    fn dependencies(&self, _repo: &RepositoryRef) -> anyhow::Result<Vec<DependencyKey>> {
        Ok(vec![METADATA])
    }
    fn evaluate(&self, repo: &RepositoryRef, ctx: &dyn DataContext) -> anyhow::Result<RuleResult> {
        let _ = ctx.get(METADATA);
        let _ = ctx.get(ALL_RULESETS);
        Ok(RuleResult::pass("reads-undeclared-rulesets", repo.full_name()))
    }
}

/// Scenario 1: single repo, single passing rule, no deps.
#[tokio::test]
async fn scenario_1_single_repo_passing_rule_no_deps() {
    let client = Arc::new(FixedClient { response: serde_json::json!({}), status: 200 });
    let fetcher = fetcher_with(METADATA, Disposition::Hard, client);
    let repos = vec![RepositoryRef::new("acme", "a", 1)];
    let rules: Vec<Arc<dyn Rule>> = vec![Arc::new(AlwaysPass)];

    let (outcome, events) = run_pipeline(repos, rules, fetcher).await;

    assert_eq!(outcome.exit_code(), 0);
    let kinds: Vec<&str> = events
        .iter()
        .map(|v| match v {
            OutputValue::Event(Event::RunStarted { .. }) => "run.started",
            OutputValue::Event(Event::RepoStarted { .. }) => "repo.started",
            OutputValue::Result(_) => "rule.result",
            OutputValue::Event(Event::RepoFinished { .. }) => "repo.finished",
            OutputValue::Event(Event::RunFinished { .. }) => "run.finished",
        })
        .collect();
    assert_eq!(kinds, vec!["run.started", "repo.started", "rule.result", "repo.finished", "run.finished"]);

    let result = events.iter().find_map(|v| v.as_result()).unwrap();
    assert_eq!(result.rule_id, "always-pass");
    assert_eq!(result.repo, "acme/a");
    assert_eq!(result.status, RuleStatus::Pass);
}

/// Scenario 2: single repo, rule fails.
#[tokio::test]
async fn scenario_2_single_repo_rule_fails() {
    let client = Arc::new(FixedClient { response: serde_json::json!({}), status: 200 });
    let fetcher = fetcher_with(METADATA, Disposition::Hard, client);
    let repos = vec![RepositoryRef::new("acme", "a", 1)];
    let rules: Vec<Arc<dyn Rule>> = vec![Arc::new(AlwaysFail)];

    let (outcome, events) = run_pipeline(repos, rules, fetcher).await;

    assert_eq!(outcome.exit_code(), 1);
    let result = events.iter().find_map(|v| v.as_result()).unwrap();
    assert_eq!(result.rule_id, "x");
    assert_eq!(result.repo, "acme/a");
    assert_eq!(result.status, RuleStatus::Fail);
    assert_eq!(result.message.as_deref(), Some("nope"));
}

/// Scenario 3: declared dep's provider fails with SKIP disposition.
#[tokio::test]
async fn scenario_3_skip_disposition_yields_skipped_not_failure() {
    let client = Arc::new(FixedClient { response: serde_json::json!({}), status: 403 });
    let fetcher = fetcher_with(BRANCH_PROTECTION, Disposition::Skip, client);
    let repos = vec![RepositoryRef::new("acme", "a", 1)];
    let rules: Vec<Arc<dyn Rule>> = vec![Arc::new(NeedsBranchProtection)];

    let (outcome, events) = run_pipeline(repos, rules, fetcher).await;

    assert_eq!(outcome.exit_code(), 0, "SKIPPED must not count as FAIL or ERROR");
    let result = events.iter().find_map(|v| v.as_result()).unwrap();
    assert_eq!(result.status, RuleStatus::Skipped);
}

/// Scenario 4: declared dep's provider returns a 500 (HARD disposition).
#[tokio::test]
async fn scenario_4_hard_disposition_yields_error() {
    let client = Arc::new(FixedClient { response: serde_json::json!({}), status: 500 });
    let fetcher = fetcher_with(BRANCH_PROTECTION, Disposition::Hard, client);
    let repos = vec![RepositoryRef::new("acme", "a", 1)];
    let rules: Vec<Arc<dyn Rule>> = vec![Arc::new(NeedsBranchProtection)];

    let (outcome, events) = run_pipeline(repos, rules, fetcher).await;

    assert_eq!(outcome.exit_code(), 2);
    let result = events.iter().find_map(|v| v.as_result()).unwrap();
    assert_eq!(result.status, RuleStatus::Error);
    assert!(result.message.as_ref().unwrap().contains("500"));
}

/// Scenario 5: two repos, rule declares `repo.metadata` but reads
/// `repo.all_rulesets` too — undeclared access invalidates both results.
#[tokio::test]
async fn scenario_5_undeclared_access_across_two_repos() {
    let client = Arc::new(FixedClient { response: serde_json::json!({}), status: 200 });
    let fetcher = fetcher_with(METADATA, Disposition::Hard, client);
    let repos = vec![RepositoryRef::new("acme", "a", 1), RepositoryRef::new("acme", "b", 2)];
    let rules: Vec<Arc<dyn Rule>> = vec![Arc::new(ReadsUndeclaredRulesets)];

    let (outcome, events) = run_pipeline(repos, rules, fetcher).await;

    assert_eq!(outcome.exit_code(), 2);
    let results: Vec<_> = events.iter().filter_map(|v| v.as_result()).collect();
    assert_eq!(results.len(), 2);
    for result in results {
        assert_eq!(result.status, RuleStatus::Error);
        assert!(result.message.as_ref().unwrap().contains("undeclared"));
    }
}

/// Boundary: empty plan closes both streams with no fatal error and exit 0.
#[tokio::test]
async fn empty_plan_emits_no_results_and_closes_cleanly() {
    let client = Arc::new(FixedClient { response: serde_json::json!({}), status: 200 });
    let fetcher = fetcher_with(METADATA, Disposition::Hard, client);
    let repos: Vec<RepositoryRef> = vec![];
    let rules: Vec<Arc<dyn Rule>> = vec![Arc::new(AlwaysPass)];

    let (outcome, events) = run_pipeline(repos, rules, fetcher).await;

    assert_eq!(outcome.exit_code(), 0);
    assert!(events.iter().filter_map(|v| v.as_result()).next().is_none());
    let kinds: Vec<&str> = events
        .iter()
        .map(|v| match v {
            OutputValue::Event(Event::RunStarted { .. }) => "run.started",
            OutputValue::Event(Event::RunFinished { .. }) => "run.finished",
            _ => "unexpected",
        })
        .collect();
    assert_eq!(kinds, vec!["run.started", "run.finished"]);
}

/// Boundary: single plan with no declared dependencies yields one result
/// with an empty data map and empty errors map (the rule itself has no
/// deps to fail on).
#[tokio::test]
async fn single_plan_no_dependencies_yields_one_clean_result() {
    let client = Arc::new(FixedClient { response: serde_json::json!({}), status: 200 });
    let fetcher = fetcher_with(METADATA, Disposition::Hard, client);
    let repos = vec![RepositoryRef::new("acme", "a", 1)];
    let rules: Vec<Arc<dyn Rule>> = vec![Arc::new(AlwaysPass)];

    let plan = ScanPlanner::plan(&repos, &rules).unwrap();
    assert!(plan.get(&1).unwrap().dependencies.is_empty());

    let (outcome, events) = run_pipeline(repos, rules, fetcher).await;
    assert_eq!(outcome.exit_code(), 0);
    assert_eq!(events.iter().filter_map(|v| v.as_result()).count(), 1);
}

/// Dedup law, exercised through the full pipeline rather than the cache
/// unit directly: two repos sharing an org-scoped key call the provider
/// once even though each repo's worker fetches it independently.
#[tokio::test]
async fn dedup_law_holds_across_two_repo_workers() {
    use std::sync::atomic::{AtomicU32, Ordering};

    struct CountingClient(Arc<AtomicU32>);
    #[async_trait]
    impl ForgeClient for CountingClient {
        async fn get_json(&self, _path: &str) -> Result<(serde_json::Value, ResponseMeta), ClientError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
            Ok((serde_json::json!("main"), ResponseMeta::default()))
        }
    }

    const ORG_BASELINE: DependencyKey = DependencyKey::new("org.merge_baseline");

    let calls = Arc::new(AtomicU32::new(0));
    let client = Arc::new(CountingClient(calls.clone()));
    let mut builder = FetcherBuilder::new(client);
    builder
        .register_provider(
            ORG_BASELINE,
            Scope::Org,
            Priority::Governance,
            Disposition::Hard,
            Arc::new(|ctx| {
                Box::pin(async move {
                    let (value, meta) = ctx
                        .client
                        .get_json("org")
                        .await
                        .map_err(|e| repowarden_fetch::FetchError::provider(ORG_BASELINE, e.to_string(), None))?;
                    Ok((value, meta))
                })
            }),
        )
        .unwrap();
    let fetcher = Arc::new(builder.build());

    struct NeedsOrgBaseline;
    impl Rule for NeedsOrgBaseline {
        fn id(&self) -> &str {
            "needs-org-baseline"
        }
        fn title(&self) -> &str {
            "needs org baseline"
        }
        fn description(&self) -> &str {
            "declares org.merge_baseline"
        }
        fn dependencies(&self, _repo: &RepositoryRef) -> anyhow::Result<Vec<DependencyKey>> {
            Ok(vec![DependencyKey::new("org.merge_baseline")])
        }
        fn evaluate(&self, repo: &RepositoryRef, _ctx: &dyn DataContext) -> anyhow::Result<RuleResult> {
            Ok(RuleResult::pass("needs-org-baseline", repo.full_name()))
        }
    }

    let repos = vec![RepositoryRef::new("acme", "a", 1), RepositoryRef::new("acme", "b", 2)];
    let rules: Vec<Arc<dyn Rule>> = vec![Arc::new(NeedsOrgBaseline)];
    let (outcome, _events) = run_pipeline(repos, rules, fetcher).await;

    assert_eq!(outcome.exit_code(), 0);
    assert_eq!(calls.load(Ordering::SeqCst), 1, "provider must be called exactly once across both repo workers");
}


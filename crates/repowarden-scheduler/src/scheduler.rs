//! The bounded-concurrency repo-worker scheduler (SPEC_FULL.md §4.5).
//!
//! Drives a `ScanPlan` through the `Fetcher` under a semaphore of size N,
//! emitting exactly one `RepoExecutionResult` per `RepoPlan` in the normal
//! (non-canceled) case. Grounded in the teacher pack's semaphore-bounded
//! worker-pool pattern (`wf-runtime::scheduler::Scheduler`): a driver task
//! holds the cancellation token and a `JoinSet` of spawned workers, workers
//! hold an owned semaphore permit for their lifetime.

use crate::error::SchedulerError;
use crate::result::RepoExecutionResult;
use repowarden_core::{DependencyKey, RepoPlan, ScanPlan, Scope};
use repowarden_fetch::{FetchSubject, Fetcher};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub struct Scheduler;

impl Scheduler {
    /// Start driving `plan`. Returns immediately with the two receivers;
    /// the driver runs as a detached task so the caller can start consuming
    /// `results` before the whole scan completes (SPEC_FULL.md §4.5's
    /// streaming contract).
    pub fn run(
        plan: ScanPlan,
        concurrency: usize,
        cancel: CancellationToken,
        fetcher: Arc<Fetcher>,
    ) -> (mpsc::Receiver<RepoExecutionResult>, mpsc::Receiver<SchedulerError>) {
        // Results hand-off is modeled as capacity-1 with the sender always
        // awaiting send before continuing — an effectively unbuffered
        // channel giving the evaluator natural backpressure over workers
        // (SPEC_FULL.md §9; tokio's mpsc requires capacity >= 1). The
        // errors channel is buffered size 1 to avoid sender deadlock when
        // nobody is listening.
        let (results_tx, results_rx) = mpsc::channel(1);
        let (errors_tx, errors_rx) = mpsc::channel(1);

        tokio::spawn(Self::drive(plan, concurrency, cancel, fetcher, results_tx, errors_tx));

        (results_rx, errors_rx)
    }

    async fn drive(
        plan: ScanPlan,
        concurrency: usize,
        cancel: CancellationToken,
        fetcher: Arc<Fetcher>,
        results_tx: mpsc::Sender<RepoExecutionResult>,
        errors_tx: mpsc::Sender<SchedulerError>,
    ) {
        if concurrency == 0 {
            errors_tx
                .send(SchedulerError::InvalidPlan("concurrency must be >= 1".to_string()))
                .await
                .ok();
            return;
        }

        info!(repos = plan.len(), concurrency, "scan started");

        let semaphore = Arc::new(Semaphore::new(concurrency));
        let mut workers = JoinSet::new();

        // BTreeMap (ScanPlan) iterates in ascending key order already, so
        // this loop satisfies "iterate RepoPlans in ascending repo-ID order"
        // (SPEC_FULL.md §4.5 step 4) without an explicit sort.
        for (repo_id, repo_plan) in plan.into_iter() {
            let permit = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                acquired = Arc::clone(&semaphore).acquire_owned() => match acquired {
                    Ok(permit) => permit,
                    Err(_) => break, // semaphore closed — treat like cancellation
                },
            };

            let worker_fetcher = fetcher.clone();
            let worker_cancel = cancel.clone();
            let worker_results_tx = results_tx.clone();

            workers.spawn(async move {
                let _permit = permit;
                Self::run_worker(repo_id, repo_plan, worker_fetcher, worker_cancel, worker_results_tx).await;
            });
        }

        while workers.join_next().await.is_some() {}

        if cancel.is_cancelled() {
            warn!("scan canceled before all repos completed");
            errors_tx.send(SchedulerError::Cancelled).await.ok();
        } else {
            info!("scan finished");
        }
        // `results_tx`/`errors_tx` drop here, closing both streams reliably.
    }

    async fn run_worker(
        repo_id: u64,
        repo_plan: RepoPlan,
        fetcher: Arc<Fetcher>,
        cancel: CancellationToken,
        results_tx: mpsc::Sender<RepoExecutionResult>,
    ) {
        let keys = repo_plan.sorted_dependencies(fetcher.as_ref());
        let mut result = RepoExecutionResult::new(repo_id);

        // Sequential within a worker, in priority order — parallelism is
        // across repos only (SPEC_FULL.md §4.5 "Ordering guarantees"). The
        // single-flight cache makes cross-repo duplicate fetches free.
        for key in keys {
            if cancel.is_cancelled() {
                return;
            }
            match fetch_one(&fetcher, &repo_plan, key).await {
                Ok(value) => {
                    result.data.insert(key, value);
                }
                Err(err) => {
                    result.errors.insert(key, err);
                }
            }
        }

        if cancel.is_cancelled() {
            return;
        }

        debug!(repo_id, keys_fetched = result.data.len(), keys_failed = result.errors.len(), "repo worker finished");

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {}
            send = results_tx.send(result) => { send.ok(); }
        }
    }
}

async fn fetch_one(
    fetcher: &Fetcher,
    repo_plan: &RepoPlan,
    key: DependencyKey,
) -> Result<serde_json::Value, repowarden_fetch::FetchError> {
    let scope = fetcher.scope_of(key).unwrap_or(Scope::Repo);
    let subject = match scope {
        Scope::Repo => FetchSubject::Repo(repo_plan.repo.clone()),
        Scope::Org => FetchSubject::Org(repo_plan.repo.owner.clone()),
    };
    fetcher.fetch(subject, key, HashMap::new()).await
}

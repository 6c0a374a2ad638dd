//! The Evaluator (SPEC_FULL.md §4.6): single consumer of the scheduler's
//! results stream, enforcing the dependency gate and the undeclared-access
//! invariant, and forwarding lifecycle events plus rule results to the
//! Output Manager.

use crate::gate::{dependency_gate, DispositionLookup};
use crate::outcome::EvalOutcome;
use repowarden_core::metrics::METRICS;
use repowarden_core::{DataContext, MapDataContext, RuleResult, RuleStatus, ScanPlan, TrackingDataContext};
use repowarden_output::{Event, OutputManager, OutputValue};
use repowarden_scheduler::{RepoExecutionResult, SchedulerError};
use std::collections::HashSet;
use tokio::sync::mpsc;
use tracing::{debug, warn};

pub struct Evaluator;

impl Evaluator {
    /// Consumes `results` to completion, then drains `errors` for a fatal
    /// cause. `plan` supplies the rule count for `run.started` and is not
    /// otherwise consulted — each `RepoExecutionResult`'s own `RepoPlan` was
    /// already folded in by the caller, since the scheduler only ever hands
    /// back `repo_id`s that came from `plan`; the evaluator looks the
    /// `RepoPlan` back up here to get each repo's rule list and identity.
    pub async fn run(
        mut results: mpsc::Receiver<RepoExecutionResult>,
        mut errors: mpsc::Receiver<SchedulerError>,
        plan: &ScanPlan,
        sinks: &OutputManager,
        dispositions: &dyn DispositionLookup,
        verbose_errors: bool,
    ) -> EvalOutcome {
        let rule_count = plan.values().next().map(|p| p.rules.len()).unwrap_or(0);
        let _ = sinks.write(&OutputValue::Event(Event::RunStarted { repos: plan.len(), rules: rule_count })).await;

        let mut outcome = EvalOutcome::default();

        while let Some(execution) = results.recv().await {
            let Some(repo_plan) = plan.get(&execution.repo_id) else {
                warn!(repo_id = execution.repo_id, "scheduler returned a repo id absent from the plan");
                continue;
            };
            let repo_name = repo_plan.repo.full_name();
            METRICS.inc_repo_scanned();

            let _ = sinks.write(&OutputValue::Event(Event::RepoStarted { repo: repo_name.clone() })).await;

            let context = MapDataContext::new(execution.data.clone());

            for rule in &repo_plan.rules {
                let result = evaluate_one(
                    rule.as_ref(),
                    &repo_plan.repo,
                    &context,
                    &execution,
                    dispositions,
                    verbose_errors,
                );

                METRICS.inc_rule_result(result.status);
                match result.status {
                    RuleStatus::Error => outcome.has_errors = true,
                    RuleStatus::Fail => outcome.has_failures = true,
                    RuleStatus::Pass | RuleStatus::Skipped => {}
                }

                debug!(repo = %repo_name, rule_id = %result.rule_id, status = ?result.status, "rule result");
                let _ = sinks.write(&OutputValue::Result(result)).await;
            }

            let _ = sinks.write(&OutputValue::Event(Event::RepoFinished { repo: repo_name })).await;
        }

        if let Some(fatal) = errors.recv().await {
            outcome.fatal = Some(fatal.to_string());
        }

        let _ = sinks.write(&OutputValue::Event(Event::RunFinished { exit_code: outcome.exit_code() })).await;
        let _ = sinks.close().await;

        outcome
    }
}

fn evaluate_one(
    rule: &dyn repowarden_core::Rule,
    repo: &repowarden_core::RepositoryRef,
    context: &MapDataContext,
    execution: &RepoExecutionResult,
    dispositions: &dyn DispositionLookup,
    verbose_errors: bool,
) -> RuleResult {
    let declared = match rule.dependencies(repo) {
        Ok(keys) => keys,
        Err(err) => {
            return RuleResult::error(rule.id(), repo.full_name(), err.to_string());
        }
    };

    if let Some(gate) = dependency_gate(&declared, &execution.data, &execution.errors, dispositions, verbose_errors) {
        return RuleResult::new(rule.id(), repo.full_name(), gate.status).with_message(gate.message);
    }

    let declared_set: HashSet<_> = declared.iter().copied().collect();
    let tracking = TrackingDataContext::new(context as &dyn DataContext);
    let evaluated = rule.evaluate(repo, &tracking);
    let accessed = tracking.accessed_keys();

    let undeclared: Vec<&str> = {
        let mut keys: Vec<&str> =
            accessed.difference(&declared_set).map(|k| k.as_str()).collect();
        keys.sort_unstable();
        keys
    };

    if !undeclared.is_empty() {
        let message = match &evaluated {
            Ok(_) => format!("undeclared dependency access: [{}]", undeclared.join(", ")),
            Err(err) => format!(
                "undeclared dependency access: [{}]; evaluation error: {}",
                undeclared.join(", "),
                err
            ),
        };
        return RuleResult::error(rule.id(), repo.full_name(), message);
    }

    match evaluated {
        Ok(result) => result.backfill(rule.id(), &repo.full_name()),
        Err(err) => RuleResult::error(rule.id(), repo.full_name(), err.to_string()),
    }
}

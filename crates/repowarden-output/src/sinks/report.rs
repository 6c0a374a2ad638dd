//! Report sink (spec.md §4.7): accumulates every rule result and lifecycle
//! count, synthesizes a deterministic summary document on close. Mirrors the
//! teacher's typed-artifact-plus-writer-function pattern in
//! `aivcs-core::reporting` (`EvalResultsArtifact`/`write_eval_results_json`),
//! generalized from eval-case outcomes to rule results.

use crate::error::SinkError;
use crate::output_value::OutputValue;
use crate::sink::Sink;
use chrono::{DateTime, Utc};
use repowarden_core::{RuleResult, RuleStatus};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;

/// Canonical summary document written once, on close.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportDocument {
    pub generated_at: DateTime<Utc>,
    pub repos_scanned: usize,
    pub rules_evaluated: usize,
    pub status_counts: BTreeMap<RuleStatus, usize>,
    /// FAIL and ERROR results, repo then rule_id order.
    pub blockers: Vec<RuleResult>,
    pub results: Vec<RuleResult>,
}

/// Builds the document from a flat list of results, accumulated in receipt
/// order (the caller, e.g. `ReportSink`, tracks `repos_scanned`/
/// `rules_evaluated` separately since those come from lifecycle events, not
/// the results themselves).
pub fn render_report_document(
    results: Vec<RuleResult>,
    repos_scanned: usize,
    rules_evaluated: usize,
    generated_at: DateTime<Utc>,
) -> ReportDocument {
    let mut status_counts: BTreeMap<RuleStatus, usize> = BTreeMap::new();
    for result in &results {
        *status_counts.entry(result.status).or_insert(0) += 1;
    }

    let mut blockers: Vec<RuleResult> = results
        .iter()
        .filter(|r| matches!(r.status, RuleStatus::Fail | RuleStatus::Error))
        .cloned()
        .collect();
    blockers.sort_by(|a, b| (a.repo.as_str(), a.rule_id.as_str()).cmp(&(b.repo.as_str(), b.rule_id.as_str())));

    ReportDocument { generated_at, repos_scanned, rules_evaluated, status_counts, blockers, results }
}

struct ReportState {
    results: Vec<RuleResult>,
    repos: HashSet<String>,
    rule_ids: HashSet<String>,
    closed: bool,
}

/// Writes the rendered `ReportDocument` as pretty JSON to `writer` on close.
/// `now` supplies the document's `generated_at` timestamp (injected rather
/// than read from the clock so the sink stays deterministic and testable).
pub struct ReportSink<W, F: Fn() -> DateTime<Utc> + Send + Sync> {
    writer: Mutex<W>,
    state: Mutex<ReportState>,
    now: F,
}

impl<W: AsyncWrite + Unpin + Send, F: Fn() -> DateTime<Utc> + Send + Sync> ReportSink<W, F> {
    pub fn new(writer: W, now: F) -> Self {
        Self {
            writer: Mutex::new(writer),
            state: Mutex::new(ReportState {
                results: Vec::new(),
                repos: HashSet::new(),
                rule_ids: HashSet::new(),
                closed: false,
            }),
            now,
        }
    }
}

#[async_trait::async_trait]
impl<W: AsyncWrite + Unpin + Send, F: Fn() -> DateTime<Utc> + Send + Sync> Sink for ReportSink<W, F> {
    async fn write(&self, value: &OutputValue) -> Result<(), SinkError> {
        let mut state = self.state.lock().await;
        if state.closed {
            return Err(SinkError::Closed);
        }
        if let Some(result) = value.as_result() {
            state.repos.insert(result.repo.clone());
            state.rule_ids.insert(result.rule_id.clone());
            state.results.push(result.clone());
        }
        Ok(())
    }

    async fn close(&self) -> Result<(), SinkError> {
        let mut state = self.state.lock().await;
        if state.closed {
            return Ok(());
        }
        state.closed = true;

        let document = render_report_document(
            state.results.clone(),
            state.repos.len(),
            state.rule_ids.len(),
            (self.now)(),
        );
        let rendered =
            serde_json::to_string_pretty(&document).map_err(|e| SinkError::Serialize(e.to_string()))?;

        let mut writer = self.writer.lock().await;
        writer.write_all(rendered.as_bytes()).await.map_err(|e| SinkError::Io(e.to_string()))?;
        writer.flush().await.map_err(|e| SinkError::Io(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use repowarden_core::RuleStatus;

    fn fixed_now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z").unwrap().with_timezone(&Utc)
    }

    #[test]
    fn blockers_are_fail_and_error_sorted_by_repo_then_rule() {
        let results = vec![
            RuleResult::new("z-rule", "acme/b", RuleStatus::Fail),
            RuleResult::new("a-rule", "acme/a", RuleStatus::Error),
            RuleResult::new("m-rule", "acme/a", RuleStatus::Fail),
            RuleResult::new("ok-rule", "acme/a", RuleStatus::Pass),
        ];
        let doc = render_report_document(results, 2, 4, fixed_now());

        assert_eq!(doc.blockers.len(), 3);
        assert_eq!(doc.blockers[0].rule_id, "a-rule");
        assert_eq!(doc.blockers[1].rule_id, "m-rule");
        assert_eq!(doc.blockers[2].repo, "acme/b");
        assert_eq!(doc.status_counts[&RuleStatus::Pass], 1);
        assert_eq!(doc.status_counts[&RuleStatus::Fail], 2);
    }

    #[tokio::test]
    async fn close_writes_pretty_json_document_ignoring_events() {
        use crate::event::Event;

        let sink = ReportSink::new(Vec::<u8>::new(), fixed_now);
        sink.write(&OutputValue::Event(Event::RunStarted { repos: 1, rules: 1 })).await.unwrap();
        sink.write(&OutputValue::Result(RuleResult::new("always-pass", "acme/a", RuleStatus::Pass)))
            .await
            .unwrap();
        sink.close().await.unwrap();

        let written = sink.writer.into_inner();
        let parsed: ReportDocument = serde_json::from_slice(&written).unwrap();
        assert_eq!(parsed.repos_scanned, 1);
        assert_eq!(parsed.rules_evaluated, 1);
        assert_eq!(parsed.results.len(), 1);
    }
}

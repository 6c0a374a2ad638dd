//! Lifecycle events (SPEC_FULL.md §3/§6): the four event types the
//! evaluator emits around each repo's rule results. Rule results themselves
//! travel as `OutputValue::Result` rather than an `Event` variant — the
//! NDJSON sink wraps them as `{type: "rule.result", ...}` at serialization
//! time (SPEC_FULL.md §4.7), so `Event` only needs to model the four purely
//! structural lifecycle markers.

use serde_json::{json, Value};

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    RunStarted { repos: usize, rules: usize },
    RepoStarted { repo: String },
    RepoFinished { repo: String },
    RunFinished { exit_code: i32 },
}

impl Event {
    /// The NDJSON `type` tag for this event.
    pub fn type_tag(&self) -> &'static str {
        match self {
            Event::RunStarted { .. } => "run.started",
            Event::RepoStarted { .. } => "repo.started",
            Event::RepoFinished { .. } => "repo.finished",
            Event::RunFinished { .. } => "run.finished",
        }
    }

    /// One NDJSON-ready JSON object for this event.
    pub fn to_json(&self) -> Value {
        match self {
            Event::RunStarted { repos, rules } => json!({
                "type": self.type_tag(),
                "repos": repos,
                "rules": rules,
            }),
            Event::RepoStarted { repo } => json!({
                "type": self.type_tag(),
                "repo": repo,
            }),
            Event::RepoFinished { repo } => json!({
                "type": self.type_tag(),
                "repo": repo,
            }),
            Event::RunFinished { exit_code } => json!({
                "type": self.type_tag(),
                "exit_code": exit_code,
            }),
        }
    }
}

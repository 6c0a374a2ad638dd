//! Sink-level and manager-level error types (SPEC_FULL.md §7:
//! "SinkWriteError — best-effort; aggregated across sinks; does not abort
//! the run").

use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum SinkError {
    #[error("sink io error: {0}")]
    Io(String),

    #[error("sink serialization error: {0}")]
    Serialize(String),

    #[error("sink already closed")]
    Closed,
}

/// Aggregated failures from a single `OutputManager::write`/`close` call.
/// One entry per sink that failed; a sink that succeeds contributes nothing.
#[derive(Debug, Error, Clone)]
#[error("{} sink(s) failed: {}", .0.len(), summarize(.0))]
pub struct OutputError(pub Vec<SinkError>);

fn summarize(errors: &[SinkError]) -> String {
    errors.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; ")
}

impl OutputError {
    pub fn from_failures(failures: Vec<SinkError>) -> Option<Self> {
        if failures.is_empty() {
            None
        } else {
            Some(OutputError(failures))
        }
    }
}

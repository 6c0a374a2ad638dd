//! `EngineConfig` — the plain config value object the CLI constructs from
//! parsed flags/env and passes into the engine, mirroring how the teacher's
//! `CiSpec` carries validated configuration into `aivcs-ci::CiPipeline::run`
//! (SPEC_FULL.md §1). The core does not parse flags itself; this is just the
//! shape collaborators hand in.

use std::time::Duration;

/// Validated engine configuration, constructed by the CLI (or any other
/// caller) and threaded through the scheduler and fetcher.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Number of repo-workers the scheduler runs in parallel. Must be >= 1.
    pub concurrency: usize,
    /// Optional wall-clock deadline for the whole scan; `None` means no
    /// deadline beyond the ambient cancellation signal.
    pub deadline: Option<Duration>,
    /// When `true`, fetch error messages keep client-library boilerplate
    /// (method + URL prefixes) instead of being sanitized (SPEC_FULL.md §7).
    pub verbose_errors: bool,
}

impl EngineConfig {
    pub fn new(concurrency: usize) -> Self {
        Self {
            concurrency: concurrency.max(1),
            deadline: None,
            verbose_errors: false,
        }
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_verbose_errors(mut self, verbose: bool) -> Self {
        self.verbose_errors = verbose;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new(4)
    }
}

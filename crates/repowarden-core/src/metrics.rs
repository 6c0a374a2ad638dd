//! Global atomic counters for scan observability.
//!
//! Counters are incremented silently at the call site from the fetcher,
//! scheduler and evaluator. Call [`Metrics::flush`] to emit current values
//! as a single `tracing::info!` event (the CLI does this once at run end).

use std::sync::atomic::{AtomicU64, Ordering};

/// Global metrics singleton, shared across the fetch/scheduler/eval crates.
pub static METRICS: Metrics = Metrics::new();

/// A point-in-time snapshot of every counter, for `flush` callers and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetricsSnapshot {
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub fetches_issued: u64,
    pub repos_scanned: u64,
    pub rule_results_pass: u64,
    pub rule_results_fail: u64,
    pub rule_results_error: u64,
    pub rule_results_skipped: u64,
}

/// Lightweight atomic counters — no allocations, no locking.
pub struct Metrics {
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    fetches_issued: AtomicU64,
    repos_scanned: AtomicU64,
    rule_results_pass: AtomicU64,
    rule_results_fail: AtomicU64,
    rule_results_error: AtomicU64,
    rule_results_skipped: AtomicU64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            cache_hits: AtomicU64::new(0),
            cache_misses: AtomicU64::new(0),
            fetches_issued: AtomicU64::new(0),
            repos_scanned: AtomicU64::new(0),
            rule_results_pass: AtomicU64::new(0),
            rule_results_fail: AtomicU64::new(0),
            rule_results_error: AtomicU64::new(0),
            rule_results_skipped: AtomicU64::new(0),
        }
    }

    pub fn inc_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_fetch_issued(&self) {
        self.fetches_issued.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_repo_scanned(&self) {
        self.repos_scanned.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_rule_result(&self, status: crate::domain::RuleStatus) {
        use crate::domain::RuleStatus::*;
        let counter = match status {
            Pass => &self.rule_results_pass,
            Fail => &self.rule_results_fail,
            Error => &self.rule_results_error,
            Skipped => &self.rule_results_skipped,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            fetches_issued: self.fetches_issued.load(Ordering::Relaxed),
            repos_scanned: self.repos_scanned.load(Ordering::Relaxed),
            rule_results_pass: self.rule_results_pass.load(Ordering::Relaxed),
            rule_results_fail: self.rule_results_fail.load(Ordering::Relaxed),
            rule_results_error: self.rule_results_error.load(Ordering::Relaxed),
            rule_results_skipped: self.rule_results_skipped.load(Ordering::Relaxed),
        }
    }

    /// Emit all current counter values as a single `info!` event.
    pub fn flush(&self) {
        tracing::info!(
            metric = "flush",
            cache_hits = self.cache_hits.load(Ordering::Relaxed),
            cache_misses = self.cache_misses.load(Ordering::Relaxed),
            fetches_issued = self.fetches_issued.load(Ordering::Relaxed),
            repos_scanned = self.repos_scanned.load(Ordering::Relaxed),
            rule_results_pass = self.rule_results_pass.load(Ordering::Relaxed),
            rule_results_fail = self.rule_results_fail.load(Ordering::Relaxed),
            rule_results_error = self.rule_results_error.load(Ordering::Relaxed),
            rule_results_skipped = self.rule_results_skipped.load(Ordering::Relaxed),
        );
    }

    /// Reset all counters to zero (useful in tests).
    pub fn reset(&self) {
        self.cache_hits.store(0, Ordering::Relaxed);
        self.cache_misses.store(0, Ordering::Relaxed);
        self.fetches_issued.store(0, Ordering::Relaxed);
        self.repos_scanned.store(0, Ordering::Relaxed);
        self.rule_results_pass.store(0, Ordering::Relaxed);
        self.rule_results_fail.store(0, Ordering::Relaxed);
        self.rule_results_error.store(0, Ordering::Relaxed);
        self.rule_results_skipped.store(0, Ordering::Relaxed);
    }
}

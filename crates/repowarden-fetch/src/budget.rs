//! Forge rate-limit budget tracking (SPEC_FULL.md §4.4). The fetcher updates
//! this from response headers after every call; the core only exposes the
//! accessor — slow-down policy is out of scope (spec.md §1 Non-goals).

use std::sync::atomic::{AtomicI64, Ordering};

/// A point-in-time snapshot of the forge's rate-limit budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BudgetSnapshot {
    pub remaining: i64,
    pub reset_at_epoch_secs: i64,
}

/// Shared, lock-free counter updated from `X-RateLimit-Remaining` /
/// `X-RateLimit-Reset`-shaped response headers.
#[derive(Debug, Default)]
pub struct RequestBudget {
    remaining: AtomicI64,
    reset_at: AtomicI64,
}

impl RequestBudget {
    pub fn new() -> Self {
        Self {
            remaining: AtomicI64::new(-1),
            reset_at: AtomicI64::new(0),
        }
    }

    /// Record the budget reported by a response. `-1` for `remaining` means
    /// "unknown" and is never recorded over a known value.
    pub fn record(&self, remaining: i64, reset_at_epoch_secs: i64) {
        if remaining >= 0 {
            self.remaining.store(remaining, Ordering::Relaxed);
            self.reset_at.store(reset_at_epoch_secs, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> BudgetSnapshot {
        BudgetSnapshot {
            remaining: self.remaining.load(Ordering::Relaxed),
            reset_at_epoch_secs: self.reset_at.load(Ordering::Relaxed),
        }
    }
}

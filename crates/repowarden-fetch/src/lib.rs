//! repowarden-fetch — the dependency provider table, single-flight cache,
//! forge client abstraction and budget tracking for the repowarden
//! repository-governance scanner. SPEC_FULL.md §4.4.

pub mod budget;
pub mod cache;
pub mod client;
pub mod disposition;
pub mod error;
pub mod provider;
pub mod providers;
pub mod sanitize;

pub use budget::{BudgetSnapshot, RequestBudget};
pub use client::{ClientError, ForgeClient, ReqwestForgeClient, ResponseMeta};
pub use disposition::{Disposition, DispositionTable};
pub use error::FetchError;
pub use provider::{FetchCtx, FetchSubject, Fetcher, FetcherBuilder, ProviderFn};
pub use sanitize::sanitize_message;

use repowarden_core::{DependencyKey, Priority, PriorityLookup};

impl PriorityLookup for Fetcher {
    fn priority_of(&self, key: DependencyKey) -> Priority {
        Fetcher::priority_of(self, key)
    }
}

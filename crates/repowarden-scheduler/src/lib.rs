//! repowarden-scheduler — bounded-concurrency repo-worker scheduler for the
//! repowarden repository-governance scanner. SPEC_FULL.md §4.5.

pub mod error;
pub mod result;
pub mod scheduler;

pub use error::SchedulerError;
pub use result::RepoExecutionResult;
pub use scheduler::Scheduler;

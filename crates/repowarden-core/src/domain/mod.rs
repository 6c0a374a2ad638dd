//! Domain model for the repowarden scanner core.
//!
//! Canonical definitions for the entities described in SPEC_FULL.md §3:
//! repository handles, dependency keys, the read-only data context rules
//! evaluate against, the rule trait itself, and rule results.

pub mod context;
pub mod error;
pub mod key;
pub mod repo;
pub mod rule;

pub use context::{DataContext, MapDataContext, TrackingDataContext};
pub use error::{CoreError, Result};
pub use key::{DependencyKey, Priority, Scope};
pub use repo::RepositoryRef;
pub use rule::{ConfigurableRule, Rule, RuleOption, RuleResult, RuleStatus};

//! repowarden-rules — a handful of concrete, illustrative governance rules.
//!
//! Not part of the hard core (SPEC_FULL.md §1/§2): the registry and planner
//! are polymorphic over `dyn Rule`, and the engine would work with any
//! caller-supplied rule set. This crate exists so the CLI has something
//! real to register and exercise end to end.

pub mod branch_protection;
pub mod default_branch_baseline;
pub mod review_required;
pub mod rulesets;

pub use branch_protection::BranchProtectionRequired;
pub use default_branch_baseline::DefaultBranchMatchesOrgBaseline;
pub use review_required::ReviewRequired;
pub use rulesets::RulesetsRequired;

use repowarden_core::{CoreError, RuleRegistry};
use std::sync::Arc;

/// Register every built-in rule against `registry`. The explicit injection
/// point SPEC_FULL.md §4.1/§9 calls for in a language without implicit
/// static initializers — the CLI calls this once at startup.
pub fn register_all(registry: &RuleRegistry) -> Result<(), CoreError> {
    registry.register(Arc::new(BranchProtectionRequired::default()))?;
    registry.register(Arc::new(RulesetsRequired))?;
    registry.register(Arc::new(DefaultBranchMatchesOrgBaseline))?;
    registry.register(Arc::new(ReviewRequired))?;
    Ok(())
}

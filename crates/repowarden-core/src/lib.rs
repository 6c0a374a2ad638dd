//! repowarden-core — data model, rule contract, rule registry, allow-list
//! decorator, scan planner and shared telemetry/metrics for the repowarden
//! repository-governance scanner.
//!
//! See SPEC_FULL.md for the full component design; this crate covers §3 and
//! §4.1-4.3.

pub mod allowlist;
pub mod config;
pub mod domain;
pub mod metrics;
pub mod options;
pub mod planner;
pub mod registry;
pub mod telemetry;

pub use allowlist::AllowListRule;
pub use config::EngineConfig;
pub use domain::{
    ConfigurableRule, CoreError, DataContext, DependencyKey, MapDataContext, Priority,
    RepositoryRef, Result, Rule, RuleOption, RuleResult, RuleStatus, Scope, TrackingDataContext,
};
pub use options::{parse_assignments, Assignment, AssignmentParseError};
pub use planner::{PriorityLookup, RepoPlan, ScanPlan, ScanPlanner};
pub use registry::RuleRegistry;

//! Error taxonomy for the registration and planning stages.
//!
//! Fetch, scheduling and per-rule evaluation errors live in their own
//! crates (`repowarden-fetch::FetchError`, `repowarden-scheduler::SchedulerError`);
//! this enum covers the errors that can occur while assembling the engine
//! itself — registry mutation and scan-plan construction.

/// Errors raised while registering rules or building a scan plan.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("duplicate rule id: {0}")]
    DuplicateRule(String),

    #[error("unknown rule id: {0}")]
    UnknownRule(String),

    #[error("unknown option {option:?} for rule {rule_id:?}")]
    UnknownOption { rule_id: String, option: String },

    #[error("rule {rule_id} is not configurable but received option {option:?}")]
    NotConfigurable { rule_id: String, option: String },

    #[error("rule {rule_id} dependencies() failed: {message}")]
    RuleDependencyError { rule_id: String, message: String },
}

/// Result type for core registration/planning operations.
pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_rule_message_names_id() {
        let err = CoreError::DuplicateRule("branch-protection".to_string());
        assert!(err.to_string().contains("branch-protection"));
    }

    #[test]
    fn unknown_option_message_names_both() {
        let err = CoreError::UnknownOption {
            rule_id: "allow-list".to_string(),
            option: "topic".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("allow-list"));
        assert!(msg.contains("topic"));
    }
}

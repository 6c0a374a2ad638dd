//! Dependency gate (SPEC_FULL.md §4.6 step b): decides, for one rule's
//! declared keys against a repo's fetched data and errors, whether the rule
//! can proceed to `evaluate` or must short-circuit with an ERROR/SKIPPED
//! result.

use repowarden_core::{DependencyKey, RuleStatus};
use repowarden_fetch::{sanitize_message, Disposition, FetchError};
use std::collections::HashMap;

/// Per-key disposition lookup the gate consults. Implemented by
/// `repowarden_fetch::Fetcher`.
pub trait DispositionLookup {
    fn disposition_of(&self, key: DependencyKey) -> Disposition;
}

impl DispositionLookup for repowarden_fetch::Fetcher {
    fn disposition_of(&self, key: DependencyKey) -> Disposition {
        repowarden_fetch::Fetcher::disposition_of(self, key)
    }
}

/// A short-circuit result the gate produced; `None` means every declared key
/// resolved and the rule may proceed to `evaluate`.
pub struct GateOutcome {
    pub status: RuleStatus,
    pub message: String,
}

struct Cause {
    key: DependencyKey,
    disposition: Disposition,
    message: String,
    missing_no_error: bool,
}

pub fn dependency_gate(
    declared: &[DependencyKey],
    data: &HashMap<DependencyKey, serde_json::Value>,
    errors: &HashMap<DependencyKey, FetchError>,
    dispositions: &dyn DispositionLookup,
    verbose_errors: bool,
) -> Option<GateOutcome> {
    let mut causes: Vec<Cause> = Vec::new();

    for &key in declared {
        if data.contains_key(&key) {
            continue;
        }
        if let Some(err) = errors.get(&key) {
            causes.push(Cause {
                key,
                disposition: dispositions.disposition_of(key),
                message: sanitize_message(&err.to_string(), verbose_errors),
                missing_no_error: false,
            });
        } else {
            causes.push(Cause {
                key,
                disposition: Disposition::Hard,
                message: "missing".to_string(),
                missing_no_error: true,
            });
        }
    }

    if causes.is_empty() {
        return None;
    }

    // Declared keys that were never attempted at all (no data, no recorded
    // error): if that is the *entire* failure set, report it with the
    // dedicated "Missing dependencies" message rather than the per-key
    // disposition format.
    if causes.iter().all(|c| c.missing_no_error) {
        let mut keys: Vec<&str> = causes.iter().map(|c| c.key.as_str()).collect();
        keys.sort_unstable();
        return Some(GateOutcome {
            status: RuleStatus::Error,
            message: format!("Missing dependencies: [{}]", keys.join(", ")),
        });
    }

    let any_hard = causes.iter().any(|c| c.disposition == Disposition::Hard);
    let message = if causes.len() == 1 {
        causes[0].message.clone()
    } else {
        causes
            .iter()
            .map(|c| format!("{}: {}", c.key.as_str(), c.message))
            .collect::<Vec<_>>()
            .join("; ")
    };

    Some(GateOutcome { status: if any_hard { RuleStatus::Error } else { RuleStatus::Skipped }, message })
}

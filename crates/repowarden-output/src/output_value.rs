//! `OutputValue` (SPEC_FULL.md §4.7): the single type that flows through
//! `Sink::write`, so the manager has one fan-out call rather than two
//! parallel paths for lifecycle events and rule results.

use crate::event::Event;
use repowarden_core::RuleResult;
use serde_json::{json, Value};

#[derive(Debug, Clone, PartialEq)]
pub enum OutputValue {
    Event(Event),
    Result(RuleResult),
}

impl OutputValue {
    /// NDJSON-ready JSON object. A `Result` is wrapped as
    /// `{type: "rule.result", ...RuleResult fields}` per the wire format in
    /// SPEC_FULL.md §6 ("a rule.result object embeds the full Result fields
    /// at the top level... and repo duplicated at the event level").
    pub fn to_json(&self) -> Value {
        match self {
            OutputValue::Event(event) => event.to_json(),
            OutputValue::Result(result) => {
                let mut value = serde_json::to_value(result).unwrap_or_else(|_| json!({}));
                if let Value::Object(map) = &mut value {
                    map.insert("type".to_string(), json!("rule.result"));
                }
                value
            }
        }
    }

    /// `Some(result)` when this value carries a rule result, for sinks that
    /// only aggregate results (the JSON/Report sinks ignore lifecycle
    /// events entirely).
    pub fn as_result(&self) -> Option<&RuleResult> {
        match self {
            OutputValue::Result(result) => Some(result),
            OutputValue::Event(_) => None,
        }
    }
}

//! Pure parser for rule-option assignment syntax: `ruleID.option=value`,
//! comma- or repeat-separable, per SPEC_FULL.md §6. No I/O, no flag
//! framework — the CLI flag surface stays external, this just turns
//! strings into structured assignments for the engine builder to validate.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AssignmentParseError {
    #[error("assignment {0:?} is missing '='")]
    MissingEquals(String),
    #[error("assignment {0:?} is missing '.' between rule id and option name")]
    MissingDot(String),
    #[error("assignment {0:?} has an empty rule id")]
    EmptyRuleId(String),
    #[error("assignment {0:?} has an empty option name")]
    EmptyOption(String),
}

/// One `ruleID.option=value` assignment. Empty values are legal — only the
/// rule id and option name must be non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub rule_id: String,
    pub option: String,
    pub value: String,
}

/// Parse a list of raw assignment strings (each possibly containing
/// comma-separated assignments, since the syntax is "comma- or
/// repeat-separable") into structured `Assignment`s.
///
/// Parsing fails on the first malformed entry. Unknown rule IDs/options are
/// *not* checked here — that validation happens against the registry,
/// downstream of this pure parser.
pub fn parse_assignments(raw: &[String]) -> Result<Vec<Assignment>, AssignmentParseError> {
    let mut out = Vec::new();
    for entry in raw {
        for piece in entry.split(',') {
            let piece = piece.trim();
            if piece.is_empty() {
                continue;
            }
            out.push(parse_one(piece)?);
        }
    }
    Ok(out)
}

fn parse_one(piece: &str) -> Result<Assignment, AssignmentParseError> {
    let (lhs, value) = piece
        .split_once('=')
        .ok_or_else(|| AssignmentParseError::MissingEquals(piece.to_string()))?;
    let (rule_id, option) = lhs
        .split_once('.')
        .ok_or_else(|| AssignmentParseError::MissingDot(piece.to_string()))?;
    if rule_id.is_empty() {
        return Err(AssignmentParseError::EmptyRuleId(piece.to_string()));
    }
    if option.is_empty() {
        return Err(AssignmentParseError::EmptyOption(piece.to_string()));
    }
    Ok(Assignment {
        rule_id: rule_id.to_string(),
        option: option.to_string(),
        value: value.to_string(),
    })
}

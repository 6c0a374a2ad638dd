//! Shared sink output format (spec.md §4.7: "Formats {text, json, ndjson}"),
//! plus the File sink's extension-inferred default (SPEC_FULL.md §4.7,
//! spec.md §4.7: "format inferred from extension when omitted").

use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Ndjson,
}

impl OutputFormat {
    /// `.json` → `Json`, `.ndjson`/`.jsonl` → `Ndjson`, anything else → `Text`.
    pub fn infer_from_path(path: &Path) -> OutputFormat {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => OutputFormat::Json,
            Some("ndjson") | Some("jsonl") => OutputFormat::Ndjson,
            _ => OutputFormat::Text,
        }
    }
}

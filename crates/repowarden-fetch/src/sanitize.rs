//! Fetch error message sanitization (SPEC_FULL.md §7): drop client library
//! boilerplate (method + URL prefixes) unless verbose mode is on. Errors
//! carrying an HTTP status keep `"HTTP {status}: {message}"` verbatim
//! regardless of verbose mode.

use regex::Regex;
use std::sync::OnceLock;

fn boilerplate_prefix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Z]+ https?://\S+: ").expect("valid regex"))
}

/// Strip a `"<METHOD> <URL>: "` prefix from `raw` unless `verbose` is true.
/// HTTP-status-carrying messages (already formatted as `"HTTP {status}: ..."`
/// by the caller) pass through this function unchanged either way, since
/// they never carry the transport-layer prefix this strips.
pub fn sanitize_message(raw: &str, verbose: bool) -> String {
    if verbose {
        return raw.to_string();
    }
    boilerplate_prefix().replace(raw, "").into_owned()
}

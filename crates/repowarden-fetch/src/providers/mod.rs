//! Concrete dependency keys and their providers.
//!
//! Each key here is a named constant exposed for rules and the CLI/demo
//! wiring to reference — per SPEC_FULL.md §3, keys are not arbitrary
//! runtime strings, they are declared once by the provider that can fetch
//! them. `register_all` is the explicit, process-wide registration point
//! (Rust has no implicit static initializers, SPEC_FULL.md §4.1/§9).

pub mod keys;
pub mod repo;
pub mod org;

use crate::provider::FetcherBuilder;
use crate::error::FetchError;

/// Register every built-in provider against `builder`. Construction-time
/// failure (duplicate key) propagates to the caller as a setup error.
pub fn register_all(builder: &mut FetcherBuilder) -> Result<(), FetchError> {
    repo::register(builder)?;
    org::register(builder)?;
    Ok(())
}

//! repowarden-output — Output Manager and sinks for the repowarden
//! repository-governance scanner. SPEC_FULL.md §4.7.

pub mod error;
pub mod event;
pub mod format;
pub mod manager;
pub mod output_value;
pub mod sink;
pub mod sinks;

pub use error::{OutputError, SinkError};
pub use event::Event;
pub use format::OutputFormat;
pub use manager::OutputManager;
pub use output_value::OutputValue;
pub use sink::Sink;
pub use sinks::{ConsoleSink, EmitSink, FileSink, ReportDocument, ReportSink};
